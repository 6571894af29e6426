use crate::core::{BatchOutcome, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// 一次轉換的結果
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Written {
        output_path: String,
        record_count: usize,
        preview: String,
    },
    /// 輸入沒有任何資料列，不產生輸出檔
    NoRows,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        tracing::info!("🚀 Starting conversion...");

        // Extract
        let rows = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} rows", rows.len());
        self.monitor.log_phase("Extract", rows.len());

        // Transform
        let row_count = rows.len();
        let batch = match self.pipeline.transform(rows).await? {
            BatchOutcome::Converted(batch) => batch,
            BatchOutcome::NoRows => {
                tracing::warn!("📭 No rows found, nothing written");
                self.monitor.log_final_stats();
                return Ok(RunOutcome::NoRows);
            }
        };
        tracing::info!("🔧 Transformed {} records", batch.record_count);
        self.monitor.log_phase("Transform", row_count);

        // Load
        let record_count = batch.record_count;
        let preview = batch.preview.clone();
        let output_path = self.pipeline.load(batch).await?;
        tracing::info!("💾 Output saved to: {}", output_path);
        self.monitor.log_phase("Load", record_count);
        self.monitor.log_final_stats();

        Ok(RunOutcome::Written {
            output_path,
            record_count,
            preview,
        })
    }
}
