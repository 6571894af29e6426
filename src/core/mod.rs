pub mod batch;
pub mod builders;
pub mod coerce;
pub mod columns;
pub mod etl;
pub mod fields;
pub mod identity;
pub mod pipeline;
pub mod transform;

pub use crate::domain::model::{BatchOutcome, JsonlBatch, Record, Row};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
