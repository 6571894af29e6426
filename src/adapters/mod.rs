// Adapters layer: concrete implementations for external systems (input sources, spreadsheet decoding).

pub mod source;
pub mod workbook;

pub use source::{SourceLocation, SourceReader};
pub use workbook::{decode_rows, InputFormat};
