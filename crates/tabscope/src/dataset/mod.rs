//! In-memory dataset model consumed by the analysis engine.

mod table;
mod value;

pub use table::{Column, ColumnRef, Dataset, Table};
pub use value::CellValue;
