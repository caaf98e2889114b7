// Tabular file input

pub mod csv;
pub mod error;
pub mod table;
pub mod xlsx;

pub use error::IoError;
pub use table::{read_table, SourceFormat, Table};
