use std::fmt;

#[derive(Debug)]
pub enum IoError {
    /// File extension is not one of the accepted tabular formats.
    UnsupportedFormat(String),
    /// Container could not be decoded (bad workbook, malformed CSV, no sheets).
    Corrupt(String),
    /// An expected column is absent from the header row.
    MissingColumn(String),
    /// Filesystem error.
    Io(String),
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat(ext) if ext.is_empty() => {
                write!(f, "unsupported file format (no extension); use .xlsx, .xls or .csv")
            }
            Self::UnsupportedFormat(ext) => {
                write!(f, "unsupported file format '.{ext}'; use .xlsx, .xls or .csv")
            }
            Self::Corrupt(msg) => write!(f, "cannot read table: {msg}"),
            Self::MissingColumn(column) => write!(f, "column '{column}' not found in header"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for IoError {}

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
