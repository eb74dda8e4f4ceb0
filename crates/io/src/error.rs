use std::fmt;

#[derive(Debug)]
pub enum IoError {
    /// File could not be read.
    Read { path: String, message: String },
    /// File could not be created or written.
    Write { path: String, message: String },
    /// Encoding label not known to the WHATWG encoding registry.
    UnknownEncoding(String),
    /// Malformed CSV.
    Csv { source: String, message: String },
    /// Header row missing or too narrow for the expected layout.
    Header { source: String, message: String },
    /// A data row has fewer fields than the layout requires.
    ShortRow { source: String, line: u64, expected: usize, found: usize },
    /// Input exceeds the supported row / column counts.
    Oversize { source: String, rows: usize, cols: usize },
    /// Checkpoint unreadable or written by an incompatible run.
    Checkpoint(String),
    /// Excel workbook could not be written.
    Xlsx(String),
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => write!(f, "cannot read {path}: {message}"),
            Self::Write { path, message } => write!(f, "cannot write {path}: {message}"),
            Self::UnknownEncoding(label) => write!(f, "unknown encoding: '{label}'"),
            Self::Csv { source, message } => write!(f, "{source}: {message}"),
            Self::Header { source, message } => write!(f, "{source}: bad header: {message}"),
            Self::ShortRow { source, line, expected, found } => write!(
                f,
                "{source}, line {line}: expected at least {expected} fields, found {found}"
            ),
            Self::Oversize { source, rows, cols } => write!(
                f,
                "{source}: {rows} rows x {cols} columns exceeds the supported size"
            ),
            Self::Checkpoint(msg) => write!(f, "checkpoint error: {msg}"),
            Self::Xlsx(msg) => write!(f, "XLSX error: {msg}"),
        }
    }
}

impl std::error::Error for IoError {}
