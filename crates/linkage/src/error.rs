use std::fmt;

#[derive(Debug)]
pub enum LinkageError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (ratio out of range, empty separator, etc.).
    ConfigValidation(String),
    /// A generic company word that cannot be turned into a word pattern.
    InvalidCompanyWord { word: String, reason: String },
    /// IO error (config file read, etc.).
    Io(String),
}

impl fmt::Display for LinkageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::InvalidCompanyWord { word, reason } => {
                write!(f, "generic company word '{word}' is invalid: {reason}")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for LinkageError {}
