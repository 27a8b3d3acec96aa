use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum DomainError {
    #[error("Invalid record type flag: {0}")]
    InvalidRecordTypeFlag(char),

    #[error("Invalid error code flag: {0}")]
    InvalidErrorCodeFlag(char),

    #[error("Output error: {0}")]
    OutputError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::IoError(e.to_string())
    }
}
