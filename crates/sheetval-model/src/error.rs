use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("invalid date format '{format}'")]
    InvalidDateFormat { format: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
