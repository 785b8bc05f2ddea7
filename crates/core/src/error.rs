use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneroError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Compiler error: {0}")]
    Compiler(String),
    #[error("Compiler timed out after {0} ms")]
    Timeout(u64),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GeneroError>;
