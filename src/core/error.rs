use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Path error: {0}")]
    PathError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Precondition failed: {0}")]
    Precondition(String),
    #[error("Invalid source: {0}")]
    InvalidSource(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
}
