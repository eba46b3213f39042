use thiserror::Error;

use crate::naming::DecodeError;
use crate::select::SelectionError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Path error: {0}")]
    Path(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("{tool} failed with {status}: {stderr}")]
    ExternalTool {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("{tool} did not finish within {secs}s")]
    Timeout { tool: String, secs: u64 },

    #[error("Storage operation failed: {0}")]
    Storage(String),

    #[error("{0} is not implemented")]
    NotImplemented(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
