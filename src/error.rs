use std::io;
use thiserror::Error;

// Import module-level errors for AppError
use crate::config::ConfigError;
use crate::git::executor::GitError;
use crate::git::workdir::WorkdirError;
use crate::security::validator::ValidationError;
use crate::server::handlers::ServerError;

/// Top-level application error that wraps all module-specific errors
///
/// This provides a unified error type for application-level code while preserving
/// the specific error context from each module. All module errors automatically
/// convert to AppError via the `From` trait.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("Working directory error: {0}")]
    Workdir(#[from] WorkdirError),

    #[error("Security validation error: {0}")]
    Security(#[from] ValidationError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for application-level operations
pub type AppResult<T> = std::result::Result<T, AppError>;
