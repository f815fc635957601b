pub mod audit;
pub mod config;
pub mod error;
pub mod git;
pub mod security;
pub mod server;

// Re-export commonly used types for convenience
pub use error::{AppError, AppResult};
pub use git::{GitExecutor, Workdir};
pub use security::{CommandSpec, CommandValidator};
pub use server::{Session, ToolResponse};
