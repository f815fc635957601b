pub mod executor;
pub mod ops;
pub mod workdir;

// Re-export commonly used types
pub use executor::{CommandOutput, GitError, GitExecutor};
pub use workdir::{Workdir, WorkdirError, WorkdirSource};
