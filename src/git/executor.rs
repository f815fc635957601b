use std::path::{Path, PathBuf};
use std::process::Output;
use thiserror::Error;
use tokio::process::Command;

use crate::security::validator::{CommandSpec, CommandValidator, ValidationError};

#[derive(Debug, Error)]
pub enum GitError {
    #[error("{0}")]
    Rejected(#[from] ValidationError),

    #[error("Command 'git {command}' failed with exit code {exit_code}: {stderr}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GitError>;

/// Result of executing a git command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    /// Combined stdout and stderr, the way a terminal user would see it.
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Executes validated git commands in a fixed working directory.
///
/// Commands are passed to the git binary as an argument vector; no shell is
/// ever involved, so shell metacharacters have no effect beyond failing
/// validation upstream.
#[derive(Debug)]
pub struct GitExecutor {
    workdir: PathBuf,
}

impl GitExecutor {
    pub fn new<P: AsRef<Path>>(workdir: P) -> Self {
        Self {
            workdir: workdir.as_ref().to_path_buf(),
        }
    }

    /// Validate and execute a raw command string.
    ///
    /// The command may carry a leading `git` token or not; the validated,
    /// cleaned form is what actually runs. Validation failures propagate
    /// before any process is spawned.
    pub async fn execute(&self, raw: &str) -> Result<CommandOutput> {
        let validator = CommandValidator::new();
        let spec = validator.validate(raw)?;
        self.execute_validated(&spec).await
    }

    /// Execute an already-validated command.
    pub async fn execute_validated(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        let output = Command::new("git")
            .args(spec.argv())
            .current_dir(&self.workdir)
            .output()
            .await?;

        self.process_output(output, &spec.command)
    }

    /// Run a fixed, trusted argument vector, bypassing string validation.
    ///
    /// For internal composite operations whose arguments are constructed
    /// here (never from caller input), e.g. `branch --show-current`.
    pub async fn run_args(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .await?;

        self.process_output(output, &args.join(" "))
    }

    fn process_output(&self, output: Output, command: &str) -> Result<CommandOutput> {
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code().unwrap_or(-1);

        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: command.to_string(),
                exit_code,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(CommandOutput {
            stdout,
            stderr,
            exit_code,
        })
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}
