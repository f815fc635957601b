use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Dedicated override, highest-priority environment fallback.
pub const WORKDIR_ENV: &str = "GITWARD_WORKING_DIR";

#[derive(Debug, Error)]
pub enum WorkdirError {
    #[error("Directory does not exist: {0}")]
    DoesNotExist(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Failed to resolve working directory: {0}")]
    Unresolvable(#[source] std::io::Error),
}

/// How a resolution was satisfied, reported by the `show_working_dir` tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkdirSource {
    Explicit,
    EnvOverride,
    CwdArg,
    PwdEnv,
    ProcessCwd,
}

impl WorkdirSource {
    pub fn describe(self) -> &'static str {
        match self {
            WorkdirSource::Explicit => "set explicitly via set_working_dir",
            WorkdirSource::EnvOverride => "from the GITWARD_WORKING_DIR environment variable",
            WorkdirSource::CwdArg => "from a --cwd= process argument",
            WorkdirSource::PwdEnv => "from the PWD environment variable",
            WorkdirSource::ProcessCwd => "from the process current directory",
        }
    }
}

/// Where git commands run.
///
/// Owned by the session that handles one client connection and passed to
/// every operation, so concurrent sessions cannot observe each other's
/// directory changes. Unset until `set` is called or the first resolution
/// falls through the environment chain.
#[derive(Debug, Default)]
pub struct Workdir {
    explicit: Option<PathBuf>,
}

impl Workdir {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store an explicit working directory.
    ///
    /// The path must exist and be a directory at set time; later deletion is
    /// not re-checked at resolve time, a race the design accepts.
    pub fn set<P: AsRef<Path>>(&mut self, path: P) -> Result<PathBuf, WorkdirError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(WorkdirError::DoesNotExist(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(WorkdirError::NotADirectory(path.to_path_buf()));
        }

        let resolved = path.canonicalize().map_err(WorkdirError::Unresolvable)?;
        self.explicit = Some(resolved.clone());
        Ok(resolved)
    }

    /// Resolve the directory commands should run in.
    ///
    /// Priority: explicit setting, then `GITWARD_WORKING_DIR`, then a
    /// `--cwd=<path>` process argument, then `PWD` (ignored when it is the
    /// filesystem root, where it usually means a detached launcher), then
    /// the process current directory.
    pub fn resolve(&self) -> Result<(PathBuf, WorkdirSource), WorkdirError> {
        let argv: Vec<String> = env::args().collect();
        self.resolve_with(
            env::var(WORKDIR_ENV).ok(),
            &argv,
            env::var("PWD").ok(),
        )
    }

    /// Resolution against an explicit environment snapshot; `resolve` is a
    /// thin wrapper over this.
    pub fn resolve_with(
        &self,
        env_override: Option<String>,
        argv: &[String],
        pwd: Option<String>,
    ) -> Result<(PathBuf, WorkdirSource), WorkdirError> {
        if let Some(explicit) = &self.explicit {
            return Ok((explicit.clone(), WorkdirSource::Explicit));
        }

        if let Some(dir) = env_override.filter(|d| !d.is_empty()) {
            return Ok((PathBuf::from(dir), WorkdirSource::EnvOverride));
        }

        if let Some(dir) = argv.iter().find_map(|arg| arg.strip_prefix("--cwd=")) {
            return Ok((PathBuf::from(dir), WorkdirSource::CwdArg));
        }

        if let Some(pwd) = pwd.filter(|p| !p.is_empty() && p != "/") {
            return Ok((PathBuf::from(pwd), WorkdirSource::PwdEnv));
        }

        let cwd = env::current_dir().map_err(WorkdirError::Unresolvable)?;
        Ok((cwd, WorkdirSource::ProcessCwd))
    }

    /// The explicit setting, if one has been made.
    pub fn explicit(&self) -> Option<&Path> {
        self.explicit.as_deref()
    }
}
