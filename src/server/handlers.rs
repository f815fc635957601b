//! Tool-name dispatch.
//!
//! Every handler runs against the session's working directory and routes
//! both its normal return and any caught error through the response shaper,
//! so the rpc layer only ever sees a [`ToolResponse`].

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::audit::AuditLogger;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::git::executor::{GitError, GitExecutor};
use crate::git::ops;
use crate::git::workdir::Workdir;
use crate::security::validator::CommandValidator;
use crate::server::envelope::ToolResponse;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),
}

/// State for one logical client connection.
///
/// The working directory lives here rather than in a process-wide static,
/// so two sessions can never observe each other's directory changes.
pub struct Session {
    workdir: Workdir,
    config: Config,
    audit: Option<AuditLogger>,
}

impl Session {
    pub fn new(config: Config, audit: Option<AuditLogger>) -> Self {
        Self {
            workdir: Workdir::new(),
            config,
            audit,
        }
    }

    /// Dispatch a tool call and shape the outcome into the uniform envelope.
    pub async fn handle_tool_call(&mut self, name: &str, args: &Value) -> ToolResponse {
        match self.dispatch(name, args).await {
            Ok(text) => ToolResponse::success(text),
            Err(err) => {
                warn!(tool = name, error = %err, "tool call failed");
                ToolResponse::failure(&err)
            }
        }
    }

    async fn dispatch(&mut self, name: &str, args: &Value) -> AppResult<String> {
        match name {
            "git_command" => self.git_command(args).await,
            "set_working_dir" => self.set_working_dir(args),
            "show_working_dir" => self.show_working_dir(),
            "git_init" => self.git_init(args).await,
            "git_status" => Ok(ops::status(&self.executor()?).await?),
            "git_diff" => Ok(ops::diff_overview(&self.executor()?).await?),
            "git_add" => self.git_add(args).await,
            "git_smart_commit" => self.git_smart_commit(args).await,
            other => Err(ServerError::UnknownTool(other.to_string()).into()),
        }
    }

    fn executor(&self) -> AppResult<GitExecutor> {
        let (path, _) = self.workdir.resolve()?;
        Ok(GitExecutor::new(path))
    }

    async fn git_command(&self, args: &Value) -> AppResult<String> {
        let command = required_str(args, "command")?;

        let validator = CommandValidator::new();
        let spec = match validator.validate(command) {
            Ok(spec) => spec,
            Err(err) => {
                self.audit_rejection(command, &err.to_string());
                return Err(err.into());
            }
        };

        let executor = self.executor()?;
        let result = executor.execute_validated(&spec).await;

        match result {
            Ok(output) => {
                self.audit_command(&spec.command, executor.workdir(), output.exit_code);

                let prefix = if spec.is_read_only { "(read-only) " } else { "" };
                Ok(format!(
                    "{}Git command succeeded: git {}\n\nOutput:\n{}",
                    prefix,
                    spec.command,
                    output.combined()
                ))
            }
            Err(err) => {
                if let GitError::CommandFailed { exit_code, .. } = &err {
                    self.audit_command(&spec.command, executor.workdir(), *exit_code);
                }
                Err(err.into())
            }
        }
    }

    fn set_working_dir(&mut self, args: &Value) -> AppResult<String> {
        let path = required_str(args, "path")?;
        let resolved = self.workdir.set(path)?;
        Ok(format!("Working directory set to: {}", resolved.display()))
    }

    fn show_working_dir(&self) -> AppResult<String> {
        let (path, source) = self.workdir.resolve()?;
        Ok(format!(
            "Working directory: {} ({})",
            path.display(),
            source.describe()
        ))
    }

    async fn git_init(&self, args: &Value) -> AppResult<String> {
        let remote_url = args.get("remote_url").and_then(Value::as_str);
        let branch = args
            .get("branch")
            .and_then(Value::as_str)
            .unwrap_or(&self.config.git.default_branch);

        let executor = self.executor()?;
        Ok(ops::init(&executor, remote_url, branch).await?)
    }

    async fn git_add(&self, args: &Value) -> AppResult<String> {
        let files = args.get("files").and_then(Value::as_str).unwrap_or(".");
        Ok(ops::add(&self.executor()?, files).await?)
    }

    async fn git_smart_commit(&self, args: &Value) -> AppResult<String> {
        let message = required_str(args, "message")?;
        Ok(ops::smart_commit(&self.executor()?, message).await?)
    }

    fn audit_command(&self, command: &str, workdir: &std::path::Path, exit_code: i32) {
        if let Some(audit) = &self.audit {
            if let Err(e) = audit.log_command(command, workdir, exit_code) {
                warn!(error = %e, "audit log write failed");
            }
        }
    }

    fn audit_rejection(&self, command: &str, reason: &str) {
        if let Some(audit) = &self.audit {
            if let Err(e) = audit.log_rejection(command, reason) {
                warn!(error = %e, "audit log write failed");
            }
        }
    }
}

fn required_str<'a>(args: &'a Value, key: &'static str) -> Result<&'a str, AppError> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ServerError::MissingArgument(key).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::process::Command as StdCommand;
    use tempfile::TempDir;

    fn session() -> Session {
        Session::new(Config::default(), None)
    }

    fn configured_repo() -> TempDir {
        let temp = TempDir::new().unwrap();
        for args in [
            vec!["init"],
            vec!["config", "user.name", "Test User"],
            vec!["config", "user.email", "test@example.com"],
        ] {
            StdCommand::new("git")
                .args(&args)
                .current_dir(temp.path())
                .output()
                .unwrap();
        }
        temp
    }

    #[tokio::test]
    async fn test_unknown_tool_returns_failure_envelope() {
        let mut session = session();
        let response = session.handle_tool_call("no_such_tool", &json!({})).await;

        assert_eq!(response.is_error, Some(true));
        assert!(response.content[0].text.contains("Unknown tool: no_such_tool"));
    }

    #[tokio::test]
    async fn test_missing_argument_is_failure_envelope() {
        let mut session = session();
        let response = session.handle_tool_call("git_command", &json!({})).await;

        assert_eq!(response.is_error, Some(true));
        assert!(response.content[0].text.contains("command"));
    }

    #[tokio::test]
    async fn test_set_working_dir_rejects_missing_path() {
        let mut session = session();
        let response = session
            .handle_tool_call("set_working_dir", &json!({"path": "/not/a/dir"}))
            .await;

        assert_eq!(response.is_error, Some(true));
    }

    #[tokio::test]
    async fn test_set_then_run_status() {
        let repo = configured_repo();
        let mut session = session();

        let set = session
            .handle_tool_call(
                "set_working_dir",
                &json!({"path": repo.path().to_str().unwrap()}),
            )
            .await;
        assert!(set.is_error.is_none());
        assert!(set.content[0].text.contains("Working directory set to"));

        let status = session
            .handle_tool_call("git_command", &json!({"command": "status"}))
            .await;
        assert!(status.is_error.is_none(), "{:?}", status);
        assert!(status.content[0].text.starts_with("(read-only) "));
    }

    #[tokio::test]
    async fn test_mutating_command_has_no_read_only_prefix() {
        let repo = configured_repo();
        let mut session = session();
        session
            .handle_tool_call(
                "set_working_dir",
                &json!({"path": repo.path().to_str().unwrap()}),
            )
            .await;

        std::fs::write(repo.path().join("f.txt"), "x\n").unwrap();
        let response = session
            .handle_tool_call("git_command", &json!({"command": "add ."}))
            .await;
        assert!(response.is_error.is_none());
        assert!(!response.content[0].text.starts_with("(read-only)"));
    }

    #[tokio::test]
    async fn test_dangerous_command_rejected_via_envelope() {
        let repo = configured_repo();
        let mut session = session();
        session
            .handle_tool_call(
                "set_working_dir",
                &json!({"path": repo.path().to_str().unwrap()}),
            )
            .await;

        let response = session
            .handle_tool_call("git_command", &json!({"command": "reset --hard HEAD"}))
            .await;
        assert_eq!(response.is_error, Some(true));
        assert!(response.content[0].text.contains("Dangerous command pattern"));
    }

    #[tokio::test]
    async fn test_rejection_is_audited() {
        let temp = TempDir::new().unwrap();
        let log_path = temp.path().join("history.log");
        let audit = AuditLogger::with_path(&log_path).unwrap();
        let mut session = Session::new(Config::default(), Some(audit));

        session
            .handle_tool_call("git_command", &json!({"command": "push --force"}))
            .await;

        let log = std::fs::read_to_string(&log_path).unwrap();
        assert!(log.contains("[REJECTED]"));
        assert!(log.contains("push --force"));
    }

    #[tokio::test]
    async fn test_git_init_in_fresh_directory() {
        let temp = TempDir::new().unwrap();
        let mut session = session();
        session
            .handle_tool_call(
                "set_working_dir",
                &json!({"path": temp.path().to_str().unwrap()}),
            )
            .await;

        let response = session.handle_tool_call("git_init", &json!({})).await;
        assert!(response.is_error.is_none(), "{:?}", response);
        assert!(temp.path().join(".git").exists());
        assert!(temp.path().join(".gitignore").exists());
    }

    #[tokio::test]
    async fn test_show_working_dir_reports_explicit_source() {
        let repo = configured_repo();
        let mut session = session();
        session
            .handle_tool_call(
                "set_working_dir",
                &json!({"path": repo.path().to_str().unwrap()}),
            )
            .await;

        let response = session.handle_tool_call("show_working_dir", &json!({})).await;
        assert!(response.is_error.is_none());
        assert!(response.content[0].text.contains("set explicitly"));
    }
}
