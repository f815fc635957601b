//! Composite git operations built on the executor.
//!
//! These are the multi-step conveniences the server exposes as dedicated
//! tools. Each step is an independent git invocation with no atomicity
//! between steps; a failure partway through leaves earlier mutations in
//! place and is reported as-is.

use std::path::Path;

use crate::git::executor::{GitError, GitExecutor, Result};

/// Written into the working directory on `init` when no ignore file exists.
pub const GITIGNORE_TEMPLATE: &str = "\
# Build output
target/
dist/
build/
*.log

# Environment variables
.env
.env.local
.env.*.local

# IDE
.vscode/
.idea/
*.swp
*.swo
*~

# OS
.DS_Store
Thumbs.db

# Testing
coverage/
";

/// Initialize a repository, set the default branch, optionally add a remote,
/// and seed a `.gitignore` when absent. Returns a line-per-step report.
pub async fn init(
    executor: &GitExecutor,
    remote_url: Option<&str>,
    branch: &str,
) -> Result<String> {
    let mut report = String::new();

    let init_out = executor.run_args(&["init"]).await?;
    report.push_str(&format!("Initialized repository\n{}", init_out.combined()));

    // branch -M fails before the first commit; that is expected
    match executor.run_args(&["branch", "-M", branch]).await {
        Ok(_) => report.push_str(&format!("Default branch set to: {}\n", branch)),
        Err(_) => report.push_str(&format!(
            "Default branch will be set to {} after the first commit\n",
            branch
        )),
    }

    if let Some(url) = remote_url {
        match executor.run_args(&["remote", "add", "origin", url]).await {
            Ok(_) => report.push_str(&format!("Remote added: {}\n", url)),
            Err(e) => report.push_str(&format!("Failed to add remote: {}\n", e)),
        }
    }

    report.push_str(&ensure_gitignore(executor.workdir())?);

    Ok(report)
}

fn ensure_gitignore(workdir: &Path) -> Result<String> {
    let path = workdir.join(".gitignore");
    if path.exists() {
        return Ok(".gitignore already exists, skipping\n".to_string());
    }
    std::fs::write(&path, GITIGNORE_TEMPLATE)?;
    Ok("Created .gitignore\n".to_string())
}

/// Plain `git status`.
pub async fn status(executor: &GitExecutor) -> Result<String> {
    Ok(executor.run_args(&["status"]).await?.stdout)
}

/// Change overview: short status plus staged and unstaged hunks.
pub async fn diff_overview(executor: &GitExecutor) -> Result<String> {
    let short_status = executor.run_args(&["status", "--short"]).await?.stdout;

    // Either diff may fail in a repo with no commits yet; treat as empty
    let staged = executor
        .run_args(&["diff", "--cached"])
        .await
        .map(|o| o.stdout)
        .unwrap_or_default();
    let unstaged = executor
        .run_args(&["diff"])
        .await
        .map(|o| o.stdout)
        .unwrap_or_default();

    let mut report = format!("Change overview:\n\n{}\n", short_status);

    if !staged.is_empty() {
        report.push_str(&format!(
            "\nStaged changes (git diff --cached):\n```diff\n{}\n```\n",
            staged
        ));
    }
    if !unstaged.is_empty() {
        report.push_str(&format!(
            "\nUnstaged changes (git diff):\n```diff\n{}\n```\n",
            unstaged
        ));
    }
    if staged.is_empty() && unstaged.is_empty() {
        report.push_str("\nNo changes detected");
    }

    Ok(report)
}

/// Stage files (default everything) and report the resulting short status.
///
/// `files` is a whitespace-separated pathspec list; each entry becomes its
/// own argument to git.
pub async fn add(executor: &GitExecutor, files: &str) -> Result<String> {
    let mut args = vec!["add"];
    args.extend(files.split_whitespace());
    executor.run_args(&args).await?;
    let short_status = executor.run_args(&["status", "--short"]).await?.stdout;
    Ok(format!(
        "Staged: {}\n\nCurrent status:\n{}",
        files, short_status
    ))
}

/// Stage everything, commit, and push, recovering once from a missing
/// upstream branch.
///
/// The recovery is keyed to the one stderr fragment git emits for this
/// condition; any other push failure propagates untouched. See
/// [`push_with_upstream_recovery`].
pub async fn smart_commit(executor: &GitExecutor, message: &str) -> Result<String> {
    executor.run_args(&["add", "."]).await?;

    let commit_out = executor.run_args(&["commit", "-m", message]).await?;
    let push_out = push_with_upstream_recovery(executor).await?;

    Ok(format!(
        "Commit and push complete\n\nCommit message: {}\n\n{}\n{}",
        message,
        commit_out.combined(),
        push_out
    ))
}

/// `git push`, retrying exactly once with `--set-upstream origin <branch>`
/// when the failure is a missing upstream tracking branch.
pub async fn push_with_upstream_recovery(executor: &GitExecutor) -> Result<String> {
    match executor.run_args(&["push"]).await {
        Ok(out) => Ok(out.combined()),
        Err(GitError::CommandFailed { stderr, .. }) if stderr.contains("no upstream branch") => {
            let branch = executor
                .run_args(&["branch", "--show-current"])
                .await?
                .stdout
                .trim()
                .to_string();

            let retry = executor
                .run_args(&["push", "--set-upstream", "origin", &branch])
                .await?;

            Ok(format!(
                "Upstream branch was not set; configured origin/{}\n{}",
                branch,
                retry.combined()
            ))
        }
        Err(e) => Err(e),
    }
}
