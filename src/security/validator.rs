use thiserror::Error;

use crate::security::rules::RuleSet;
use crate::security::{ALLOWED_GIT_SUBCOMMANDS, READ_ONLY_SUBCOMMANDS};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Git subcommand not allowed: {0}")]
    NotAllowed(String),

    #[error("Dangerous command pattern ({tag}) in: {command}")]
    DangerousPattern { tag: &'static str, command: String },

    #[error("Empty command")]
    EmptyCommand,
}

/// Per-invocation validation result.
///
/// Construction via [`CommandValidator::validate`] is the only proof that a
/// command passed the gate; the spec is created fresh per call and discarded
/// after the execution it authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// The command with any leading `git` token and whitespace stripped.
    pub command: String,
    /// First token of `command`.
    pub main_command: String,
    /// Whether `main_command` is in the non-mutating subset.
    pub is_read_only: bool,
}

impl CommandSpec {
    /// Argument vector for process spawning: the cleaned command split on
    /// whitespace. Never empty for a validated spec.
    pub fn argv(&self) -> Vec<&str> {
        self.command.split_whitespace().collect()
    }
}

/// The command-safety gate.
///
/// Two mandatory, order-independent layers: a default-deny subcommand
/// allowlist and a dangerous-pattern table. Either one can reject.
pub struct CommandValidator {
    rules: &'static RuleSet,
}

impl CommandValidator {
    pub fn new() -> Self {
        Self {
            rules: RuleSet::builtin(),
        }
    }

    /// Validate a raw command string.
    ///
    /// Accepts commands with or without the leading `git` token;
    /// `validate("status")` and `validate("git status")` are equivalent.
    pub fn validate(&self, raw: &str) -> Result<CommandSpec, ValidationError> {
        let clean = Self::strip_git_prefix(raw);

        let main_command = clean
            .split_whitespace()
            .next()
            .ok_or(ValidationError::EmptyCommand)?;

        if !ALLOWED_GIT_SUBCOMMANDS.contains(&main_command) {
            return Err(ValidationError::NotAllowed(main_command.to_string()));
        }

        if let Some(tag) = self.rules.first_match(clean) {
            return Err(ValidationError::DangerousPattern {
                tag,
                command: clean.to_string(),
            });
        }

        let is_read_only = READ_ONLY_SUBCOMMANDS.contains(&main_command);

        Ok(CommandSpec {
            command: clean.to_string(),
            main_command: main_command.to_string(),
            is_read_only,
        })
    }

    fn strip_git_prefix(raw: &str) -> &str {
        let trimmed = raw.trim();
        match trimmed.strip_prefix("git") {
            // Only strip a full token: "git status" yes, "gitk" no.
            Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim(),
            _ => trimmed,
        }
    }
}

impl Default for CommandValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_simple_command() {
        let validator = CommandValidator::new();
        let spec = validator.validate("git status").unwrap();

        assert_eq!(spec.command, "status");
        assert_eq!(spec.main_command, "status");
        assert!(spec.is_read_only);
    }

    #[test]
    fn test_prefix_stripping_is_idempotent() {
        let validator = CommandValidator::new();
        let with_prefix = validator.validate("git status").unwrap();
        let without_prefix = validator.validate("status").unwrap();
        assert_eq!(with_prefix, without_prefix);
    }

    #[test]
    fn test_prefix_requires_token_boundary() {
        let validator = CommandValidator::new();
        let result = validator.validate("gitk");
        assert!(matches!(result, Err(ValidationError::NotAllowed(cmd)) if cmd == "gitk"));
    }

    #[test]
    fn test_disallowed_subcommand() {
        let validator = CommandValidator::new();
        let result = validator.validate("foo bar");
        assert!(matches!(result, Err(ValidationError::NotAllowed(_))));
    }

    #[test]
    fn test_rm_is_not_a_git_subcommand_here() {
        let validator = CommandValidator::new();
        let result = validator.validate("rm -rf /");
        assert!(matches!(result, Err(ValidationError::NotAllowed(cmd)) if cmd == "rm"));
    }

    #[test]
    fn test_empty_command() {
        let validator = CommandValidator::new();
        assert!(matches!(
            validator.validate(""),
            Err(ValidationError::EmptyCommand)
        ));
        assert!(matches!(
            validator.validate("   "),
            Err(ValidationError::EmptyCommand)
        ));
        // "git" alone has no subcommand either
        assert!(matches!(
            validator.validate("git "),
            Err(ValidationError::EmptyCommand)
        ));
    }

    #[test]
    fn test_hard_reset_rejected() {
        let validator = CommandValidator::new();
        let result = validator.validate("reset --hard HEAD");
        assert!(matches!(
            result,
            Err(ValidationError::DangerousPattern { .. })
        ));
    }

    #[test]
    fn test_force_push_rejected() {
        let validator = CommandValidator::new();
        let result = validator.validate("push --force");
        assert!(matches!(
            result,
            Err(ValidationError::DangerousPattern { .. })
        ));
    }

    #[test]
    fn test_branch_delete_rejected() {
        let validator = CommandValidator::new();
        let result = validator.validate("branch -D feature-x");
        assert!(matches!(
            result,
            Err(ValidationError::DangerousPattern { tag, .. }) if tag == "branch-delete"
        ));
    }

    #[test]
    fn test_tag_delete_rejected() {
        let validator = CommandValidator::new();
        assert!(validator.validate("tag -d v1.0").is_err());
    }

    #[test]
    fn test_filter_branch_rejected_by_pattern() {
        // filter-branch is not allowlisted, and the pattern layer would
        // reject it even if it were
        let validator = CommandValidator::new();
        assert!(validator.validate("filter-branch --tree-filter 'rm f' HEAD").is_err());
    }

    #[test]
    fn test_dangerous_pattern_with_git_prefix() {
        let validator = CommandValidator::new();
        let result = validator.validate("git push origin main --force");
        assert!(matches!(
            result,
            Err(ValidationError::DangerousPattern { .. })
        ));
    }

    #[test]
    fn test_read_only_classification() {
        let validator = CommandValidator::new();
        assert!(validator.validate("status").unwrap().is_read_only);
        assert!(validator.validate("log --oneline -10").unwrap().is_read_only);
        assert!(validator.validate("diff --cached").unwrap().is_read_only);
        assert!(!validator.validate("commit -m x").unwrap().is_read_only);
        assert!(!validator.validate("push origin main").unwrap().is_read_only);
        assert!(!validator.validate("add .").unwrap().is_read_only);
    }

    #[test]
    fn test_allowed_subcommands() {
        let validator = CommandValidator::new();

        let commands = vec![
            "git status",
            "git log --oneline -10",
            "git show HEAD",
            "git diff",
            "git branch -a",
            "git tag",
            "git remote -v",
            "git ls-files",
            "git ls-remote origin",
            "git describe --tags",
            "git reflog",
            "git blame README.md",
            "git grep TODO",
            "git shortlog -sn",
            "git add .",
            "git commit -m 'test'",
            "git checkout main",
            "git switch feature",
            "git merge feature",
            "git rebase main",
            "git reset HEAD",
            "git stash",
            "git cherry-pick abc123",
            "git revert abc123",
            "git fetch origin",
            "git pull origin main",
            "git push origin main",
            "git clone repo.git",
            "git init",
            "git config user.name",
        ];

        for cmd in commands {
            assert!(validator.validate(cmd).is_ok(), "Command should be valid: {}", cmd);
        }
    }

    #[test]
    fn test_argv_tokenization() {
        let validator = CommandValidator::new();
        let spec = validator.validate("git log --oneline -10").unwrap();
        assert_eq!(spec.argv(), vec!["log", "--oneline", "-10"]);
    }
}
