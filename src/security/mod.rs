pub mod rules;
pub mod validator;

pub use rules::{DangerousRule, RuleSet, RULESET_VERSION};
pub use validator::{CommandSpec, CommandValidator, ValidationError};

/// Allowlist of permitted git subcommands
///
/// Default-deny: any subcommand not named here is rejected outright,
/// including everything that can shell out or rewrite history.
///
/// Adding a new subcommand requires careful security review.
pub const ALLOWED_GIT_SUBCOMMANDS: &[&str] = &[
    // Read operations
    "status",
    "diff",
    "log",
    "show",
    "branch",
    "tag",
    "remote",
    "ls-files",
    "ls-remote",
    "describe",
    "reflog",
    "blame",
    "grep",
    "shortlog",
    // Write operations
    "add",
    "commit",
    "checkout",
    "switch",
    "merge",
    "rebase",
    "reset",
    "stash",
    "cherry-pick",
    "revert",
    // Remote operations
    "fetch",
    "pull",
    "push",
    "clone",
    // Repository setup
    "init",
    "config",
];

/// Subcommands guaranteed not to mutate repository state.
///
/// Strict subset of [`ALLOWED_GIT_SUBCOMMANDS`]. Used only for response
/// classification, never as a security gate.
pub const READ_ONLY_SUBCOMMANDS: &[&str] = &[
    "status",
    "diff",
    "log",
    "show",
    "branch",
    "tag",
    "remote",
    "ls-files",
    "ls-remote",
    "describe",
    "reflog",
    "blame",
    "grep",
    "shortlog",
];
