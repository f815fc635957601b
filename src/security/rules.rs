//! Dangerous-pattern rule table.
//!
//! The second line of defense after the subcommand allowlist: an allowed
//! subcommand can still carry a destructive flag (`push --force`,
//! `reset --hard`), which name-based allowlisting cannot catch. Rules are
//! kept as data so the table can grow without touching validation logic.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Bumped whenever the builtin table changes meaning.
pub const RULESET_VERSION: u32 = 1;

/// Tag and source pattern for one rule, case-insensitive.
const BUILTIN_RULES: &[(&str, &str)] = &[
    ("force-flag", r"--force"),
    ("hard-flag", r"--hard"),
    ("rm", r"rm\s+"),
    ("clean-force", r"clean\s+-[df]"),
    ("hard-reset", r"reset\s+--hard"),
    ("force-push", r"push\s+.*--force"),
    ("interactive-rebase", r"rebase\s+.*--interactive"),
    ("filter-branch", r"filter-branch"),
    ("aggressive-gc", r"gc\s+--aggressive"),
    ("branch-delete", r"branch\s+-D"),
    ("tag-delete", r"tag\s+-d"),
];

/// A single compiled rule.
#[derive(Debug, Clone)]
pub struct DangerousRule {
    pub tag: &'static str,
    pattern: Regex,
}

impl DangerousRule {
    pub fn matches(&self, command: &str) -> bool {
        self.pattern.is_match(command)
    }
}

/// The compiled rule table.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<DangerousRule>,
}

impl RuleSet {
    /// The builtin table. Compilation of the static patterns cannot fail;
    /// a broken pattern is a programming error caught by tests.
    pub fn builtin() -> &'static RuleSet {
        static BUILTIN: Lazy<RuleSet> = Lazy::new(|| {
            let rules = BUILTIN_RULES
                .iter()
                .map(|&(tag, source)| DangerousRule {
                    tag,
                    pattern: RegexBuilder::new(source)
                        .case_insensitive(true)
                        .build()
                        .unwrap_or_else(|e| panic!("invalid builtin rule {tag}: {e}")),
                })
                .collect();
            RuleSet { rules }
        });
        &*BUILTIN
    }

    /// Returns the tag of the first rule matching `command`, if any.
    pub fn first_match(&self, command: &str) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(command))
            .map(|rule| rule.tag)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
