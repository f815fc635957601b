//! MCP tool definitions exposed by `tools/list`.

use serde_json::{Value, json};

fn tool_def(name: &str, description: &str, properties: Value, required: Vec<&str>) -> Value {
    json!({
        "name": name,
        "description": description,
        "inputSchema": {
            "type": "object",
            "properties": properties,
            "required": required,
        }
    })
}

/// Return all tool definitions
pub fn definitions() -> Vec<Value> {
    vec![
        tool_def(
            "git_command",
            "Run a git command through the safety gate: subcommand allowlist plus dangerous-pattern rejection. Destructive flags are refused even on allowed subcommands.",
            json!({
                "command": {
                    "type": "string",
                    "description": "Git command without the leading 'git', e.g. 'status', 'log --oneline -10', 'branch -a'",
                },
            }),
            vec!["command"],
        ),
        tool_def(
            "set_working_dir",
            "Set the working directory for subsequent git operations. The path must exist and be a directory.",
            json!({
                "path": {
                    "type": "string",
                    "description": "Absolute or relative directory path",
                },
            }),
            vec!["path"],
        ),
        tool_def(
            "show_working_dir",
            "Report the directory git commands currently run in and how it was resolved.",
            json!({}),
            vec![],
        ),
        tool_def(
            "git_init",
            "Initialize a git repository in the working directory, set the default branch, optionally add an origin remote, and create a .gitignore if absent.",
            json!({
                "remote_url": {
                    "type": "string",
                    "description": "Optional remote URL added as 'origin'",
                },
                "branch": {
                    "type": "string",
                    "description": "Default branch name (defaults to the configured default, normally 'main')",
                },
            }),
            vec![],
        ),
        tool_def("git_status", "Show the full git status of the working directory.", json!({}), vec![]),
        tool_def(
            "git_diff",
            "Show a change overview: short status plus staged and unstaged diffs.",
            json!({}),
            vec![],
        ),
        tool_def(
            "git_add",
            "Stage files and report the resulting status.",
            json!({
                "files": {
                    "type": "string",
                    "description": "Pathspec to stage (defaults to '.')",
                },
            }),
            vec![],
        ),
        tool_def(
            "git_smart_commit",
            "Stage everything, commit with the given message, and push. If the branch has no upstream yet, sets origin/<branch> automatically and pushes once more.",
            json!({
                "message": {
                    "type": "string",
                    "description": "Commit message",
                },
            }),
            vec!["message"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definitions_are_well_formed() {
        let defs = definitions();
        assert_eq!(defs.len(), 8);

        for def in &defs {
            assert!(def["name"].is_string());
            assert!(def["description"].is_string());
            assert_eq!(def["inputSchema"]["type"], "object");
        }
    }

    #[test]
    fn test_required_fields() {
        let defs = definitions();
        let by_name = |name: &str| {
            defs.iter()
                .find(|d| d["name"] == name)
                .unwrap_or_else(|| panic!("missing tool: {name}"))
                .clone()
        };

        assert_eq!(by_name("git_command")["inputSchema"]["required"][0], "command");
        assert_eq!(by_name("set_working_dir")["inputSchema"]["required"][0], "path");
        assert_eq!(by_name("git_smart_commit")["inputSchema"]["required"][0], "message");
        assert!(by_name("git_status")["inputSchema"]["required"]
            .as_array()
            .unwrap()
            .is_empty());
    }
}
