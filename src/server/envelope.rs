//! The uniform response shape every tool call returns.
//!
//! Wire contract: `{ content: [ { type: "text", text } ], isError?: true }`.
//! The `isError` key is present (and `true`) only on failure, absent on
//! success. Handlers never let a raw error reach the rpc layer; everything
//! is routed through these constructors.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl ContentBlock {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolResponse {
    pub content: Vec<ContentBlock>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl ToolResponse {
    pub fn success<S: Into<String>>(text: S) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            is_error: None,
        }
    }

    /// Failure text carries the error message; for a failed git invocation
    /// the `CommandFailed` Display already includes the captured stderr.
    pub fn failure(err: &AppError) -> Self {
        Self {
            content: vec![ContentBlock::text(format!("Operation failed:\n{}", err))],
            is_error: Some(true),
        }
    }
}
