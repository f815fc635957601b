pub mod envelope;
pub mod handlers;
pub mod rpc;
pub mod tools;

pub use envelope::{ContentBlock, ToolResponse};
pub use handlers::{ServerError, Session};
