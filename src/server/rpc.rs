//! JSON-RPC 2.0 over stdio.
//!
//! stdout carries protocol frames only; all diagnostics go to stderr via
//! `tracing`. Malformed input lines are logged and skipped so a confused
//! client cannot take the server down.

use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::server::handlers::Session;
use crate::server::tools;

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "gitward";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the server loop until stdin closes.
pub async fn run(session: &mut Session) -> std::io::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    info!(version = SERVER_VERSION, "gitward server started");

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let msg: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "skipping malformed request line");
                continue;
            }
        };

        handle_message(session, &msg, &mut stdout).await?;
    }

    info!("stdin closed, shutting down");
    Ok(())
}

async fn handle_message<W: AsyncWrite + Unpin>(
    session: &mut Session,
    msg: &Value,
    out: &mut W,
) -> std::io::Result<()> {
    let method = msg["method"].as_str().unwrap_or("");
    let id = &msg["id"];
    let params = &msg["params"];

    debug!(method, "received request");

    match method {
        "initialize" => {
            send_response(
                out,
                id,
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": {
                        "name": SERVER_NAME,
                        "version": SERVER_VERSION,
                    }
                }),
            )
            .await
        }

        // No response expected
        "notifications/initialized" => Ok(()),

        "tools/list" => send_response(out, id, json!({ "tools": tools::definitions() })).await,

        "tools/call" => {
            let name = params["name"].as_str().unwrap_or("");
            let args = params.get("arguments").cloned().unwrap_or(json!({}));

            let response = session.handle_tool_call(name, &args).await;
            let result = serde_json::to_value(&response)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            send_response(out, id, result).await
        }

        "ping" => send_response(out, id, json!({})).await,

        other => {
            if id.is_null() {
                // Notification for a method we do not know; nothing to answer
                Ok(())
            } else {
                send_error(out, id, -32601, &format!("Unknown method: {}", other)).await
            }
        }
    }
}

async fn send_response<W: AsyncWrite + Unpin>(
    out: &mut W,
    id: &Value,
    result: Value,
) -> std::io::Result<()> {
    let response = json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    });
    write_frame(out, &response).await
}

async fn send_error<W: AsyncWrite + Unpin>(
    out: &mut W,
    id: &Value,
    code: i64,
    message: &str,
) -> std::io::Result<()> {
    let response = json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    });
    write_frame(out, &response).await
}

async fn write_frame<W: AsyncWrite + Unpin>(out: &mut W, frame: &Value) -> std::io::Result<()> {
    let msg = serde_json::to_string(frame)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    out.write_all(msg.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await
}
