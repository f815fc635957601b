use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use gitward::audit::AuditLogger;
use gitward::config::Config;
use gitward::server::{Session, rpc};

#[tokio::main]
async fn main() {
    // stdout is the protocol channel; all diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gitward=info")),
        )
        .init();

    let config = match Config::load_or_default() {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let audit = if config.behavior.log_commands {
        match AuditLogger::new() {
            Ok(logger) => Some(logger),
            Err(e) => {
                warn!("audit log unavailable: {}", e);
                None
            }
        }
    } else {
        None
    };

    let mut session = Session::new(config, audit);

    if let Err(e) = rpc::run(&mut session).await {
        error!("server loop failed: {}", e);
        std::process::exit(1);
    }
}
