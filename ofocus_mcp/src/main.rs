use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ofocus_core::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Stdout is the protocol channel; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ofocus_core=info,ofocus_mcp=info".into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("Starting OmniFocus MCP Server");

    let config = match Config::load_default() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config: {}", e);
            return Err(e.into());
        }
    };
    info!(
        osascript = %config.executor.osascript_path.display(),
        timeout_secs = config.executor.timeout_secs,
        "MCP Server ready, listening on stdio"
    );

    tokio::select! {
        result = ofocus_core::serve_stdio(config) => {
            if let Err(e) = result {
                error!("Transport error: {}", e);
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }

    Ok(())
}
