//! Tracker listener binary.
//!
//! Configuration comes from environment variables (see
//! [`h02_listener::config`]). `RUST_LOG` controls log filtering.

use std::sync::Arc;

use h02_listener::config::{LogFormat, ServerConfig};
use h02_listener::sink::{EventSink, JsonSink, TracingSink};
use h02_listener::Server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("h02_listener=info"));

    // Diagnostics go to stderr; JSON events own stdout.
    let sink: Arc<dyn EventSink> = match config.log_format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            Arc::new(JsonSink::stdout())
        }
        LogFormat::Pretty => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            Arc::new(TracingSink::new())
        }
    };

    let server = Server::bind(config, sink).await?;

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    Ok(())
}
