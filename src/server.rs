//! Listener and accept loop.
//!
//! The [`Server`] accepts TCP connections and spawns one
//! [`handle_connection`] task per socket. Connections never affect each
//! other or the accept loop; accept failures are reported to the sink as
//! `accept_failed` and the loop keeps going.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use h02_listener::{config::ServerConfig, sink::TracingSink, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::bind(ServerConfig::from_env()?, Arc::new(TracingSink::new())).await?;
//!     server.run_until(async { tokio::signal::ctrl_c().await.ok(); }).await;
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::connection::handle_connection;
use crate::error::Result;
use crate::sink::{Event, EventSink};
use crate::transport::{apply_keepalive, bind_listener};

/// Pause after a failed accept (e.g. out of file descriptors).
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// A bound tracker listener.
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
    sink: Arc<dyn EventSink>,
}

impl Server {
    /// Bind the listening socket on `config.port`.
    pub async fn bind(config: ServerConfig, sink: Arc<dyn EventSink>) -> Result<Self> {
        let listener = bind_listener(config.port).await?;
        Ok(Self::from_listener(listener, config, sink))
    }

    /// Wrap an already bound listener.
    pub fn from_listener(
        listener: TcpListener,
        config: ServerConfig,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            listener,
            config,
            sink,
        }
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever.
    pub async fn run(self) {
        self.run_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves.
    ///
    /// Connections already being served keep running on their own tasks.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let listen_addr = self
            .listener
            .local_addr()
            .map_or_else(|_| format!("0.0.0.0:{}", self.config.port), |a| a.to_string());
        tracing::info!(
            addr = %listen_addr,
            ack_enabled = self.config.ack_enabled,
            "Listening for trackers"
        );

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Listener shutting down");
                    return;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => self.spawn_connection(stream, peer),
                    Err(e) => {
                        self.sink.emit(&Event::AcceptFailed {
                            listener: listen_addr.clone(),
                            error: e.to_string(),
                        });
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
            }
        }
    }

    fn spawn_connection(&self, stream: tokio::net::TcpStream, peer: SocketAddr) {
        if let Err(e) = apply_keepalive(&stream, self.config.keepalive_interval) {
            tracing::warn!(peer = %peer, "Failed to enable keep-alive: {}", e);
        }

        let settings = self.config.connection_settings();
        let sink = self.sink.clone();
        tokio::spawn(handle_connection(stream, peer.to_string(), settings, sink));
    }
}
