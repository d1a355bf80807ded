//! # h02-listener
//!
//! TCP listener for GPS/GSM tracker devices speaking the delimited ASCII
//! `*...#` protocol.
//!
//! Each accepted connection gets its own task that:
//! 1. Accumulates bytes and splits them into frames at every `#`
//! 2. Parses each frame into a [`protocol::Record`] (or rejects it)
//! 3. Reports `parsed` / `unparsed` events to an injected [`sink::EventSink`]
//! 4. Optionally replies with an `R12` heartbeat acknowledgement
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use h02_listener::{config::ServerConfig, sink::TracingSink, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::from_env()?;
//!     let server = Server::bind(config, Arc::new(TracingSink::new())).await?;
//!     server.run().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod protocol;
pub mod sink;
pub mod transport;

mod server;
mod writer;

pub use connection::handle_connection;
pub use error::ListenerError;
pub use server::Server;
