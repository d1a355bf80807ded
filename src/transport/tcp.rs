//! TCP listener and socket hardening.
//!
//! Accepted sockets get TCP keep-alive probing after an idle interval.
//!
//! # Example
//!
//! ```ignore
//! use h02_listener::transport::{apply_keepalive, bind_listener};
//!
//! let listener = bind_listener(5001).await?;
//! let (stream, peer) = listener.accept().await?;
//! apply_keepalive(&stream, Duration::from_secs(60))?;
//! ```

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use socket2::{SockRef, TcpKeepalive};
use tokio::net::{TcpListener, TcpStream};

use crate::error::Result;

/// Bind a listener on all IPv4 interfaces.
///
/// Port 0 picks a free port; read it back with `local_addr()`.
pub async fn bind_listener(port: u16) -> Result<TcpListener> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    Ok(TcpListener::bind(addr).await?)
}

/// Enable TCP keep-alive probes after `idle` without traffic.
pub fn apply_keepalive(stream: &TcpStream, idle: Duration) -> Result<()> {
    let keepalive = TcpKeepalive::new().with_time(idle);
    SockRef::from(stream).set_tcp_keepalive(&keepalive)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let listener = bind_listener(0).await.unwrap();
        let addr = listener.local_addr().unwrap();

        assert_ne!(addr.port(), 0);
        assert!(addr.ip().is_unspecified());
    }

    #[tokio::test]
    async fn test_keepalive_enabled_on_accepted_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let _client = TcpStream::connect(addr).await.unwrap();
        let (server, _) = listener.accept().await.unwrap();

        apply_keepalive(&server, Duration::from_secs(30)).unwrap();

        assert!(SockRef::from(&server).keepalive().unwrap());
    }
}
