//! TCP connection setup.
//!
//! # Example
//!
//! ```ignore
//! use wordgrid_client::transport::connect_tcp;
//! use std::time::Duration;
//!
//! let stream = connect_tcp("127.0.0.1:8080", Duration::from_secs(5)).await?;
//! let (reader, writer) = stream.into_split();
//! ```

use std::io;
use std::time::Duration;

use tokio::net::TcpStream;

use crate::error::{ClientError, Result};

/// Connect to `address`, giving up after `timeout`.
///
/// Nagle is disabled: requests are small and latency-bound.
pub async fn connect_tcp(address: &str, timeout: Duration) -> Result<TcpStream> {
    let stream = tokio::time::timeout(timeout, TcpStream::connect(address))
        .await
        .map_err(|_| {
            ClientError::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("connecting to {} timed out after {:?}", address, timeout),
            ))
        })??;

    stream.set_nodelay(true)?;
    tracing::debug!(%address, "Connected to game server");
    Ok(stream)
}
