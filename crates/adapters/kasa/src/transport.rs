//! TCP transport to one plug.
//!
//! Keeps a single connection open between requests and reconnects lazily
//! after any failure. Plugs commonly close the connection after answering,
//! so an I/O failure on a reused connection is retried once on a fresh one.
//! Every stage (connect, write, read) is bounded by the command timeout.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::KasaError;
use crate::protocol;

#[derive(Debug)]
pub struct Transport {
    address: String,
    port: u16,
    timeout: Duration,
    stream: Option<TcpStream>,
}

impl Transport {
    #[must_use]
    pub fn new(address: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            port,
            timeout,
            stream: None,
        }
    }

    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Whether a connection is currently open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// Send one JSON command and return the decoded answer.
    ///
    /// # Errors
    ///
    /// Returns [`KasaError`] on connect, I/O, timeout, or decoding failures.
    /// The connection is dropped on any failure.
    pub async fn request(&mut self, command: &str) -> Result<Value, KasaError> {
        let reused = self.stream.is_some();
        let mut result = self.exchange(command).await;
        if reused && let Err(KasaError::Io(err)) = &result {
            tracing::debug!(address = %self.address, error = %err, "stale connection, reconnecting");
            self.stream = None;
            result = self.exchange(command).await;
        }
        if result.is_err() {
            self.stream = None;
        }
        let body = result?;
        Ok(serde_json::from_slice(&protocol::decrypt(&body))?)
    }

    async fn exchange(&mut self, command: &str) -> Result<Vec<u8>, KasaError> {
        let frame = protocol::frame(command)?;
        let timeout = self.timeout;

        let stream = match self.stream.take() {
            Some(stream) => stream,
            None => {
                tracing::debug!(address = %self.address, port = self.port, "connecting");
                bounded(
                    "connect",
                    timeout,
                    TcpStream::connect((self.address.as_str(), self.port)),
                )
                .await?
            }
        };
        let stream = self.stream.insert(stream);

        bounded("write", timeout, stream.write_all(&frame)).await?;

        let mut header = [0_u8; 4];
        bounded("read", timeout, stream.read_exact(&mut header)).await?;
        let len = usize::try_from(u32::from_be_bytes(header)).unwrap_or(usize::MAX);
        if len > protocol::MAX_FRAME_LEN {
            return Err(KasaError::FrameTooLarge(len));
        }

        let mut body = vec![0_u8; len];
        bounded("read", timeout, stream.read_exact(&mut body)).await?;
        Ok(body)
    }
}

async fn bounded<T>(
    stage: &'static str,
    timeout: Duration,
    future: impl Future<Output = std::io::Result<T>>,
) -> Result<T, KasaError> {
    tokio::time::timeout(timeout, future)
        .await
        .map_err(|_| KasaError::Timeout { stage, timeout })?
        .map_err(KasaError::from)
}
