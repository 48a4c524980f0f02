//! UDP broadcast discovery of Kasa devices.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use onelight_app::ports::{DiscoveryScanner, ScanError};
use onelight_domain::discovery::RawResponse;
use tokio::net::UdpSocket;
use tokio::time::Instant;

use crate::config::KasaConfig;
use crate::protocol;

/// How many times the probe is sent; UDP gives no delivery guarantee.
const PROBE_REPEATS: usize = 3;

/// Broadcasts `get_sysinfo` and collects the devices that answer.
#[derive(Debug, Clone)]
pub struct KasaScanner {
    port: u16,
    default_timeout: Duration,
}

impl KasaScanner {
    #[must_use]
    pub fn new(config: &KasaConfig) -> Self {
        Self {
            port: config.port,
            default_timeout: config.discovery_timeout(),
        }
    }
}

impl DiscoveryScanner for KasaScanner {
    fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Every datagram that decrypts to JSON becomes a response, duplicates
    /// included; datagrams that do not are ignored.
    async fn scan(
        &self,
        target: Option<Ipv4Addr>,
        timeout: Duration,
    ) -> Result<Vec<RawResponse>, ScanError> {
        let destination = SocketAddrV4::new(target.unwrap_or(Ipv4Addr::BROADCAST), self.port);
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
        socket.set_broadcast(true)?;

        let probe = protocol::encrypt(protocol::GET_SYSINFO.as_bytes());
        for _ in 0..PROBE_REPEATS {
            socket.send_to(&probe, destination).await?;
        }
        tracing::debug!(%destination, ?timeout, "discovery probe sent");

        let mut responses = Vec::new();
        let mut buf = [0_u8; 4096];
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            match tokio::time::timeout(remaining, socket.recv_from(&mut buf)).await {
                Ok(Ok((len, from))) => {
                    match serde_json::from_slice(&protocol::decrypt(&buf[..len])) {
                        Ok(payload) => {
                            responses.push(RawResponse::new(from.ip().to_string(), payload));
                        }
                        Err(err) => {
                            tracing::debug!(%from, error = %err, "ignoring undecodable datagram");
                        }
                    }
                }
                Ok(Err(err)) => {
                    tracing::warn!(error = %err, "discovery receive failed");
                    break;
                }
                Err(_) => break,
            }
        }

        tracing::debug!(count = responses.len(), "discovery window closed");
        Ok(responses)
    }
}
