//! Discovery port: time-bounded broadcast scan.

use std::future::Future;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use onelight_domain::discovery::RawResponse;

/// Errors a scanner may report. Recovered by the discovery engine.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Socket setup, send, or receive failed.
    #[error("discovery socket error")]
    Io(#[from] std::io::Error),

    /// Any other scanner specific failure.
    #[error("discovery scan failed")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Sends a discovery broadcast and collects the answers.
pub trait DiscoveryScanner: Send + Sync {
    /// Scan duration used when retrying with protocol defaults.
    fn default_timeout(&self) -> Duration;

    /// Broadcast a discovery query to `target` (or the protocol's default
    /// broadcast address when `None`) and collect every response that
    /// arrives before `timeout` elapses, in arrival order.
    fn scan(
        &self,
        target: Option<Ipv4Addr>,
        timeout: Duration,
    ) -> impl Future<Output = Result<Vec<RawResponse>, ScanError>> + Send;
}

impl<T: DiscoveryScanner> DiscoveryScanner for Arc<T> {
    fn default_timeout(&self) -> Duration {
        (**self).default_timeout()
    }

    fn scan(
        &self,
        target: Option<Ipv4Addr>,
        timeout: Duration,
    ) -> impl Future<Output = Result<Vec<RawResponse>, ScanError>> + Send {
        (**self).scan(target, timeout)
    }
}
