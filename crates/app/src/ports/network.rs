//! Network port: choose where to send discovery broadcasts.

use std::net::Ipv4Addr;

/// Computes the broadcast address of the network the host routes through.
pub trait BroadcastResolver: Send + Sync {
    /// Best broadcast target, or `None` to let the scanner use its default.
    ///
    /// Never fails: detection problems are logged by the implementation
    /// and reported as `None`.
    fn resolve_broadcast_target(&self) -> Option<Ipv4Addr>;
}
