//! # onelight-adapter-network
//!
//! Broadcast target detection for device discovery.
//!
//! Routers often drop the global broadcast (`255.255.255.255`), so discovery
//! prefers the directed broadcast of the network the host actually routes
//! through. The outbound interface is found by asking the kernel which local
//! address a UDP socket would use for an off-link destination; its broadcast
//! address comes from [`network_interface`].
//!
//! ## Dependency rule
//! Depends on `onelight-app` (port traits) only.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use network_interface::{Addr, NetworkInterface, NetworkInterfaceConfig};
use onelight_app::ports::BroadcastResolver;

/// Off-link destination (TEST-NET-1) used to find the default route.
/// Connecting a UDP socket sends nothing.
const ROUTE_PROBE: (Ipv4Addr, u16) = (Ipv4Addr::new(192, 0, 2, 1), 9);

/// One IPv4 address assigned to a local interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceV4 {
    pub name: String,
    pub ip: Ipv4Addr,
    pub broadcast: Option<Ipv4Addr>,
    pub netmask: Option<Ipv4Addr>,
}

/// Resolves the broadcast address of the default-route interface.
#[derive(Debug, Clone, Default)]
pub struct InterfaceBroadcastResolver {
    configured: Option<Ipv4Addr>,
}

impl InterfaceBroadcastResolver {
    /// Detect the target from the host's interfaces on every call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Always use `target`, skipping detection.
    #[must_use]
    pub fn fixed(target: Ipv4Addr) -> Self {
        Self {
            configured: Some(target),
        }
    }
}

impl BroadcastResolver for InterfaceBroadcastResolver {
    fn resolve_broadcast_target(&self) -> Option<Ipv4Addr> {
        if let Some(target) = self.configured {
            tracing::debug!(%target, "using configured broadcast target");
            return Some(target);
        }

        let local = match default_route_address() {
            Ok(local) => local,
            Err(err) => {
                tracing::warn!(error = %err, "no default route, using default discovery");
                return None;
            }
        };

        let interfaces = match NetworkInterface::show() {
            Ok(interfaces) => interfaces,
            Err(err) => {
                tracing::warn!(error = %err, "could not list network interfaces");
                return None;
            }
        };

        let candidates = interfaces.into_iter().flat_map(|iface| {
            let name = iface.name;
            iface
                .addr
                .into_iter()
                .filter_map(move |addr| match addr {
                    Addr::V4(v4) => Some(InterfaceV4 {
                        name: name.clone(),
                        ip: v4.ip,
                        broadcast: v4.broadcast,
                        netmask: v4.netmask,
                    }),
                    Addr::V6(_) => None,
                })
        });

        select_broadcast(local, candidates)
    }
}

/// Pick the broadcast address of the interface holding `local`.
///
/// Falls back to computing it from the netmask when the interface does not
/// report one. Point-to-point links (a `/32` mask) have no broadcast.
pub fn select_broadcast(
    local: Ipv4Addr,
    interfaces: impl IntoIterator<Item = InterfaceV4>,
) -> Option<Ipv4Addr> {
    let Some(iface) = interfaces.into_iter().find(|iface| iface.ip == local) else {
        tracing::warn!(%local, "no interface carries the default route address");
        return None;
    };

    if let Some(target) = iface.broadcast.filter(|b| !b.is_unspecified()) {
        tracing::info!(interface = %iface.name, %target, "broadcast target found");
        return Some(target);
    }

    let derived = iface
        .netmask
        .filter(|mask| *mask != Ipv4Addr::BROADCAST)
        .map(|mask| Ipv4Addr::from(u32::from(iface.ip) | !u32::from(mask)));
    match derived {
        Some(target) => {
            tracing::info!(interface = %iface.name, %target, "broadcast target derived from netmask");
            Some(target)
        }
        None => {
            tracing::warn!(interface = %iface.name, "interface has no broadcast address");
            None
        }
    }
}

fn default_route_address() -> std::io::Result<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    socket.connect(ROUTE_PROBE)?;
    match socket.local_addr()?.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() && !ip.is_loopback() => Ok(ip),
        other => Err(std::io::Error::new(
            std::io::ErrorKind::AddrNotAvailable,
            format!("default route uses {other}"),
        )),
    }
}
