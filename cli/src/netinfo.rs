//! Audience URL discovery.

#[cfg(test)]
#[path = "netinfo_test.rs"]
mod netinfo_test;

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Address used only to pick an outbound interface; nothing is sent to it.
const ROUTE_PROBE: (Ipv4Addr, u16) = (Ipv4Addr::new(192, 0, 2, 1), 9);

/// IPv4 address of the interface that routes off-host, if any.
///
/// Connecting a UDP socket sends no packets but makes the OS choose a source
/// address, which is the one audience devices on the same LAN can reach.
pub fn lan_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
        .inspect_err(|error| tracing::debug!(%error, "probe socket unavailable"))
        .ok()?;
    if let Err(error) = socket.connect(ROUTE_PROBE) {
        tracing::debug!(%error, "no outbound route");
        return None;
    }
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() && !ip.is_loopback() => Some(ip),
        _ => None,
    }
}

/// URL audience devices open to reach the hub on `port`.
pub fn audience_url(lan: Option<Ipv4Addr>, port: u16) -> String {
    match lan {
        Some(ip) => format!("http://{ip}:{port}"),
        None => format!("http://localhost:{port}"),
    }
}
