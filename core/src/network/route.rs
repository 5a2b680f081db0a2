use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use synscan_common::TransportError;

/// Any port works; connecting a UDP socket sends nothing.
const PROBE_PORT: u16 = 9;

/// Returns the local address the kernel would use to reach `target`.
pub(super) fn local_ipv4_for(target: Ipv4Addr) -> Result<Ipv4Addr, TransportError> {
    let no_route = |source| TransportError::NoRoute {
        target: IpAddr::V4(target),
        source,
    };

    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).map_err(no_route)?;
    socket.connect((target, PROBE_PORT)).map_err(no_route)?;

    match socket.local_addr().map_err(no_route)?.ip() {
        IpAddr::V4(local) => Ok(local),
        other => Err(TransportError::Unsupported(other)),
    }
}
