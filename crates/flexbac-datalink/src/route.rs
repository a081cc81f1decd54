use crate::DataLinkError;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::UdpSocket;

/// Returns the local interface address the OS would use to reach `peer`.
///
/// Connecting a UDP socket sends nothing; it only resolves the route.
pub async fn local_ip_for(peer: SocketAddr) -> Result<IpAddr, DataLinkError> {
    let unspecified = match peer {
        SocketAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        SocketAddr::V6(_) => IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED),
    };
    let scratch = UdpSocket::bind(SocketAddr::new(unspecified, 0)).await?;
    scratch.connect(peer).await?;
    let ip = scratch.local_addr()?.ip();
    log::debug!("route to {peer} leaves via {ip}");
    Ok(ip)
}
