use std::net::SocketAddr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataLinkError {
    #[error("udp socket: {0}")]
    Io(#[from] std::io::Error),
    /// The NPDU would not fit one BACnet/IP datagram.
    #[error("npdu exceeds the BACnet/IP datagram limit")]
    FrameTooLarge,
    /// Truncated or non-BACnet/IP datagram. Receivers skip these.
    #[error("malformed BACnet/IP datagram")]
    InvalidFrame,
    #[error("BVLC function 0x{0:02x} is not handled")]
    UnsupportedBvlcFunction(u8),
    /// A BVLC-Result NAK, e.g. from a BBMD.
    #[error("peer answered with BVLC result 0x{0:04x}")]
    BvlcResult(u16),
}

/// Carries NPDUs to and from UDP peers. One instance belongs to one session.
pub trait DataLink {
    async fn send(&self, peer: SocketAddr, npdu: &[u8]) -> Result<(), DataLinkError>;

    /// Waits for the next NPDU; returns its length in `buf` and its sender.
    async fn recv(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr), DataLinkError>;
}
