use crate::bip::bvlc::{BvlcFunction, BvlcHeader, BVLC_HEADER_LEN};
use crate::{DataLink, DataLinkError};
use flexbac_core::encoding::{reader::Reader, writer::Writer};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::net::UdpSocket;

const MAX_BIP_FRAME_LEN: usize = 1600;

/// Length of the B/IP address prefix on a Forwarded-NPDU.
const FORWARDED_ORIGIN_LEN: usize = 6;

/// BACnet/IP endpoint over a single UDP socket.
///
/// The socket lives as long as the transport; dropping it releases the port.
#[derive(Debug)]
pub struct BacnetIpTransport {
    socket: UdpSocket,
}

impl BacnetIpTransport {
    pub async fn bind(bind_addr: SocketAddr) -> Result<Self, DataLinkError> {
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.set_broadcast(true)?;
        log::debug!("bound BACnet/IP socket on {}", socket.local_addr()?);
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, DataLinkError> {
        self.socket.local_addr().map_err(DataLinkError::Io)
    }

    fn copy_out(payload: &[u8], buf: &mut [u8]) -> Result<usize, DataLinkError> {
        if payload.len() > buf.len() {
            return Err(DataLinkError::FrameTooLarge);
        }
        buf[..payload.len()].copy_from_slice(payload);
        Ok(payload.len())
    }
}

impl DataLink for BacnetIpTransport {
    async fn send(&self, address: SocketAddr, payload: &[u8]) -> Result<(), DataLinkError> {
        let function = match address.ip() {
            IpAddr::V4(v4) if v4.is_broadcast() => BvlcFunction::OriginalBroadcastNpdu,
            _ => BvlcFunction::OriginalUnicastNpdu,
        };

        let total_len = BVLC_HEADER_LEN
            .checked_add(payload.len())
            .filter(|len| *len <= MAX_BIP_FRAME_LEN)
            .ok_or(DataLinkError::FrameTooLarge)?;

        let mut w = Writer::with_capacity(total_len);
        BvlcHeader {
            function,
            length: total_len as u16,
        }
        .encode(&mut w);
        w.write_all(payload);

        log::trace!("send {} bytes to {address}", total_len);
        self.socket.send_to(w.as_written(), address).await?;
        Ok(())
    }

    async fn recv(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr), DataLinkError> {
        let mut frame = [0u8; MAX_BIP_FRAME_LEN];
        let (n, src) = self.socket.recv_from(&mut frame).await?;
        log::trace!("recv {n} bytes from {src}");

        let mut r = Reader::new(&frame[..n]);
        let hdr = BvlcHeader::decode(&mut r).map_err(|_| DataLinkError::InvalidFrame)?;
        let body = r
            .read_exact(hdr.payload_len())
            .map_err(|_| DataLinkError::InvalidFrame)?;

        match hdr.function {
            BvlcFunction::OriginalUnicastNpdu | BvlcFunction::OriginalBroadcastNpdu => {
                Ok((Self::copy_out(body, buf)?, src))
            }
            BvlcFunction::ForwardedNpdu => {
                if body.len() < FORWARDED_ORIGIN_LEN {
                    return Err(DataLinkError::InvalidFrame);
                }
                let origin_ip = Ipv4Addr::new(body[0], body[1], body[2], body[3]);
                let origin_port = u16::from_be_bytes([body[4], body[5]]);
                let len = Self::copy_out(&body[FORWARDED_ORIGIN_LEN..], buf)?;
                Ok((len, SocketAddr::new(IpAddr::V4(origin_ip), origin_port)))
            }
            BvlcFunction::Result => match body {
                [hi, lo] if *hi != 0 || *lo != 0 => {
                    Err(DataLinkError::BvlcResult(u16::from_be_bytes([*hi, *lo])))
                }
                _ => Err(DataLinkError::InvalidFrame),
            },
            BvlcFunction::Unknown(v) => Err(DataLinkError::UnsupportedBvlcFunction(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BacnetIpTransport;
    use crate::bip::bvlc::{BvlcFunction, BvlcHeader, BVLC_TYPE_BIP};
    use crate::{DataLink, DataLinkError};
    use flexbac_core::encoding::writer::Writer;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use tokio::net::UdpSocket;

    fn localhost() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
    }

    async fn pair() -> (BacnetIpTransport, UdpSocket, SocketAddr) {
        let transport = BacnetIpTransport::bind(localhost()).await.unwrap();
        let target = transport.local_addr().unwrap();
        let peer = UdpSocket::bind(localhost()).await.unwrap();
        (transport, peer, target)
    }

    #[tokio::test]
    async fn send_wraps_payload_in_original_unicast() {
        let (transport, peer, _) = pair().await;
        transport
            .send(peer.local_addr().unwrap(), &[0x01, 0x04, 0xAA])
            .await
            .unwrap();

        let mut buf = [0u8; 16];
        let (n, _) = peer.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], &[0x81, 0x0A, 0x00, 0x07, 0x01, 0x04, 0xAA]);
    }

    #[tokio::test]
    async fn recv_original_unicast_strips_header() {
        let (transport, peer, target) = pair().await;
        peer.send_to(&[0x81, 0x0A, 0x00, 0x06, 0x01, 0x00], target)
            .await
            .unwrap();

        let mut out = [0u8; 16];
        let (n, src) = transport.recv(&mut out).await.unwrap();
        assert_eq!(&out[..n], &[0x01, 0x00]);
        assert_eq!(src, peer.local_addr().unwrap());
    }

    #[tokio::test]
    async fn recv_forwarded_npdu_returns_forwarded_origin() {
        let (transport, peer, target) = pair().await;

        let mut w = Writer::new();
        BvlcHeader {
            function: BvlcFunction::ForwardedNpdu,
            length: 4 + 6 + 3,
        }
        .encode(&mut w);
        w.write_all(&[10, 1, 2, 3]);
        w.write_be_u16(47808);
        w.write_all(&[1, 2, 3]);
        peer.send_to(w.as_written(), target).await.unwrap();

        let mut out = [0u8; 16];
        let (n, src) = transport.recv(&mut out).await.unwrap();
        assert_eq!(&out[..n], &[1, 2, 3]);
        assert_eq!(
            src,
            SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 1, 2, 3)), 47808)
        );
    }

    #[tokio::test]
    async fn nak_result_surfaces_code() {
        let (transport, peer, target) = pair().await;
        peer.send_to(&[BVLC_TYPE_BIP, 0x00, 0x00, 0x06, 0x00, 0x30], target)
            .await
            .unwrap();

        let mut out = [0u8; 16];
        let err = transport.recv(&mut out).await.unwrap_err();
        assert!(matches!(err, DataLinkError::BvlcResult(0x0030)));
    }

    #[tokio::test]
    async fn unknown_bvlc_function_errors() {
        let (transport, peer, target) = pair().await;
        peer.send_to(&[BVLC_TYPE_BIP, 0x99, 0x00, 0x04], target)
            .await
            .unwrap();

        let mut out = [0u8; 16];
        let err = transport.recv(&mut out).await.unwrap_err();
        assert!(matches!(err, DataLinkError::UnsupportedBvlcFunction(0x99)));
    }

    #[tokio::test]
    async fn truncated_frame_is_invalid() {
        let (transport, peer, target) = pair().await;
        peer.send_to(&[BVLC_TYPE_BIP, 0x0A, 0x00, 0x10, 0x01], target)
            .await
            .unwrap();

        let mut out = [0u8; 16];
        let err = transport.recv(&mut out).await.unwrap_err();
        assert!(matches!(err, DataLinkError::InvalidFrame));
    }

    #[tokio::test]
    async fn oversized_payload_is_rejected_before_sending() {
        let (transport, peer, _) = pair().await;
        let payload = vec![0u8; 2000];
        let err = transport
            .send(peer.local_addr().unwrap(), &payload)
            .await
            .unwrap_err();
        assert!(matches!(err, DataLinkError::FrameTooLarge));
    }
}
