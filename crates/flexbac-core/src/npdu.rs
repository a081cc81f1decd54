use crate::encoding::{reader::Reader, writer::Writer};
use crate::DecodeError;

/// BACnet network layer protocol version (always `0x01`).
pub const NPDU_VERSION: u8 = 0x01;

const CONTROL_NETWORK_MESSAGE: u8 = 0x80;
const CONTROL_HAS_DESTINATION: u8 = 0x20;
const CONTROL_HAS_SOURCE: u8 = 0x08;
const CONTROL_EXPECTING_REPLY: u8 = 0x04;

/// Network number plus MAC of a remote (routed) station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpduAddress {
    pub network: u16,
    pub mac: Vec<u8>,
}

/// NPDU header for local unicast traffic.
///
/// Outgoing requests never carry routing information; incoming frames may,
/// when the unit sits behind a router, and it is decoded and kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Npdu {
    pub expecting_reply: bool,
    pub destination: Option<NpduAddress>,
    pub source: Option<NpduAddress>,
    pub hop_count: Option<u8>,
    /// Set when the frame carries a network-layer message instead of an APDU.
    pub message_type: Option<u8>,
}

impl Npdu {
    pub fn request() -> Self {
        Self {
            expecting_reply: true,
            ..Self::default()
        }
    }

    pub fn encode(&self, w: &mut Writer) {
        let mut control = 0u8;
        if self.expecting_reply {
            control |= CONTROL_EXPECTING_REPLY;
        }
        if self.destination.is_some() {
            control |= CONTROL_HAS_DESTINATION;
        }
        if self.source.is_some() {
            control |= CONTROL_HAS_SOURCE;
        }
        w.write_u8(NPDU_VERSION);
        w.write_u8(control);
        if let Some(dest) = &self.destination {
            write_addr(w, dest);
        }
        if let Some(src) = &self.source {
            write_addr(w, src);
        }
        if self.destination.is_some() {
            w.write_u8(self.hop_count.unwrap_or(255));
        }
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        if r.read_u8()? != NPDU_VERSION {
            return Err(DecodeError::InvalidValue);
        }
        let control = r.read_u8()?;
        let destination = if control & CONTROL_HAS_DESTINATION != 0 {
            Some(read_addr(r)?)
        } else {
            None
        };
        let source = if control & CONTROL_HAS_SOURCE != 0 {
            Some(read_addr(r)?)
        } else {
            None
        };
        let hop_count = if destination.is_some() {
            Some(r.read_u8()?)
        } else {
            None
        };
        let message_type = if control & CONTROL_NETWORK_MESSAGE != 0 {
            let mt = r.read_u8()?;
            if mt >= 0x80 {
                // Vendor id of a proprietary network message.
                r.read_be_u16()?;
            }
            Some(mt)
        } else {
            None
        };
        Ok(Self {
            expecting_reply: control & CONTROL_EXPECTING_REPLY != 0,
            destination,
            source,
            hop_count,
            message_type,
        })
    }
}

fn write_addr(w: &mut Writer, addr: &NpduAddress) {
    w.write_be_u16(addr.network);
    w.write_u8(addr.mac.len() as u8);
    w.write_all(&addr.mac);
}

fn read_addr(r: &mut Reader<'_>) -> Result<NpduAddress, DecodeError> {
    let network = r.read_be_u16()?;
    let mac_len = r.read_u8()? as usize;
    if mac_len > 7 {
        return Err(DecodeError::InvalidLength);
    }
    Ok(NpduAddress {
        network,
        mac: r.read_exact(mac_len)?.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::{Npdu, NpduAddress};
    use crate::encoding::{reader::Reader, writer::Writer};

    #[test]
    fn request_header_is_two_bytes() {
        let mut w = Writer::new();
        Npdu::request().encode(&mut w);
        assert_eq!(w.as_written(), &[0x01, 0x04]);
    }

    #[test]
    fn routed_reply_keeps_source() {
        let npdu = Npdu {
            source: Some(NpduAddress {
                network: 5,
                mac: vec![0x11],
            }),
            ..Npdu::default()
        };
        let mut w = Writer::new();
        npdu.encode(&mut w);
        w.write_u8(0x20);

        let mut r = Reader::new(w.as_written());
        let decoded = Npdu::decode(&mut r).unwrap();
        assert_eq!(decoded, npdu);
        assert_eq!(r.rest(), &[0x20]);
    }

    #[test]
    fn network_layer_message_is_flagged() {
        let mut r = Reader::new(&[0x01, 0x80, 0x01, 0x00, 0x05]);
        let decoded = Npdu::decode(&mut r).unwrap();
        assert_eq!(decoded.message_type, Some(0x01));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut r = Reader::new(&[0x02, 0x00]);
        assert!(Npdu::decode(&mut r).is_err());
    }
}
