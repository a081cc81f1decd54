use crate::apdu::ApduType;
use crate::encoding::{
    primitives::{decode_unsigned, encode_unsigned, unsigned_len},
    reader::Reader,
    tag::{AppTag, Tag},
    writer::Writer,
};
use crate::DecodeError;

/// Reads the first APDU octet and checks its PDU type nibble.
fn expect_pdu(r: &mut Reader<'_>, expected: ApduType) -> Result<u8, DecodeError> {
    let b0 = r.read_u8()?;
    if ApduType::from_u8(b0 >> 4) != Some(expected) {
        return Err(DecodeError::InvalidValue);
    }
    Ok(b0)
}

/// Max-APDU code 5: 1476 octets, the BACnet/IP maximum.
pub const MAX_APDU_1476: u8 = 5;

/// Header of an unsegmented confirmed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmedRequestHeader {
    pub segmented_response_accepted: bool,
    pub max_apdu: u8,
    pub invoke_id: u8,
    pub service_choice: u8,
}

impl ConfirmedRequestHeader {
    pub const fn new(invoke_id: u8, service_choice: u8) -> Self {
        Self {
            segmented_response_accepted: false,
            max_apdu: MAX_APDU_1476,
            invoke_id,
            service_choice,
        }
    }

    pub fn encode(&self, w: &mut Writer) {
        let mut b0 = (ApduType::ConfirmedRequest as u8) << 4;
        if self.segmented_response_accepted {
            b0 |= 0b0000_0010;
        }
        w.write_u8(b0);
        w.write_u8(self.max_apdu & 0x0F);
        w.write_u8(self.invoke_id);
        w.write_u8(self.service_choice);
    }

    /// Decodes an unsegmented request; segmented requests are rejected.
    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let b0 = expect_pdu(r, ApduType::ConfirmedRequest)?;
        if b0 & 0b0000_1000 != 0 {
            return Err(DecodeError::Unsupported);
        }
        let max_apdu = r.read_u8()? & 0x0F;
        let invoke_id = r.read_u8()?;
        let service_choice = r.read_u8()?;
        Ok(Self {
            segmented_response_accepted: b0 & 0b0000_0010 != 0,
            max_apdu,
            invoke_id,
            service_choice,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexAckHeader {
    pub segmented: bool,
    pub invoke_id: u8,
    pub service_choice: u8,
}

impl ComplexAckHeader {
    pub fn encode(&self, w: &mut Writer) {
        let mut b0 = (ApduType::ComplexAck as u8) << 4;
        if self.segmented {
            b0 |= 0b0000_1000;
        }
        w.write_u8(b0);
        w.write_u8(self.invoke_id);
        if self.segmented {
            w.write_u8(0);
            w.write_u8(1);
        }
        w.write_u8(self.service_choice);
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let b0 = expect_pdu(r, ApduType::ComplexAck)?;
        let segmented = b0 & 0b0000_1000 != 0;
        let invoke_id = r.read_u8()?;
        if segmented {
            // Sequence number and proposed window size.
            r.read_exact(2)?;
        }
        Ok(Self {
            segmented,
            invoke_id,
            service_choice: r.read_u8()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleAck {
    pub invoke_id: u8,
    pub service_choice: u8,
}

impl SimpleAck {
    pub fn encode(&self, w: &mut Writer) {
        w.write_u8((ApduType::SimpleAck as u8) << 4);
        w.write_u8(self.invoke_id);
        w.write_u8(self.service_choice);
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        expect_pdu(r, ApduType::SimpleAck)?;
        Ok(Self {
            invoke_id: r.read_u8()?,
            service_choice: r.read_u8()?,
        })
    }
}

/// Error PDU with its error class and code (both optional on the wire in
/// the wild, although the standard requires them).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BacnetError {
    pub invoke_id: u8,
    pub service_choice: u8,
    pub error_class: Option<u32>,
    pub error_code: Option<u32>,
}

impl BacnetError {
    pub fn encode(&self, w: &mut Writer) {
        w.write_u8((ApduType::Error as u8) << 4);
        w.write_u8(self.invoke_id);
        w.write_u8(self.service_choice);
        if let (Some(class), Some(code)) = (self.error_class, self.error_code) {
            for v in [class, code] {
                Tag::Application {
                    tag: AppTag::Enumerated,
                    len: unsigned_len(v) as u32,
                }
                .encode(w);
                encode_unsigned(w, v);
            }
        }
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        expect_pdu(r, ApduType::Error)?;
        let invoke_id = r.read_u8()?;
        let service_choice = r.read_u8()?;
        let (mut error_class, mut error_code) = (None, None);
        if !r.is_empty() {
            let mut first = Tag::decode(r)?;
            let wrapped = first == Tag::Opening { tag_num: 0 };
            if wrapped {
                first = Tag::decode(r)?;
            }
            error_class = Some(error_field(r, first, 0)?);
            let second = Tag::decode(r)?;
            error_code = Some(error_field(r, second, 1)?);
            if wrapped && !Tag::decode(r)?.closes(0) {
                return Err(DecodeError::InvalidTag);
            }
        }
        Ok(Self {
            invoke_id,
            service_choice,
            error_class,
            error_code,
        })
    }
}

fn error_field(r: &mut Reader<'_>, tag: Tag, ctx_tag: u8) -> Result<u32, DecodeError> {
    match tag {
        Tag::Context { tag_num, len } if tag_num == ctx_tag => decode_unsigned(r, len as usize),
        Tag::Application {
            tag: AppTag::Enumerated,
            len,
        } => decode_unsigned(r, len as usize),
        _ => Err(DecodeError::InvalidTag),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectPdu {
    pub invoke_id: u8,
    pub reason: u8,
}

impl RejectPdu {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        expect_pdu(r, ApduType::Reject)?;
        Ok(Self {
            invoke_id: r.read_u8()?,
            reason: r.read_u8()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbortPdu {
    pub server: bool,
    pub invoke_id: u8,
    pub reason: u8,
}

impl AbortPdu {
    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let b0 = expect_pdu(r, ApduType::Abort)?;
        Ok(Self {
            server: b0 & 0x01 != 0,
            invoke_id: r.read_u8()?,
            reason: r.read_u8()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{AbortPdu, BacnetError, ComplexAckHeader, ConfirmedRequestHeader};
    use crate::encoding::{reader::Reader, writer::Writer};

    #[test]
    fn confirmed_request_header_layout() {
        let mut w = Writer::new();
        ConfirmedRequestHeader::new(7, 0x0E).encode(&mut w);
        assert_eq!(w.as_written(), &[0x00, 0x05, 7, 0x0E]);
        let mut r = Reader::new(w.as_written());
        assert_eq!(
            ConfirmedRequestHeader::decode(&mut r).unwrap(),
            ConfirmedRequestHeader::new(7, 0x0E)
        );
    }

    #[test]
    fn segmented_complex_ack_skips_window_fields() {
        let mut r = Reader::new(&[0x38, 9, 0, 4, 0x0E]);
        let ack = ComplexAckHeader::decode(&mut r).unwrap();
        assert!(ack.segmented);
        assert_eq!(ack.invoke_id, 9);
        assert_eq!(ack.service_choice, 0x0E);
    }

    #[test]
    fn error_pdu_with_enumerated_fields() {
        let err = BacnetError {
            invoke_id: 3,
            service_choice: 15,
            error_class: Some(2),
            error_code: Some(40),
        };
        let mut w = Writer::new();
        err.encode(&mut w);
        let mut r = Reader::new(w.as_written());
        assert_eq!(BacnetError::decode(&mut r).unwrap(), err);
    }

    #[test]
    fn error_pdu_with_wrapped_context_fields() {
        let mut r = Reader::new(&[0x50, 1, 15, 0x0E, 0x09, 0x02, 0x19, 0x20, 0x0F]);
        let e = BacnetError::decode(&mut r).unwrap();
        assert_eq!(e.error_class, Some(2));
        assert_eq!(e.error_code, Some(32));
    }

    #[test]
    fn error_pdu_without_details() {
        let mut r = Reader::new(&[0x50, 1, 12]);
        let e = BacnetError::decode(&mut r).unwrap();
        assert_eq!((e.error_class, e.error_code), (None, None));
    }

    #[test]
    fn abort_from_server() {
        let mut r = Reader::new(&[0x71, 4, 4]);
        let a = AbortPdu::decode(&mut r).unwrap();
        assert!(a.server);
        assert_eq!(a.reason, 4);
    }
}
