use flexbac_core::encoding::{reader::Reader, writer::Writer};
use flexbac_core::DecodeError;

pub const BVLC_TYPE_BIP: u8 = 0x81;

/// Size of the fixed BVLC header (type, function, length).
pub const BVLC_HEADER_LEN: usize = 4;

/// The BVLC functions a unicast client meets. Everything else is carried
/// through `Unknown` so the caller can report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvlcFunction {
    Result,
    ForwardedNpdu,
    OriginalUnicastNpdu,
    OriginalBroadcastNpdu,
    Unknown(u8),
}

impl BvlcFunction {
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0x00 => Self::Result,
            0x04 => Self::ForwardedNpdu,
            0x0A => Self::OriginalUnicastNpdu,
            0x0B => Self::OriginalBroadcastNpdu,
            v => Self::Unknown(v),
        }
    }

    pub const fn to_u8(self) -> u8 {
        match self {
            Self::Result => 0x00,
            Self::ForwardedNpdu => 0x04,
            Self::OriginalUnicastNpdu => 0x0A,
            Self::OriginalBroadcastNpdu => 0x0B,
            Self::Unknown(v) => v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BvlcHeader {
    pub function: BvlcFunction,
    pub length: u16,
}

impl BvlcHeader {
    pub fn encode(&self, w: &mut Writer) {
        w.write_u8(BVLC_TYPE_BIP);
        w.write_u8(self.function.to_u8());
        w.write_be_u16(self.length);
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self, DecodeError> {
        if r.read_u8()? != BVLC_TYPE_BIP {
            return Err(DecodeError::InvalidValue);
        }
        let function = BvlcFunction::from_u8(r.read_u8()?);
        let length = r.read_be_u16()?;
        if (length as usize) < BVLC_HEADER_LEN {
            return Err(DecodeError::InvalidLength);
        }
        Ok(Self { function, length })
    }

    pub const fn payload_len(&self) -> usize {
        self.length as usize - BVLC_HEADER_LEN
    }
}

#[cfg(test)]
mod tests {
    use super::{BvlcFunction, BvlcHeader, BVLC_TYPE_BIP};
    use flexbac_core::encoding::{reader::Reader, writer::Writer};
    use flexbac_core::DecodeError;

    #[test]
    fn original_unicast_header_bytes() {
        let mut w = Writer::new();
        BvlcHeader {
            function: BvlcFunction::OriginalUnicastNpdu,
            length: 25,
        }
        .encode(&mut w);
        assert_eq!(w.as_written(), &[0x81, 0x0A, 0x00, 0x19]);
    }

    #[test]
    fn forwarded_header_decodes() {
        let mut r = Reader::new(&[BVLC_TYPE_BIP, 0x04, 0x00, 0x0D]);
        let h = BvlcHeader::decode(&mut r).unwrap();
        assert_eq!(h.function, BvlcFunction::ForwardedNpdu);
        assert_eq!(h.payload_len(), 9);
    }

    #[test]
    fn unknown_function_decodes() {
        let mut r = Reader::new(&[BVLC_TYPE_BIP, 0x99, 0, 4]);
        let decoded = BvlcHeader::decode(&mut r).unwrap();
        assert_eq!(decoded.function, BvlcFunction::Unknown(0x99));
    }

    #[test]
    fn short_length_is_rejected() {
        let mut r = Reader::new(&[BVLC_TYPE_BIP, 0x0A, 0, 3]);
        assert_eq!(BvlcHeader::decode(&mut r).unwrap_err(), DecodeError::InvalidLength);
    }

    #[test]
    fn foreign_type_is_rejected() {
        let mut r = Reader::new(&[0x82, 0x0A, 0, 4]);
        assert_eq!(BvlcHeader::decode(&mut r).unwrap_err(), DecodeError::InvalidValue);
    }
}
