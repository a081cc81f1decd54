/// Confirmed-service request header and the response PDUs that answer it.
pub mod confirmed;

pub use confirmed::{AbortPdu, BacnetError, ComplexAckHeader, ConfirmedRequestHeader, RejectPdu, SimpleAck};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ApduType {
    ConfirmedRequest = 0,
    UnconfirmedRequest = 1,
    SimpleAck = 2,
    ComplexAck = 3,
    SegmentAck = 4,
    Error = 5,
    Reject = 6,
    Abort = 7,
}

impl ApduType {
    pub fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::ConfirmedRequest,
            1 => Self::UnconfirmedRequest,
            2 => Self::SimpleAck,
            3 => Self::ComplexAck,
            4 => Self::SegmentAck,
            5 => Self::Error,
            6 => Self::Reject,
            7 => Self::Abort,
            _ => return None,
        })
    }

    /// Classifies an APDU by the high nibble of its first byte.
    pub fn of(apdu: &[u8]) -> Option<Self> {
        apdu.first().and_then(|b| Self::from_u8(b >> 4))
    }
}
