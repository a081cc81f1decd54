use crate::types::{BitString, Date, ObjectId, Time};

/// An owned BACnet application value.
///
/// `List` holds a run of application values returned for an array property
/// read without an index (for example `state-text`).
#[derive(Debug, Clone, PartialEq)]
pub enum DataValue {
    Null,
    Boolean(bool),
    Unsigned(u32),
    Signed(i32),
    Real(f32),
    Double(f64),
    OctetString(Vec<u8>),
    CharacterString(String),
    BitString(BitString),
    Enumerated(u32),
    Date(Date),
    Time(Time),
    ObjectId(ObjectId),
    List(Vec<DataValue>),
}

impl DataValue {
    /// Numeric view of scalar number-like values.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Unsigned(v) => Some(v as f64),
            Self::Signed(v) => Some(v as f64),
            Self::Real(v) => Some(v as f64),
            Self::Double(v) => Some(v),
            Self::Enumerated(v) => Some(v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::CharacterString(s) => Some(s),
            _ => None,
        }
    }
}
