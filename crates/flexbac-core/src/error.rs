//! Codec errors. Both types are `Copy` and carry no allocation so decode
//! paths can return them freely.

use core::fmt;

/// A frame could not be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// A field does not fit its encoding, e.g. a write priority outside
    /// 1..=16.
    ValueOutOfRange,
    /// A length patch pointed past the written bytes.
    InvalidLength,
}

/// A received frame is truncated, malformed or outside the supported subset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    UnexpectedEof,
    InvalidTag,
    InvalidLength,
    InvalidValue,
    /// Well-formed but not handled here: segmentation, constructed values,
    /// double-byte character sets.
    Unsupported,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::ValueOutOfRange => "field value outside its encodable range",
            Self::InvalidLength => "length field outside written frame",
        };
        f.write_str(msg)
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::UnexpectedEof => "frame ended early",
            Self::InvalidTag => "unexpected tag",
            Self::InvalidLength => "length does not match content",
            Self::InvalidValue => "value not valid here",
            Self::Unsupported => "encoding not supported by this client",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for EncodeError {}

impl std::error::Error for DecodeError {}
