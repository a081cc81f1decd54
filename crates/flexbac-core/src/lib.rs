//! BACnet wire codec for the flexbac ventilation-unit client.
//!
//! `flexbac-core` covers exactly the part of BACnet the client speaks:
//! application tags and primitive values, the NPDU header, confirmed-service
//! APDU headers, and the ReadPropertyMultiple and WriteProperty services.
//! Segmentation, COV and discovery are not implemented.

/// APDU headers for confirmed requests and their responses.
pub mod apdu;
/// Tag system, primitive encoders and the byte reader/writer.
pub mod encoding;
/// Error types for encoding and decoding.
pub mod error;
/// NPDU (network layer) header.
pub mod npdu;
/// Service request and acknowledgement codecs.
pub mod services;
/// Object identifiers, property identifiers and application values.
pub mod types;

pub use error::{DecodeError, EncodeError};
