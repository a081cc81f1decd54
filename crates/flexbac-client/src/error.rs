use crate::value::TypedValue;
use flexbac_core::types::{ObjectId, PropertyId};
use flexbac_datalink::DataLinkError;
use std::net::SocketAddr;
use thiserror::Error;

/// Low-level failure of one request/response exchange.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("datalink error: {0}")]
    DataLink(#[from] DataLinkError),
    #[error("encode error: {0}")]
    Encode(#[from] flexbac_core::EncodeError),
    #[error("decode error: {0}")]
    Decode(#[from] flexbac_core::DecodeError),
    #[error("request timed out")]
    Timeout,
    #[error("remote service error for service choice {service_choice} (class {error_class:?}, code {error_code:?})")]
    RemoteServiceError {
        service_choice: u8,
        error_class: Option<u32>,
        error_code: Option<u32>,
    },
    #[error("remote reject reason {reason}")]
    RemoteReject { reason: u8 },
    #[error("remote abort reason {reason} (server={server})")]
    RemoteAbort { reason: u8, server: bool },
    #[error("reply carried no results")]
    EmptyReply,
    #[error("reply lacks {property:?} of {object_id}")]
    MissingProperty {
        object_id: ObjectId,
        property: PropertyId,
    },
    #[error("{property:?} of {object_id} failed with class {error_class} code {error_code}")]
    PropertyAccess {
        object_id: ObjectId,
        property: PropertyId,
        error_class: u32,
        error_code: u32,
    },
    #[error("{object_id} returned a value its register cannot decode")]
    UndecodableValue { object_id: ObjectId },
    #[error("unsupported response")]
    UnsupportedResponse,
}

/// Failure surfaced by the device facade and its sessions.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no route to {peer}: {source}")]
    NoRoute {
        peer: SocketAddr,
        #[source]
        source: DataLinkError,
    },
    #[error("BACnet/IP binding failed: {0}")]
    BindFailed(#[source] DataLinkError),
    #[error("operation timed out")]
    Timeout,
    #[error("protocol error: {0}")]
    Protocol(#[source] TransportError),
    #[error("write to '{register}' failed: {source}")]
    WriteFailed {
        register: String,
        #[source]
        source: TransportError,
    },
    #[error("unknown register '{0}'")]
    UnknownRegister(String),
    #[error("register '{0}' is read-only")]
    ReadOnlyRegister(String),
    #[error("no successful refresh has completed")]
    StaleOrMissing,
    #[error("value {value} cannot be written to register '{register}'")]
    ValueMismatch { register: String, value: TypedValue },
    #[error("session is not bound or was already used")]
    SessionClosed,
}

impl DeviceError {
    /// Maps a failed read exchange: deadline expiry stays a timeout, all
    /// else is a protocol error.
    pub(crate) fn from_read(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => Self::Timeout,
            other => Self::Protocol(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("object {0} appears twice in the catalog")]
    DuplicateObject(ObjectId),
    #[error("register name '{0}' appears twice in the catalog")]
    DuplicateName(&'static str),
    #[error("register '{name}' declares priority {priority}, outside 1..=16")]
    InvalidPriority { name: &'static str, priority: u8 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be at least 1")]
    ZeroDuration { field: &'static str },
    #[error("address must not be empty")]
    EmptyAddress,
    #[error("device id {0} exceeds the BACnet instance range")]
    DeviceIdOutOfRange(u32),
    #[error("cannot resolve '{host}': {reason}")]
    Unresolved { host: String, reason: String },
}

#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("device {device_id} at {peer} did not answer the identity read")]
    ValidationFailed { peer: SocketAddr, device_id: u32 },
    #[error("first refresh failed: {0}")]
    FirstRefresh(#[source] DeviceError),
    #[error("integration '{0}' is already registered")]
    AlreadyRegistered(String),
}
