#![allow(async_fn_in_trait)]
//! Polling and control core for a Flexit Nordic ventilation unit.
//!
//! A [`Device`] reads every register of a [`Catalog`] in one
//! ReadPropertyMultiple request per [`Device::refresh`], keeps the decoded
//! result as an immutable [`DeviceState`] snapshot, and writes single
//! registers on demand. Each operation opens its own short-lived
//! [`Session`] and always closes it.

pub mod bip;
pub mod catalog;
pub mod config;
pub mod controls;
pub mod coordinator;
pub mod derived;
pub mod device;
pub mod error;
pub mod identity;
pub mod nordic;
pub mod raw;
pub mod registry;
pub mod session;
pub mod setup;
pub mod state;
pub mod value;

#[cfg(test)]
pub(crate) mod mock;

pub use bip::{BipSession, BipTransport};
pub use catalog::{Catalog, Decoder, RegisterDescriptor};
pub use config::DeviceConfig;
pub use controls::{Airflow, FanProfile};
pub use coordinator::{Coordinator, CoordinatorUpdate};
pub use derived::{FilterStatus, HvacMode, Preset};
pub use device::Device;
pub use error::{CatalogError, ConfigError, DeviceError, SetupError, TransportError};
pub use identity::DeviceIdentity;
pub use nordic::VentilationMode;
pub use raw::{RawBatch, RawReading};
pub use registry::DeviceRegistry;
pub use session::{Session, SessionLifecycle, SessionState, Transport};
pub use setup::{setup, setup_with};
pub use state::DeviceState;
pub use value::TypedValue;
