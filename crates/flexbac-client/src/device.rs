use crate::catalog::{Catalog, RegisterDescriptor};
use crate::error::{DeviceError, TransportError};
use crate::identity::DeviceIdentity;
use crate::raw::RawBatch;
use crate::session::{Session, Transport};
use crate::state::{DeviceState, StateSlot};
use crate::value::TypedValue;
use flexbac_core::types::PropertyId;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::time::{timeout_at, Instant};

/// Per-operation deadline unless [`Device::with_deadline`] overrides it.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

/// The object callers talk to for one ventilation unit.
///
/// Every operation opens its own session through `T`, runs under a bounded
/// deadline and closes the session on every exit path. The current
/// [`DeviceState`] is the only shared mutable state and is replaced
/// wholesale.
#[derive(Debug)]
pub struct Device<T> {
    transport: T,
    peer: SocketAddr,
    device_id: u32,
    catalog: Catalog,
    state: StateSlot,
    identity: OnceLock<DeviceIdentity>,
    deadline: Duration,
}

impl<T: Transport> Device<T> {
    /// Creates a device with no snapshot and no resolved identity. Nothing is
    /// sent until the first operation.
    pub fn new(transport: T, peer: SocketAddr, device_id: u32, catalog: Catalog) -> Self {
        Self {
            transport,
            peer,
            device_id,
            catalog,
            state: StateSlot::default(),
            identity: OnceLock::new(),
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Bounds open plus operation of every session.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// BACnet/IP address of the unit.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Configured device object instance.
    pub fn device_id(&self) -> u32 {
        self.device_id
    }

    /// Registers read by every refresh.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Identity resolved by [`Device::validate`] or [`Device::identify`].
    pub fn identity(&self) -> Option<&DeviceIdentity> {
        self.identity.get()
    }

    /// Confirms the configured address and instance id answer an identity
    /// read. Any failure counts as invalid and is only logged.
    pub async fn validate(&self) -> bool {
        match self.read_identity().await {
            Ok(identity) => {
                log::info!(
                    "validated device {} at {} ({})",
                    self.device_id,
                    self.peer,
                    identity.object_name
                );
                let _ = self.identity.set(identity);
                true
            }
            Err(err) => {
                log::warn!(
                    "device {} at {} failed validation: {err}",
                    self.device_id,
                    self.peer
                );
                false
            }
        }
    }

    /// Cached identity, read from the unit on first use.
    pub async fn identify(&self) -> Result<&DeviceIdentity, DeviceError> {
        if let Some(identity) = self.identity.get() {
            return Ok(identity);
        }
        let identity = self.read_identity().await?;
        Ok(self.identity.get_or_init(|| identity))
    }

    /// Reads the whole catalog in one batch and replaces the snapshot.
    ///
    /// On failure the previous snapshot stays in place, the device turns
    /// unavailable and the error is returned.
    pub async fn refresh(&self) -> Result<Arc<DeviceState>, DeviceError> {
        match self.read_state().await {
            Ok(state) => {
                let state = Arc::new(state);
                self.state.publish(state.clone());
                Ok(state)
            }
            Err(err) => {
                self.state.mark_unavailable();
                Err(err)
            }
        }
    }

    /// Writes one register through a dedicated session. The snapshot is not
    /// touched; call [`Device::refresh`] to observe the change.
    ///
    /// Read-only registers fail with [`DeviceError::ReadOnlyRegister`]
    /// before any session is opened.
    pub async fn set_register(&self, name: &str, value: TypedValue) -> Result<(), DeviceError> {
        let register = *self.catalog.lookup(name)?;
        if !register.writable {
            return Err(DeviceError::ReadOnlyRegister(register.name.to_owned()));
        }
        let raw = register.encode(&value)?;

        let deadline = Instant::now() + self.deadline;
        let mut session = timeout_at(deadline, self.transport.open(self.peer))
            .await
            .map_err(|_| write_timeout(&register))??;
        let result = timeout_at(deadline, session.write_one(&register, raw)).await;
        session.close().await;
        result.map_err(|_| write_timeout(&register))?
    }

    /// Latest value of `name` from the current snapshot.
    pub fn current_value(&self, name: &str) -> Result<TypedValue, DeviceError> {
        let register = self.catalog.lookup(name)?;
        self.state
            .snapshot()
            .and_then(|state| state.get(register.name).cloned())
            .ok_or(DeviceError::StaleOrMissing)
    }

    /// Last successful refresh, kept while the device is unavailable.
    /// `None` until a refresh has succeeded.
    pub fn snapshot(&self) -> Option<Arc<DeviceState>> {
        self.state.snapshot()
    }

    /// True only while the latest refresh succeeded.
    pub fn is_available(&self) -> bool {
        self.state.is_available()
    }

    /// Snapshot and availability read together.
    pub fn status(&self) -> (Option<Arc<DeviceState>>, bool) {
        self.state.load()
    }

    /// JSON dump of address, identity, availability and the current
    /// snapshot for support output.
    pub fn diagnostics(&self) -> serde_json::Value {
        let (snapshot, available) = self.state.load();
        serde_json::json!({
            "peer": self.peer.to_string(),
            "device_id": self.device_id,
            "identity": self.identity.get(),
            "available": available,
            "snapshot": snapshot.as_deref(),
        })
    }

    async fn read_identity(&self) -> Result<DeviceIdentity, DeviceError> {
        let deadline = Instant::now() + self.deadline;
        let mut session = self.open_until(deadline).await?;
        let result = timeout_at(deadline, session.read_identity(self.device_id)).await;
        session.close().await;
        result.map_err(|_| DeviceError::Timeout)?
    }

    async fn read_state(&self) -> Result<DeviceState, DeviceError> {
        let deadline = Instant::now() + self.deadline;
        let mut session = self.open_until(deadline).await?;
        let result = timeout_at(deadline, session.read_batch(self.catalog.list())).await;
        session.close().await;
        let batch = result.map_err(|_| DeviceError::Timeout)??;
        self.decode(&batch)
    }

    async fn open_until(&self, deadline: Instant) -> Result<T::Session, DeviceError> {
        timeout_at(deadline, self.transport.open(self.peer))
            .await
            .map_err(|_| DeviceError::Timeout)?
    }

    /// All-or-nothing: a register missing from the batch or carrying an
    /// undecodable value fails the whole snapshot.
    fn decode(&self, batch: &RawBatch) -> Result<DeviceState, DeviceError> {
        let mut values = BTreeMap::new();
        for register in self.catalog.list() {
            let reading = batch.get(register.name).ok_or(DeviceError::Protocol(
                TransportError::MissingProperty {
                    object_id: register.object_id,
                    property: PropertyId::PresentValue,
                },
            ))?;
            let value = register.decode(reading).map_err(DeviceError::Protocol)?;
            values.insert(register.name, value);
        }
        Ok(DeviceState::new(values))
    }
}

fn write_timeout(register: &RegisterDescriptor) -> DeviceError {
    DeviceError::WriteFailed {
        register: register.name.to_owned(),
        source: TransportError::Timeout,
    }
}
