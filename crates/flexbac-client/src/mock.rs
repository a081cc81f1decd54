//! In-memory transport for facade tests.

use crate::catalog::RegisterDescriptor;
use crate::error::{DeviceError, TransportError};
use crate::identity::DeviceIdentity;
use crate::raw::{RawBatch, RawReading};
use crate::session::{Session, SessionLifecycle, Transport};
use flexbac_core::types::{DataValue, ObjectId, PropertyId};
use flexbac_datalink::DataLinkError;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecordedWrite {
    pub object_id: ObjectId,
    pub value: DataValue,
    pub priority: Option<u8>,
}

#[derive(Debug, Default)]
struct MockState {
    table: Mutex<HashMap<&'static str, RawReading>>,
    read_failures: Mutex<VecDeque<DeviceError>>,
    write_failures: Mutex<VecDeque<TransportError>>,
    identity: Mutex<Option<DeviceIdentity>>,
    refuse_open: AtomicBool,
    delay: Mutex<Duration>,
    opened: AtomicUsize,
    closed: AtomicUsize,
    writes: Mutex<Vec<RecordedWrite>>,
}

/// Simulated unit: reads serve the register table, writes update its
/// present values.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockTransport {
    state: Arc<MockState>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_register(self, name: &'static str, reading: RawReading) -> Self {
        self.set_register(name, reading);
        self
    }

    pub fn with_identity(self, identity: DeviceIdentity) -> Self {
        *lock(&self.state.identity) = Some(identity);
        self
    }

    pub fn set_register(&self, name: &'static str, reading: RawReading) {
        lock(&self.state.table).insert(name, reading);
    }

    pub fn fail_next_read(&self, err: DeviceError) {
        lock(&self.state.read_failures).push_back(err);
    }

    pub fn fail_next_write(&self, err: TransportError) {
        lock(&self.state.write_failures).push_back(err);
    }

    pub fn refuse_open(&self, refuse: bool) {
        self.state.refuse_open.store(refuse, Ordering::SeqCst);
    }

    /// Every session operation sleeps this long first.
    pub fn set_delay(&self, delay: Duration) {
        *lock(&self.state.delay) = delay;
    }

    pub fn opened(&self) -> usize {
        self.state.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.state.closed.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        lock(&self.state.writes).clone()
    }
}

impl Transport for MockTransport {
    type Session = MockSession;

    async fn open(&self, peer: SocketAddr) -> Result<MockSession, DeviceError> {
        if self.state.refuse_open.load(Ordering::SeqCst) {
            return Err(DeviceError::NoRoute {
                peer,
                source: DataLinkError::InvalidFrame,
            });
        }
        self.state.opened.fetch_add(1, Ordering::SeqCst);
        let mut lifecycle = SessionLifecycle::default();
        lifecycle.begin_bind();
        lifecycle.bound();
        Ok(MockSession {
            state: self.state.clone(),
            lifecycle,
        })
    }
}

#[derive(Debug)]
pub(crate) struct MockSession {
    state: Arc<MockState>,
    lifecycle: SessionLifecycle,
}

impl MockSession {
    async fn pause(&self) {
        let delay = *lock(&self.state.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Session for MockSession {
    async fn read_batch(
        &mut self,
        registers: &[RegisterDescriptor],
    ) -> Result<RawBatch, DeviceError> {
        self.lifecycle.begin_operation()?;
        self.pause().await;
        if let Some(err) = lock(&self.state.read_failures).pop_front() {
            return Err(err);
        }
        let table = lock(&self.state.table);
        let mut batch = RawBatch::new();
        for register in registers {
            let reading = table.get(register.name).cloned().ok_or(DeviceError::Protocol(
                TransportError::MissingProperty {
                    object_id: register.object_id,
                    property: PropertyId::PresentValue,
                },
            ))?;
            batch.insert(register.name, reading);
        }
        Ok(batch)
    }

    async fn read_identity(&mut self, _device_id: u32) -> Result<DeviceIdentity, DeviceError> {
        self.lifecycle.begin_operation()?;
        self.pause().await;
        if let Some(err) = lock(&self.state.read_failures).pop_front() {
            return Err(err);
        }
        lock(&self.state.identity)
            .clone()
            .ok_or(DeviceError::Protocol(TransportError::EmptyReply))
    }

    async fn write_one(
        &mut self,
        register: &RegisterDescriptor,
        value: DataValue,
    ) -> Result<(), DeviceError> {
        self.lifecycle.begin_operation()?;
        self.pause().await;
        if let Some(source) = lock(&self.state.write_failures).pop_front() {
            return Err(DeviceError::WriteFailed {
                register: register.name.to_owned(),
                source,
            });
        }
        lock(&self.state.writes).push(RecordedWrite {
            object_id: register.object_id,
            value: value.clone(),
            priority: register.priority,
        });
        lock(&self.state.table)
            .entry(register.name)
            .or_default()
            .insert(PropertyId::PresentValue, value);
        Ok(())
    }

    async fn close(&mut self) {
        if self.lifecycle.begin_unbind() {
            self.state.closed.fetch_add(1, Ordering::SeqCst);
            self.lifecycle.unbound();
        }
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
