//! Single-use protocol sessions and their lifecycle.

use crate::catalog::RegisterDescriptor;
use crate::error::DeviceError;
use crate::identity::DeviceIdentity;
use crate::raw::RawBatch;
use flexbac_core::types::DataValue;
use std::net::SocketAddr;

/// Opens sessions to a peer. One session per operation; never pooled.
pub trait Transport {
    type Session: Session;

    /// Resolves the local interface for `peer` and binds a fresh endpoint.
    ///
    /// Fails with `NoRoute` when no interface reaches the peer and
    /// `BindFailed` when the endpoint cannot be bound.
    async fn open(&self, peer: SocketAddr) -> Result<Self::Session, DeviceError>;
}

/// A bound session. At most one of the operations may be called, then
/// [`Session::close`].
pub trait Session {
    /// One combined read of every register's read-selectors.
    async fn read_batch(&mut self, registers: &[RegisterDescriptor])
        -> Result<RawBatch, DeviceError>;

    /// Reads name, model and serial number of `device:<device_id>`.
    async fn read_identity(&mut self, device_id: u32) -> Result<DeviceIdentity, DeviceError>;

    /// One present-value write, tagged with the register's priority if it
    /// declares one. Failures are `WriteFailed`.
    async fn write_one(
        &mut self,
        register: &RegisterDescriptor,
        value: DataValue,
    ) -> Result<(), DeviceError>;

    /// Releases the binding. Idempotent; never fails.
    async fn close(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unbound,
    Binding,
    Bound,
    Unbinding,
}

/// State machine shared by session implementations:
/// `Unbound -> Binding -> Bound -> Unbinding -> Unbound`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLifecycle {
    state: SessionState,
    used: bool,
}

impl Default for SessionLifecycle {
    fn default() -> Self {
        Self {
            state: SessionState::Unbound,
            used: false,
        }
    }
}

impl SessionLifecycle {
    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn begin_bind(&mut self) {
        debug_assert_eq!(self.state, SessionState::Unbound);
        self.state = SessionState::Binding;
    }

    /// Binding failed; back to `Unbound` with nothing to release.
    pub fn bind_failed(&mut self) {
        self.state = SessionState::Unbound;
    }

    pub fn bound(&mut self) {
        self.state = SessionState::Bound;
        self.used = false;
    }

    /// Claims the single operation of a bound session.
    pub fn begin_operation(&mut self) -> Result<(), DeviceError> {
        if self.state != SessionState::Bound || self.used {
            return Err(DeviceError::SessionClosed);
        }
        self.used = true;
        Ok(())
    }

    /// Starts teardown. Returns `false` when there is nothing to release,
    /// which makes repeated closes no-ops.
    pub fn begin_unbind(&mut self) -> bool {
        match self.state {
            SessionState::Bound | SessionState::Binding => {
                self.state = SessionState::Unbinding;
                true
            }
            SessionState::Unbinding | SessionState::Unbound => false,
        }
    }

    pub fn unbound(&mut self) {
        self.state = SessionState::Unbound;
    }
}
