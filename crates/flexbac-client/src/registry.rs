use crate::coordinator::Coordinator;
use crate::device::Device;
use crate::error::SetupError;
use crate::session::Transport;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Devices set up in this process, keyed by integration id.
///
/// Passed explicitly to whoever needs to look devices up.
#[derive(Debug)]
pub struct DeviceRegistry<T> {
    entries: Mutex<HashMap<String, Arc<Coordinator<T>>>>,
}

impl<T> Default for DeviceRegistry<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Transport> DeviceRegistry<T> {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `coordinator` under `id`.
    ///
    /// Fails with [`SetupError::AlreadyRegistered`] when `id` is taken; the
    /// existing entry is left alone.
    pub fn insert(
        &self,
        id: impl Into<String>,
        coordinator: Arc<Coordinator<T>>,
    ) -> Result<(), SetupError> {
        let id = id.into();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&id) {
            return Err(SetupError::AlreadyRegistered(id));
        }
        entries.insert(id, coordinator);
        Ok(())
    }

    /// Coordinator registered under `id`.
    pub fn get(&self, id: &str) -> Option<Arc<Coordinator<T>>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Shortcut for the device behind [`DeviceRegistry::get`].
    pub fn device(&self, id: &str) -> Option<Arc<Device<T>>> {
        self.get(id).map(|c| c.device().clone())
    }

    /// Unregisters `id` and hands back its coordinator so the caller can
    /// stop its loop.
    pub fn remove(&self, id: &str) -> Option<Arc<Coordinator<T>>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    /// Number of registered devices.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
