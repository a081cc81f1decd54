use crate::value::TypedValue;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

/// One complete set of decoded register values from a successful refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceState {
    values: BTreeMap<&'static str, TypedValue>,
    #[serde(skip)]
    taken_at: SystemTime,
}

impl DeviceState {
    pub fn new(values: BTreeMap<&'static str, TypedValue>) -> Self {
        Self {
            values,
            taken_at: SystemTime::now(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &TypedValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn taken_at(&self) -> SystemTime {
        self.taken_at
    }
}

#[derive(Debug, Default)]
struct Slot {
    snapshot: Option<Arc<DeviceState>>,
    available: bool,
}

/// The one shared, mutable piece of a device: current snapshot plus
/// availability, always replaced together under the write lock.
#[derive(Debug, Default)]
pub(crate) struct StateSlot {
    inner: RwLock<Slot>,
}

impl StateSlot {
    pub(crate) fn publish(&self, snapshot: Arc<DeviceState>) {
        let mut slot = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        slot.snapshot = Some(snapshot);
        slot.available = true;
    }

    pub(crate) fn mark_unavailable(&self) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .available = false;
    }

    pub(crate) fn snapshot(&self) -> Option<Arc<DeviceState>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot
            .clone()
    }

    pub(crate) fn is_available(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .available
    }

    /// Snapshot and availability read under one lock.
    pub(crate) fn load(&self) -> (Option<Arc<DeviceState>>, bool) {
        let slot = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        (slot.snapshot.clone(), slot.available)
    }
}

#[cfg(test)]
mod tests {
    use super::{DeviceState, StateSlot};
    use crate::value::TypedValue;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn state(v: f64) -> Arc<DeviceState> {
        Arc::new(DeviceState::new(BTreeMap::from([(
            "room_temperature",
            TypedValue::Float(v),
        )])))
    }

    #[test]
    fn starts_empty_and_unavailable() {
        let slot = StateSlot::default();
        assert!(slot.snapshot().is_none());
        assert!(!slot.is_available());
    }

    #[test]
    fn unavailable_keeps_last_snapshot() {
        let slot = StateSlot::default();
        slot.publish(state(21.0));
        assert!(slot.is_available());
        slot.mark_unavailable();
        let (snapshot, available) = slot.load();
        assert!(!available);
        assert_eq!(
            snapshot.unwrap().get("room_temperature"),
            Some(&TypedValue::Float(21.0))
        );
    }

    #[test]
    fn serializes_values_only() {
        let json = serde_json::to_value(&*state(19.5)).unwrap();
        assert_eq!(json, serde_json::json!({"values": {"room_temperature": 19.5}}));
    }
}
