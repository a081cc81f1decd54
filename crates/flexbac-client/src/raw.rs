use crate::catalog::RegisterDescriptor;
use crate::error::TransportError;
use flexbac_core::services::read_property_multiple::{
    ReadAccessResult, ReadPropertyMultipleAck, ReadResultError,
};
use flexbac_core::types::{DataValue, PropertyId};
use std::collections::HashMap;

/// Undecoded property values of one register, as read from the wire.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawReading {
    properties: Vec<(PropertyId, DataValue)>,
}

impl RawReading {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reading that carries only a present-value.
    pub fn present_value(value: DataValue) -> Self {
        Self::new().with(PropertyId::PresentValue, value)
    }

    pub fn with(mut self, property: PropertyId, value: DataValue) -> Self {
        self.insert(property, value);
        self
    }

    /// Inserts or replaces the value of `property`.
    pub fn insert(&mut self, property: PropertyId, value: DataValue) {
        match self.properties.iter_mut().find(|(p, _)| *p == property) {
            Some(slot) => slot.1 = value,
            None => self.properties.push((property, value)),
        }
    }

    pub fn get(&self, property: PropertyId) -> Option<&DataValue> {
        self.properties
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v)
    }

    pub fn present(&self) -> Option<&DataValue> {
        self.get(PropertyId::PresentValue)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(PropertyId, DataValue)> {
        self.properties.iter()
    }
}

/// Raw readings of one batched read, keyed by register name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawBatch {
    readings: HashMap<&'static str, RawReading>,
}

impl RawBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &'static str, reading: RawReading) {
        self.readings.insert(name, reading);
    }

    pub fn with(mut self, name: &'static str, reading: RawReading) -> Self {
        self.insert(name, reading);
        self
    }

    pub fn get(&self, name: &str) -> Option<&RawReading> {
        self.readings.get(name)
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Maps a ReadPropertyMultiple reply onto `registers`.
    ///
    /// Every register must come back with a present-value. Errors on the
    /// other selectors (units, state-text) are tolerated and the property
    /// is left out. A reply without any property result is an
    /// [`TransportError::EmptyReply`].
    pub fn from_ack(
        registers: &[RegisterDescriptor],
        ack: ReadPropertyMultipleAck,
    ) -> Result<Self, TransportError> {
        if ack.results.iter().all(|r| r.results.is_empty()) {
            return Err(TransportError::EmptyReply);
        }

        let by_object: HashMap<_, _> = ack
            .results
            .into_iter()
            .map(|ReadAccessResult { object_id, results }| (object_id, results))
            .collect();

        let mut batch = Self::new();
        for register in registers {
            let missing = |property| TransportError::MissingProperty {
                object_id: register.object_id,
                property,
            };
            let elements = by_object
                .get(&register.object_id)
                .ok_or_else(|| missing(PropertyId::PresentValue))?;

            let mut reading = RawReading::new();
            for &selector in register.read_selectors {
                let element = elements.iter().find(|e| e.property_id == selector);
                match (selector, element) {
                    (_, Some(e)) => match &e.value {
                        Ok(value) => reading.insert(selector, value.clone()),
                        Err(err) if selector == PropertyId::PresentValue => {
                            return Err(present_value_failure(register, *err));
                        }
                        Err(err) => {
                            log::debug!("{} {selector:?} unavailable: {err:?}", register.object_id)
                        }
                    },
                    (PropertyId::PresentValue, None) => return Err(missing(selector)),
                    (_, None) => {}
                }
            }
            batch.insert(register.name, reading);
        }
        Ok(batch)
    }
}

fn present_value_failure(register: &RegisterDescriptor, err: ReadResultError) -> TransportError {
    match err {
        ReadResultError::Access(access) => TransportError::PropertyAccess {
            object_id: register.object_id,
            property: PropertyId::PresentValue,
            error_class: access.error_class,
            error_code: access.error_code,
        },
        ReadResultError::Undecodable(_) => TransportError::UndecodableValue {
            object_id: register.object_id,
        },
    }
}
