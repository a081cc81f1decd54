use crate::error::{CatalogError, DeviceError, TransportError};
use crate::raw::RawReading;
use crate::value::TypedValue;
use flexbac_core::services::write_property::PRIORITY_RANGE;
use flexbac_core::types::{DataValue, ObjectId, ObjectType, PropertyId};
use std::collections::{HashMap, HashSet};

const PRESENT_VALUE: &[PropertyId] = &[PropertyId::PresentValue];
const PRESENT_VALUE_AND_STATE_TEXT: &[PropertyId] =
    &[PropertyId::PresentValue, PropertyId::StateText];

/// How a register's present-value maps to a [`TypedValue`] and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    /// Floating point, rounded to `decimals`.
    Real { decimals: u8 },
    /// Fixed-point integer on the wire: engineering value = raw / `divisor`.
    Scaled { divisor: u32, decimals: u8 },
    /// Whole number (counters, durations, percentages).
    Unsigned,
    /// Binary object; active is `true`.
    Binary,
    /// Multi-state object, labelled from `state-text` when it was read.
    MultiState,
}

impl Decoder {
    /// Decodes a reading. Returns `None` only when the present-value is
    /// missing or of a kind this decoder cannot interpret; values outside
    /// any engineering range pass through untouched.
    pub fn decode(&self, raw: &RawReading) -> Option<TypedValue> {
        let present = raw.present()?;
        match *self {
            Self::Real { decimals } => Some(TypedValue::Float(round_to(
                numeric(present)?,
                decimals,
            ))),
            Self::Scaled { divisor, decimals } => Some(TypedValue::Float(round_to(
                numeric(present)? / f64::from(divisor.max(1)),
                decimals,
            ))),
            Self::Unsigned => Some(TypedValue::Int(numeric(present)?.round() as i64)),
            Self::Binary => match present {
                DataValue::Boolean(b) => Some(TypedValue::Bool(*b)),
                other => numeric(other).map(|v| TypedValue::Bool(v != 0.0)),
            },
            Self::MultiState => {
                let index = match present {
                    DataValue::Unsigned(v) | DataValue::Enumerated(v) => *v,
                    _ => return None,
                };
                Some(TypedValue::Enum {
                    index,
                    label: state_label(raw.get(PropertyId::StateText), index),
                })
            }
        }
    }

    /// Encodes a value for a present-value write, or `None` when the value
    /// does not fit this decoder.
    pub fn encode(&self, value: &TypedValue) -> Option<DataValue> {
        match (*self, value) {
            (Self::Real { .. }, v) => Some(DataValue::Real(v.as_f64()? as f32)),
            (Self::Scaled { divisor, .. }, v) => {
                let scaled = (v.as_f64()? * f64::from(divisor.max(1))).round();
                if (0.0..=f64::from(u32::MAX)).contains(&scaled) {
                    Some(DataValue::Unsigned(scaled as u32))
                } else if (f64::from(i32::MIN)..0.0).contains(&scaled) {
                    Some(DataValue::Signed(scaled as i32))
                } else {
                    None
                }
            }
            (Self::Unsigned, v) => {
                let n = v.as_f64()?;
                (n.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&n))
                    .then(|| DataValue::Unsigned(n as u32))
            }
            (Self::Binary, TypedValue::Bool(b)) => Some(DataValue::Enumerated(u32::from(*b))),
            (Self::Binary, TypedValue::Int(n @ (0 | 1))) => Some(DataValue::Enumerated(*n as u32)),
            (Self::MultiState, TypedValue::Enum { index, .. }) if *index >= 1 => {
                Some(DataValue::Unsigned(*index))
            }
            (Self::MultiState, TypedValue::Int(n)) if (1..=i64::from(u32::MAX)).contains(n) => {
                Some(DataValue::Unsigned(*n as u32))
            }
            _ => None,
        }
    }

    /// Parses user input (command line, automation payload) for this decoder.
    pub fn parse(&self, text: &str) -> Option<TypedValue> {
        let text = text.trim();
        match self {
            Self::Real { .. } | Self::Scaled { .. } => text.parse().ok().map(TypedValue::Float),
            Self::Unsigned => text.parse().ok().map(TypedValue::Int),
            Self::Binary => match text.to_ascii_lowercase().as_str() {
                "1" | "true" | "on" | "active" => Some(TypedValue::Bool(true)),
                "0" | "false" | "off" | "inactive" => Some(TypedValue::Bool(false)),
                _ => None,
            },
            Self::MultiState => text.parse().ok().filter(|i| *i >= 1).map(TypedValue::state),
        }
    }

    const fn default_selectors(self) -> &'static [PropertyId] {
        match self {
            Self::MultiState => PRESENT_VALUE_AND_STATE_TEXT,
            _ => PRESENT_VALUE,
        }
    }
}

fn numeric(value: &DataValue) -> Option<f64> {
    match value {
        DataValue::Boolean(b) => Some(f64::from(u8::from(*b))),
        other => other.as_f64(),
    }
}

fn round_to(value: f64, decimals: u8) -> f64 {
    let factor = 10f64.powi(i32::from(decimals));
    (value * factor).round() / factor
}

fn state_label(state_text: Option<&DataValue>, index: u32) -> Option<String> {
    let slot = usize::try_from(index).ok()?.checked_sub(1)?;
    match state_text? {
        DataValue::List(states) => states.get(slot)?.as_str().map(str::to_owned),
        DataValue::CharacterString(s) if slot == 0 => Some(s.clone()),
        _ => None,
    }
}

/// Static description of one monitored or controllable property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterDescriptor {
    pub name: &'static str,
    pub object_id: ObjectId,
    /// Properties fetched on each refresh; present-value always comes first.
    pub read_selectors: &'static [PropertyId],
    /// Write priority; `None` writes without one (relinquish default).
    pub priority: Option<u8>,
    /// Whether the facade may write the present-value. Sensors are read-only.
    pub writable: bool,
    pub decoder: Decoder,
}

impl RegisterDescriptor {
    pub const fn new(
        name: &'static str,
        object_type: ObjectType,
        instance: u32,
        decoder: Decoder,
    ) -> Self {
        Self {
            name,
            object_id: ObjectId::new(object_type, instance),
            read_selectors: decoder.default_selectors(),
            priority: None,
            writable: false,
            decoder,
        }
    }

    /// Marks the register writable at `priority`.
    pub const fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self.writable = true;
        self
    }

    /// Marks the register writable without a priority.
    pub const fn with_write_access(mut self) -> Self {
        self.writable = true;
        self
    }

    pub const fn with_selectors(mut self, selectors: &'static [PropertyId]) -> Self {
        self.read_selectors = selectors;
        self
    }

    pub fn decode(&self, raw: &RawReading) -> Result<TypedValue, TransportError> {
        self.decoder
            .decode(raw)
            .ok_or(TransportError::UndecodableValue {
                object_id: self.object_id,
            })
    }

    pub fn encode(&self, value: &TypedValue) -> Result<DataValue, DeviceError> {
        self.decoder
            .encode(value)
            .ok_or_else(|| DeviceError::ValueMismatch {
                register: self.name.to_owned(),
                value: value.clone(),
            })
    }
}

/// Ordered, validated set of registers.
#[derive(Debug, Clone)]
pub struct Catalog {
    registers: Vec<RegisterDescriptor>,
    by_name: HashMap<&'static str, usize>,
}

impl Catalog {
    /// Builds a catalog, rejecting duplicate object ids or names and
    /// priorities outside 1..=16. Order is kept as given.
    pub fn new(
        registers: impl IntoIterator<Item = RegisterDescriptor>,
    ) -> Result<Self, CatalogError> {
        let registers: Vec<_> = registers.into_iter().collect();
        let mut objects = HashSet::with_capacity(registers.len());
        let mut by_name = HashMap::with_capacity(registers.len());
        for (idx, register) in registers.iter().enumerate() {
            if !objects.insert(register.object_id) {
                return Err(CatalogError::DuplicateObject(register.object_id));
            }
            if by_name.insert(register.name, idx).is_some() {
                return Err(CatalogError::DuplicateName(register.name));
            }
            if let Some(priority) = register.priority {
                if !PRIORITY_RANGE.contains(&priority) {
                    return Err(CatalogError::InvalidPriority {
                        name: register.name,
                        priority,
                    });
                }
            }
        }
        Ok(Self { registers, by_name })
    }

    pub fn list(&self) -> &[RegisterDescriptor] {
        &self.registers
    }

    pub fn lookup(&self, name: &str) -> Result<&RegisterDescriptor, DeviceError> {
        self.by_name
            .get(name)
            .map(|&idx| &self.registers[idx])
            .ok_or_else(|| DeviceError::UnknownRegister(name.to_owned()))
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }
}
