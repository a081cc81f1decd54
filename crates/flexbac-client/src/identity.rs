use crate::error::TransportError;
use crate::raw::RawReading;
use flexbac_core::types::{ObjectId, ObjectType, PropertyId};
use serde::Serialize;

/// Properties read from the device object to identify the unit.
pub const IDENTITY_PROPERTIES: &[PropertyId] = &[
    PropertyId::ObjectName,
    PropertyId::ModelName,
    PropertyId::SerialNumber,
];

/// Who the unit says it is. Read once by validation and fixed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    pub device_id: u32,
    pub object_name: String,
    pub model_name: Option<String>,
    pub serial_number: Option<String>,
}

impl DeviceIdentity {
    pub const fn device_object(device_id: u32) -> ObjectId {
        ObjectId::new(ObjectType::Device, device_id)
    }

    /// Builds an identity from a device-object reading; object-name is
    /// the only required property.
    pub fn from_reading(device_id: u32, reading: &RawReading) -> Result<Self, TransportError> {
        let text = |property| {
            reading
                .get(property)
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        let object_name = text(PropertyId::ObjectName).ok_or(TransportError::MissingProperty {
            object_id: Self::device_object(device_id),
            property: PropertyId::ObjectName,
        })?;
        Ok(Self {
            device_id,
            object_name,
            model_name: text(PropertyId::ModelName),
            serial_number: text(PropertyId::SerialNumber),
        })
    }

    /// Stable key for grouping entities of this unit.
    pub fn unique_id(&self) -> String {
        match &self.serial_number {
            Some(serial) => serial.clone(),
            None => format!("device-{}", self.device_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DeviceIdentity;
    use crate::raw::RawReading;
    use flexbac_core::types::{DataValue, PropertyId};

    fn text(s: &str) -> DataValue {
        DataValue::CharacterString(s.into())
    }

    #[test]
    fn serial_number_keys_the_unit() {
        let reading = RawReading::new()
            .with(PropertyId::ObjectName, text("Nordic S3"))
            .with(PropertyId::ModelName, text("S3 R"))
            .with(PropertyId::SerialNumber, text(" 800111-000123 "));
        let id = DeviceIdentity::from_reading(2, &reading).unwrap();
        assert_eq!(id.object_name, "Nordic S3");
        assert_eq!(id.model_name.as_deref(), Some("S3 R"));
        assert_eq!(id.unique_id(), "800111-000123");
    }

    #[test]
    fn falls_back_to_device_id() {
        let reading = RawReading::new()
            .with(PropertyId::ObjectName, text("Nordic"))
            .with(PropertyId::SerialNumber, text(""));
        let id = DeviceIdentity::from_reading(7, &reading).unwrap();
        assert_eq!(id.serial_number, None);
        assert_eq!(id.unique_id(), "device-7");
    }

    #[test]
    fn object_name_is_required() {
        let reading = RawReading::new().with(PropertyId::ModelName, text("S3"));
        assert!(DeviceIdentity::from_reading(2, &reading).is_err());
    }
}
