use crate::types::ObjectType;
use core::fmt;
use core::str::FromStr;

const INSTANCE_MASK: u32 = 0x3F_FFFF;

/// A packed BACnet object identifier: 10 bits of object type over a 22-bit
/// instance number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(u32);

impl ObjectId {
    pub const MAX_INSTANCE: u32 = INSTANCE_MASK;

    pub const fn new(object_type: ObjectType, instance: u32) -> Self {
        Self((((object_type.to_u16() as u32) & 0x03FF) << 22) | (instance & INSTANCE_MASK))
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn object_type(self) -> ObjectType {
        ObjectType::from_u16(((self.0 >> 22) & 0x03FF) as u16)
    }

    pub const fn instance(self) -> u32 {
        self.0 & INSTANCE_MASK
    }
}

/// Formats as `type:instance`, e.g. `analog-value:1994`.
impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.object_type().name() {
            Some(name) => write!(f, "{name}:{}", self.instance()),
            None => write!(f, "{}:{}", self.object_type().to_u16(), self.instance()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseObjectIdError(String);

impl fmt::Display for ParseObjectIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid object identifier '{}'", self.0)
    }
}

impl std::error::Error for ParseObjectIdError {}

impl FromStr for ObjectId {
    type Err = ParseObjectIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseObjectIdError(s.to_owned());
        let (kind, instance) = s.split_once(':').ok_or_else(err)?;
        let object_type = match ObjectType::from_name(kind) {
            Some(t) => t,
            None => ObjectType::from_u16(kind.parse().map_err(|_| err())?),
        };
        let instance: u32 = instance.parse().map_err(|_| err())?;
        if instance > INSTANCE_MASK {
            return Err(err());
        }
        Ok(Self::new(object_type, instance))
    }
}

#[cfg(test)]
mod tests {
    use super::ObjectId;
    use crate::types::ObjectType;

    #[test]
    fn packs_type_and_instance() {
        let id = ObjectId::new(ObjectType::AnalogValue, 1994);
        assert_eq!(id.object_type(), ObjectType::AnalogValue);
        assert_eq!(id.instance(), 1994);
        assert_eq!(id.raw(), (2 << 22) | 1994);
    }

    #[test]
    fn text_form_roundtrips() {
        let id: ObjectId = "multi-state-value:42".parse().unwrap();
        assert_eq!(id, ObjectId::new(ObjectType::MultiStateValue, 42));
        assert_eq!(id.to_string(), "multi-state-value:42");

        let proprietary: ObjectId = "300:7".parse().unwrap();
        assert_eq!(proprietary.to_string(), "300:7");
    }

    #[test]
    fn rejects_malformed_text() {
        assert!("analog-value".parse::<ObjectId>().is_err());
        assert!("analog-value:x".parse::<ObjectId>().is_err());
        assert!("analog-value:4194304".parse::<ObjectId>().is_err());
    }
}
