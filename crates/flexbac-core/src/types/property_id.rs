/// BACnet property identifiers read or written by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyId {
    Description,
    ModelName,
    ObjectName,
    PresentValue,
    StateText,
    Units,
    SerialNumber,
    Proprietary(u32),
}

impl PropertyId {
    pub const fn to_u32(self) -> u32 {
        match self {
            Self::Description => 28,
            Self::ModelName => 70,
            Self::ObjectName => 77,
            Self::PresentValue => 85,
            Self::StateText => 110,
            Self::Units => 117,
            Self::SerialNumber => 372,
            Self::Proprietary(v) => v,
        }
    }

    pub const fn from_u32(value: u32) -> Self {
        match value {
            28 => Self::Description,
            70 => Self::ModelName,
            77 => Self::ObjectName,
            85 => Self::PresentValue,
            110 => Self::StateText,
            117 => Self::Units,
            372 => Self::SerialNumber,
            v => Self::Proprietary(v),
        }
    }
}
