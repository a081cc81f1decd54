/// BACnet object types that appear on a ventilation unit's point list.
///
/// Anything else decodes to [`Proprietary`](Self::Proprietary) and keeps its
/// numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    AnalogInput,
    AnalogOutput,
    AnalogValue,
    BinaryInput,
    BinaryOutput,
    BinaryValue,
    Device,
    MultiStateInput,
    MultiStateOutput,
    MultiStateValue,
    PositiveIntegerValue,
    Proprietary(u16),
}

impl ObjectType {
    pub const fn to_u16(self) -> u16 {
        match self {
            Self::AnalogInput => 0,
            Self::AnalogOutput => 1,
            Self::AnalogValue => 2,
            Self::BinaryInput => 3,
            Self::BinaryOutput => 4,
            Self::BinaryValue => 5,
            Self::Device => 8,
            Self::MultiStateInput => 13,
            Self::MultiStateOutput => 14,
            Self::MultiStateValue => 19,
            Self::PositiveIntegerValue => 48,
            Self::Proprietary(v) => v,
        }
    }

    pub const fn from_u16(value: u16) -> Self {
        match value {
            0 => Self::AnalogInput,
            1 => Self::AnalogOutput,
            2 => Self::AnalogValue,
            3 => Self::BinaryInput,
            4 => Self::BinaryOutput,
            5 => Self::BinaryValue,
            8 => Self::Device,
            13 => Self::MultiStateInput,
            14 => Self::MultiStateOutput,
            19 => Self::MultiStateValue,
            48 => Self::PositiveIntegerValue,
            v => Self::Proprietary(v),
        }
    }

    /// The hyphenated name used in `type:instance` addresses.
    pub const fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::AnalogInput => "analog-input",
            Self::AnalogOutput => "analog-output",
            Self::AnalogValue => "analog-value",
            Self::BinaryInput => "binary-input",
            Self::BinaryOutput => "binary-output",
            Self::BinaryValue => "binary-value",
            Self::Device => "device",
            Self::MultiStateInput => "multi-state-input",
            Self::MultiStateOutput => "multi-state-output",
            Self::MultiStateValue => "multi-state-value",
            Self::PositiveIntegerValue => "positive-integer-value",
            Self::Proprietary(_) => return None,
        })
    }

    pub fn from_name(name: &str) -> Option<Self> {
        const NAMED: [ObjectType; 11] = [
            ObjectType::AnalogInput,
            ObjectType::AnalogOutput,
            ObjectType::AnalogValue,
            ObjectType::BinaryInput,
            ObjectType::BinaryOutput,
            ObjectType::BinaryValue,
            ObjectType::Device,
            ObjectType::MultiStateInput,
            ObjectType::MultiStateOutput,
            ObjectType::MultiStateValue,
            ObjectType::PositiveIntegerValue,
        ];
        NAMED.into_iter().find(|t| t.name() == Some(name))
    }
}
