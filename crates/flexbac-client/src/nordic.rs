//! Register table of the Flexit Nordic (S2/S3/S4/CL3/CL4) BACnet interface.

use crate::catalog::{Catalog, Decoder, RegisterDescriptor};
use crate::error::CatalogError;
use crate::value::TypedValue;
use flexbac_core::types::ObjectType::{
    AnalogInput as AI, AnalogOutput as AO, AnalogValue as AV, BinaryValue as BV,
    MultiStateValue as MSV, PositiveIntegerValue as PIV,
};

/// Priority the unit's own panel writes at; user commands use the same.
const PRIORITY: u8 = 13;

const TEMPERATURE: Decoder = Decoder::Real { decimals: 1 };
const PERCENT: Decoder = Decoder::Real { decimals: 0 };
/// Analog values holding whole hours or minutes. They stay REAL on the wire.
const WHOLE: Decoder = Decoder::Real { decimals: 0 };

pub const OUTSIDE_AIR_TEMPERATURE: &str = "outside_air_temperature";
pub const SUPPLY_AIR_TEMPERATURE: &str = "supply_air_temperature";
pub const EXHAUST_AIR_TEMPERATURE: &str = "exhaust_air_temperature";
pub const EXTRACT_AIR_TEMPERATURE: &str = "extract_air_temperature";
pub const ROOM_TEMPERATURE: &str = "room_temperature";
pub const VENTILATION_MODE: &str = "ventilation_mode";
pub const OPERATION_MODE: &str = "operation_mode";
pub const AIR_TEMP_SETPOINT_AWAY: &str = "air_temp_setpoint_away";
pub const AIR_TEMP_SETPOINT_HOME: &str = "air_temp_setpoint_home";
pub const FIREPLACE_VENTILATION_DURATION: &str = "fireplace_ventilation_duration";
pub const RAPID_VENTILATION_DURATION: &str = "rapid_ventilation_duration";
pub const FIREPLACE_VENTILATION_REMAINING_DURATION: &str =
    "fireplace_ventilation_remaining_duration";
pub const RAPID_VENTILATION_REMAINING_DURATION: &str = "rapid_ventilation_remaining_duration";
pub const FIREPLACE_VENTILATION_TRIGGER: &str = "fireplace_ventilation_trigger";
pub const RAPID_VENTILATION_TRIGGER: &str = "rapid_ventilation_trigger";
pub const ELECTRIC_HEATER: &str = "electric_heater";
pub const COMFORT_BUTTON: &str = "comfort_button";
pub const COOKER_HOOD: &str = "cooker_hood";
pub const SCHEDULER_OVERRIDE: &str = "scheduler_override";
pub const AIR_FILTER_OPERATING_TIME: &str = "air_filter_operating_time";
pub const AIR_FILTER_EXCHANGE_INTERVAL: &str = "air_filter_exchange_interval";
pub const AIR_FILTER_POLLUTED: &str = "air_filter_polluted";

/// Fan setpoint register names, `(supply, extract)` per mode.
pub const FAN_SETPOINTS_AWAY: (&str, &str) =
    ("fan_setpoint_supply_air_away", "fan_setpoint_extract_air_away");
pub const FAN_SETPOINTS_HOME: (&str, &str) =
    ("fan_setpoint_supply_air_home", "fan_setpoint_extract_air_home");
pub const FAN_SETPOINTS_HIGH: (&str, &str) =
    ("fan_setpoint_supply_air_high", "fan_setpoint_extract_air_high");
pub const FAN_SETPOINTS_FIRE: (&str, &str) =
    ("fan_setpoint_supply_air_fire", "fan_setpoint_extract_air_fire");
pub const FAN_SETPOINTS_COOKER: (&str, &str) =
    ("fan_setpoint_supply_air_cooker", "fan_setpoint_extract_air_cooker");

/// State written to a trigger register to start a timed ventilation run.
pub const TRIGGER_ACTIVATE: u32 = 2;

pub const REGISTERS: &[RegisterDescriptor] = &[
    // Temperatures
    RegisterDescriptor::new(OUTSIDE_AIR_TEMPERATURE, AI, 1, TEMPERATURE),
    RegisterDescriptor::new(SUPPLY_AIR_TEMPERATURE, AI, 4, TEMPERATURE),
    RegisterDescriptor::new(EXHAUST_AIR_TEMPERATURE, AI, 11, TEMPERATURE),
    RegisterDescriptor::new(EXTRACT_AIR_TEMPERATURE, AI, 59, TEMPERATURE),
    RegisterDescriptor::new(ROOM_TEMPERATURE, AI, 75, TEMPERATURE),
    // Modes
    RegisterDescriptor::new(VENTILATION_MODE, MSV, 42, Decoder::MultiState)
        .with_priority(PRIORITY),
    RegisterDescriptor::new(OPERATION_MODE, MSV, 361, Decoder::MultiState),
    // Temperature setpoints
    RegisterDescriptor::new(AIR_TEMP_SETPOINT_AWAY, AV, 1985, TEMPERATURE)
        .with_priority(PRIORITY),
    RegisterDescriptor::new(AIR_TEMP_SETPOINT_HOME, AV, 1994, TEMPERATURE)
        .with_priority(PRIORITY),
    // Timed ventilation
    RegisterDescriptor::new(FIREPLACE_VENTILATION_DURATION, PIV, 270, Decoder::Unsigned)
        .with_write_access(),
    RegisterDescriptor::new(RAPID_VENTILATION_DURATION, PIV, 293, Decoder::Unsigned)
        .with_write_access(),
    RegisterDescriptor::new(FIREPLACE_VENTILATION_REMAINING_DURATION, AV, 2038, WHOLE),
    RegisterDescriptor::new(RAPID_VENTILATION_REMAINING_DURATION, AV, 2031, WHOLE),
    RegisterDescriptor::new(RAPID_VENTILATION_TRIGGER, MSV, 357, Decoder::MultiState)
        .with_priority(PRIORITY),
    RegisterDescriptor::new(FIREPLACE_VENTILATION_TRIGGER, MSV, 360, Decoder::MultiState)
        .with_priority(PRIORITY),
    // Fans
    RegisterDescriptor::new("supply_air_fan_control_signal", AO, 3, PERCENT),
    RegisterDescriptor::new("supply_air_fan_rpm", AI, 5, Decoder::Unsigned),
    RegisterDescriptor::new("exhaust_air_fan_control_signal", AO, 4, PERCENT),
    RegisterDescriptor::new("exhaust_air_fan_rpm", AI, 12, Decoder::Unsigned),
    // Electric heater
    RegisterDescriptor::new(ELECTRIC_HEATER, BV, 445, Decoder::Binary).with_priority(PRIORITY),
    RegisterDescriptor::new("electric_heater_nominal_power", AV, 190, Decoder::Real { decimals: 1 }),
    RegisterDescriptor::new("electric_heater_power", AI, 194, Decoder::Real { decimals: 2 }),
    // Fan setpoints, written without priority
    RegisterDescriptor::new(FAN_SETPOINTS_AWAY.0, AV, 1836, PERCENT).with_write_access(),
    RegisterDescriptor::new(FAN_SETPOINTS_AWAY.1, AV, 1837, PERCENT).with_write_access(),
    RegisterDescriptor::new(FAN_SETPOINTS_HOME.0, AV, 1838, PERCENT).with_write_access(),
    RegisterDescriptor::new(FAN_SETPOINTS_HOME.1, AV, 1839, PERCENT).with_write_access(),
    RegisterDescriptor::new(FAN_SETPOINTS_HIGH.0, AV, 1840, PERCENT).with_write_access(),
    RegisterDescriptor::new(FAN_SETPOINTS_HIGH.1, AV, 1841, PERCENT).with_write_access(),
    RegisterDescriptor::new(FAN_SETPOINTS_FIRE.0, AV, 1842, PERCENT).with_write_access(),
    RegisterDescriptor::new(FAN_SETPOINTS_FIRE.1, AV, 1843, PERCENT).with_write_access(),
    RegisterDescriptor::new(FAN_SETPOINTS_COOKER.0, AV, 1844, PERCENT).with_write_access(),
    RegisterDescriptor::new(FAN_SETPOINTS_COOKER.1, AV, 1845, PERCENT).with_write_access(),
    // Filter
    RegisterDescriptor::new(AIR_FILTER_OPERATING_TIME, AV, 285, WHOLE),
    RegisterDescriptor::new(AIR_FILTER_EXCHANGE_INTERVAL, AV, 286, WHOLE)
        .with_priority(PRIORITY),
    RegisterDescriptor::new(AIR_FILTER_POLLUTED, BV, 522, Decoder::Binary),
    // Heat exchanger
    RegisterDescriptor::new("heat_exchanger_efficiency", AI, 2, PERCENT),
    RegisterDescriptor::new("heat_exchanger_speed", AO, 0, PERCENT),
    // Buttons and switches
    RegisterDescriptor::new(COMFORT_BUTTON, BV, 50, Decoder::Binary).with_priority(PRIORITY),
    RegisterDescriptor::new(COOKER_HOOD, BV, 402, Decoder::Binary).with_priority(PRIORITY),
    RegisterDescriptor::new(SCHEDULER_OVERRIDE, BV, 466, Decoder::Binary).with_priority(PRIORITY),
];

/// The full Nordic catalog.
pub fn catalog() -> Result<Catalog, CatalogError> {
    Catalog::new(REGISTERS.iter().copied())
}

/// States of the `ventilation_mode` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VentilationMode {
    Stop,
    Away,
    Home,
    High,
}

impl VentilationMode {
    pub const fn index(self) -> u32 {
        match self {
            Self::Stop => 1,
            Self::Away => 2,
            Self::Home => 3,
            Self::High => 4,
        }
    }

    pub const fn from_index(index: u32) -> Option<Self> {
        match index {
            1 => Some(Self::Stop),
            2 => Some(Self::Away),
            3 => Some(Self::Home),
            4 => Some(Self::High),
            _ => None,
        }
    }

    pub fn from_value(value: &TypedValue) -> Option<Self> {
        value.as_index().and_then(Self::from_index)
    }

    pub fn as_value(self) -> TypedValue {
        TypedValue::state(self.index())
    }
}
