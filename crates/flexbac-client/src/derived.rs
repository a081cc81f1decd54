//! Pure views computed from a snapshot. No I/O.

use crate::device::Device;
use crate::error::DeviceError;
use crate::nordic::{
    VentilationMode, AIR_FILTER_EXCHANGE_INTERVAL, AIR_FILTER_OPERATING_TIME,
    AIR_TEMP_SETPOINT_AWAY, AIR_TEMP_SETPOINT_HOME, ELECTRIC_HEATER, VENTILATION_MODE,
};
use crate::session::Transport;
use crate::state::DeviceState;
use serde::Serialize;

/// Air filter wear, in hours and whole days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FilterStatus {
    pub hours_since_change: f64,
    pub change_interval_hours: f64,
    pub hours_until_dirty: f64,
    pub days_since_change: i64,
    pub change_interval_days: i64,
    pub days_until_dirty: i64,
}

impl FilterStatus {
    pub fn from_state(state: &DeviceState) -> Option<Self> {
        let operating = state.get(AIR_FILTER_OPERATING_TIME)?.as_f64()?;
        let interval = state.get(AIR_FILTER_EXCHANGE_INTERVAL)?.as_f64()?;
        let days_since_change = whole_days(operating);
        let change_interval_days = whole_days(interval);
        Some(Self {
            hours_since_change: operating,
            change_interval_hours: interval,
            hours_until_dirty: interval - operating,
            days_since_change,
            change_interval_days,
            days_until_dirty: change_interval_days - days_since_change,
        })
    }
}

fn whole_days(hours: f64) -> i64 {
    (hours / 24.0).floor() as i64
}

/// The setpoint in effect: away while the unit is in Away, home otherwise.
pub fn target_temperature(state: &DeviceState) -> Option<f64> {
    let register = match ventilation_mode(state) {
        Some(VentilationMode::Away) => AIR_TEMP_SETPOINT_AWAY,
        _ => AIR_TEMP_SETPOINT_HOME,
    };
    state.get(register)?.as_f64()
}

pub fn ventilation_mode(state: &DeviceState) -> Option<VentilationMode> {
    VentilationMode::from_value(state.get(VENTILATION_MODE)?)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    None,
    Away,
    Home,
    Boost,
}

impl Preset {
    pub fn from_state(state: &DeviceState) -> Option<Self> {
        ventilation_mode(state).map(Self::from)
    }

    /// Mode to write for this preset. `None` stops the unit.
    pub const fn ventilation_mode(self) -> VentilationMode {
        match self {
            Self::None => VentilationMode::Stop,
            Self::Away => VentilationMode::Away,
            Self::Home => VentilationMode::Home,
            Self::Boost => VentilationMode::High,
        }
    }
}

impl From<VentilationMode> for Preset {
    fn from(mode: VentilationMode) -> Self {
        match mode {
            VentilationMode::Stop => Self::None,
            VentilationMode::Away => Self::Away,
            VentilationMode::Home => Self::Home,
            VentilationMode::High => Self::Boost,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacMode {
    Off,
    Heat,
    FanOnly,
}

impl HvacMode {
    pub fn from_state(state: &DeviceState) -> Option<Self> {
        if ventilation_mode(state)? == VentilationMode::Stop {
            return Some(Self::Off);
        }
        let heater = state.get(ELECTRIC_HEATER)?.as_bool()?;
        Some(if heater { Self::Heat } else { Self::FanOnly })
    }
}

impl<T: Transport> Device<T> {
    fn derive<R>(&self, view: impl FnOnce(&DeviceState) -> Option<R>) -> Result<R, DeviceError> {
        self.snapshot()
            .as_deref()
            .and_then(view)
            .ok_or(DeviceError::StaleOrMissing)
    }

    pub fn filter_status(&self) -> Result<FilterStatus, DeviceError> {
        self.derive(FilterStatus::from_state)
    }

    pub fn target_temperature(&self) -> Result<f64, DeviceError> {
        self.derive(target_temperature)
    }

    pub fn ventilation_mode(&self) -> Result<VentilationMode, DeviceError> {
        self.derive(ventilation_mode)
    }

    pub fn preset(&self) -> Result<Preset, DeviceError> {
        self.derive(Preset::from_state)
    }

    pub fn hvac_mode(&self) -> Result<HvacMode, DeviceError> {
        self.derive(HvacMode::from_state)
    }
}
