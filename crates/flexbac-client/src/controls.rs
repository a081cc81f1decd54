//! Named control actions for the Nordic unit.
//!
//! Each helper resolves to one or more [`Device::set_register`] calls. None
//! of them refresh on their own; the `*_and_refresh` variants do so once the
//! writes succeeded.

use crate::derived::{ventilation_mode, HvacMode, Preset};
use crate::device::Device;
use crate::error::DeviceError;
use crate::nordic::{
    VentilationMode, AIR_TEMP_SETPOINT_AWAY, AIR_TEMP_SETPOINT_HOME, COMFORT_BUTTON, COOKER_HOOD,
    ELECTRIC_HEATER, FAN_SETPOINTS_AWAY, FAN_SETPOINTS_COOKER, FAN_SETPOINTS_FIRE,
    FAN_SETPOINTS_HIGH, FAN_SETPOINTS_HOME, FIREPLACE_VENTILATION_DURATION,
    FIREPLACE_VENTILATION_TRIGGER, RAPID_VENTILATION_DURATION, RAPID_VENTILATION_TRIGGER,
    SCHEDULER_OVERRIDE, TRIGGER_ACTIVATE, VENTILATION_MODE,
};
use crate::session::Transport;
use crate::state::DeviceState;
use crate::value::TypedValue;
use std::sync::Arc;

/// Operating profile a pair of fan setpoints belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanProfile {
    Away,
    Home,
    High,
    Fireplace,
    CookerHood,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Airflow {
    Supply,
    Extract,
}

impl FanProfile {
    pub const fn register(self, airflow: Airflow) -> &'static str {
        let (supply, extract) = match self {
            Self::Away => FAN_SETPOINTS_AWAY,
            Self::Home => FAN_SETPOINTS_HOME,
            Self::High => FAN_SETPOINTS_HIGH,
            Self::Fireplace => FAN_SETPOINTS_FIRE,
            Self::CookerHood => FAN_SETPOINTS_COOKER,
        };
        match airflow {
            Airflow::Supply => supply,
            Airflow::Extract => extract,
        }
    }
}

impl<T: Transport> Device<T> {
    /// Writes the setpoint that is in effect: away while the unit runs in
    /// Away, home otherwise. Needs a snapshot to know the mode.
    pub async fn set_target_temperature(&self, celsius: f64) -> Result<(), DeviceError> {
        let snapshot = self.snapshot().ok_or(DeviceError::StaleOrMissing)?;
        let register = match ventilation_mode(&snapshot) {
            Some(VentilationMode::Away) => AIR_TEMP_SETPOINT_AWAY,
            _ => AIR_TEMP_SETPOINT_HOME,
        };
        self.set_register(register, TypedValue::Float(celsius)).await
    }

    pub async fn set_ventilation_mode(&self, mode: VentilationMode) -> Result<(), DeviceError> {
        self.set_register(VENTILATION_MODE, mode.as_value()).await
    }

    pub async fn set_preset(&self, preset: Preset) -> Result<(), DeviceError> {
        self.set_ventilation_mode(preset.ventilation_mode()).await
    }

    /// Off stops the unit; any other mode runs it at Home. The heater
    /// follows: on for Heat, off otherwise.
    pub async fn set_hvac_mode(&self, mode: HvacMode) -> Result<(), DeviceError> {
        let ventilation = match mode {
            HvacMode::Off => VentilationMode::Stop,
            HvacMode::Heat | HvacMode::FanOnly => VentilationMode::Home,
        };
        self.set_ventilation_mode(ventilation).await?;
        self.set_switch(ELECTRIC_HEATER, mode == HvacMode::Heat).await
    }

    pub async fn enable_electric_heater(&self) -> Result<(), DeviceError> {
        self.set_switch(ELECTRIC_HEATER, true).await
    }

    pub async fn disable_electric_heater(&self) -> Result<(), DeviceError> {
        self.set_switch(ELECTRIC_HEATER, false).await
    }

    pub async fn activate_comfort_button(&self) -> Result<(), DeviceError> {
        self.set_switch(COMFORT_BUTTON, true).await
    }

    pub async fn deactivate_comfort_button(&self) -> Result<(), DeviceError> {
        self.set_switch(COMFORT_BUTTON, false).await
    }

    pub async fn activate_cooker_hood(&self) -> Result<(), DeviceError> {
        self.set_switch(COOKER_HOOD, true).await
    }

    pub async fn deactivate_cooker_hood(&self) -> Result<(), DeviceError> {
        self.set_switch(COOKER_HOOD, false).await
    }

    pub async fn activate_scheduler_override(&self) -> Result<(), DeviceError> {
        self.set_switch(SCHEDULER_OVERRIDE, true).await
    }

    pub async fn deactivate_scheduler_override(&self) -> Result<(), DeviceError> {
        self.set_switch(SCHEDULER_OVERRIDE, false).await
    }

    /// Starts a rapid ventilation run for the configured duration.
    pub async fn trigger_rapid_ventilation(&self) -> Result<(), DeviceError> {
        self.set_register(RAPID_VENTILATION_TRIGGER, TypedValue::state(TRIGGER_ACTIVATE))
            .await
    }

    pub async fn trigger_fireplace_ventilation(&self) -> Result<(), DeviceError> {
        self.set_register(
            FIREPLACE_VENTILATION_TRIGGER,
            TypedValue::state(TRIGGER_ACTIVATE),
        )
        .await
    }

    pub async fn set_fan_setpoint(
        &self,
        profile: FanProfile,
        airflow: Airflow,
        percent: f64,
    ) -> Result<(), DeviceError> {
        self.set_register(profile.register(airflow), TypedValue::Float(percent))
            .await
    }

    pub async fn set_rapid_ventilation_duration(&self, minutes: u32) -> Result<(), DeviceError> {
        self.set_register(RAPID_VENTILATION_DURATION, TypedValue::Int(i64::from(minutes)))
            .await
    }

    pub async fn set_fireplace_ventilation_duration(
        &self,
        minutes: u32,
    ) -> Result<(), DeviceError> {
        self.set_register(
            FIREPLACE_VENTILATION_DURATION,
            TypedValue::Int(i64::from(minutes)),
        )
        .await
    }

    pub async fn set_register_and_refresh(
        &self,
        name: &str,
        value: TypedValue,
    ) -> Result<Arc<DeviceState>, DeviceError> {
        self.set_register(name, value).await?;
        self.refresh().await
    }

    pub async fn set_target_temperature_and_refresh(
        &self,
        celsius: f64,
    ) -> Result<Arc<DeviceState>, DeviceError> {
        self.set_target_temperature(celsius).await?;
        self.refresh().await
    }

    pub async fn set_preset_and_refresh(
        &self,
        preset: Preset,
    ) -> Result<Arc<DeviceState>, DeviceError> {
        self.set_preset(preset).await?;
        self.refresh().await
    }

    pub async fn set_hvac_mode_and_refresh(
        &self,
        mode: HvacMode,
    ) -> Result<Arc<DeviceState>, DeviceError> {
        self.set_hvac_mode(mode).await?;
        self.refresh().await
    }

    async fn set_switch(&self, name: &str, on: bool) -> Result<(), DeviceError> {
        self.set_register(name, TypedValue::Bool(on)).await
    }
}
