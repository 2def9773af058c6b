use super::property::*;
use super::{read_only, rejected, Capability, DeviceEvent};
use crate::client::Commands;
use crate::devices::DeviceInfo;
use crate::error::Result;

pub const MIN_TARGET_CELSIUS: f64 = 8.0;
pub const MAX_TARGET_CELSIUS: f64 = 28.0;

/// Radiator controls (HKR) like the FRITZ!DECT 301.
#[derive(Debug, Clone)]
pub struct Thermostat {
    state: ProxyState,
    has_battery: bool,
}

impl Thermostat {
    pub fn new(info: &DeviceInfo) -> Self {
        Thermostat {
            state: ProxyState::new(info),
            has_battery: info.battery.is_some(),
        }
    }

    pub fn ain(&self) -> &str {
        &self.state.ain
    }
}

impl Capability for Thermostat {
    fn state(&self) -> &ProxyState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ProxyState {
        &mut self.state
    }

    fn properties(&self) -> Vec<PropertyDescription> {
        let mut properties = vec![
            temperature_property().multiple_of(0.5),
            PropertyDescription::new(TARGET_TEMPERATURE, "Target temperature", ValueType::Number)
                .semantic("TargetTemperatureProperty")
                .unit("degree celsius")
                .range(MIN_TARGET_CELSIUS, MAX_TARGET_CELSIUS)
                .multiple_of(0.5),
        ];
        if self.has_battery {
            properties.extend(battery_properties());
        }
        properties
    }

    fn apply_info(&mut self, info: &DeviceInfo) -> Vec<DeviceEvent> {
        let mut events = Vec::new();
        if let Some(hkr) = info.thermostat {
            self.state.set(
                TEMPERATURE,
                PropertyValue::Number(hkr.current_celsius),
                &mut events,
            );
            self.state.set(
                TARGET_TEMPERATURE,
                PropertyValue::Number(hkr.target_celsius),
                &mut events,
            );
        }
        self.state.apply_battery(info, &mut events);
        events
    }

    fn command(&self, property: &str, value: &PropertyValue) -> Result<Commands> {
        match (property, value) {
            (TARGET_TEMPERATURE, PropertyValue::Number(celsius))
                if (MIN_TARGET_CELSIUS..=MAX_TARGET_CELSIUS).contains(celsius) =>
            {
                Ok(Commands::SetThermostatTarget {
                    ain: self.state.ain.clone(),
                    celsius: *celsius,
                })
            }
            (TARGET_TEMPERATURE, value) => Err(rejected(
                property,
                format!("{value} is outside of {MIN_TARGET_CELSIUS}..{MAX_TARGET_CELSIUS}"),
            )),
            (_, value) => Err(read_only(property, value)),
        }
    }
}
