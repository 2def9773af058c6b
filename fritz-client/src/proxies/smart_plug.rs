use super::property::*;
use super::{read_only, rejected, Capability, DeviceEvent};
use crate::client::Commands;
use crate::devices::DeviceInfo;
use crate::error::Result;
use crate::features::FeatureFlag;

/// Switchable outlets like the FRITZ!DECT 200/210, usually with a power
/// meter.
#[derive(Debug, Clone)]
pub struct SmartPlug {
    state: ProxyState,
    has_temperature: bool,
    has_powermeter: bool,
}

impl SmartPlug {
    pub fn new(info: &DeviceInfo) -> Self {
        SmartPlug {
            state: ProxyState::new(info),
            has_temperature: info.has_feature(FeatureFlag::TemperatureSensor)
                || info.temperature.is_some(),
            has_powermeter: info.has_feature(FeatureFlag::EnergyMeter)
                || info.powermeter.is_some(),
        }
    }

    pub fn ain(&self) -> &str {
        &self.state.ain
    }
}

impl Capability for SmartPlug {
    fn state(&self) -> &ProxyState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ProxyState {
        &mut self.state
    }

    fn properties(&self) -> Vec<PropertyDescription> {
        let mut properties =
            vec![PropertyDescription::new(ON, "On/Off", ValueType::Boolean).semantic("OnOffProperty")];
        if self.has_temperature {
            properties.push(temperature_property());
        }
        if self.has_powermeter {
            properties.push(
                PropertyDescription::new(POWER, "Power", ValueType::Number)
                    .semantic("InstantaneousPowerProperty")
                    .unit("watt")
                    .read_only(),
            );
            properties.push(
                PropertyDescription::new(ENERGY, "Energy", ValueType::Number)
                    .unit("watt hours")
                    .read_only(),
            );
            properties.push(
                PropertyDescription::new(VOLTAGE, "Voltage", ValueType::Number)
                    .semantic("VoltageProperty")
                    .unit("volt")
                    .read_only(),
            );
        }
        properties
    }

    fn apply_info(&mut self, info: &DeviceInfo) -> Vec<DeviceEvent> {
        let mut events = Vec::new();
        if let Some(switch) = info.switch {
            self.state
                .set(ON, PropertyValue::Bool(switch.state), &mut events);
        }
        self.state.apply_temperature(info, &mut events);
        if let Some(meter) = info.powermeter {
            self.state
                .set(POWER, PropertyValue::Number(meter.watt), &mut events);
            self.state.set(
                ENERGY,
                PropertyValue::Number(meter.energy_in_watt_h as f64),
                &mut events,
            );
            self.state
                .set(VOLTAGE, PropertyValue::Number(meter.volt), &mut events);
        }
        events
    }

    fn command(&self, property: &str, value: &PropertyValue) -> Result<Commands> {
        let ain = self.state.ain.clone();
        match (property, value) {
            (ON, PropertyValue::Bool(true)) => Ok(Commands::SetSwitchOn { ain }),
            (ON, PropertyValue::Bool(false)) => Ok(Commands::SetSwitchOff { ain }),
            (ON, value) => Err(rejected(property, format!("invalid value {value}"))),
            (_, value) => Err(read_only(property, value)),
        }
    }
}
