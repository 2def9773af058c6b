use super::property::*;
use super::{read_only, Capability, DeviceEvent};
use crate::client::Commands;
use crate::devices::DeviceInfo;
use crate::error::Result;

/// Devices that only measure temperature, e.g. the FRITZ!DECT 440 without
/// button support or the DECT repeater.
#[derive(Debug, Clone)]
pub struct TemperatureSensor {
    state: ProxyState,
    has_battery: bool,
}

impl TemperatureSensor {
    pub fn new(info: &DeviceInfo) -> Self {
        TemperatureSensor {
            state: ProxyState::new(info),
            has_battery: info.battery.is_some(),
        }
    }

    pub fn ain(&self) -> &str {
        &self.state.ain
    }
}

impl Capability for TemperatureSensor {
    fn state(&self) -> &ProxyState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ProxyState {
        &mut self.state
    }

    fn properties(&self) -> Vec<PropertyDescription> {
        let mut properties = vec![temperature_property()];
        if self.has_battery {
            properties.extend(battery_properties());
        }
        properties
    }

    fn apply_info(&mut self, info: &DeviceInfo) -> Vec<DeviceEvent> {
        let mut events = Vec::new();
        self.state.apply_temperature(info, &mut events);
        self.state.apply_battery(info, &mut events);
        events
    }

    fn command(&self, property: &str, value: &PropertyValue) -> Result<Commands> {
        Err(read_only(property, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::decode_device_list;
    use crate::proxies::DeviceProxy;

    const REPEATER: &str = r#"<devicelist version="1"><device identifier="11959 0171328" id="16" functionbitmask="1280" fwversion="03.86" manufacturer="AVM" productname="FRITZ!DECT Repeater 100">
<present>1</present><txbusy>0</txbusy><name>Repeater</name>
<temperature><celsius>245</celsius><offset>0</offset></temperature>
</device></devicelist>"#;

    #[test]
    fn temperature_only() {
        let info = decode_device_list(REPEATER).unwrap().remove(0);
        let mut proxy = DeviceProxy::classify(&info, &Default::default()).unwrap();
        assert!(matches!(proxy, DeviceProxy::TemperatureSensor(_)));

        let events = proxy.apply_info(&info);
        assert_eq!(events.len(), 1);
        assert_eq!(proxy.value(TEMPERATURE), Some(&PropertyValue::Number(24.5)));
        assert_eq!(proxy.properties().len(), 1);
    }
}
