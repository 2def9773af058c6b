//! Typed views over a single device's state. Each proxy picks the fields it
//! cares about from every poll, emits change events for them and turns
//! property writes into home automation commands.

use serde::Serialize;

use crate::client::{Commands, FritzClient};
use crate::devices::{ColorDefaults, DeviceInfo};
use crate::error::{FritzError, Result};
use crate::features::FeatureFlag;

mod bulb;
mod button;
pub mod property;
mod sensor;
mod smart_plug;
mod thermostat;

pub use bulb::Bulb;
pub use button::Button;
pub use property::{EventDescription, PropertyDescription, PropertyValue, ProxyState, ValueType};
pub use sensor::TemperatureSensor;
pub use smart_plug::SmartPlug;
pub use thermostat::Thermostat;

/// What a proxy tells the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum DeviceEvent {
    DeviceAdded {
        ain: String,
        name: String,
        productname: String,
        kind: DeviceKind,
        properties: Vec<PropertyDescription>,
        events: Vec<EventDescription>,
    },
    PropertyChanged {
        ain: String,
        property: String,
        value: PropertyValue,
    },
    /// The property has no value anymore, e.g. `color` after a bulb switched
    /// to color temperature mode.
    PropertyCleared {
        ain: String,
        property: String,
    },
    ButtonPressed {
        ain: String,
        button_id: String,
    },
    /// The device reports sub-buttons that were not part of its
    /// [`DeviceEvent::DeviceAdded`] event. Carries the full list.
    EventsChanged {
        ain: String,
        events: Vec<EventDescription>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DeviceKind {
    Bulb,
    Thermostat,
    SmartPlug,
    Button,
    TemperatureSensor,
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DeviceKind::Bulb => "bulb",
            DeviceKind::Thermostat => "thermostat",
            DeviceKind::SmartPlug => "smart plug",
            DeviceKind::Button => "button",
            DeviceKind::TemperatureSensor => "temperature sensor",
        };
        write!(f, "{name}")
    }
}

/// Behavior shared by all proxies.
pub trait Capability {
    fn state(&self) -> &ProxyState;

    fn state_mut(&mut self) -> &mut ProxyState;

    fn properties(&self) -> Vec<PropertyDescription>;

    fn events(&self) -> Vec<EventDescription> {
        Vec::new()
    }

    /// Takes over the device state of one poll, returns the resulting change
    /// events.
    fn apply_info(&mut self, info: &DeviceInfo) -> Vec<DeviceEvent>;

    /// Translates a property write into the command that performs it.
    fn command(&self, property: &str, value: &PropertyValue) -> Result<Commands>;

    /// Properties that lose their value once `property` was set.
    fn excludes(&self, _property: &str) -> &'static [&'static str] {
        &[]
    }
}

pub(crate) fn rejected(property: &str, reason: impl ToString) -> FritzError {
    FritzError::Command {
        command: property.to_string(),
        reason: reason.to_string(),
    }
}

pub(crate) fn read_only(property: &str, value: &PropertyValue) -> FritzError {
    rejected(property, format!("cannot set read-only property to {value}"))
}

/// One variant per supported device category.
#[derive(Debug, Clone)]
pub enum DeviceProxy {
    Bulb(Bulb),
    Thermostat(Thermostat),
    SmartPlug(SmartPlug),
    Button(Button),
    TemperatureSensor(TemperatureSensor),
}

impl DeviceProxy {
    /// Picks the proxy for a device by its features. `None` for devices we
    /// do not support.
    pub fn classify(info: &DeviceInfo, colors: &ColorDefaults) -> Option<Self> {
        let proxy = if info.has_feature(FeatureFlag::Light) {
            DeviceProxy::Bulb(Bulb::new(info, colors.clone()))
        } else if info.has_feature(FeatureFlag::Thermostat) {
            DeviceProxy::Thermostat(Thermostat::new(info))
        } else if info.has_feature(FeatureFlag::SmartPlug) {
            DeviceProxy::SmartPlug(SmartPlug::new(info))
        } else if info.has_feature(FeatureFlag::Button) {
            DeviceProxy::Button(Button::new(info))
        } else if info.has_feature(FeatureFlag::TemperatureSensor) {
            DeviceProxy::TemperatureSensor(TemperatureSensor::new(info))
        } else {
            return None;
        };
        Some(proxy)
    }

    pub fn kind(&self) -> DeviceKind {
        match self {
            DeviceProxy::Bulb(_) => DeviceKind::Bulb,
            DeviceProxy::Thermostat(_) => DeviceKind::Thermostat,
            DeviceProxy::SmartPlug(_) => DeviceKind::SmartPlug,
            DeviceProxy::Button(_) => DeviceKind::Button,
            DeviceProxy::TemperatureSensor(_) => DeviceKind::TemperatureSensor,
        }
    }

    fn capability(&self) -> &dyn Capability {
        match self {
            DeviceProxy::Bulb(dev) => dev,
            DeviceProxy::Thermostat(dev) => dev,
            DeviceProxy::SmartPlug(dev) => dev,
            DeviceProxy::Button(dev) => dev,
            DeviceProxy::TemperatureSensor(dev) => dev,
        }
    }

    fn capability_mut(&mut self) -> &mut dyn Capability {
        match self {
            DeviceProxy::Bulb(dev) => dev,
            DeviceProxy::Thermostat(dev) => dev,
            DeviceProxy::SmartPlug(dev) => dev,
            DeviceProxy::Button(dev) => dev,
            DeviceProxy::TemperatureSensor(dev) => dev,
        }
    }

    pub fn ain(&self) -> &str {
        &self.capability().state().ain
    }

    pub fn name(&self) -> &str {
        &self.capability().state().name
    }

    pub fn productname(&self) -> &str {
        &self.capability().state().productname
    }

    pub fn value(&self, property: &str) -> Option<&PropertyValue> {
        self.capability().state().get(property)
    }

    pub fn properties(&self) -> Vec<PropertyDescription> {
        self.capability().properties()
    }

    pub fn added_event(&self) -> DeviceEvent {
        let capability = self.capability();
        let state = capability.state();
        DeviceEvent::DeviceAdded {
            ain: state.ain.clone(),
            name: state.name.clone(),
            productname: state.productname.clone(),
            kind: self.kind(),
            properties: capability.properties(),
            events: capability.events(),
        }
    }

    /// Applies `info` if it describes this proxy's device, otherwise does
    /// nothing.
    pub fn apply_info(&mut self, info: &DeviceInfo) -> Vec<DeviceEvent> {
        if info.identifier != self.ain() {
            return Vec::new();
        }
        let capability = self.capability_mut();
        if capability.state().name != info.name {
            capability.state_mut().name = info.name.clone();
        }
        capability.apply_info(info)
    }

    /// Sends the command for a property write. On success the new value is
    /// cached and its change event returned. Failures are logged and come
    /// back as [`FritzError::Command`].
    pub fn set_value(
        &mut self,
        client: &FritzClient,
        property: &str,
        value: PropertyValue,
    ) -> Result<Vec<DeviceEvent>> {
        info!("Set value of {} / {property} to {value}", self.name());

        let result = self
            .capability()
            .command(property, &value)
            .and_then(|cmd| {
                let body = client.request(&cmd)?;
                if body.trim() == "inval" {
                    return Err(rejected(cmd.name(), "rejected by the fritz box"));
                }
                Ok(())
            });

        match result {
            Ok(()) => {
                let mut events = Vec::new();
                let capability = self.capability_mut();
                for excluded in capability.excludes(property) {
                    capability.state_mut().clear(excluded, &mut events);
                }
                capability.state_mut().set(property, value, &mut events);
                Ok(events)
            }
            Err(err) => {
                error!(
                    "Could not set value of {} / {property} to {value}: {err}",
                    self.name()
                );
                Err(match err {
                    err @ FritzError::Command { .. } => err,
                    err => rejected(property, err),
                })
            }
        }
    }
}
