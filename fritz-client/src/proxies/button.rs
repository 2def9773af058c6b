use std::collections::BTreeMap;

use super::property::*;
use super::{read_only, Capability, DeviceEvent};
use crate::client::Commands;
use crate::devices::DeviceInfo;
use crate::error::Result;

/// Push button devices like the FRITZ!DECT 440. A press shows up as a new
/// `lastpressedtimestamp` of one of the sub-buttons.
#[derive(Debug, Clone)]
pub struct Button {
    state: ProxyState,
    /// sub-button id -> last seen press timestamp
    last_pressed: BTreeMap<String, Option<i64>>,
    buttons: Vec<(String, String)>,
    has_battery: bool,
    has_temperature: bool,
}

impl Button {
    /// The timestamps in `info` become the baseline, only later changes count
    /// as presses.
    pub fn new(info: &DeviceInfo) -> Self {
        Button {
            state: ProxyState::new(info),
            last_pressed: info
                .buttons
                .iter()
                .map(|button| (button.id.clone(), button.last_pressed))
                .collect(),
            buttons: info
                .buttons
                .iter()
                .map(|button| (button.id.clone(), button.name.clone()))
                .collect(),
            has_battery: info.battery.is_some(),
            has_temperature: info.temperature.is_some(),
        }
    }

    pub fn ain(&self) -> &str {
        &self.state.ain
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn last_pressed(&self, button_id: &str) -> Option<i64> {
        self.last_pressed.get(button_id).copied().flatten()
    }
}

impl Capability for Button {
    fn state(&self) -> &ProxyState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ProxyState {
        &mut self.state
    }

    fn properties(&self) -> Vec<PropertyDescription> {
        let mut properties = Vec::new();
        if self.has_battery {
            properties.extend(battery_properties());
        }
        if self.has_temperature {
            properties.push(temperature_property());
        }
        properties
    }

    fn events(&self) -> Vec<EventDescription> {
        self.buttons
            .iter()
            .map(|(id, name)| EventDescription {
                name: id.clone(),
                title: name.clone(),
            })
            .collect()
    }

    fn apply_info(&mut self, info: &DeviceInfo) -> Vec<DeviceEvent> {
        let mut events = Vec::new();
        self.state.apply_battery(info, &mut events);
        self.state.apply_temperature(info, &mut events);

        let mut new_buttons = false;
        for button in &info.buttons {
            match self.last_pressed.insert(button.id.clone(), button.last_pressed) {
                // first sighting, just the baseline
                None => {
                    debug!("{} [{}] new button {}", self.state.name, self.state.ain, button.id);
                    self.buttons.push((button.id.clone(), button.name.clone()));
                    new_buttons = true;
                }
                Some(previous) if previous != button.last_pressed && button.last_pressed.is_some() => {
                    debug!("{} [{}] button {} pressed", self.state.name, self.state.ain, button.id);
                    events.push(DeviceEvent::ButtonPressed {
                        ain: self.state.ain.clone(),
                        button_id: button.id.clone(),
                    });
                }
                Some(_) => {}
            }
        }

        if new_buttons {
            events.push(DeviceEvent::EventsChanged {
                ain: self.state.ain.clone(),
                events: self.events(),
            });
        }

        events
    }

    fn command(&self, property: &str, value: &PropertyValue) -> Result<Commands> {
        Err(read_only(property, value))
    }
}
