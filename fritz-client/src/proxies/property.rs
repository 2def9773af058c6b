use std::collections::BTreeMap;

use serde::Serialize;

use crate::devices::DeviceInfo;
use crate::proxies::DeviceEvent;

pub const ON: &str = "on";
pub const BRIGHTNESS: &str = "brightness";
pub const COLOR: &str = "color";
pub const COLOR_TEMPERATURE: &str = "colorTemperature";
pub const TEMPERATURE: &str = "temperature";
pub const TARGET_TEMPERATURE: &str = "targetTemperature";
pub const BATTERY: &str = "battery";
pub const BATTERY_LOW: &str = "batteryLow";
pub const POWER: &str = "power";
pub const ENERGY: &str = "energy";
pub const VOLTAGE: &str = "voltage";

/// Value of a device property as exposed to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Bool(val) => write!(f, "{val}"),
            PropertyValue::Number(val) => write!(f, "{val}"),
            PropertyValue::String(val) => write!(f, "{val:?}"),
        }
    }
}

/// `true`/`false` become [`PropertyValue::Bool`], numbers
/// [`PropertyValue::Number`], anything else is kept as string.
impl std::str::FromStr for PropertyValue {
    type Err = std::convert::Infallible;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        Ok(match input {
            "true" | "on" => PropertyValue::Bool(true),
            "false" | "off" => PropertyValue::Bool(false),
            _ => match input.parse::<f64>() {
                Ok(num) => PropertyValue::Number(num),
                Err(_) => PropertyValue::String(input.to_string()),
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Boolean,
    Integer,
    Number,
    String,
}

/// Metadata of a property, what the host needs to render and validate it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescription {
    pub name: &'static str,
    pub title: &'static str,
    #[serde(rename = "@type", skip_serializing_if = "Option::is_none")]
    pub semantic_type: Option<&'static str>,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    pub read_only: bool,
}

impl PropertyDescription {
    pub fn new(name: &'static str, title: &'static str, value_type: ValueType) -> Self {
        PropertyDescription {
            name,
            title,
            semantic_type: None,
            value_type,
            unit: None,
            minimum: None,
            maximum: None,
            multiple_of: None,
            choices: Vec::new(),
            read_only: false,
        }
    }

    pub fn semantic(mut self, semantic_type: &'static str) -> Self {
        self.semantic_type = Some(semantic_type);
        self
    }

    pub fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn range(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    pub fn multiple_of(mut self, step: f64) -> Self {
        self.multiple_of = Some(step);
        self
    }

    pub fn choices(mut self, choices: Vec<String>) -> Self {
        self.choices = choices;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

/// A discrete event a device can fire, e.g. one per sub-button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDescription {
    pub name: String,
    pub title: String,
}

pub(crate) fn temperature_property() -> PropertyDescription {
    PropertyDescription::new(TEMPERATURE, "Temperature", ValueType::Number)
        .semantic("TemperatureProperty")
        .unit("degree celsius")
        .multiple_of(0.1)
        .read_only()
}

pub(crate) fn battery_properties() -> Vec<PropertyDescription> {
    vec![
        PropertyDescription::new(BATTERY, "Battery", ValueType::Integer)
            .semantic("LevelProperty")
            .unit("percent")
            .range(0.0, 100.0)
            .read_only(),
        PropertyDescription::new(BATTERY_LOW, "Battery low", ValueType::Boolean)
            .semantic("AlarmProperty")
            .read_only(),
    ]
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

/// Identity of the proxied device plus the last known property values.
#[derive(Debug, Clone)]
pub struct ProxyState {
    pub ain: String,
    pub name: String,
    pub productname: String,
    values: BTreeMap<String, PropertyValue>,
}

impl ProxyState {
    pub fn new(info: &DeviceInfo) -> Self {
        ProxyState {
            ain: info.identifier.clone(),
            name: info.name.clone(),
            productname: info.productname.clone(),
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, property: &str) -> Option<&PropertyValue> {
        self.values.get(property)
    }

    /// Stores `value` and queues a change event unless it equals the cached
    /// value.
    pub fn set(&mut self, property: &str, value: PropertyValue, events: &mut Vec<DeviceEvent>) {
        if self.values.get(property) == Some(&value) {
            return;
        }
        trace!("{} [{}] {property} = {value}", self.name, self.ain);
        self.values.insert(property.to_string(), value.clone());
        events.push(DeviceEvent::PropertyChanged {
            ain: self.ain.clone(),
            property: property.to_string(),
            value,
        });
    }

    /// Drops a cached value, queues [`DeviceEvent::PropertyCleared`] if there
    /// was one.
    pub fn clear(&mut self, property: &str, events: &mut Vec<DeviceEvent>) {
        if self.values.remove(property).is_some() {
            trace!("{} [{}] {property} cleared", self.name, self.ain);
            events.push(DeviceEvent::PropertyCleared {
                ain: self.ain.clone(),
                property: property.to_string(),
            });
        }
    }

    pub(crate) fn apply_temperature(&mut self, info: &DeviceInfo, events: &mut Vec<DeviceEvent>) {
        if let Some(temperature) = info.temperature {
            self.set(
                TEMPERATURE,
                PropertyValue::Number(temperature.celsius),
                events,
            );
        }
    }

    pub(crate) fn apply_battery(&mut self, info: &DeviceInfo, events: &mut Vec<DeviceEvent>) {
        if let Some(battery) = info.battery {
            self.set(BATTERY, PropertyValue::Number(battery as f64), events);
        }
        if let Some(low) = info.batterylow {
            self.set(BATTERY_LOW, PropertyValue::Bool(low), events);
        }
    }
}
