use super::property::*;
use super::{read_only, rejected, Capability, DeviceEvent};
use crate::client::Commands;
use crate::devices::{ColorDefaults, ColorState, DeviceInfo, OnOff};
use crate::error::Result;
use crate::features::FeatureFlag;

/// Color bulbs like the FRITZ!DECT 500.
#[derive(Debug, Clone)]
pub struct Bulb {
    state: ProxyState,
    colors: ColorDefaults,
    dimmable: bool,
    colored: bool,
}

impl Bulb {
    pub fn new(info: &DeviceInfo, colors: ColorDefaults) -> Self {
        Bulb {
            state: ProxyState::new(info),
            colors,
            dimmable: info.has_feature(FeatureFlag::DimmableLight) || info.levelcontrol.is_some(),
            colored: info.has_feature(FeatureFlag::ColorLight) || info.colorcontrol.is_some(),
        }
    }

    pub fn ain(&self) -> &str {
        &self.state.ain
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }
}

impl std::fmt::Display for Bulb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] ({})",
            self.state.name, self.state.ain, self.state.productname
        )
    }
}

impl Capability for Bulb {
    fn state(&self) -> &ProxyState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ProxyState {
        &mut self.state
    }

    fn properties(&self) -> Vec<PropertyDescription> {
        let mut properties =
            vec![PropertyDescription::new(ON, "On/Off", ValueType::Boolean).semantic("OnOffProperty")];

        if self.dimmable {
            properties.push(
                PropertyDescription::new(BRIGHTNESS, "Brightness", ValueType::Integer)
                    .semantic("BrightnessProperty")
                    .unit("percent")
                    .range(0.0, 100.0),
            );
        }

        if self.colored && !self.colors.colors.is_empty() {
            let names = self
                .colors
                .presets()
                .into_iter()
                .map(|preset| preset.name)
                .collect();
            properties.push(
                PropertyDescription::new(COLOR, "Color", ValueType::String).choices(names),
            );
        }

        if self.colored && !self.colors.color_temperatures.is_empty() {
            properties.push(
                PropertyDescription::new(COLOR_TEMPERATURE, "Color temperature", ValueType::String)
                    .unit("kelvin")
                    .choices(self.colors.temperature_names()),
            );
        }

        properties
    }

    fn apply_info(&mut self, info: &DeviceInfo) -> Vec<DeviceEvent> {
        let mut events = Vec::new();

        if let Some(OnOff { state }) = info.simpleonoff {
            self.state.set(ON, PropertyValue::Bool(state), &mut events);
        }

        if let Some(level) = info.levelcontrol {
            self.state.set(
                BRIGHTNESS,
                PropertyValue::Number(level.percentage as f64),
                &mut events,
            );
        }

        // color and color temperature are mutually exclusive
        match info.colorcontrol {
            Some(ColorState::Temperature { kelvin }) => {
                self.state.clear(COLOR, &mut events);
                self.state.set(
                    COLOR_TEMPERATURE,
                    PropertyValue::String(kelvin.to_string()),
                    &mut events,
                );
            }
            Some(ColorState::HueSaturation { hue, saturation }) => {
                self.state.clear(COLOR_TEMPERATURE, &mut events);
                match self.colors.find_preset(hue, saturation) {
                    Some(preset) => {
                        self.state
                            .set(COLOR, PropertyValue::String(preset.name), &mut events)
                    }
                    None => {
                        self.state.clear(COLOR, &mut events);
                        warn!(
                            "{}: no color preset with hue {hue} and saturation {saturation}",
                            self
                        )
                    }
                }
            }
            None => {}
        }

        events
    }

    fn command(&self, property: &str, value: &PropertyValue) -> Result<Commands> {
        let ain = self.state.ain.clone();
        match (property, value) {
            (ON, PropertyValue::Bool(on)) => Ok(Commands::SetSimpleOnOff { ain, on: *on }),
            (BRIGHTNESS, PropertyValue::Number(percent)) => Ok(Commands::SetLevelPercentage {
                ain,
                level: percent.round().clamp(0.0, 100.0) as u8,
            }),
            (COLOR, PropertyValue::String(name)) => self
                .colors
                .preset_by_name(name)
                .map(|preset| Commands::SetColor {
                    ain,
                    hue: preset.color.hue,
                    saturation: preset.color.sat,
                })
                .ok_or_else(|| rejected(property, format!("unknown color preset {name:?}"))),
            (COLOR_TEMPERATURE, PropertyValue::String(kelvin)) => kelvin
                .parse()
                .map(|kelvin| Commands::SetColorTemperature { ain, kelvin })
                .map_err(|_| rejected(property, format!("{kelvin:?} is not a color temperature"))),
            (ON | BRIGHTNESS | COLOR | COLOR_TEMPERATURE, value) => {
                Err(rejected(property, format!("invalid value {value}")))
            }
            (_, value) => Err(read_only(property, value)),
        }
    }

    fn excludes(&self, property: &str) -> &'static [&'static str] {
        match property {
            COLOR => &[COLOR_TEMPERATURE],
            COLOR_TEMPERATURE => &[COLOR],
            _ => &[],
        }
    }
}
