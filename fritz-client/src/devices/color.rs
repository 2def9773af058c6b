use serde::Serialize;

use crate::error::{FritzError, Result};
use crate::fritz_xml as xml;

/// Color presets the box offers for color bulbs (`getcolordefaults`). Fetched
/// once, does not change afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColorDefaults {
    pub colors: Vec<MainColor>,
    pub color_temperatures: Vec<ColorTemperature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MainColor {
    pub name: String,
    pub colors: Vec<Color>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Color {
    pub sat_index: u8,
    pub hue: u16,
    pub sat: u16,
    pub val: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorTemperature {
    pub kelvin: u32,
}

/// A selectable color, named after its group and saturation index, e.g.
/// `"Rot 2"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorPreset {
    pub name: String,
    pub color: Color,
}

impl ColorDefaults {
    pub fn from_xml(raw: xml::ColorDefaults) -> Result<Self> {
        let colors = raw
            .hsdefaults
            .map(|hs| hs.groups)
            .unwrap_or_default()
            .into_iter()
            .map(|group| {
                Ok(MainColor {
                    name: group.name.value.trim().to_string(),
                    colors: group
                        .colors
                        .iter()
                        .map(|color| {
                            Ok(Color {
                                sat_index: parse("sat_index", &color.sat_index)?,
                                hue: parse("hue", &color.hue)?,
                                sat: parse("sat", &color.sat)?,
                                val: parse("val", &color.val)?,
                            })
                        })
                        .collect::<Result<_>>()?,
                })
            })
            .collect::<Result<_>>()?;

        let color_temperatures = raw
            .temperaturedefaults
            .map(|temps| temps.temps)
            .unwrap_or_default()
            .iter()
            .map(|temp| {
                Ok(ColorTemperature {
                    kelvin: parse("temp", &temp.value)?,
                })
            })
            .collect::<Result<_>>()?;

        Ok(ColorDefaults {
            colors,
            color_temperatures,
        })
    }

    pub fn parse(xml: &str) -> Result<Self> {
        Self::from_xml(xml::parse_color_defaults(xml)?)
    }

    pub fn presets(&self) -> Vec<ColorPreset> {
        self.colors
            .iter()
            .flat_map(|group| {
                group.colors.iter().map(move |color| ColorPreset {
                    name: format!("{} {}", group.name, color.sat_index),
                    color: *color,
                })
            })
            .collect()
    }

    /// The preset with exactly this hue and saturation, if any.
    pub fn find_preset(&self, hue: u16, sat: u16) -> Option<ColorPreset> {
        self.presets()
            .into_iter()
            .find(|preset| preset.color.hue == hue && preset.color.sat == sat)
    }

    pub fn preset_by_name(&self, name: &str) -> Option<ColorPreset> {
        self.presets().into_iter().find(|preset| preset.name == name)
    }

    pub fn temperature_names(&self) -> Vec<String> {
        self.color_temperatures
            .iter()
            .map(|temp| temp.kelvin.to_string())
            .collect()
    }
}

fn parse<T: std::str::FromStr>(field: &str, val: &str) -> Result<T> {
    val.trim()
        .parse::<T>()
        .map_err(|_| FritzError::Parse(format!("color defaults {field}: {val:?} is not a number")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::COLOR_DEFAULTS;

    #[test]
    fn builds_flat_presets() {
        let defaults = ColorDefaults::parse(COLOR_DEFAULTS).unwrap();
        assert_eq!(defaults.colors.len(), 2);
        assert_eq!(
            defaults.colors[0].colors[0],
            Color {
                sat_index: 1,
                hue: 358,
                sat: 180,
                val: 230
            }
        );
        let names = defaults
            .presets()
            .into_iter()
            .map(|preset| preset.name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Rot 1", "Rot 2", "Rot 3", "Orange 1", "Orange 2"]);
        assert_eq!(defaults.temperature_names(), vec!["2700", "3000", "3400"]);
    }

    #[test]
    fn preset_lookup_requires_exact_match() {
        let defaults = ColorDefaults::parse(COLOR_DEFAULTS).unwrap();
        assert_eq!(defaults.find_preset(35, 140).unwrap().name, "Orange 2");
        assert!(defaults.find_preset(35, 141).is_none());
        assert!(defaults.find_preset(36, 140).is_none());
        assert_eq!(defaults.preset_by_name("Rot 3").unwrap().color.sat, 54);
    }
}
