//! Normalized device state, decoded from the raw `getdevicelistinfos` XML.

use serde::Serialize;

use crate::error::{FritzError, Result};
use crate::features::{FeatureFlag, Features};
use crate::fritz_xml as xml;

mod color;
pub use color::{Color, ColorDefaults, ColorPreset, ColorTemperature, MainColor};

const COLOR_MODE_HUE_SAT: u32 = 1;
const COLOR_MODE_COLOR_TEMPERATURE: u32 = 4;

/// State of a single device as reported by one poll. Rebuilt from scratch on
/// every poll, sub-records are `None` when the device did not report them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceInfo {
    pub identifier: String,
    pub productname: String,
    pub name: String,
    pub features: Features,
    pub present: bool,
    pub simpleonoff: Option<OnOff>,
    pub temperature: Option<Temperature>,
    pub levelcontrol: Option<Level>,
    pub colorcontrol: Option<ColorState>,
    pub battery: Option<u8>,
    pub batterylow: Option<bool>,
    pub thermostat: Option<Thermostat>,
    pub switch: Option<OnOff>,
    pub powermeter: Option<PowerMeter>,
    pub buttons: Vec<Button>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OnOff {
    pub state: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Temperature {
    pub celsius: f64,
    pub offset: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Level {
    pub level: u8,
    pub percentage: u8,
}

/// A bulb is either in hue/saturation mode or in color temperature mode,
/// never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColorState {
    HueSaturation { hue: u16, saturation: u16 },
    Temperature { kelvin: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thermostat {
    pub current_celsius: f64,
    pub target_celsius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerMeter {
    pub volt: f64,
    pub watt: f64,
    pub energy_in_watt_h: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Button {
    pub id: String,
    pub identifier: String,
    pub name: String,
    pub last_pressed: Option<i64>,
}

impl DeviceInfo {
    pub fn has_feature(&self, feature: FeatureFlag) -> bool {
        self.features.contains(feature)
    }

    /// Builds the normalized record from a raw device. Fails on values that
    /// are present but not parseable.
    pub fn from_xml_device(device: &xml::Device) -> Result<Self> {
        let identifier = strip_whitespace(&device.identifier);
        let mask = parse_number::<u32>("functionbitmask", &device.functionbitmask)?;

        Ok(DeviceInfo {
            features: Features::from_bitmask(mask),
            productname: device.productname.clone(),
            name: device.name.trim().to_string(),
            present: value(&device.present).map(is_set).unwrap_or(false),
            simpleonoff: device
                .simpleonoff
                .as_ref()
                .and_then(|raw| value(&raw.state))
                .map(|state| OnOff {
                    state: is_set(state),
                }),
            temperature: decode_temperature(device.temperature.as_ref())?,
            levelcontrol: decode_level(device.levelcontrol.as_ref())?,
            colorcontrol: decode_color(device.colorcontrol.as_ref())?,
            battery: value(&device.battery)
                .map(|val| parse_number("battery", val))
                .transpose()?,
            batterylow: value(&device.batterylow).map(is_set),
            thermostat: decode_thermostat(device.hkr.as_ref())?,
            switch: device
                .switch
                .as_ref()
                .and_then(|raw| value(&raw.state))
                .map(|state| OnOff {
                    state: is_set(state),
                }),
            powermeter: decode_powermeter(device.powermeter.as_ref())?,
            buttons: device
                .buttons
                .iter()
                .map(decode_button)
                .collect::<Result<_>>()?,
            identifier,
        })
    }
}

/// Parses a `getdevicelistinfos` response. Pure, calling it twice with the
/// same input gives the same result.
pub fn decode_device_list(xml: &str) -> Result<Vec<DeviceInfo>> {
    xml::parse_device_list(xml)?
        .iter()
        .map(DeviceInfo::from_xml_device)
        .collect()
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

fn decode_temperature(raw: Option<&xml::Temperature>) -> Result<Option<Temperature>> {
    let (celsius, offset) = match raw.map(|raw| (value(&raw.celsius), value(&raw.offset))) {
        Some((Some(celsius), Some(offset))) => (celsius, offset),
        _ => return Ok(None),
    };
    Ok(Some(Temperature {
        celsius: parse_number::<i32>("celsius", celsius)? as f64 / 10.0,
        offset: parse_number::<i32>("offset", offset)? as f64 / 10.0,
    }))
}

fn decode_level(raw: Option<&xml::LevelControl>) -> Result<Option<Level>> {
    let (level, percentage) = match raw.map(|raw| (value(&raw.level), value(&raw.levelpercentage)))
    {
        Some((Some(level), Some(percentage))) => (level, percentage),
        _ => return Ok(None),
    };
    Ok(Some(Level {
        level: parse_number("level", level)?,
        percentage: parse_number("levelpercentage", percentage)?,
    }))
}

fn decode_color(raw: Option<&xml::ColorControl>) -> Result<Option<ColorState>> {
    let raw = match raw {
        Some(raw) => raw,
        None => return Ok(None),
    };
    let mode = match value(&raw.current_mode) {
        Some(mode) => parse_number::<u32>("current_mode", mode)?,
        None => return Ok(None),
    };

    match mode {
        COLOR_MODE_HUE_SAT => match (value(&raw.hue), value(&raw.saturation)) {
            (Some(hue), Some(saturation)) => Ok(Some(ColorState::HueSaturation {
                hue: parse_number("hue", hue)?,
                saturation: parse_number("saturation", saturation)?,
            })),
            _ => Ok(None),
        },
        COLOR_MODE_COLOR_TEMPERATURE => value(&raw.temperature)
            .map(|kelvin| {
                Ok(ColorState::Temperature {
                    kelvin: parse_number("temperature", kelvin)?,
                })
            })
            .transpose(),
        _ => Ok(None),
    }
}

fn decode_thermostat(raw: Option<&xml::Hkr>) -> Result<Option<Thermostat>> {
    let (tist, tsoll) = match raw.map(|raw| (value(&raw.tist), value(&raw.tsoll))) {
        Some((Some(tist), Some(tsoll))) => (tist, tsoll),
        _ => return Ok(None),
    };
    Ok(Some(Thermostat {
        current_celsius: parse_number::<u32>("tist", tist)? as f64 * 0.5,
        target_celsius: parse_number::<u32>("tsoll", tsoll)? as f64 * 0.5,
    }))
}

fn decode_powermeter(raw: Option<&xml::PowerMeter>) -> Result<Option<PowerMeter>> {
    let raw = match raw {
        Some(raw) => raw,
        None => return Ok(None),
    };
    let (voltage, power, energy) = match (value(&raw.voltage), value(&raw.power), value(&raw.energy))
    {
        (Some(voltage), Some(power), Some(energy)) => (voltage, power, energy),
        _ => return Ok(None),
    };
    Ok(Some(PowerMeter {
        volt: parse_number::<u32>("voltage", voltage)? as f64 / 1000.0,
        watt: parse_number::<u32>("power", power)? as f64 / 1000.0,
        energy_in_watt_h: parse_number("energy", energy)?,
    }))
}

fn decode_button(raw: &xml::Button) -> Result<Button> {
    Ok(Button {
        id: raw.id.trim().to_string(),
        identifier: strip_whitespace(&raw.identifier),
        name: raw.name.as_deref().unwrap_or_default().trim().to_string(),
        last_pressed: value(&raw.lastpressedtimestamp)
            .map(|ts| parse_number("lastpressedtimestamp", ts))
            .transpose()?,
    })
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

/// Present and non-empty value of an element.
fn value(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|val| !val.is_empty())
}

fn is_set(val: &str) -> bool {
    val == "1"
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn parse_number<T: std::str::FromStr>(field: &str, val: &str) -> Result<T> {
    val.trim()
        .parse::<T>()
        .map_err(|_| FritzError::Parse(format!("{field}: {val:?} is not a valid number")))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testing::DEVICE_LIST as FIXTURE;

    fn device<'a>(devices: &'a [DeviceInfo], ain: &str) -> &'a DeviceInfo {
        devices
            .iter()
            .find(|ea| ea.identifier == ain)
            .unwrap_or_else(|| panic!("no device {ain}"))
    }

    fn single(xml: &str) -> DeviceInfo {
        let list = format!(r#"<devicelist version="1">{xml}</devicelist>"#);
        let mut devices = decode_device_list(&list).unwrap();
        assert_eq!(devices.len(), 1);
        devices.remove(0)
    }

    #[test]
    fn decodes_button_device() {
        let devices = decode_device_list(FIXTURE).unwrap();
        let button = device(&devices, "099950756387");

        assert_eq!(button.name, "Schalter 1");
        assert_eq!(button.productname, "FRITZ!DECT 440");
        assert!(button.has_feature(FeatureFlag::Button));
        assert_eq!(button.battery, Some(100));
        assert_eq!(button.batterylow, Some(false));

        let buttons = &button.buttons;
        assert_eq!(buttons.len(), 4);
        let expected = [
            ("5000", "Schalter 1: Top right", 1604710638),
            ("5001", "Schalter 1: Bottom right", 1602355181),
            ("5002", "Schalter 1: Bottom left", 1602355178),
            ("5003", "Schalter 1: Top left", 1604598916),
        ];
        for (button, (id, name, ts)) in buttons.iter().zip(expected) {
            assert_eq!(button.id, id);
            assert_eq!(button.name, name);
            assert_eq!(button.last_pressed, Some(ts));
        }
        assert_eq!(buttons[0].identifier, "099950756387-1");
    }

    #[test]
    fn decoding_is_idempotent() {
        let first = decode_device_list(FIXTURE).unwrap();
        let second = decode_device_list(FIXTURE).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn strips_whitespace_from_identifier() {
        let devices = decode_device_list(FIXTURE).unwrap();
        assert!(devices.iter().all(|ea| !ea.identifier.contains(' ')));
        device(&devices, "116570149698");
    }

    #[test]
    fn decodes_smart_plug() {
        let devices = decode_device_list(FIXTURE).unwrap();
        let plug = device(&devices, "116570149698");
        assert_eq!(plug.switch, Some(OnOff { state: true }));
        assert_eq!(
            plug.powermeter,
            Some(PowerMeter {
                volt: 230.051,
                watt: 1.5,
                energy_in_watt_h: 4711,
            })
        );
        assert_eq!(
            plug.temperature,
            Some(Temperature {
                celsius: 22.5,
                offset: -1.0,
            })
        );
        assert_eq!(plug.simpleonoff, Some(OnOff { state: true }));
        assert_eq!(plug.colorcontrol, None);
        assert!(plug.buttons.is_empty());
    }

    #[test]
    fn decodes_thermostat_in_half_degrees() {
        let devices = decode_device_list(FIXTURE).unwrap();
        let hkr = device(&devices, "119600642220");
        assert_eq!(
            hkr.thermostat,
            Some(Thermostat {
                current_celsius: 16.0,
                target_celsius: 21.5,
            })
        );
        assert_eq!(hkr.battery, Some(80));
        assert_eq!(hkr.batterylow, Some(false));
    }

    #[test]
    fn color_mode_hue_saturation() {
        let bulb = single(
            r#"<device identifier="13077 0010000-1" id="2000" functionbitmask="237572" fwversion="0.0" manufacturer="AVM" productname="FRITZ!DECT 500">
<present>1</present><txbusy>0</txbusy><name>Lamp</name>
<colorcontrol supported_modes="5" current_mode="1"><hue>100</hue><saturation>200</saturation><temperature>3000</temperature></colorcontrol>
</device>"#,
        );
        assert_eq!(
            bulb.colorcontrol,
            Some(ColorState::HueSaturation {
                hue: 100,
                saturation: 200
            })
        );
    }

    #[test]
    fn color_mode_temperature() {
        let bulb = single(
            r#"<device identifier="13077 0010000-1" id="2000" functionbitmask="237572" fwversion="0.0" manufacturer="AVM" productname="FRITZ!DECT 500">
<present>1</present><txbusy>0</txbusy><name>Lamp</name>
<colorcontrol supported_modes="5" current_mode="4"><hue>100</hue><saturation>200</saturation><temperature>3000</temperature></colorcontrol>
</device>"#,
        );
        assert_eq!(
            bulb.colorcontrol,
            Some(ColorState::Temperature { kelvin: 3000 })
        );
    }

    #[test]
    fn unknown_color_mode_yields_no_color() {
        let bulb = single(
            r#"<device identifier="130770010000-1" id="2000" functionbitmask="237572" fwversion="0.0" manufacturer="AVM" productname="FRITZ!DECT 500">
<present>1</present><txbusy>0</txbusy><name>Lamp</name>
<colorcontrol supported_modes="5" current_mode="2"><hue>100</hue><saturation>200</saturation><temperature>3000</temperature></colorcontrol>
</device>"#,
        );
        assert_eq!(bulb.colorcontrol, None);
    }

    #[test]
    fn empty_values_are_omitted() {
        // disconnected plugs report empty elements
        let plug = single(
            r#"<device identifier="11657 0000000" id="17" functionbitmask="35712" fwversion="04.16" manufacturer="AVM" productname="FRITZ!DECT 200">
<present>0</present><txbusy>0</txbusy><name>Offline</name>
<switch><state></state><mode></mode><lock></lock><devicelock></devicelock></switch>
<powermeter><voltage></voltage><power></power><energy></energy></powermeter>
<temperature><celsius></celsius><offset></offset></temperature>
</device>"#,
        );
        assert!(!plug.present);
        assert_eq!(plug.switch, None);
        assert_eq!(plug.powermeter, None);
        assert_eq!(plug.temperature, None);
        assert_eq!(plug.battery, None);
        assert_eq!(plug.batterylow, None);
    }

    #[test]
    fn garbage_values_are_parse_errors() {
        let list = r#"<devicelist version="1"><device identifier="1" id="1" functionbitmask="35712" fwversion="1" manufacturer="AVM" productname="FRITZ!DECT 200">
<name>Plug</name><powermeter><voltage>abc</voltage><power>1</power><energy>1</energy></powermeter>
</device></devicelist>"#;
        let err = decode_device_list(list).unwrap_err();
        assert!(err.is_parse(), "{err}");
    }

    #[test]
    fn empty_device_list() {
        let devices = decode_device_list(r#"<devicelist version="1"></devicelist>"#).unwrap();
        assert!(devices.is_empty());
    }
}
