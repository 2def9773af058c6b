//! Raw serde mappings of the XML documents the fritz box answers with.
//!
//! Values are kept as strings here; scaling and validation happens in
//! [`crate::devices`] so that an empty element (which the box sends for
//! devices that are currently not reachable) can be told apart from a
//! missing one.

use crate::error::Result;
use serde::Deserialize;
use serde_xml_rs::from_reader;

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
// response of login_sid.lua

#[derive(Debug, Deserialize)]
pub struct SessionInfo {
    #[serde(alias = "SID")]
    pub sid: String,
    #[serde(alias = "Challenge")]
    pub challenge: String,
    #[serde(alias = "BlockTime")]
    pub block_time: i32,
    #[serde(alias = "Rights")]
    pub rights: Option<Rights>,
}

/// `<Rights>` is a flat list of alternating `<Name>` / `<Access>` elements.
#[derive(Debug, Default, Deserialize)]
pub struct Rights {
    #[serde(rename = "$value", default)]
    pub entries: Vec<RightsEntry>,
}

#[derive(Debug, Deserialize)]
pub enum RightsEntry {
    Name(String),
    Access(String),
}

impl SessionInfo {
    /// Names of the granted rights, in document order.
    pub fn right_names(&self) -> Vec<String> {
        self.rights
            .iter()
            .flat_map(|rights| rights.entries.iter())
            .filter_map(|entry| match entry {
                RightsEntry::Name(name) => Some(name.trim().to_string()),
                RightsEntry::Access(_) => None,
            })
            .collect()
    }
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
// response of getdevicelistinfos

#[derive(Debug, Deserialize)]
pub struct DeviceList {
    #[serde(rename = "device", default)]
    pub devices: Vec<Device>,
}

#[derive(Debug, Deserialize)]
pub struct Device {
    pub identifier: String,
    pub id: String,
    pub functionbitmask: String,
    #[serde(default)]
    pub fwversion: String,
    #[serde(default)]
    pub manufacturer: String,
    pub productname: String,
    pub present: Option<String>,
    pub txbusy: Option<String>,
    #[serde(default)]
    pub name: String,
    pub battery: Option<String>,
    pub batterylow: Option<String>,
    pub switch: Option<Switch>,
    pub simpleonoff: Option<SimpleOnOff>,
    pub levelcontrol: Option<LevelControl>,
    pub colorcontrol: Option<ColorControl>,
    pub hkr: Option<Hkr>,
    pub powermeter: Option<PowerMeter>,
    pub temperature: Option<Temperature>,
    #[serde(rename = "button", default)]
    pub buttons: Vec<Button>,
}

#[derive(Debug, Deserialize)]
pub struct Switch {
    pub state: Option<String>,
    pub mode: Option<String>,
    pub lock: Option<String>,
    pub devicelock: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SimpleOnOff {
    pub state: Option<String>,
}

/// level: 0-255, levelpercentage: 0-100
#[derive(Debug, Deserialize)]
pub struct LevelControl {
    pub level: Option<String>,
    pub levelpercentage: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ColorControl {
    pub supported_modes: Option<String>,
    pub current_mode: Option<String>,
    pub hue: Option<String>,
    pub saturation: Option<String>,
    pub temperature: Option<String>,
}

/// tist / tsoll: half degrees celsius, 253 = off, 254 = on
#[derive(Debug, Deserialize)]
pub struct Hkr {
    pub tist: Option<String>,
    pub tsoll: Option<String>,
    pub absenk: Option<String>,
    pub komfort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PowerMeter {
    /// Wert in 0,001 V (aktuelle Spannung, wird etwa alle 2 Minuten aktualisiert)
    pub voltage: Option<String>,
    /// Wert in 0,001 W (aktuelle Leistung, wird etwa alle 2 Minuten aktualisiert)
    pub power: Option<String>,
    /// Wert in 1.0 Wh (absoluter Verbrauch seit Inbetriebnahme)
    pub energy: Option<String>,
}

/// celsius: Wert in 0,1 °C, negative und positive Werte möglich
/// offset: Wert in 0,1 °C, negative und positive Werte möglich
#[derive(Debug, Deserialize)]
pub struct Temperature {
    pub celsius: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Button {
    pub identifier: String,
    pub id: String,
    pub name: Option<String>,
    pub lastpressedtimestamp: Option<String>,
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
// response of getcolordefaults

#[derive(Debug, Deserialize)]
pub struct ColorDefaults {
    pub hsdefaults: Option<HsDefaults>,
    pub temperaturedefaults: Option<TemperatureDefaults>,
}

#[derive(Debug, Deserialize)]
pub struct HsDefaults {
    #[serde(rename = "hs", default)]
    pub groups: Vec<Hs>,
}

#[derive(Debug, Deserialize)]
pub struct Hs {
    pub hue_index: Option<String>,
    pub name: HsName,
    #[serde(rename = "color", default)]
    pub colors: Vec<HsColor>,
}

#[derive(Debug, Deserialize)]
pub struct HsName {
    #[serde(rename = "enum")]
    pub name_enum: Option<String>,
    #[serde(rename = "$value")]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct HsColor {
    pub sat_index: String,
    pub hue: String,
    pub sat: String,
    pub val: String,
}

#[derive(Debug, Deserialize)]
pub struct TemperatureDefaults {
    #[serde(rename = "temp", default)]
    pub temps: Vec<Temp>,
}

#[derive(Debug, Deserialize)]
pub struct Temp {
    pub value: String,
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

// The xml declaration must come first, the box sometimes sends a leading
// newline.

pub fn parse_session_info(xml: &str) -> Result<SessionInfo> {
    from_reader(xml.trim_start().as_bytes()).map_err(|err| {
        error!("cannot parse session info");
        err.into()
    })
}

/// Parses raw [`Device`]s.
pub fn parse_device_list(xml: &str) -> Result<Vec<Device>> {
    from_reader::<&[u8], DeviceList>(xml.trim_start().as_bytes())
        .map(|list| list.devices)
        .map_err(|err| {
            error!("cannot parse device infos");
            err.into()
        })
}

pub fn parse_color_defaults(xml: &str) -> Result<ColorDefaults> {
    from_reader(xml.trim_start().as_bytes()).map_err(|err| {
        error!("cannot parse color defaults");
        err.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_session_info() {
        let xml = r##"
<?xml version="1.0" encoding="utf-8"?>
<SessionInfo>
  <SID>0000000000000000</SID>
  <Challenge>63233c3d</Challenge>
  <BlockTime>0</BlockTime>
  <Rights></Rights>
</SessionInfo>
"##;

        let info = super::parse_session_info(xml).unwrap();
        assert_eq!(info.block_time, 0);
        assert_eq!(info.challenge, "63233c3d");
        assert_eq!(info.sid, "0000000000000000");
        assert!(info.right_names().is_empty());
    }

    #[test]
    fn parse_session_rights() {
        let xml = r##"<?xml version="1.0" encoding="utf-8"?>
<SessionInfo>
  <SID>9ad9d4f5e0bca47d</SID>
  <Challenge>2ef2e5a9</Challenge>
  <BlockTime>0</BlockTime>
  <Rights>
    <Name>Dial</Name>
    <Access>2</Access>
    <Name>HomeAuto</Name>
    <Access>2</Access>
  </Rights>
</SessionInfo>
"##;

        let info = super::parse_session_info(xml).unwrap();
        assert_eq!(info.sid, "9ad9d4f5e0bca47d");
        assert_eq!(info.right_names(), vec!["Dial", "HomeAuto"]);
    }

    #[test]
    fn parse_color_defaults() {
        let xml = r##"<colordefaults>
<hsdefaults>
<hs hue_index="1"><name enum="5569">Rot</name><color sat_index="1" hue="358" sat="180" val="230"/><color sat_index="2" hue="358" sat="112" val="237"/></hs>
<hs hue_index="2"><name enum="5570">Orange</name><color sat_index="1" hue="35" sat="214" val="252"/></hs>
</hsdefaults>
<temperaturedefaults><temp value="2700"/><temp value="3000"/></temperaturedefaults>
</colordefaults>"##;

        let defaults = super::parse_color_defaults(xml).unwrap();
        let groups = defaults.hsdefaults.unwrap().groups;
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name.value, "Rot");
        assert_eq!(groups[0].colors.len(), 2);
        assert_eq!(groups[0].colors[1].sat, "112");
        assert_eq!(defaults.temperaturedefaults.unwrap().temps.len(), 2);
    }

    #[test]
    fn leading_whitespace_before_declaration() {
        let xml = "\n  <?xml version=\"1.0\" encoding=\"utf-8\"?><devicelist version=\"1\"><device identifier=\"1\" id=\"1\" functionbitmask=\"1\" productname=\"x\"></device></devicelist>";
        assert_eq!(parse_device_list(xml).unwrap().len(), 1);
    }

    #[test]
    fn malformed_device_list_is_an_error() {
        let err = parse_device_list("<devicelist><device").unwrap_err();
        assert!(err.is_parse());
    }
}
