use serde::Serialize;

/// Capability categories encoded in a device's `functionbitmask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FeatureFlag {
    HanFunDevice,
    Light,
    AlarmSensor,
    Button,
    Thermostat,
    EnergyMeter,
    TemperatureSensor,
    SmartPlug,
    DectRepeater,
    Microphone,
    HanFunUnit,
    OnOffActor,
    DimmableLight,
    ColorLight,
}

use FeatureFlag::*;

/// Bit position -> feature. `None` marks reserved bits.
const FEATURE_TABLE: [Option<FeatureFlag>; 18] = [
    Some(HanFunDevice),
    None,
    Some(Light),
    None,
    Some(AlarmSensor),
    Some(Button),
    Some(Thermostat),
    Some(EnergyMeter),
    Some(TemperatureSensor),
    Some(SmartPlug),
    Some(DectRepeater),
    Some(Microphone),
    None,
    Some(HanFunUnit),
    None,
    Some(OnOffActor),
    Some(DimmableLight),
    Some(ColorLight),
];

impl FeatureFlag {
    pub fn name(&self) -> &'static str {
        match self {
            HanFunDevice | HanFunUnit => "HAN-FUN",
            Light => "Light",
            AlarmSensor => "AlarmSensor",
            Button => "Button",
            Thermostat => "Thermostat",
            EnergyMeter => "EnergyMeter",
            TemperatureSensor => "TemperatureSensor",
            SmartPlug => "SmartPlug",
            DectRepeater => "DECTRepeater",
            Microphone => "Microphone",
            OnOffActor => "OnOffActor",
            DimmableLight => "DimmableLight",
            ColorLight => "ColorLight",
        }
    }
}

impl std::fmt::Display for FeatureFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The feature set of a device, ordered by bit position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Features(Vec<FeatureFlag>);

impl Features {
    pub fn from_bitmask(mask: u32) -> Self {
        Features(
            FEATURE_TABLE
                .iter()
                .enumerate()
                .filter(|(pos, _)| mask & (1 << pos) != 0)
                .filter_map(|(_, feature)| *feature)
                .collect(),
        )
    }

    pub fn contains(&self, feature: FeatureFlag) -> bool {
        self.0.contains(&feature)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureFlag> {
        self.0.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(FeatureFlag::name).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for Features {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.names().join(","))
    }
}
