use std::sync::Arc;

use crate::api::{self, HttpTransport, Session, Transport};
use crate::devices::{decode_device_list, ColorDefaults, DeviceInfo};
use crate::error::Result;
use crate::features::FeatureFlag;
use crate::proxies::{Bulb, Button};

pub const HOMEAUTO_PATH: &str = "//webservices/homeautoswitch.lua";

/// Commands of the home automation endpoint that this client knows how to
/// send.
#[derive(Debug, Clone, PartialEq)]
pub enum Commands {
    GetDeviceListInfos,
    GetColorDefaults,
    SetSimpleOnOff { ain: String, on: bool },
    SetLevelPercentage { ain: String, level: u8 },
    SetColor { ain: String, hue: u16, saturation: u16 },
    SetColorTemperature { ain: String, kelvin: u32 },
    SetSwitchOn { ain: String },
    SetSwitchOff { ain: String },
    /// Target temperature in degrees celsius, sent in half degree steps.
    SetThermostatTarget { ain: String, celsius: f64 },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        use Commands::*;
        match self {
            GetDeviceListInfos => "getdevicelistinfos",
            GetColorDefaults => "getcolordefaults",
            SetSimpleOnOff { .. } => "setsimpleonoff",
            SetLevelPercentage { .. } => "setlevelpercentage",
            SetColor { .. } => "setcolor",
            SetColorTemperature { .. } => "setcolortemperature",
            SetSwitchOn { .. } => "setswitchon",
            SetSwitchOff { .. } => "setswitchoff",
            SetThermostatTarget { .. } => "sethkrtsoll",
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        use Commands::*;
        match self {
            GetDeviceListInfos | GetColorDefaults => vec![],
            SetSimpleOnOff { ain, on } => {
                vec![("ain", ain.clone()), ("onoff", (*on as u8).to_string())]
            }
            SetLevelPercentage { ain, level } => {
                vec![("ain", ain.clone()), ("level", level.to_string())]
            }
            SetColor {
                ain,
                hue,
                saturation,
            } => vec![
                ("ain", ain.clone()),
                ("hue", hue.to_string()),
                ("saturation", saturation.to_string()),
                ("duration", "0".to_string()),
            ],
            SetColorTemperature { ain, kelvin } => vec![
                ("ain", ain.clone()),
                ("temperature", kelvin.to_string()),
                ("duration", "0".to_string()),
            ],
            SetSwitchOn { ain } | SetSwitchOff { ain } => vec![("ain", ain.clone())],
            SetThermostatTarget { ain, celsius } => vec![
                ("ain", ain.clone()),
                ("param", ((celsius * 2.0).round() as u32).to_string()),
            ],
        }
    }
}

/// Builds the query string for a home automation request.
///
/// Values are inserted as they are, only spaces get removed. Values with
/// reserved url characters (`&`, `=`, `#`, ...) are not escaped.
pub(crate) fn build_query(method: &str, params: &[(&str, String)], sid: &str) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .chain([format!("switchcmd={method}"), format!("sid={sid}")])
        .collect::<Vec<_>>()
        .join("&")
        .replace(' ', "")
}

/// The main interface to get data from the fritz box API. Holds one session.
#[derive(Clone)]
pub struct FritzClient {
    transport: Arc<dyn Transport>,
    session: Session,
}

impl std::fmt::Debug for FritzClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FritzClient")
            .field("host", &self.session.host())
            .finish()
    }
}

impl FritzClient {
    /// Logs in via HTTP.
    pub fn login(host: &str, user: &str, password: &str) -> Result<Self> {
        Self::login_with(Arc::new(HttpTransport::new()), host, user, password)
    }

    pub fn login_with(
        transport: Arc<dyn Transport>,
        host: &str,
        user: &str,
        password: &str,
    ) -> Result<Self> {
        let session = api::login(transport.as_ref(), host, user, password)?;
        Ok(Self::with_session(transport, session))
    }

    pub fn with_session(transport: Arc<dyn Transport>, session: Session) -> Self {
        FritzClient { transport, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Replaces the session with a new one. Never done automatically.
    pub fn relogin(&mut self, user: &str, password: &str) -> Result<()> {
        let host = self.session.host().to_string();
        self.session = api::login(self.transport.as_ref(), &host, user, password)?;
        Ok(())
    }

    /// Sends a single request to the home automation endpoint and returns the
    /// raw response body.
    pub fn invoke(&self, method: &str, params: &[(&str, String)]) -> Result<String> {
        let query = build_query(method, params, self.session.sid());
        let url = format!("{}{}?{}", self.session.host(), HOMEAUTO_PATH, query);
        trace!("[fritz api] {method} {params:?}");
        self.transport.get(&url)
    }

    pub fn request(&self, cmd: &Commands) -> Result<String> {
        self.invoke(cmd.name(), &cmd.params())
    }

    /// Returns the state of all smart home devices. See [`DeviceInfo`].
    pub fn get_device_infos(&self) -> Result<Vec<DeviceInfo>> {
        let xml = self.request(&Commands::GetDeviceListInfos)?;
        decode_device_list(&xml)
    }

    pub fn get_color_defaults(&self) -> Result<ColorDefaults> {
        let xml = self.request(&Commands::GetColorDefaults)?;
        ColorDefaults::parse(&xml)
    }

    /// All devices with the [`FeatureFlag::Light`] feature.
    pub fn get_bulbs(&self, colors: &ColorDefaults) -> Result<Vec<Bulb>> {
        Ok(self
            .get_device_infos()?
            .iter()
            .filter(|info| info.has_feature(FeatureFlag::Light))
            .map(|info| Bulb::new(info, colors.clone()))
            .collect())
    }

    /// All devices with the [`FeatureFlag::Button`] feature. The current
    /// button timestamps serve as baseline for press detection.
    pub fn get_buttons(&self) -> Result<Vec<Button>> {
        Ok(self
            .get_device_infos()?
            .iter()
            .filter(|info| info.has_feature(FeatureFlag::Button))
            .map(Button::new)
            .collect())
    }
}
