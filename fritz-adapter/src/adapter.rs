use std::sync::Arc;

use flume::{Receiver, Sender};
use fritz_client::{
    ColorDefaults, DeviceEvent, DeviceStateBroadcaster, FritzClient, FritzError, HttpTransport,
    PropertyValue, Transport,
};

use crate::error::Error;
use crate::{Config, Result, Timer};

/// Inbound requests from the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetValue {
        ain: String,
        property: String,
        value: PropertyValue,
    },
}

/// Parses `"<ain> <property> <value>"`, e.g. `"116570149698 on true"`. The
/// value may contain spaces.
impl std::str::FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.trim().splitn(3, ' ');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(ain), Some(property), Some(value)) if !ain.is_empty() => {
                Ok(Command::SetValue {
                    ain: ain.to_string(),
                    property: property.to_string(),
                    value: value.parse().unwrap_or_else(|err| match err {}),
                })
            }
            _ => Err(Error::InvalidCommand(format!(
                "expected \"<ain> <property> <value>\", got {line:?}"
            ))),
        }
    }
}

/// Owns the session and all device proxies.
pub struct FritzAdapter {
    config: Config,
    client: FritzClient,
    broadcaster: DeviceStateBroadcaster,
}

impl std::fmt::Debug for FritzAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FritzAdapter")
            .field("host", &self.config.host)
            .field("devices", &self.broadcaster.proxies().len())
            .finish()
    }
}

impl FritzAdapter {
    pub fn start(config: Config, events: Sender<DeviceEvent>) -> Result<Self> {
        Self::start_with(Arc::new(HttpTransport::new()), config, events)
    }

    /// Logs in, fetches the color presets and runs the first poll. Only a
    /// failed login is fatal.
    pub fn start_with(
        transport: Arc<dyn Transport>,
        config: Config,
        events: Sender<DeviceEvent>,
    ) -> Result<Self> {
        let (user, password) = config.credentials()?;
        let client = FritzClient::login_with(transport, &config.host, user, password)?;

        let colors = match client.get_color_defaults() {
            Ok(colors) => colors,
            Err(err) => {
                warn!("Cannot get color defaults, bulbs will have no color presets: {err}");
                ColorDefaults::default()
            }
        };
        debug!(
            "{} color presets, {} color temperatures",
            colors.presets().len(),
            colors.color_temperatures.len()
        );

        let mut adapter = Self {
            broadcaster: DeviceStateBroadcaster::new(events, colors),
            client,
            config,
        };
        adapter.poll();
        Ok(adapter)
    }

    pub fn client(&self) -> &FritzClient {
        &self.client
    }

    pub fn broadcaster(&self) -> &DeviceStateBroadcaster {
        &self.broadcaster
    }

    /// One poll cycle. Errors are logged and the cycle is skipped. A
    /// rejected session is replaced for the next cycle.
    pub fn poll(&mut self) {
        match self.broadcaster.update(&self.client) {
            Ok(n) => trace!("polled {n} devices"),
            Err(FritzError::Forbidden) => {
                warn!("Session was rejected, logging in again");
                if let Err(err) = self.relogin() {
                    error!("Login failed: {err}");
                }
            }
            Err(err) => error!("Error polling devices: {err}"),
        }
    }

    fn relogin(&mut self) -> Result<()> {
        let (user, password) = self.config.credentials()?;
        self.client.relogin(user, password)?;
        Ok(())
    }

    pub fn set_value(&mut self, ain: &str, property: &str, value: PropertyValue) -> Result<()> {
        self.broadcaster
            .set_value(&self.client, ain, property, value)?;
        Ok(())
    }

    /// Polls on every tick of `timer` and handles `commands` in between until
    /// the command channel is closed.
    pub fn run(&mut self, timer: &Timer, commands: Receiver<Command>) {
        enum Action {
            Tick,
            Command(Command),
            Exit(&'static str),
        }

        let timer_rx = timer.timer_rx();
        info!(
            "Polling {} every {}",
            self.config.host,
            crate::duration::duration_pretty(timer.interval())
        );

        loop {
            let action = flume::Selector::new()
                .recv(&timer_rx, |msg| match msg {
                    Err(_) => Action::Exit("timer channel closed"),
                    Ok(_) => Action::Tick,
                })
                .recv(&commands, |msg| match msg {
                    Err(_) => Action::Exit("command channel closed"),
                    Ok(cmd) => Action::Command(cmd),
                })
                .wait();

            match action {
                Action::Tick => self.poll(),
                Action::Command(Command::SetValue {
                    ain,
                    property,
                    value,
                }) => {
                    // failures are already logged by the proxy
                    if let Err(err) = self.set_value(&ain, &property, value) {
                        debug!("command failed: {err}");
                    }
                }
                Action::Exit(reason) => {
                    info!("Stopping: {reason}");
                    return;
                }
            }
        }
    }
}
