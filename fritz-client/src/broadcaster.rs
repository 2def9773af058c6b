use std::collections::BTreeSet;

use flume::Sender;

use crate::client::FritzClient;
use crate::devices::{ColorDefaults, DeviceInfo};
use crate::error::{FritzError, Result};
use crate::proxies::{DeviceEvent, DeviceProxy, PropertyValue};

/// Hands the device list of every poll to all subscribed proxies and forwards
/// their events.
///
/// Fan-out is synchronous: when [`DeviceStateBroadcaster::publish`] returns,
/// every proxy has seen the new state.
#[derive(Debug)]
pub struct DeviceStateBroadcaster {
    subscribers: Vec<DeviceProxy>,
    colors: ColorDefaults,
    events: Sender<DeviceEvent>,
    /// identifiers of unsupported devices, logged once
    ignored: BTreeSet<String>,
}

impl DeviceStateBroadcaster {
    pub fn new(events: Sender<DeviceEvent>, colors: ColorDefaults) -> Self {
        DeviceStateBroadcaster {
            subscribers: Vec::new(),
            colors,
            events,
            ignored: BTreeSet::new(),
        }
    }

    pub fn proxies(&self) -> &[DeviceProxy] {
        &self.subscribers
    }

    pub fn contains(&self, ain: &str) -> bool {
        self.subscribers.iter().any(|proxy| proxy.ain() == ain)
    }

    pub fn subscribe(&mut self, proxy: DeviceProxy) {
        info!(
            "Adding {} {} [{}] ({})",
            proxy.kind(),
            proxy.name(),
            proxy.ain(),
            proxy.productname()
        );
        self.emit(proxy.added_event());
        self.subscribers.push(proxy);
    }

    /// Creates proxies for devices that are new and supported.
    pub fn discover(&mut self, infos: &[DeviceInfo]) {
        for info in infos {
            if self.contains(&info.identifier) || self.ignored.contains(&info.identifier) {
                continue;
            }
            match DeviceProxy::classify(info, &self.colors) {
                Some(proxy) => self.subscribe(proxy),
                None => {
                    info!(
                        "Ignoring unsupported device {} [{}] ({}), features: {}",
                        info.name, info.identifier, info.productname, info.features
                    );
                    self.ignored.insert(info.identifier.clone());
                }
            }
        }
    }

    /// Passes the state of one poll to every proxy.
    pub fn publish(&mut self, infos: &[DeviceInfo]) {
        let mut events = Vec::new();
        for proxy in &mut self.subscribers {
            for info in infos {
                events.extend(proxy.apply_info(info));
            }
        }
        for event in events {
            self.emit(event);
        }
    }

    /// Fetches the device list, discovers new devices and publishes the
    /// state. On errors nothing is published and the proxies keep their last
    /// known state. Returns the number of devices in the list.
    pub fn update(&mut self, client: &FritzClient) -> Result<usize> {
        let infos = client.get_device_infos()?;
        debug!("poll returned {} devices", infos.len());
        self.discover(&infos);
        self.publish(&infos);
        Ok(infos.len())
    }

    pub fn set_value(
        &mut self,
        client: &FritzClient,
        ain: &str,
        property: &str,
        value: PropertyValue,
    ) -> Result<()> {
        let proxy = self
            .subscribers
            .iter_mut()
            .find(|proxy| proxy.ain() == ain)
            .ok_or_else(|| FritzError::Command {
                command: property.to_string(),
                reason: format!("no device with ain {ain}"),
            })?;
        let events = proxy.set_value(client, property, value)?;
        for event in events {
            self.emit(event);
        }
        Ok(())
    }

    fn emit(&self, event: DeviceEvent) {
        if let Err(err) = self.events.send(event) {
            trace!("event receiver gone, dropping {:?}", err.into_inner());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Session;
    use crate::proxies::{property, DeviceKind};
    use crate::testing::{ScriptedTransport, COLOR_DEFAULTS, DEVICE_LIST};
    use std::sync::Arc;

    fn client() -> (Arc<ScriptedTransport>, FritzClient) {
        let transport = Arc::new(ScriptedTransport::new());
        let session = Session::new("http://test.host", "foo", vec!["HomeAuto".to_string()]);
        let client = FritzClient::with_session(transport.clone(), session);
        (transport, client)
    }

    fn broadcaster() -> (flume::Receiver<DeviceEvent>, DeviceStateBroadcaster) {
        let (tx, rx) = flume::unbounded();
        let colors = ColorDefaults::parse(COLOR_DEFAULTS).unwrap();
        (rx, DeviceStateBroadcaster::new(tx, colors))
    }

    #[test]
    fn first_poll_adds_devices() {
        let (transport, client) = client();
        let (rx, mut broadcaster) = broadcaster();
        transport.push(DEVICE_LIST);

        assert_eq!(broadcaster.update(&client).unwrap(), 4);
        assert_eq!(broadcaster.proxies().len(), 4);

        let events = rx.drain().collect::<Vec<_>>();
        let added = events
            .iter()
            .filter_map(|ev| match ev {
                DeviceEvent::DeviceAdded { kind, .. } => Some(*kind),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(
            added,
            vec![
                DeviceKind::SmartPlug,
                DeviceKind::Thermostat,
                DeviceKind::Button,
                DeviceKind::Bulb
            ]
        );
        assert!(events
            .iter()
            .any(|ev| matches!(ev, DeviceEvent::PropertyChanged { property, .. } if property == "targetTemperature")));
    }

    #[test]
    fn second_poll_only_reports_changes() {
        let (transport, client) = client();
        let (rx, mut broadcaster) = broadcaster();
        transport.push(DEVICE_LIST);
        transport.push(DEVICE_LIST.replace("<power>1500</power>", "<power>2000</power>"));

        broadcaster.update(&client).unwrap();
        rx.drain().for_each(drop);

        broadcaster.update(&client).unwrap();
        let events = rx.drain().collect::<Vec<_>>();
        assert_eq!(
            events,
            vec![DeviceEvent::PropertyChanged {
                ain: "116570149698".to_string(),
                property: property::POWER.to_string(),
                value: PropertyValue::Number(2.0),
            }]
        );
    }

    #[test]
    fn button_press_is_reported_once() {
        let (transport, client) = client();
        let (rx, mut broadcaster) = broadcaster();
        transport.push(DEVICE_LIST);
        let pressed = DEVICE_LIST.replace("1602355178", "1602355179");
        transport.push(pressed.clone());
        transport.push(pressed);

        for button in client.get_buttons().unwrap() {
            broadcaster.subscribe(DeviceProxy::Button(button));
        }

        broadcaster.update(&client).unwrap();
        broadcaster.update(&client).unwrap();

        let presses = rx
            .drain()
            .filter_map(|ev| match ev {
                DeviceEvent::ButtonPressed { ain, button_id } => Some((ain, button_id)),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(
            presses,
            vec![("099950756387".to_string(), "5002".to_string())]
        );
    }

    #[test]
    fn failed_poll_keeps_state() {
        let (transport, client) = client();
        let (rx, mut broadcaster) = broadcaster();
        transport.push(DEVICE_LIST);
        transport.push("<devicelist><device");

        broadcaster.update(&client).unwrap();
        rx.drain().for_each(drop);

        let err = broadcaster.update(&client).unwrap_err();
        assert!(err.is_parse(), "{err}");
        assert!(rx.is_empty());
        let plug = &broadcaster.proxies()[0];
        assert_eq!(
            plug.value(property::POWER),
            Some(&PropertyValue::Number(1.5))
        );
    }

    #[tracing_test::traced_test]
    #[test]
    fn unsupported_devices_are_logged_once() {
        let (_rx, mut broadcaster) = broadcaster();
        let infos = crate::devices::decode_device_list(
            r#"<devicelist version="1"><device identifier="1" id="1" functionbitmask="1" fwversion="1" manufacturer="AVM" productname="HAN-FUN"><name>Thing</name></device></devicelist>"#,
        )
        .unwrap();
        broadcaster.discover(&infos);
        broadcaster.discover(&infos);
        assert!(broadcaster.proxies().is_empty());
        logs_assert(|lines: &[&str]| {
            match lines
                .iter()
                .filter(|line| line.contains("Ignoring unsupported device Thing"))
                .count()
            {
                1 => Ok(()),
                n => Err(format!("logged {n} times")),
            }
        });
    }

    #[test]
    fn set_value_for_unknown_device() {
        let (transport, client) = client();
        let (_rx, mut broadcaster) = broadcaster();
        let err = broadcaster
            .set_value(&client, "nope", property::ON, PropertyValue::Bool(true))
            .unwrap_err();
        assert!(matches!(err, FritzError::Command { .. }));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn set_value_emits_change() {
        let (transport, client) = client();
        let (rx, mut broadcaster) = broadcaster();
        transport.push(DEVICE_LIST);
        broadcaster.update(&client).unwrap();
        rx.drain().for_each(drop);

        transport.push("0");
        broadcaster
            .set_value(&client, "116570149698", property::ON, PropertyValue::Bool(false))
            .unwrap();
        assert_eq!(
            rx.drain().collect::<Vec<_>>(),
            vec![DeviceEvent::PropertyChanged {
                ain: "116570149698".to_string(),
                property: property::ON.to_string(),
                value: PropertyValue::Bool(false),
            }]
        );
        assert!(transport.requests()[1].contains("switchcmd=setswitchoff"));
    }
}
