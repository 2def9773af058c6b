//! Test helpers: a scripted transport and XML fixtures.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::api::Transport;
use crate::error::{FritzError, Result};

pub(crate) const DEVICE_LIST: &str = include_str!("../tests/data/devicelist.xml");

pub(crate) const COLOR_DEFAULTS: &str = r##"<colordefaults>
<hsdefaults>
<hs hue_index="1"><name enum="5569">Rot</name><color sat_index="1" hue="358" sat="180" val="230"/><color sat_index="2" hue="358" sat="112" val="237"/><color sat_index="3" hue="358" sat="54" val="245"/></hs>
<hs hue_index="2"><name enum="5570">Orange</name><color sat_index="1" hue="35" sat="214" val="252"/><color sat_index="2" hue="35" sat="140" val="252"/></hs>
</hsdefaults>
<temperaturedefaults><temp value="2700"/><temp value="3000"/><temp value="3400"/></temperaturedefaults>
</colordefaults>"##;

pub(crate) fn session_xml(sid: &str, challenge: &str, rights: &[&str]) -> String {
    let rights = rights
        .iter()
        .map(|name| format!("<Name>{name}</Name><Access>2</Access>"))
        .collect::<String>();
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?><SessionInfo><SID>{sid}</SID><Challenge>{challenge}</Challenge><BlockTime>0</BlockTime><Rights>{rights}</Rights></SessionInfo>"#
    )
}

/// Answers requests with queued responses, in order, and records the
/// requested urls.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<String>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, body: impl ToString) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(body.to_string()));
    }

    pub(crate) fn push_error(&self, err: FritzError) {
        self.responses.lock().unwrap().push_back(Err(err));
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FritzError::Parse(format!("no scripted response for {url}"))))
    }
}
