use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::error::{FritzError, Result};
use crate::fritz_xml as xml;

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

/// Issues plain HTTP GET requests and returns the response body. The only
/// point where the client touches the network.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<String>;
}

/// [`Transport`] backed by a blocking reqwest client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        // the query carries the sid, keep it out of the logs
        let path = url.split('?').next().unwrap_or_default();
        debug!(
            "[fritz api] GET {} status: {:?} {:?}",
            path,
            status,
            status.canonical_reason().unwrap_or_default()
        );

        if status == StatusCode::FORBIDDEN {
            return Err(FritzError::Forbidden);
        }
        if !status.is_success() {
            return Err(FritzError::HttpStatus {
                url: path.to_string(),
                status,
            });
        }

        Ok(response.text()?)
    }
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

pub const LOGIN_PATH: &str = "/login_sid.lua";

/// Session id the box hands out when not (or not successfully) logged in.
pub const INVALID_SID: &str = "0000000000000000";

/// Right that is needed to use the home automation endpoints.
pub const HOME_AUTO_RIGHT: &str = "HomeAuto";

/// An authenticated session with a fritz box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    host: String,
    sid: String,
    rights: Vec<String>,
}

impl Session {
    pub fn new(host: impl AsRef<str>, sid: impl ToString, rights: Vec<String>) -> Self {
        Session {
            host: host.as_ref().trim_end_matches('/').to_string(),
            sid: sid.to_string(),
            rights,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn sid(&self) -> &str {
        &self.sid
    }

    pub fn rights(&self) -> &[String] {
        &self.rights
    }

    pub fn has_home_auto(&self) -> bool {
        self.rights.iter().any(|right| right == HOME_AUTO_RIGHT)
    }

    pub fn require_home_auto(&self) -> Result<()> {
        if self.has_home_auto() {
            Ok(())
        } else {
            Err(FritzError::Auth("insufficient rights".to_string()))
        }
    }
}

/// Computes the string that we use to authenticate.
/// 1. Concat `challenge` and `password` with a "-"
/// 2. Convert that to UTF16le
/// 3. MD5 that byte array
/// 4. concat that as hex with challenge again
fn request_response(password: &str, challenge: &str) -> String {
    let hash_input = format!("{}-{}", challenge, password);
    let bytes: Vec<u8> = hash_input
        .encode_utf16()
        .flat_map(|utf16| utf16.to_le_bytes())
        .collect();
    let digest = md5::compute(bytes);
    format!("{}-{:032x}", challenge, digest)
}

/// Requests a fresh login challenge from the box.
pub fn get_challenge(transport: &dyn Transport, host: &str) -> Result<String> {
    let url = format!("{}{}", host.trim_end_matches('/'), LOGIN_PATH);
    let xml = transport.get(&url)?;
    let info = xml::parse_session_info(&xml)?;
    if info.block_time > 0 {
        warn!(
            "fritz box blocks logins for another {} seconds",
            info.block_time
        );
    }
    Ok(info.challenge)
}

/// Answers `challenge` and returns the raw session info the box responds
/// with. The returned sid is [`INVALID_SID`] when the credentials are wrong.
pub fn create_session(
    transport: &dyn Transport,
    host: &str,
    user: &str,
    password: &str,
    challenge: &str,
) -> Result<xml::SessionInfo> {
    let response = request_response(password, challenge);
    let url = format!(
        "{}{}?username={}&response={}",
        host.trim_end_matches('/'),
        LOGIN_PATH,
        user,
        response
    );
    let xml = transport.get(&url)?;
    xml::parse_session_info(&xml)
}

/// Requests a temporary token (session id = sid) from the fritz box using user
/// name and password.
pub fn login(transport: &dyn Transport, host: &str, user: &str, password: &str) -> Result<Session> {
    let challenge = get_challenge(transport, host)?;
    let info = create_session(transport, host, user, password, &challenge)?;

    if INVALID_SID == info.sid {
        if info.block_time > 0 {
            warn!("login for user {user} failed, blocked for {}s", info.block_time);
        }
        return Err(FritzError::Auth("invalid credentials".to_string()));
    }

    let session = Session::new(host, &info.sid, info.right_names());
    if let Err(err) = session.require_home_auto() {
        warn!(
            "{err}: user {user} lacks the {HOME_AUTO_RIGHT:?} right (has {:?}), device requests will likely be rejected",
            session.rights()
        );
    }
    info!("logged in to {host} as {user}");

    Ok(session)
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-
