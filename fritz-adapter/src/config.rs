use std::{io::Read, path::Path};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::Result;

pub const DEFAULT_HOST: &str = "http://fritz.box";

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_poll_interval() -> Duration {
    Duration::seconds(10)
}

/// What the adapter is constructed with. Read from a YAML file, command line
/// flags and environment variables override single fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    #[serde(with = "crate::duration", default = "default_poll_interval")]
    pub poll_interval: Duration,
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            username: None,
            password: None,
            poll_interval: default_poll_interval(),
            debug: false,
        }
    }
}

impl Config {
    pub fn from_yaml_file(p: impl AsRef<Path>) -> Result<Self> {
        let f = std::fs::File::open(p)?;
        Self::from_yaml(f)
    }

    pub fn from_yaml(yaml_reader: impl Read) -> Result<Self> {
        Ok(serde_yaml::from_reader(yaml_reader)?)
    }

    pub fn from_string(s: impl ToString) -> Result<Self> {
        Config::from_yaml(s.to_string().as_bytes())
    }

    /// Username and password, both are required for the login.
    pub fn credentials(&self) -> Result<(&str, &str)> {
        let user = self
            .username
            .as_deref()
            .filter(|user| !user.is_empty())
            .ok_or(Error::MissingCredential("username"))?;
        let password = self
            .password
            .as_deref()
            .ok_or(Error::MissingCredential("password"))?;
        Ok((user, password))
    }
}
