use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unable to open config file: {0}")]
    ConfigFile(#[from] std::io::Error),
    #[error("unable to parse config file: {0}")]
    ConfigRead(#[from] serde_yaml::Error),

    #[error("unable to parse duration: {0}")]
    DurationParse(String),

    #[error("no {0} configured, pass it via config file, command line or environment")]
    MissingCredential(&'static str),

    #[error("invalid command: {0}")]
    InvalidCommand(String),

    #[error(transparent)]
    Fritz(#[from] fritz_client::FritzError),
}

pub type Result<T> = std::result::Result<T, Error>;
