#[derive(thiserror::Error, Debug)]
pub enum FritzError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("http request to `{url}` failed with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Request forbidden. Are you logged in, is the sid correct and recent?")]
    Forbidden,

    #[error("fritz login error: `{0}`")]
    Auth(String),

    #[error("cannot parse xml: `{0}`")]
    XmlParse(#[from] serde_xml_rs::Error),

    #[error("parser error: `{0}`")]
    Parse(String),

    #[error("command `{command}` failed: {reason}")]
    Command { command: String, reason: String },
}

impl FritzError {
    /// Whether the error happened on the transport level (connection
    /// problems, bad status codes).
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            FritzError::Network(_) | FritzError::HttpStatus { .. } | FritzError::Forbidden
        )
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, FritzError::XmlParse(_) | FritzError::Parse(_))
    }
}

pub type Result<T> = std::result::Result<T, FritzError>;
