use sitepilot_core::credentials::CredentialError;
use sitepilot_core::github::ContentError;
use sitepilot_core::response::ResponseError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Configuration(String),

    #[error("GitHub API Error ({status}): {message}")]
    Remote { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Model(String),

    #[error("Could not decode {name}: {reason}")]
    Decode { name: String, reason: String },

    #[error("Credential store error: {0}")]
    Store(String),
}

impl Error {
    pub fn remote(status: reqwest::StatusCode, message: impl Into<String>) -> Self {
        Error::Remote {
            status: status.as_u16(),
            message: message.into(),
        }
    }

    pub fn decode(name: &str, err: ContentError) -> Self {
        Error::Decode {
            name: name.to_string(),
            reason: err.to_string(),
        }
    }

    /// The store rejected a write because the revision token was stale.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Remote { status: 409, .. })
    }
}

impl From<ResponseError> for Error {
    fn from(err: ResponseError) -> Self {
        Error::Model(format!("Could not read the AI response: {err}"))
    }
}

impl From<CredentialError> for Error {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidApiKey(msg) => {
                Error::Configuration(format!("Invalid Gemini API Key format: {msg}"))
            }
            other => Error::Store(other.to_string()),
        }
    }
}
