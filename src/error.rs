use thiserror::Error;

/// Message fragment Spotify uses in 401 responses for an expired access token.
const TOKEN_EXPIRED_MESSAGE: &str = "access token expired";

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Spotify API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse data, error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),
}

impl Error {
    /// Whether the API rejected the request because the access token expired.
    ///
    /// Spotify reports this only through the error text of a 401 response,
    /// so the message is inspected rather than the status code.
    pub fn is_token_expired(&self) -> bool {
        match self {
            Error::Api { message, .. } => message.to_lowercase().contains(TOKEN_EXPIRED_MESSAGE),
            _ => false,
        }
    }
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Error::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
