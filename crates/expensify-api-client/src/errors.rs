use thiserror::Error;

use crate::transport::TransportError;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Expensify credentials require both a partner user ID and a partner user secret")]
    MissingCredentials,
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("The client received an unexpected response that could not be parsed: {source}")]
    MalformedJsonResponse {
        #[from]
        source: serde_json::Error,
    },
    #[error("Expensify API responded with error {code}: {message}")]
    ApiErrorResponse { code: i64, message: String },
    #[error("Generic error: {0}")]
    Generic(String),
}
impl Error {
    pub fn generic(e: impl core::fmt::Display) -> Self {
        Self::Generic(e.to_string())
    }
}
