//! Errors the client can return.
//!
//! - [`AuthExchange`] when the token endpoint rejects a code or refresh token.
//! - [`Query`] when an authenticated request fails at the transport level.
//! - [`Parse`] when a response body is not JSON.
//! - [`NotFound`] when an id is absent from the provider listing.
//! - [`InvalidPath`] when a query path would leave the API base.
//! - [`CurrencyMismatch`] when prices in different currencies are summed.
//!
//!  [`AuthExchange`]: ClientError::AuthExchange
//!  [`Query`]: ClientError::Query
//!  [`Parse`]: ClientError::Parse
//!  [`NotFound`]: ClientError::NotFound
//!  [`InvalidPath`]: ClientError::InvalidPath
//!  [`CurrencyMismatch`]: ClientError::CurrencyMismatch
use thiserror::Error;

use crate::transport::TransportError;

/// Client custom errors.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Authorization exchange failed: {0}")]
    AuthExchange(String),
    #[error("Query failed: {0}")]
    Query(#[source] TransportError),
    #[error("Invalid JSON in response: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("Unexpected response shape: {0}")]
    Decode(String),
    #[error("Provider error {code}: {message}")]
    Api { code: String, message: String },
    #[error("{resource} \"{id}\" not found!")]
    NotFound { resource: &'static str, id: String },
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error("Invalid resource path: {0:?}")]
    InvalidPath(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Token storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("Credentials serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl ClientError {
    pub(crate) fn not_found(resource: &'static str, id: &str) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Returns `true` for a by-id lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
