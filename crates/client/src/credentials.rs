use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::oauth::{AppIdentity, TokenSet, mask_token};

/// OAuth2 credentials for the Monzo API.
///
/// Credentials are never patched field by field: exchange, refresh, load and
/// [`set_credentials`](crate::AuthorizedClient::set_credentials) always
/// replace the whole value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    /// Always empty: the provider grants full access by default.
    #[serde(default)]
    pub scopes: String,
    pub token_expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Credentials {
    /// Builds credentials from a token endpoint answer. Used by both the code
    /// exchange and the refresh grant.
    ///
    /// A lifetime too large to represent as a timestamp is recorded as no
    /// known expiry.
    pub(crate) fn issued(
        app: &AppIdentity,
        token_uri: &str,
        tokens: TokenSet,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_uri: token_uri.to_string(),
            client_id: app.client_id.clone(),
            client_secret: app.client_secret.clone(),
            scopes: String::new(),
            token_expiry: tokens
                .expires_in
                .and_then(Duration::try_seconds)
                .and_then(|lifetime| now.checked_add_signed(lifetime)),
            user_agent: None,
        }
    }

    /// Returns `true` if the access token can be presented.
    pub fn is_usable(&self) -> bool {
        !self.access_token.trim().is_empty()
    }

    /// Returns `true` if the token expiry is known and not after `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.token_expiry.is_some_and(|expiry| expiry <= now)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &mask_token(&self.access_token))
            .field(
                "refresh_token",
                &self.refresh_token.as_deref().map(mask_token),
            )
            .field("token_uri", &self.token_uri)
            .field("client_id", &self.client_id)
            .field("client_secret", &mask_token(&self.client_secret))
            .field("scopes", &self.scopes)
            .field("token_expiry", &self.token_expiry)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
