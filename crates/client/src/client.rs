//! The OAuth2 client: authorization link, code exchange, credential storage
//! and authenticated queries.

use std::{
    fmt,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError, RwLock},
    time::Duration,
};

use api_types::oauth::ErrorResponse;
use chrono::Utc;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use url::Url;

use crate::{
    ClientError, Credentials, ResultClient, TokenStore,
    oauth::{self, AppIdentity, Endpoints, OAuthEndpoints, TokenSet},
    transport::{HttpTransport, Transport},
};

/// Authorized access to the Monzo API.
///
/// The client is either *unauthorized* (no usable credentials) or
/// *authorized*. It becomes authorized when credentials are supplied at
/// construction, loaded from the token file, exchanged from an authorization
/// code, or set explicitly. There is no way back: expired credentials are
/// still presented until the caller refreshes or replaces them.
///
/// Cloning is cheap and every clone shares the same credentials, so resource
/// entities keep a clone to run their own lookups.
#[derive(Clone)]
pub struct AuthorizedClient {
    inner: Arc<Inner>,
}

struct Inner {
    app: AppIdentity,
    endpoints: Endpoints,
    transport: Box<dyn Transport>,
    credentials: RwLock<Option<Credentials>>,
    store: Option<TokenStore>,
    // Serializes setters so memory and the token file agree.
    persist: Mutex<()>,
}

impl AuthorizedClient {
    /// Return a builder for `AuthorizedClient`.
    pub fn builder() -> AuthorizedClientBuilder {
        AuthorizedClientBuilder::default()
    }

    /// Builds a client against the production endpoints.
    ///
    /// `credentials` win over `token_file`; otherwise the token file is loaded
    /// if it exists. Exchanged credentials are written to `token_file`.
    pub fn new(
        client_id: &str,
        client_secret: &str,
        redirect_uri: &str,
        credentials: Option<Credentials>,
        token_file: Option<PathBuf>,
    ) -> ResultClient<Self> {
        let mut builder = Self::builder()
            .client_id(client_id)
            .client_secret(client_secret)
            .redirect_uri(redirect_uri);
        if let Some(credentials) = credentials {
            builder = builder.credentials(credentials);
        }
        if let Some(path) = token_file {
            builder = builder.token_file(path);
        }
        builder.build()
    }

    /// URL the user must visit to grant access to this application.
    pub fn get_auth_link(&self) -> Url {
        oauth::authorize_url(&self.inner.endpoints.auth, &self.inner.app, None)
    }

    /// Same as [`get_auth_link`](Self::get_auth_link) with an anti-forgery
    /// `state` the provider echoes back on the redirect.
    pub fn get_auth_link_with_state(&self, state: &str) -> Url {
        oauth::authorize_url(&self.inner.endpoints.auth, &self.inner.app, Some(state))
    }

    /// Exchanges a one-time authorization code for credentials.
    ///
    /// On success the credentials replace the current ones and are persisted
    /// when a token file is configured.
    pub async fn exchange_code(&self, code: &str) -> ResultClient<Credentials> {
        let form = oauth::exchange_form(&self.inner.app, code);
        let tokens = self.request_tokens(form).await?;
        let credentials = self.issue(tokens);
        self.set_credentials(credentials.clone())?;

        tracing::info!(client_id = %self.inner.app.client_id, "authorization code exchanged");
        Ok(credentials)
    }

    /// Trades the stored refresh token for new credentials.
    ///
    /// Never called implicitly: an expired access token keeps being presented
    /// until the caller decides to refresh. When the provider does not rotate
    /// the refresh token, the current one is kept.
    pub async fn refresh_credentials(&self) -> ResultClient<Credentials> {
        let refresh_token = self
            .credentials()
            .and_then(|c| c.refresh_token)
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ClientError::AuthExchange("no refresh token stored".to_string()))?;

        let form = oauth::refresh_form(&self.inner.app, &refresh_token);
        let mut tokens = self.request_tokens(form).await?;
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = Some(refresh_token);
        }
        let credentials = self.issue(tokens);
        self.set_credentials(credentials.clone())?;

        tracing::info!(client_id = %self.inner.app.client_id, "access token refreshed");
        Ok(credentials)
    }

    /// Replaces the current credentials and persists them when a token file
    /// is configured.
    ///
    /// The token file is written first: when saving fails the error is
    /// returned and the current credentials are left untouched.
    pub fn set_credentials(&self, credentials: Credentials) -> ResultClient<()> {
        let _persist = self
            .inner
            .persist
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(store) = &self.inner.store {
            store.save(&credentials)?;
        }

        *self
            .inner
            .credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(credentials);
        Ok(())
    }

    /// Snapshot of the current credentials.
    pub fn credentials(&self) -> Option<Credentials> {
        self.inner
            .credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `true` iff credentials are present and carry an access token.
    pub fn authorized(&self) -> bool {
        self.inner
            .credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(Credentials::is_usable)
    }

    /// `true` when the stored access token is past its expiry.
    pub fn is_expired(&self) -> bool {
        self.credentials()
            .is_some_and(|credentials| credentials.is_expired(Utc::now()))
    }

    /// Issues `GET <api_url><path>?<options>` with the current access token and
    /// returns the body as JSON.
    ///
    /// An unauthorized client returns an empty object without touching the
    /// network. HTTP status codes are not interpreted: whatever JSON the
    /// provider sent, error envelopes included, is returned as is.
    pub async fn query(&self, path: &str, options: &[(&str, &str)]) -> ResultClient<Value> {
        let Some(credentials) = self.credentials().filter(Credentials::is_usable) else {
            tracing::debug!(path, "client not authorized, returning empty result");
            return Ok(Value::Object(Map::new()));
        };

        let url = oauth::resource_url(&self.inner.endpoints.api, path, options)?;
        tracing::debug!(path, "querying provider");

        let response = self
            .inner
            .transport
            .get(url, credentials.access_token)
            .await
            .map_err(ClientError::Query)?;
        if !response.is_success() {
            tracing::warn!(path, status = response.status, "provider answered with an error status");
        }

        serde_json::from_str(&response.body).map_err(ClientError::Parse)
    }

    /// [`query`](Self::query) followed by a typed decode of the body.
    ///
    /// A provider error envelope (`{"code": .., "message": ..}`) becomes
    /// [`ClientError::Api`].
    pub async fn query_as<T: DeserializeOwned>(
        &self,
        path: &str,
        options: &[(&str, &str)],
    ) -> ResultClient<T> {
        let value = self.query(path, options).await?;
        decode(value)
    }

    async fn request_tokens(&self, form: Vec<(&'static str, String)>) -> ResultClient<TokenSet> {
        let response = self
            .inner
            .transport
            .post_form(self.inner.endpoints.token.clone(), form)
            .await
            .map_err(|err| ClientError::AuthExchange(format!("token request failed: {err}")))?;
        oauth::parse_token_response(&response)
    }

    fn issue(&self, tokens: TokenSet) -> Credentials {
        Credentials::issued(
            &self.inner.app,
            self.inner.endpoints.token.as_str(),
            tokens,
            Utc::now(),
        )
    }
}

impl fmt::Debug for AuthorizedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizedClient")
            .field("client_id", &self.inner.app.client_id)
            .field("api_url", &self.inner.endpoints.api.as_str())
            .field("authorized", &self.authorized())
            .finish_non_exhaustive()
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> ResultClient<T> {
    if let Ok(envelope) = ErrorResponse::deserialize(&value) {
        return Err(ClientError::Api {
            code: envelope.code,
            message: envelope.message,
        });
    }
    serde_json::from_value(value).map_err(|err| ClientError::Decode(err.to_string()))
}

#[derive(Default)]
pub struct AuthorizedClientBuilder {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    credentials: Option<Credentials>,
    token_file: Option<PathBuf>,
    endpoints: OAuthEndpoints,
    transport: Option<Box<dyn Transport>>,
    timeout: Option<Duration>,
}

impl AuthorizedClientBuilder {
    pub fn client_id(mut self, client_id: &str) -> AuthorizedClientBuilder {
        self.client_id = client_id.to_string();
        self
    }

    pub fn client_secret(mut self, client_secret: &str) -> AuthorizedClientBuilder {
        self.client_secret = client_secret.to_string();
        self
    }

    pub fn redirect_uri(mut self, redirect_uri: &str) -> AuthorizedClientBuilder {
        self.redirect_uri = redirect_uri.to_string();
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> AuthorizedClientBuilder {
        self.credentials = Some(credentials);
        self
    }

    pub fn token_file(mut self, path: impl Into<PathBuf>) -> AuthorizedClientBuilder {
        self.token_file = Some(path.into());
        self
    }

    pub fn endpoints(mut self, endpoints: OAuthEndpoints) -> AuthorizedClientBuilder {
        self.endpoints = endpoints;
        self
    }

    /// Replaces the default reqwest transport.
    pub fn transport(mut self, transport: impl Transport + 'static) -> AuthorizedClientBuilder {
        self.transport = Some(Box::new(transport));
        self
    }

    /// Request timeout of the default transport. Ignored with a custom one.
    pub fn timeout(mut self, timeout: Duration) -> AuthorizedClientBuilder {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> ResultClient<AuthorizedClient> {
        tracing::info!("Initializing Monzo client...");

        let app = AppIdentity {
            client_id: required("client_id", self.client_id)?,
            client_secret: required("client_secret", self.client_secret)?,
            redirect_uri: required("redirect_uri", self.redirect_uri)?,
        };
        let endpoints = self.endpoints.resolve()?;

        let store = self.token_file.map(TokenStore::new);
        let credentials = match (self.credentials, &store) {
            (Some(credentials), _) => Some(credentials),
            (None, Some(store)) => {
                let loaded = store.load()?;
                if loaded.is_some() {
                    tracing::info!(path = %store.path().display(), "credentials loaded");
                }
                loaded
            }
            (None, None) => None,
        };

        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(HttpTransport::new(self.timeout).map_err(|err| {
                ClientError::Config(format!("failed to build http client: {err}"))
            })?),
        };

        Ok(AuthorizedClient {
            inner: Arc::new(Inner {
                app,
                endpoints,
                transport,
                credentials: RwLock::new(credentials),
                store,
                persist: Mutex::new(()),
            }),
        })
    }
}

fn required(name: &str, value: String) -> ResultClient<String> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(ClientError::Config(format!("missing {name}")));
    }
    Ok(value)
}
