//! Authorization-code flow helpers: authorization URL, token endpoint forms
//! and token response parsing.

use api_types::oauth::TokenResponse;
use serde_json::Value;
use url::Url;

use crate::{ClientError, ResultClient, transport::HttpResponse};

const AUTH_URI: &str = "https://auth.monzo.com/";
const TOKEN_URI: &str = "https://api.monzo.com/oauth2/token";
const API_URL: &str = "https://api.monzo.com/";

const ERROR_SNIPPET_LEN: usize = 300;

/// Provider endpoints. Defaults point at the production Monzo API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OAuthEndpoints {
    pub auth_uri: String,
    pub token_uri: String,
    pub api_url: String,
}

impl Default for OAuthEndpoints {
    fn default() -> Self {
        Self {
            auth_uri: AUTH_URI.to_string(),
            token_uri: TOKEN_URI.to_string(),
            api_url: API_URL.to_string(),
        }
    }
}

/// Identity of the registered OAuth application.
#[derive(Clone)]
pub(crate) struct AppIdentity {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Tokens issued by the token endpoint, before they become [`Credentials`].
///
/// [`Credentials`]: crate::Credentials
#[derive(Debug, Clone)]
pub(crate) struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
}

/// Endpoints validated once at client construction.
#[derive(Clone, Debug)]
pub(crate) struct Endpoints {
    pub auth: Url,
    pub token: Url,
    pub api: Url,
}

impl OAuthEndpoints {
    pub(crate) fn resolve(&self) -> ResultClient<Endpoints> {
        let parse = |name: &str, raw: &str| {
            Url::parse(raw.trim())
                .map_err(|err| ClientError::Config(format!("invalid {name}: {err}")))
        };

        let mut api = parse("api_url", &self.api_url)?;
        // Paths are joined onto the base, which must therefore be a directory.
        if !api.path().ends_with('/') {
            let path = format!("{}/", api.path());
            api.set_path(&path);
        }

        Ok(Endpoints {
            auth: parse("auth_uri", &self.auth_uri)?,
            token: parse("token_uri", &self.token_uri)?,
            api,
        })
    }
}

pub(crate) fn authorize_url(auth: &Url, app: &AppIdentity, state: Option<&str>) -> Url {
    let mut url = auth.clone();
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("client_id", &app.client_id)
            .append_pair("redirect_uri", &app.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", "");
        if let Some(state) = state {
            query.append_pair("state", state);
        }
    }
    url
}

/// `api + path`, followed by the url-encoded `options` in the given order.
///
/// `path` is appended segment by segment below the API base, so the request
/// never leaves the API origin. Absolute URLs and `.`/`..` segments are
/// rejected.
pub(crate) fn resource_url(api: &Url, path: &str, options: &[(&str, &str)]) -> ResultClient<Url> {
    if Url::parse(path).is_ok() {
        return Err(ClientError::InvalidPath(path.to_string()));
    }
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.iter().any(|s| matches!(*s, "." | "..")) {
        return Err(ClientError::InvalidPath(path.to_string()));
    }

    let mut url = api.clone();
    url.path_segments_mut()
        .map_err(|()| ClientError::Config(format!("api url cannot be a base: {api}")))?
        .pop_if_empty()
        .extend(segments);
    if !options.is_empty() {
        url.query_pairs_mut().extend_pairs(options);
    }

    if url.origin() != api.origin() {
        return Err(ClientError::InvalidPath(path.to_string()));
    }
    Ok(url)
}

pub(crate) fn exchange_form(app: &AppIdentity, code: &str) -> Vec<(&'static str, String)> {
    vec![
        ("grant_type", "authorization_code".to_string()),
        ("code", code.trim().to_string()),
        ("redirect_uri", app.redirect_uri.trim().to_string()),
        ("client_id", app.client_id.trim().to_string()),
        ("client_secret", app.client_secret.trim().to_string()),
    ]
}

pub(crate) fn refresh_form(app: &AppIdentity, refresh_token: &str) -> Vec<(&'static str, String)> {
    vec![
        ("grant_type", "refresh_token".to_string()),
        ("refresh_token", refresh_token.trim().to_string()),
        ("client_id", app.client_id.trim().to_string()),
        ("client_secret", app.client_secret.trim().to_string()),
    ]
}

pub(crate) fn parse_token_response(response: &HttpResponse) -> ResultClient<TokenSet> {
    if !response.is_success() {
        return Err(ClientError::AuthExchange(describe_rejection(response)));
    }

    let token: TokenResponse = serde_json::from_str(&response.body).map_err(|err| {
        ClientError::AuthExchange(format!("token response json invalid: {err}"))
    })?;

    let access_token = token.access_token.trim();
    if access_token.is_empty() {
        return Err(ClientError::AuthExchange(
            "token response missing access_token".to_string(),
        ));
    }

    let refresh_token = token
        .refresh_token
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let expires_in = token
        .expires_in
        .as_ref()
        .and_then(|value| match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .filter(|secs| *secs > 0);

    Ok(TokenSet {
        access_token: access_token.to_string(),
        refresh_token,
        expires_in,
    })
}

/// Short form of a secret for logs and `Debug`: the first four characters.
pub(crate) fn mask_token(token: &str) -> String {
    let token = token.trim();
    if token.chars().count() <= 8 {
        return "***".to_string();
    }
    let head: String = token.chars().take(4).collect();
    format!("{head}***")
}

/// `status=.. code=.. message=.. body=..` for a rejected token request.
///
/// Both the OAuth error body (`error`, `error_description`) and the provider
/// envelope (`code`, `message`) are understood. Token and secret fields are
/// dropped from the body before it is quoted.
fn describe_rejection(response: &HttpResponse) -> String {
    let mut msg = format!("token endpoint returned status={}", response.status);

    let Ok(Value::Object(mut body)) = serde_json::from_str::<Value>(&response.body) else {
        let snippet: String = response.body.chars().take(ERROR_SNIPPET_LEN).collect();
        msg.push_str(&format!(" body={snippet}"));
        return msg;
    };

    let field = |keys: [&str; 2]| {
        keys.iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    if let Some(code) = field(["error", "code"]) {
        msg.push_str(&format!(" code={code}"));
    }
    if let Some(message) = field(["error_description", "message"]) {
        msg.push_str(&format!(" message={message}"));
    }

    body.retain(|key, _| {
        let key = key.to_ascii_lowercase();
        !(key.contains("token") || key.contains("secret"))
    });
    let snippet: String = Value::Object(body)
        .to_string()
        .chars()
        .take(ERROR_SNIPPET_LEN)
        .collect();
    msg.push_str(&format!(" body={snippet}"));
    msg
}
