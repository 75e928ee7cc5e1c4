#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    path::PathBuf,
    sync::{Arc, Mutex},
};

use monzo_oauth::{
    AuthorizedClient, Credentials, OAuthEndpoints,
    transport::{BoxFuture, HttpResponse, Transport, TransportError, TransportResult},
};
use url::Url;
use uuid::Uuid;

pub const CLIENT_ID: &str = "oauth2client_00009";
pub const CLIENT_SECRET: &str = "mnzconf.secret";
pub const REDIRECT_URI: &str = "http://localhost:8080/callback";

#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: &'static str,
    pub url: String,
    pub bearer: Option<String>,
    pub form: Vec<(String, String)>,
}

#[derive(Clone, Debug)]
enum Reply {
    Response(HttpResponse),
    Fail(String),
}

#[derive(Default)]
struct State {
    routes: HashMap<String, VecDeque<Reply>>,
    requests: Vec<Recorded>,
}

/// In-memory transport keyed by `path` or `path?query` (no leading slash).
///
/// Replies queued for one key are served in order; the last one keeps being
/// served. Unknown keys answer 404 with a provider error envelope.
#[derive(Clone, Default)]
pub struct FakeTransport {
    state: Arc<Mutex<State>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, key: &str, status: u16, body: impl Into<String>) -> &Self {
        self.push(key, Reply::Response(HttpResponse::new(status, body)));
        self
    }

    pub fn respond_json(&self, key: &str, body: serde_json::Value) -> &Self {
        self.respond(key, 200, body.to_string())
    }

    pub fn fail(&self, key: &str, message: &str) -> &Self {
        self.push(key, Reply::Fail(message.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().requests.len()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| {
                let url = Url::parse(&r.url).unwrap();
                url.path().trim_start_matches('/') == path
            })
            .count()
    }

    fn push(&self, key: &str, reply: Reply) {
        self.state
            .lock()
            .unwrap()
            .routes
            .entry(key.to_string())
            .or_default()
            .push_back(reply);
    }

    fn serve(&self, recorded: Recorded) -> TransportResult<HttpResponse> {
        let url = Url::parse(&recorded.url).unwrap();
        let path = url.path().trim_start_matches('/').to_string();
        let full = match url.query() {
            Some(query) => format!("{path}?{query}"),
            None => path.clone(),
        };

        let mut state = self.state.lock().unwrap();
        state.requests.push(recorded);

        let key = if state.routes.contains_key(&full) {
            full
        } else {
            path
        };
        let reply = match state.routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        match reply {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Fail(message)) => Err(TransportError::Other(message)),
            None => Ok(HttpResponse::new(
                404,
                r#"{"code":"not_found","message":"no such route"}"#,
            )),
        }
    }
}

impl Transport for FakeTransport {
    fn get(&self, url: Url, bearer: String) -> BoxFuture<'_, TransportResult<HttpResponse>> {
        let recorded = Recorded {
            method: "GET",
            url: url.to_string(),
            bearer: Some(bearer),
            form: Vec::new(),
        };
        Box::pin(async move { self.serve(recorded) })
    }

    fn post_form(
        &self,
        url: Url,
        form: Vec<(&'static str, String)>,
    ) -> BoxFuture<'_, TransportResult<HttpResponse>> {
        let recorded = Recorded {
            method: "POST",
            url: url.to_string(),
            bearer: None,
            form: form
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        };
        Box::pin(async move { self.serve(recorded) })
    }
}

pub fn endpoints() -> OAuthEndpoints {
    OAuthEndpoints {
        auth_uri: "http://auth.fake.test/".to_string(),
        token_uri: "http://api.fake.test/oauth2/token".to_string(),
        api_url: "http://api.fake.test/".to_string(),
    }
}

pub fn credentials(access_token: &str) -> Credentials {
    Credentials {
        access_token: access_token.to_string(),
        refresh_token: Some("refresh-1".to_string()),
        token_uri: "http://api.fake.test/oauth2/token".to_string(),
        client_id: CLIENT_ID.to_string(),
        client_secret: CLIENT_SECRET.to_string(),
        scopes: String::new(),
        token_expiry: None,
        user_agent: None,
    }
}

pub fn unauthorized_client(transport: &FakeTransport) -> AuthorizedClient {
    AuthorizedClient::builder()
        .client_id(CLIENT_ID)
        .client_secret(CLIENT_SECRET)
        .redirect_uri(REDIRECT_URI)
        .endpoints(endpoints())
        .transport(transport.clone())
        .build()
        .unwrap()
}

pub fn authorized_client(transport: &FakeTransport) -> AuthorizedClient {
    AuthorizedClient::builder()
        .client_id(CLIENT_ID)
        .client_secret(CLIENT_SECRET)
        .redirect_uri(REDIRECT_URI)
        .endpoints(endpoints())
        .credentials(credentials("access-1"))
        .transport(transport.clone())
        .build()
        .unwrap()
}

/// Fresh token file path under `target/test_tokens`.
pub fn token_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../target/test_tokens")
        .join(format!("token_{}.json", Uuid::new_v4()))
}

pub fn account_json(id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "description": "Peter Pan's Account",
        "created": "2015-11-13T12:17:42Z",
        "closed": false
    })
}

pub fn pot_json(id: &str, balance: i64, currency: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": "Savings",
        "style": "beach_ball",
        "balance": balance,
        "currency": currency,
        "created": "2017-11-09T12:30:53.695Z",
        "updated": "2017-11-09T12:30:53.695Z",
        "deleted": false
    })
}

pub fn balance_json(balance: i64, spend_today: i64, currency: &str) -> serde_json::Value {
    serde_json::json!({
        "balance": balance,
        "total_balance": balance,
        "currency": currency,
        "spend_today": spend_today
    })
}

pub fn transaction_json(id: &str, amount: i64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "amount": amount,
        "currency": "GBP",
        "account_balance": 13013,
        "created": "2015-08-22T12:20:18Z",
        "description": "THE DE BEAUVOIR DELI C LONDON GBR",
        "merchant": {"id": "merch_1", "name": "The De Beauvoir Deli Co."},
        "notes": "Salmon sandwich",
        "settled": "2015-08-23T12:20:18Z"
    })
}
