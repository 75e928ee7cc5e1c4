//! HTTP transport used by [`AuthorizedClient`](crate::AuthorizedClient).
//!
//! The client never reaches for a global HTTP handle: a [`Transport`] is
//! injected at construction and owned by the client. [`HttpTransport`] is the
//! reqwest-backed default; tests plug in an in-memory fake.

use std::{future::Future, pin::Pin, time::Duration};

use reqwest::{Client, header};
use url::Url;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type TransportResult<T> = Result<T, TransportError>;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    Other(String),
}

/// Status and raw body of a completed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking-free request primitive the client is built on.
///
/// The trait is object-safe so the client can hold a `Box<dyn Transport>`.
/// Implementations must not interpret status codes: a response is returned
/// whenever the server answered at all.
pub trait Transport: Send + Sync {
    /// `GET url` with `Authorization: Bearer <bearer>`.
    fn get(&self, url: Url, bearer: String) -> BoxFuture<'_, TransportResult<HttpResponse>>;

    /// `POST url` with an `application/x-www-form-urlencoded` body.
    fn post_form(
        &self,
        url: Url,
        form: Vec<(&'static str, String)>,
    ) -> BoxFuture<'_, TransportResult<HttpResponse>>;
}

#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> TransportResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let mut builder = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("monzo_oauth/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    async fn read(res: reqwest::Response) -> TransportResult<HttpResponse> {
        let status = res.status().as_u16();
        let body = res.text().await?;
        Ok(HttpResponse { status, body })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: Url, bearer: String) -> BoxFuture<'_, TransportResult<HttpResponse>> {
        Box::pin(async move {
            let res = self.client.get(url).bearer_auth(bearer).send().await?;
            Self::read(res).await
        })
    }

    fn post_form(
        &self,
        url: Url,
        form: Vec<(&'static str, String)>,
    ) -> BoxFuture<'_, TransportResult<HttpResponse>> {
        Box::pin(async move {
            let res = self.client.post(url).form(&form).send().await?;
            Self::read(res).await
        })
    }
}
