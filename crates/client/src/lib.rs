//! OAuth2 client for the Monzo API.
//!
//! [`AuthorizedClient`] drives the authorization-code flow (authorization
//! link, code exchange, optional token file) and performs bearer
//! authenticated queries. Typed resources are built on top of it:
//!
//! - [`Account`], with its balance, spend today and transactions fetched
//!   lazily and cached;
//! - [`Pot`] and [`Transaction`], copied from their payloads;
//! - [`UserAggregate`], every account and pot of the user plus the total
//!   balance.
//!
//! ```rust,no_run
//! use monzo_oauth::{AuthorizedClient, UserAggregate};
//!
//! # async fn run() -> Result<(), monzo_oauth::ClientError> {
//! let client = AuthorizedClient::builder()
//!     .client_id("oauth2client_00009")
//!     .client_secret("mnzconf.secret")
//!     .redirect_uri("http://localhost:8080/callback")
//!     .token_file("config/monzo_token.json")
//!     .build()?;
//!
//! if !client.authorized() {
//!     println!("visit {}", client.get_auth_link());
//!     client.exchange_code("code-from-redirect").await?;
//! }
//!
//! let user = UserAggregate::new(&client);
//! println!("total: {}", user.get_total_balance().await?);
//! # Ok(())
//! # }
//! ```

pub use account::Account;
pub use api_types;
pub use client::{AuthorizedClient, AuthorizedClientBuilder};
pub use credentials::Credentials;
pub use error::ClientError;
pub use oauth::OAuthEndpoints;
pub use pot::Pot;
pub use price::{Price, REFERENCE_CURRENCY};
pub use token_store::TokenStore;
pub use transaction::Transaction;
pub use user::UserAggregate;

pub mod transport;

mod account;
mod client;
mod credentials;
mod error;
mod oauth;
mod pot;
mod price;
mod token_store;
mod transaction;
mod user;

pub type ResultClient<T> = Result<T, ClientError>;
