use std::time::Duration;

use clap::Args;
use monzo_oauth::{AuthorizedClient, OAuthEndpoints};
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/monzo.toml";
const DEFAULT_TOKEN_FILE: &str = "config/monzo_token.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub token_file: String,
    pub api_url: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub timeout_secs: Option<u64>,
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let endpoints = OAuthEndpoints::default();
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://localhost:8080/callback".to_string(),
            token_file: DEFAULT_TOKEN_FILE.to_string(),
            api_url: endpoints.api_url,
            auth_uri: endpoints.auth_uri,
            token_uri: endpoints.token_uri,
            timeout_secs: Some(30),
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn client(&self) -> Result<AuthorizedClient> {
        let mut builder = AuthorizedClient::builder()
            .client_id(&self.client_id)
            .client_secret(&self.client_secret)
            .redirect_uri(&self.redirect_uri)
            .token_file(&self.token_file)
            .endpoints(OAuthEndpoints {
                auth_uri: self.auth_uri.clone(),
                token_uri: self.token_uri.clone(),
                api_url: self.api_url.clone(),
            });
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(builder.build()?)
    }
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    config: Option<String>,
    /// Override the OAuth client id.
    #[arg(long, global = true)]
    client_id: Option<String>,
    /// Override the redirect URI registered for the client.
    #[arg(long, global = true)]
    redirect_uri: Option<String>,
    /// Override where credentials are stored (JSON).
    #[arg(long, global = true)]
    token_file: Option<String>,
    /// Override the log level (e.g. debug).
    #[arg(long, global = true)]
    level: Option<String>,
}

/// Layers the config file, `MONZO_*` environment variables and CLI flags, in
/// increasing priority. The client secret is never read from the command line.
pub fn load(args: &ConfigArgs) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("MONZO"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(client_id) = &args.client_id {
        settings.client_id = client_id.clone();
    }
    if let Some(redirect_uri) = &args.redirect_uri {
        settings.redirect_uri = redirect_uri.clone();
    }
    if let Some(token_file) = &args.token_file {
        settings.token_file = token_file.clone();
    }
    if let Some(level) = &args.level {
        settings.level = level.clone();
    }

    Ok(settings)
}
