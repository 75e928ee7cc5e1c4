use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Client(#[from] monzo_oauth::ClientError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("usage error: {0}")]
    Usage(String),
}
