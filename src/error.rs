use thiserror::Error;

/// Errors raised while starting the client: reading configuration, building
/// the HTTP client or driving the terminal.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

pub fn config_error(msg: impl Into<String>) -> Error {
    Error::Config(msg.into())
}
