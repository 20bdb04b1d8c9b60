use thiserror::Error;

/// Errors raised by deployments, handles and the inference service client
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("inference failed: {0}")]
    Inference(String),

    #[error("{deployment} did not respond within {timeout_ms}ms")]
    Timeout {
        deployment: &'static str,
        timeout_ms: u128,
    },

    #[error("deployment {0} is not running")]
    DeploymentUnavailable(&'static str),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T, E = ServeError> = std::result::Result<T, E>;
