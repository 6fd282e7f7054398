use thiserror::Error;

/// Failures that stop the driver. Individual request failures are never
/// represented here; they are counted in [`crate::domain::WorkerResult`].
#[derive(Debug, Error)]
pub enum StressError {
    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Target set is empty")]
    NoTargets,

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    #[error("Report output failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = StressError> = std::result::Result<T, E>;
