use thiserror::Error;

#[derive(Error, Debug)]
pub enum JenkinsLensError {
    #[error("Jenkins API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not convert id '{0}' to an integer")]
    InvalidBuildId(String),

    #[error("could not find metrics in actions")]
    MetricsNotFound,

    #[error("invalid metrics action: {0}")]
    InvalidMetrics(#[source] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlConstruction(String),
}

pub type Result<T> = std::result::Result<T, JenkinsLensError>;
