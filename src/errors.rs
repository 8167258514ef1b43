use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to obtain access token: `{0}`")]
    AuthenticationError(String),

    #[error("Upstream request failed, status: {status}, body: `{body}`")]
    UpstreamRequestError { status: u16, body: String },

    #[error("Entity lookup failed for incident `{incident_id}`: {message}")]
    EntityLookupError { incident_id: String, message: String },

    #[error("Failed to parse timestamp: `{0}`")]
    TimestampParseError(String),

    #[error("Pagination cursor points back to an already fetched page: `{0}`")]
    PaginationCycle(String),

    #[error("Pagination stopped after reaching the limit of {0} pages")]
    PaginationLimitExceeded(usize),

    #[error("Missing required configuration: `{0}`")]
    MissingConfig(String),

    #[error("Invalid configuration value for {name}: `{value}`")]
    InvalidConfig { name: String, value: String },

    #[error("Reqwest error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Failed to parse json: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid url: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Failed to initialise logging: `{0}`")]
    LoggingError(String),
}

impl AppError {
    pub fn upstream(status: reqwest::StatusCode, body: String) -> AppError {
        AppError::UpstreamRequestError { status: status.as_u16(), body }
    }
}
