//! Error types for upstream management API calls.

/// All errors that can occur while talking to the management API.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("Auth error: {0}")]
    Auth(String),

    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;
