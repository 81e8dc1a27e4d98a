use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// Network failure, request timeout, or a non-2xx HTTP status.
    #[error("transport error: {0}")]
    Transport(String),

    /// A response body that could not be parsed as JSON at all.
    /// Missing nested fields are not malformed; they degrade to an empty page.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Anything unanticipated; aborts the whole run.
    #[error("{0}")]
    Fatal(String),
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::MalformedResponse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
