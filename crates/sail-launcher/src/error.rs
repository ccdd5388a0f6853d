use std::sync::PoisonError;

use thiserror::Error;

pub type LaunchResult<T> = Result<T, LaunchError>;

#[derive(Debug, Error)]
pub enum LaunchError {
    /// A required launch field is absent or empty.
    /// This is always reported before any remote call is made.
    #[error("missing required field: {0}")]
    MissingRequiredField(String),
    #[error("malformed value for {key}: {value:?} ({reason})")]
    MalformedValue {
        key: String,
        value: String,
        reason: String,
    },
    #[error("error in Kubernetes client: {0}")]
    KubeError(#[from] kube::Error),
    #[error("remote call failed: {0}")]
    RemoteCallFailure(String),
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

impl LaunchError {
    pub fn missing(key: impl Into<String>) -> Self {
        LaunchError::MissingRequiredField(key.into())
    }

    pub fn malformed(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        LaunchError::MalformedValue {
            key: key.into(),
            value: value.into(),
            reason: reason.to_string(),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        LaunchError::RemoteCallFailure(message.into())
    }
}

impl From<serde_json::Error> for LaunchError {
    fn from(error: serde_json::Error) -> Self {
        LaunchError::InternalError(error.to_string())
    }
}

impl<T> From<PoisonError<T>> for LaunchError {
    fn from(error: PoisonError<T>) -> Self {
        LaunchError::InternalError(error.to_string())
    }
}
