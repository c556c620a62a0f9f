use thiserror::Error;

/// Errors a backend operation can fail with.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("not supported: {0}")]
    NotSupported(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("no network connection")]
    NoNetwork,

    #[error("not enough disk space: {0}")]
    NoSpace(String),

    #[error("authentication required: {0}")]
    AuthRequired(String),

    #[error("authentication invalid: {0}")]
    AuthInvalid(String),

    #[error("write failed: {0}")]
    WriteFailed(String),

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("timed out: {0}")]
    TimedOut(String),

    #[error("{0}")]
    Failed(String),
}

impl BackendError {
    /// Error returned by operations a backend does not implement.
    pub fn not_supported(backend: &str, operation: &str) -> Self {
        Self::NotSupported(format!("{} does not implement {}", backend, operation))
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported(_))
    }

    /// Whether retrying the same operation later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NoNetwork | Self::TimedOut(_) | Self::DownloadFailed(_)
        )
    }
}
