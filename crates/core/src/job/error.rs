use thiserror::Error;

use crate::backend::BackendError;

/// Terminal error of a job.
#[derive(Debug, Clone, Error)]
pub enum JobError {
    #[error("not supported: {0}")]
    NotSupported(String),

    #[error("job cancelled")]
    Cancelled,

    #[error("backend {backend} failed: {source}")]
    Backend {
        backend: String,
        #[source]
        source: BackendError,
    },

    #[error("refining results failed: {0}")]
    Refine(#[source] Box<JobError>),
}

impl JobError {
    /// Whether the job stopped because it was cancelled, either before
    /// dispatch or by a backend noticing the cancellation.
    pub fn is_cancelled(&self) -> bool {
        match self {
            Self::Cancelled => true,
            Self::Backend { source, .. } => source.is_cancelled(),
            Self::Refine(inner) => inner.is_cancelled(),
            Self::NotSupported(_) => false,
        }
    }

    pub fn is_not_supported(&self) -> bool {
        match self {
            Self::NotSupported(_) => true,
            Self::Backend { source, .. } => source.is_not_supported(),
            Self::Refine(inner) => inner.is_not_supported(),
            Self::Cancelled => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_cancellation_counts_as_cancelled() {
        let err = JobError::Backend {
            backend: "static".to_string(),
            source: BackendError::Cancelled,
        };
        assert!(err.is_cancelled());
        assert_eq!(err.to_string(), "backend static failed: operation cancelled");
    }

    #[test]
    fn test_refine_wraps() {
        let err = JobError::Refine(Box::new(JobError::Cancelled));
        assert!(err.is_cancelled());
        assert!(!err.is_not_supported());
    }
}
