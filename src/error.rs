//! Error types for the reservation pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Broad category of a failure, independent of how many context layers wrap it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed configuration
    Configuration,
    /// File or network not found/unreachable, unreadable data
    Io,
    /// Expected column missing, insufficient class samples, bad k
    DataShape,
    /// Numeric domain violation (e.g. log1p below -1)
    Domain,
    /// Serialization and state misuse
    Internal,
}

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Fetch error: {0}")]
    FetchError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Class {class} has {count} samples, need at least {required}")]
    InsufficientSamples {
        class: i64,
        count: usize,
        required: usize,
    },

    #[error("Domain error: {0}")]
    DomainError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("{context}")]
    Context {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Category of the innermost error
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::ConfigError(_) => ErrorKind::Configuration,
            PipelineError::IoError(_)
            | PipelineError::FetchError(_)
            | PipelineError::DataError(_) => ErrorKind::Io,
            PipelineError::FeatureNotFound(_)
            | PipelineError::ShapeError { .. }
            | PipelineError::InsufficientSamples { .. } => ErrorKind::DataShape,
            PipelineError::DomainError(_) => ErrorKind::Domain,
            PipelineError::SerializationError(_) | PipelineError::ModelNotFitted => {
                ErrorKind::Internal
            }
            PipelineError::Context { source, .. } => source.kind(),
        }
    }

    /// Wrap this error with a description of the operation that failed
    pub fn context(self, context: impl Into<String>) -> Self {
        PipelineError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Attach operation context to a fallible result
pub trait ErrorContext<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<PipelineError>,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().context(context))
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| e.into().context(f()))
    }
}

impl From<polars::error::PolarsError> for PipelineError {
    fn from(err: polars::error::PolarsError) -> Self {
        PipelineError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for PipelineError {
    fn from(err: serde_yaml::Error) -> Self {
        PipelineError::ConfigError(err.to_string())
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(err: reqwest::Error) -> Self {
        PipelineError::FetchError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for PipelineError {
    fn from(err: ndarray::ShapeError) -> Self {
        PipelineError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PipelineError::DataError("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PipelineError = io_err.into();
        assert!(matches!(err, PipelineError::IoError(_)));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_kind_survives_context() {
        let result: Result<()> = Err(PipelineError::DomainError("log1p(-2)".to_string()));
        let err = result
            .context("skewness handling")
            .context("preprocessing train")
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Domain);
        assert_eq!(err.to_string(), "preprocessing train");

        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "skewness handling");
    }
}
