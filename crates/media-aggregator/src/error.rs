//! Error types shared by the aggregator layers.

use thiserror::Error;

/// Failure class of an upstream call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamStatus {
    /// The call exceeded its timeout
    Timeout,
    /// Connection or transport failure
    Network,
    /// The provider answered with a non-2xx status
    Http(u16),
    /// The payload could not be decoded or reported a query error
    Malformed,
}

impl std::fmt::Display for UpstreamStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamStatus::Timeout => write!(f, "timeout"),
            UpstreamStatus::Network => write!(f, "network"),
            UpstreamStatus::Http(code) => write!(f, "http {}", code),
            UpstreamStatus::Malformed => write!(f, "malformed"),
        }
    }
}

/// A single upstream call failed
#[derive(Debug, Clone, Error)]
#[error("{provider} request failed ({status}): {message}")]
pub struct UpstreamError {
    pub provider: &'static str,
    pub status: UpstreamStatus,
    pub message: String,
}

impl UpstreamError {
    pub fn new(provider: &'static str, status: UpstreamStatus, message: impl Into<String>) -> Self {
        Self {
            provider,
            status,
            message: message.into(),
        }
    }

    pub fn malformed(provider: &'static str, message: impl Into<String>) -> Self {
        Self::new(provider, UpstreamStatus::Malformed, message)
    }

    /// Whether the provider confirmed the requested entity does not exist
    pub fn is_not_found(&self) -> bool {
        self.status == UpstreamStatus::Http(404)
    }
}

/// A provider record lacks a field the unified shape requires
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("{provider} record {id} is missing {field}")]
    MissingField {
        provider: &'static str,
        id: String,
        field: &'static str,
    },
}

impl From<NormalizeError> for UpstreamError {
    fn from(err: NormalizeError) -> Self {
        match &err {
            NormalizeError::MissingField { provider, .. } => {
                UpstreamError::malformed(*provider, err.to_string())
            }
        }
    }
}

/// Errors returned by [`crate::QueryService`]
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

pub type QueryResult<T> = std::result::Result<T, QueryError>;
