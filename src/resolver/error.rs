use serde::Serialize;
use thiserror::Error;

/// Failure of a single query
///
/// These are data, not control flow: every failure ends up in a `QueryResult` and is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum QueryError {
    #[error("unknown record type '{record_type}'")]
    UnknownRecordType { record_type: String },
    #[error("invalid query: {reason}")]
    InvalidQuery { reason: String },
    #[error("request timed out")]
    Timeout,
    #[error("transport error: {reason}")]
    Transport { reason: String },
    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },
    #[error("query has been cancelled")]
    Cancelled,
    #[error("query execution panicked")]
    RuntimePanic,
}

impl QueryError {
    pub(crate) fn transport<E: std::fmt::Display>(err: E) -> QueryError {
        QueryError::Transport {
            reason: err.to_string(),
        }
    }

    pub(crate) fn malformed<E: std::fmt::Display>(err: E) -> QueryError {
        QueryError::MalformedResponse {
            reason: err.to_string(),
        }
    }

    /// Failures raised before anything has been sent over the wire
    pub fn is_pre_flight(&self) -> bool {
        matches!(
            self,
            QueryError::UnknownRecordType { .. } | QueryError::InvalidQuery { .. }
        )
    }
}
