use std::fmt;

use thiserror::Error;

/// Message used when the endpoint reports failure without a reason.
pub const INVALID_DATA_MESSAGE: &str = "Invalid data received";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOperation {
    ListYears,
    FetchYearData,
}

impl fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteOperation::ListYears => f.write_str("available years"),
            RemoteOperation::FetchYearData => f.write_str("data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The request could not be completed at all.
    #[error("Network error: Failed to load {operation}")]
    Network { operation: RemoteOperation },
    /// The endpoint answered and reported failure itself.
    #[error("{0}")]
    Server(String),
    #[error("reply addressed to `{received}` but the request used `{expected}`")]
    Mismatch { expected: String, received: String },
    #[error("malformed response: {0}")]
    DataShape(String),
}

impl RemoteError {
    pub fn network(operation: RemoteOperation) -> Self {
        Self::Network { operation }
    }

    pub fn server(reason: impl Into<String>) -> Self {
        Self::Server(reason.into())
    }

    pub fn is_network(&self) -> bool {
        matches!(self, RemoteError::Network { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_message_is_the_reason() {
        assert_eq!(RemoteError::server("bad year").to_string(), "bad year");
    }

    #[test]
    fn network_errors_name_the_operation() {
        let years = RemoteError::network(RemoteOperation::ListYears);
        let data = RemoteError::network(RemoteOperation::FetchYearData);
        assert!(years.is_network());
        assert_eq!(
            years.to_string(),
            "Network error: Failed to load available years"
        );
        assert_eq!(data.to_string(), "Network error: Failed to load data");
        assert!(!RemoteError::server("Network error").is_network());
    }
}
