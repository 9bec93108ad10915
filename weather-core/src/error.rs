use std::time::Duration;

use thiserror::Error;

/// Errors produced by the fetch and transformation pipeline.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WeatherError {
    /// The request never produced a response (DNS, connect, TLS, reset...).
    #[error("Network error: {0}")]
    Network(String),

    /// The provider answered with a 5xx status.
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// The provider answered with any other non-success status.
    #[error("HTTP {status}: {message}")]
    Client { status: u16, message: String },

    /// The body was not JSON or lacked a required field.
    #[error("Failed to parse {context}: {message}")]
    Parse { context: String, message: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
}

impl WeatherError {
    pub fn parse(context: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse { context: context.into(), message: message.to_string() }
    }

    /// Transport failures and 5xx answers may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Server { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::Client { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_network_and_server_errors_are_retryable() {
        assert!(WeatherError::Network("reset".into()).is_retryable());
        assert!(WeatherError::Server { status: 503, message: "busy".into() }.is_retryable());
        assert!(!WeatherError::Client { status: 404, message: "city not found".into() }
            .is_retryable());
        assert!(!WeatherError::parse("forecast JSON", "missing field `list`").is_retryable());
        assert!(!WeatherError::Timeout(Duration::from_secs(1)).is_retryable());
    }

    #[test]
    fn http_errors_carry_status_and_message() {
        let err = WeatherError::Client { status: 401, message: "Invalid API key".into() };
        assert_eq!(err.to_string(), "HTTP 401: Invalid API key");
        assert_eq!(err.status(), Some(401));
        assert_eq!(WeatherError::Network("x".into()).status(), None);
    }
}
