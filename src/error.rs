//! Error types for the gateway client
//!
//! Every failure a caller can observe is returned as a `ClientError` value.
//! Gateway-reported validation and custom errors are not errors at this level;
//! they are decoded into [`crate::payments::response::PaymentOutcome`].

use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Failed to encode request for /{path}: {message}")]
    Encode { path: String, message: String },

    #[error("Connection lost after {attempts} attempts: {message}")]
    ConnectionLost { attempts: u32, message: String },

    #[error("Timeout error: {message}")]
    Timeout { message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("{title} ({code})")]
    Server { title: String, code: u16 },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },
}

impl ClientError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn encode(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encode {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn connection_lost(attempts: u32, message: impl Into<String>) -> Self {
        Self::ConnectionLost {
            attempts,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// The distinguished error produced for an HTTP 500 response.
    pub fn internal_server_error() -> Self {
        Self::Server {
            title: "Internal Server Error".to_string(),
            code: 500,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Only a lost connection is retried; everything else is terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConnectionLost { .. })
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Server { .. })
    }

    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::decode(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_server_error_shape() {
        let err = ClientError::internal_server_error();
        assert!(err.is_server_error());
        assert_eq!(err.to_string(), "Internal Server Error (500)");
        match err {
            ClientError::Server { title, code } => {
                assert_eq!(title, "Internal Server Error");
                assert_eq!(code, 500);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_only_connection_lost_is_retryable() {
        assert!(ClientError::connection_lost(4, "reset").is_retryable());
        assert!(!ClientError::timeout("slow").is_retryable());
        assert!(!ClientError::network("dns").is_retryable());
        assert!(!ClientError::decode("bad json").is_retryable());
        assert!(!ClientError::internal_server_error().is_retryable());
    }

    #[test]
    fn test_serde_error_maps_to_decode() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: ClientError = err.into();
        assert!(matches!(err, ClientError::Decode { .. }));
    }
}
