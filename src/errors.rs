//! Error types for the Loggly adapter

use reqwest::StatusCode;
use std::fmt;

pub type Result<T> = std::result::Result<T, AdapterError>;

#[derive(Debug)]
pub enum AdapterError {
    /// Missing or invalid adapter configuration
    Config(String),

    /// Outbound event could not be encoded
    Serialization(serde_json::Error),

    /// Network-level failure while talking to the collector
    Transport(reqwest::Error),

    /// Collector answered with something other than 200 OK
    Protocol { status: StatusCode, body: String },

    /// Adapter registry or route failure
    Registry(String),

    /// IO operation failed
    Io(std::io::Error),
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AdapterError::Serialization(err) => write!(f, "Serialization error: {}", err),
            AdapterError::Transport(err) => write!(f, "Error from client: {}", err),
            AdapterError::Protocol { status, body } if body.is_empty() => {
                write!(f, "Received a non 200 status code: {}", status)
            }
            AdapterError::Protocol { status, body } => {
                write!(f, "Received a non 200 status code: {}: {}", status, body)
            }
            AdapterError::Registry(msg) => write!(f, "Registry error: {}", msg),
            AdapterError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for AdapterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AdapterError::Serialization(err) => Some(err),
            AdapterError::Transport(err) => Some(err),
            AdapterError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AdapterError {
    fn from(err: std::io::Error) -> Self {
        AdapterError::Io(err)
    }
}

impl From<reqwest::Error> for AdapterError {
    fn from(err: reqwest::Error) -> Self {
        AdapterError::Transport(err)
    }
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        AdapterError::Serialization(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_uses_status() {
        let err = AdapterError::Protocol {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
        };
        assert_eq!(
            err.to_string(),
            "Received a non 200 status code: 500 Internal Server Error"
        );

        let err = AdapterError::Protocol {
            status: StatusCode::FORBIDDEN,
            body: "invalid token".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Received a non 200 status code: 403 Forbidden: invalid token"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = AdapterError::Config("LOGGLY_TOKEN is not set".to_string());
        assert_eq!(err.to_string(), "Configuration error: LOGGLY_TOKEN is not set");
    }
}
