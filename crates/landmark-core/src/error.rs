//! Error types for the Landmark Explorer pipeline.
//!
//! Errors are organized by concern so every failure can be turned into a
//! clear, user-facing message at the point where it happens: configuration
//! problems surface at startup, service failures are tagged with the service
//! that produced them, and session misuse is reported without side effects.

use std::fmt;
use thiserror::Error;

/// Top-level error type for Landmark Explorer operations.
#[derive(Error, Debug)]
pub enum ExplorerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote service errors
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Image preparation errors
    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    /// Session state machine errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// A required service setting resolved to nothing
    #[error("Missing required setting {field}. Set {env_var} or edit the config file.")]
    Missing { field: String, env_var: String },
}

/// Which remote service an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Classification,
    Generation,
    Translation,
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceKind::Classification => write!(f, "classification"),
            ServiceKind::Generation => write!(f, "generation"),
            ServiceKind::Translation => write!(f, "translation"),
        }
    }
}

/// Failures talking to one of the three remote services.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Network or connection failure (DNS, refused, timeout)
    #[error("{service} request failed: {message}")]
    Transport { service: ServiceKind, message: String },

    /// Non-success HTTP status
    #[error("{service} service returned HTTP {status_code}: {message}")]
    Status {
        service: ServiceKind,
        status_code: u16,
        message: String,
    },

    /// 2xx response missing the fields we need
    #[error("Unexpected response format from {service} service: {message}")]
    UnexpectedFormat { service: ServiceKind, message: String },
}

impl ServiceError {
    /// The service this error belongs to.
    pub fn service(&self) -> ServiceKind {
        match self {
            ServiceError::Transport { service, .. }
            | ServiceError::Status { service, .. }
            | ServiceError::UnexpectedFormat { service, .. } => *service,
        }
    }

    /// HTTP status code, when the service answered with one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ServiceError::Status { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Map a reqwest send failure onto a transport error.
    pub(crate) fn transport(service: ServiceKind, err: &reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("timed out: {err}")
        } else {
            err.to_string()
        };
        ServiceError::Transport { service, message }
    }
}

/// Errors preparing an image for classification.
#[derive(Error, Debug)]
pub enum ImageError {
    /// No bytes were supplied
    #[error("Image is empty")]
    Empty,

    /// Input exceeds the byte size limit
    #[error("Image too large: {size_mb}MB > {max_mb}MB")]
    FileTooLarge { size_mb: u64, max_mb: u64 },

    /// Decoded dimensions exceed the limit
    #[error("Image too large: {width}x{height} > {max_dim}")]
    DimensionsTooLarge { width: u32, height: u32, max_dim: u32 },

    /// Format could not be recognized or decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// JPEG re-encoding failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// Decoding took too long
    #[error("Decoding timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

/// Session misuse: an operation invoked from a state that does not allow it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Cannot {operation} while the session is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: &'static str,
    },
}

/// Convenience type alias for Landmark Explorer results.
pub type Result<T> = std::result::Result<T, ExplorerError>;

/// Convenience type alias for service call results.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message_names_service_and_code() {
        let err = ServiceError::Status {
            service: ServiceKind::Generation,
            status_code: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.status_code(), Some(500));
        assert_eq!(err.service(), ServiceKind::Generation);
        assert!(err.to_string().contains("generation"));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_missing_setting_mentions_env_var() {
        let err = ConfigError::Missing {
            field: "classifier.endpoint".to_string(),
            env_var: "CV_API_URL".to_string(),
        };
        assert!(err.to_string().contains("CV_API_URL"));
    }

    #[test]
    fn test_transport_has_no_status() {
        let err = ServiceError::Transport {
            service: ServiceKind::Translation,
            message: "connection refused".to_string(),
        };
        assert_eq!(err.status_code(), None);
    }
}
