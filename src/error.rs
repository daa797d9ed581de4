//! Error types and handling for `TravelAI` application

use thiserror::Error;

/// Stable machine-readable error codes exposed by the HTTP layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ConfigMissing,
    ApiNetworkError,
    ApiInvalidResponse,
    GenerationFailed,
    ValidationFailed,
    NotFound,
    Unauthorized,
    StorageFailure,
    Internal,
}

impl ErrorCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::ConfigMissing => "config_missing",
            ErrorCode::ApiNetworkError => "api_network_error",
            ErrorCode::ApiInvalidResponse => "api_invalid_response",
            ErrorCode::GenerationFailed => "generation_failed",
            ErrorCode::ValidationFailed => "validation_failed",
            ErrorCode::NotFound => "not_found",
            ErrorCode::Unauthorized => "unauthorized",
            ErrorCode::StorageFailure => "storage_failure",
            ErrorCode::Internal => "internal",
        }
    }
}

/// Main error type for the `TravelAI` application
#[derive(Error, Debug)]
pub enum TravelAiError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// API communication errors
    #[error("API error: {message}")]
    Api { message: String, code: ErrorCode },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Itinerary generation errors
    #[error("Generation error: {message}")]
    Generation { message: String },

    /// Trip history and cache storage errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Requested record does not exist for this user
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Caller identity missing
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl TravelAiError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error with a specific code
    pub fn api<S: Into<String>>(message: S, code: ErrorCode) -> Self {
        Self::Api {
            message: message.into(),
            code,
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new generation error
    pub fn generation<S: Into<String>>(message: S) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn unauthorized<S: Into<String>>(message: S) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Machine-readable code for this error
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            TravelAiError::Config { .. } => ErrorCode::ConfigMissing,
            TravelAiError::Api { code, .. } => *code,
            TravelAiError::Validation { .. } => ErrorCode::ValidationFailed,
            TravelAiError::Generation { .. } => ErrorCode::GenerationFailed,
            TravelAiError::Storage { .. } | TravelAiError::Io { .. } => ErrorCode::StorageFailure,
            TravelAiError::NotFound { .. } => ErrorCode::NotFound,
            TravelAiError::Unauthorized { .. } => ErrorCode::Unauthorized,
            TravelAiError::General { .. } => ErrorCode::Internal,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TravelAiError::Config { message } => {
                format!("Configuration error: {message}")
            }
            TravelAiError::Api {
                code: ErrorCode::ApiInvalidResponse,
                ..
            } => "An external service returned an unexpected response. Please try again later."
                .to_string(),
            TravelAiError::Api { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            TravelAiError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TravelAiError::Generation { .. } => {
                "Failed to generate itinerary. Please check your Groq API configuration."
                    .to_string()
            }
            TravelAiError::Storage { .. } | TravelAiError::Io { .. } => {
                "Trip history is unavailable right now. Please try again later.".to_string()
            }
            TravelAiError::NotFound { message } | TravelAiError::Unauthorized { message } => {
                message.clone()
            }
            TravelAiError::General { message } => message.clone(),
        }
    }
}

impl From<fjall::Error> for TravelAiError {
    fn from(err: fjall::Error) -> Self {
        TravelAiError::storage(err.to_string())
    }
}

impl From<postcard::Error> for TravelAiError {
    fn from(err: postcard::Error) -> Self {
        TravelAiError::storage(format!("Corrupt record: {err}"))
    }
}

impl From<tokio::task::JoinError> for TravelAiError {
    fn from(err: tokio::task::JoinError) -> Self {
        TravelAiError::storage(format!("Storage task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = TravelAiError::config("missing API key");
        assert!(matches!(config_err, TravelAiError::Config { .. }));

        let api_err = TravelAiError::api("connection failed", ErrorCode::ApiNetworkError);
        assert!(matches!(api_err, TravelAiError::Api { .. }));

        let validation_err = TravelAiError::validation("destination is required");
        assert!(matches!(validation_err, TravelAiError::Validation { .. }));
    }

    #[test]
    fn test_user_messages() {
        let config_err = TravelAiError::config("GROQ_API_KEY is not set");
        assert!(config_err.user_message().contains("GROQ_API_KEY"));

        let api_err = TravelAiError::api("test", ErrorCode::ApiNetworkError);
        assert!(api_err.user_message().contains("Unable to connect"));

        let validation_err = TravelAiError::validation("test input");
        assert!(validation_err.user_message().contains("test input"));

        let invalid_err = TravelAiError::api("test", ErrorCode::ApiInvalidResponse);
        assert!(invalid_err.user_message().contains("unexpected response"));

        let generation_err = TravelAiError::generation("upstream 500");
        assert!(generation_err.user_message().contains("Groq"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(TravelAiError::config("x").code(), ErrorCode::ConfigMissing);
        assert_eq!(
            TravelAiError::api("x", ErrorCode::ApiInvalidResponse).code(),
            ErrorCode::ApiInvalidResponse
        );
        assert_eq!(TravelAiError::not_found("x").code(), ErrorCode::NotFound);
        assert_eq!(ErrorCode::StorageFailure.as_str(), "storage_failure");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let travel_err: TravelAiError = io_err.into();
        assert!(matches!(travel_err, TravelAiError::Io { .. }));
        assert_eq!(travel_err.code(), ErrorCode::StorageFailure);
    }
}
