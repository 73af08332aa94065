use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{error, warn};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid planner configuration: {message}")]
    Configuration {
        message: String,
        details: Option<JsonValue>,
    },

    #[error("invalid input: {message}")]
    InvalidInput {
        message: String,
        details: Option<JsonValue>,
    },

    #[error("planner `{planner}` failed: {message}")]
    Planner { planner: String, message: String },

    #[error("planner `{planner}` timed out after {millis} ms")]
    Timeout { planner: String, millis: u64 },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn configuration(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::config", %message, "configuration error");
        AppError::Configuration {
            message,
            details: None,
        }
    }

    pub fn configuration_with_details(message: impl Into<String>, details: JsonValue) -> Self {
        let message = message.into();
        warn!(target: "app::config", %message, details = %details, "configuration error with details");
        AppError::Configuration {
            message,
            details: Some(details),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, "invalid input");
        AppError::InvalidInput {
            message,
            details: None,
        }
    }

    pub fn invalid_input_with_details(message: impl Into<String>, details: JsonValue) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, details = %details, "invalid input with details");
        AppError::InvalidInput {
            message,
            details: Some(details),
        }
    }

    pub fn planner(planner: impl Into<String>, message: impl Into<String>) -> Self {
        let planner = planner.into();
        let message = message.into();
        warn!(target: "planner::service", %planner, %message, "external planner error");
        AppError::Planner { planner, message }
    }

    pub fn timeout(planner: impl Into<String>, millis: u64) -> Self {
        let planner = planner.into();
        warn!(target: "planner::service", %planner, millis, "external planner timed out");
        AppError::Timeout { planner, millis }
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::other", %message, "other error");
        AppError::Other(message)
    }

    pub fn details(&self) -> Option<&JsonValue> {
        match self {
            AppError::Configuration { details, .. } | AppError::InvalidInput { details, .. } => {
                details.as_ref()
            }
            _ => None,
        }
    }

    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            AppError::Configuration { .. } | AppError::InvalidInput { .. }
        )
    }
}
