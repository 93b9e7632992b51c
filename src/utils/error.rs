use thiserror::Error;

#[derive(Error, Debug)]
pub enum StackTestError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Service not found: {service}")]
    ServiceNotFound { service: String },

    #[error("Orchestrator query for {service} failed: {message}")]
    OrchestratorError { service: String, message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// Coarse grouping used in log output and exit diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The orchestrator does not know the service (yet).
    NotFound,
    /// Network, process or IO failure talking to an external system.
    Transport,
    /// An external system answered with something we could not interpret.
    Protocol,
    Configuration,
}

impl StackTestError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            StackTestError::ServiceNotFound { .. } => ErrorCategory::NotFound,
            StackTestError::HttpError(_) | StackTestError::IoError(_) => ErrorCategory::Transport,
            StackTestError::SerializationError(_) | StackTestError::OrchestratorError { .. } => {
                ErrorCategory::Protocol
            }
            StackTestError::ConfigError { .. }
            | StackTestError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            StackTestError::ServiceNotFound { service } => {
                format!("Service '{}' does not exist in the stack", service)
            }
            StackTestError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::NotFound => "Check that the stack is deployed and the service name is correct",
            ErrorCategory::Transport => "Check that Docker is running and DOCKER_HOST points at it",
            ErrorCategory::Protocol => "Check the Docker daemon version and its API response",
            ErrorCategory::Configuration => "Fix the configuration file and run again",
        }
    }
}

pub type Result<T> = std::result::Result<T, StackTestError>;
