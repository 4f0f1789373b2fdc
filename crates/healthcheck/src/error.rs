//! Runner error types.

use healthcheck_config::ConfigError;
use thiserror::Error;

/// Errors that stop a healthcheck run before any test is executed.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Building or reading the configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The port is not a number in `1..=65535`.
    #[error("Invalid port '{0}': expected a number between 1 and 65535")]
    InvalidPort(String),

    /// Unknown output level.
    #[error(
        "Unknown output level '{0}': expected one of all, none, problem, correct, summary, info"
    )]
    UnknownOutputLevel(String),

    /// Unknown log level or format.
    #[error("Invalid log {setting} '{value}'")]
    InvalidLogSetting { setting: &'static str, value: String },

    /// Semantically invalid configuration.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The tracing subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    /// The run plan could not be rendered.
    #[error("Failed to render run plan: {0}")]
    Render(#[from] serde_json::Error),
}

impl RunnerError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an invalid log setting error.
    pub fn invalid_log_setting(setting: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidLogSetting {
            setting,
            value: value.into(),
        }
    }

    /// Process exit status for this error.
    ///
    /// Help and version requests exit successfully; everything else is a
    /// configuration error.
    pub fn exit_status(&self) -> u8 {
        match self {
            Self::Config(ConfigError::CommandLine(e)) => u8::try_from(e.exit_code()).unwrap_or(2),
            _ => 2,
        }
    }
}

/// Result type for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;
