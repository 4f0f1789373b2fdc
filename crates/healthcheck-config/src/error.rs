//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::value::ValueKind;

/// Errors that can occur while building an option index or resolving options.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The option is not set in any consulted source.
    ///
    /// `sources` carries a dump of every consulted source's state.
    #[error("Option '{name}' is not set in any configuration source:\n{sources}")]
    OptionNotPresent { name: String, sources: String },

    /// An accessor declares a return type that is not an option value type.
    #[error("Unsupported value type '{found}' for accessor '{schema}::{method}'")]
    UnsupportedValueKind {
        schema: String,
        method: String,
        found: String,
    },

    /// An accessor name matches neither the `get*` nor the `is*` convention.
    #[error("Invalid accessor name '{schema}::{method}': expected a get* or is* method")]
    InvalidMethodName { schema: String, method: String },

    /// A non-accessor method was dispatched through a resolver.
    #[error("Unsupported operation '{method}' on option schema '{schema}'")]
    UnsupportedOperation { schema: String, method: String },

    /// A value was resolved with a different kind than the one requested.
    #[error("Option '{name}' has kind {found}, expected {expected}")]
    KindMismatch {
        name: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// File not found at the specified path.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// Failed to read a configuration source.
    #[error("Failed to read {source_name}: {error}")]
    SourceRead {
        source_name: String,
        #[source]
        error: std::io::Error,
    },

    /// Malformed properties content.
    #[error("Malformed properties in {source_name} at line {line}: {message}")]
    Parse {
        source_name: String,
        line: usize,
        message: String,
    },

    /// A raw value could not be decoded as UTF-8.
    #[error("Value of '{key}' in {source_name} is not valid UTF-8")]
    InvalidEncoding { key: String, source_name: String },

    /// Command-line parsing failed (this includes `--help` display).
    #[cfg(feature = "cmdline")]
    #[error(transparent)]
    CommandLine(#[from] clap::Error),
}

impl ConfigError {
    /// Creates an option-not-present error with the given source dump.
    pub fn not_present(name: impl Into<String>, sources: impl Into<String>) -> Self {
        Self::OptionNotPresent {
            name: name.into(),
            sources: sources.into(),
        }
    }

    /// Creates an unsupported-operation error.
    pub fn unsupported_operation(schema: impl Into<String>, method: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            schema: schema.into(),
            method: method.into(),
        }
    }

    /// Creates a kind-mismatch error.
    pub fn kind_mismatch(name: impl Into<String>, expected: ValueKind, found: ValueKind) -> Self {
        Self::KindMismatch {
            name: name.into(),
            expected,
            found,
        }
    }

    /// Creates a source-read error.
    pub fn source_read(source_name: impl Into<String>, error: std::io::Error) -> Self {
        Self::SourceRead {
            source_name: source_name.into(),
            error,
        }
    }

    /// Returns `true` if the error only signals an absent option.
    ///
    /// Every other variant is fatal for cascade resolution.
    pub fn is_not_present(&self) -> bool {
        matches!(self, Self::OptionNotPresent { .. })
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
