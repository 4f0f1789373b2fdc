//! Logging setup for the healthcheck runner.
//!
//! Logging is configured through the same cascade as every other option:
//!
//! ```text
//! --log-level debug --log-format pretty --log-file /tmp/healthcheck.log
//! ```
//!
//! `RUST_LOG`, when set, takes precedence over the configured level.
//!
//! # Manual Initialization
//!
//! ```rust,ignore
//! use healthcheck::logging::{LogFormat, LoggingBuilder};
//!
//! LoggingBuilder::new()
//!     .with_level(tracing::Level::DEBUG)
//!     .format(LogFormat::Pretty)
//!     .directive("healthcheck_config=trace")
//!     .init();
//! ```

use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::warn;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt as subscriber_fmt};

use crate::error::{RunnerError, RunnerResult};
use crate::options::RunnerOptions;

const DEFAULT_LOG_FILE: &str = "healthcheck.log";

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    #[cfg(feature = "json-log")]
    Json,
}

impl FromStr for LogFormat {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "full" => Ok(Self::Full),
            "pretty" => Ok(Self::Pretty),
            #[cfg(feature = "json-log")]
            "json" => Ok(Self::Json),
            _ => Err(RunnerError::invalid_log_setting("format", s)),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Compact => "compact",
            Self::Full => "full",
            Self::Pretty => "pretty",
            #[cfg(feature = "json-log")]
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    /// Stdout carries the run plan, so logs go to stderr unless redirected.
    #[default]
    Stderr,
    File,
}

/// A builder for configuring logging.
#[derive(Debug, Default)]
pub struct LoggingBuilder {
    directives: Vec<String>,
    level: Option<tracing::Level>,
    format: LogFormat,
    output: LogOutput,
    with_target: bool,
    file_path: Option<PathBuf>,
}

impl LoggingBuilder {
    /// Create a new logging builder.
    pub fn new() -> Self {
        Self {
            with_target: true,
            ..Default::default()
        }
    }

    /// Create a builder from the `log_level`, `log_format` and `log_file`
    /// options. Unset options keep the builder defaults.
    pub fn from_options(options: &dyn RunnerOptions) -> RunnerResult<Self> {
        let mut builder = Self::new();

        if options.is_log_level() {
            let level = options.get_log_level()?;
            builder.level = Some(
                level
                    .trim()
                    .parse()
                    .map_err(|_| RunnerError::invalid_log_setting("level", level))?,
            );
        }

        if options.is_log_format() {
            builder.format = options.get_log_format()?.parse()?;
        }

        if options.is_log_file() {
            builder.output = LogOutput::File;
            builder.file_path = Some(PathBuf::from(options.get_log_file()?));
        }

        Ok(builder)
    }

    /// Set the global log level.
    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Add a filter directive, e.g. `healthcheck_config=trace`.
    pub fn directive(mut self, directive: &str) -> Self {
        self.directives.push(directive.to_string());
        self
    }

    /// Set the output format.
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the output destination.
    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Include the target (module path) in log output.
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    /// Set file path for file output.
    pub fn file_path(mut self, path: PathBuf) -> Self {
        self.file_path = Some(path);
        self
    }

    /// Build the filter from directives.
    fn build_filter(&self) -> EnvFilter {
        let base_level = self.level.unwrap_or(tracing::Level::INFO);
        let base_filter = base_level.to_string().to_lowercase();

        let mut filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&base_filter));

        for directive in &self.directives {
            match directive.parse() {
                Ok(d) => filter = filter.add_directive(d),
                Err(_) => warn!(directive = %directive, "Ignoring invalid log directive"),
            }
        }

        filter
    }

    /// Initialize the logging system.
    pub fn init(self) {
        let _ = self.try_init();
    }

    /// Try to initialize the logging system, returning an error on failure.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let filter = self.build_filter();

        macro_rules! init_with_writer {
            ($writer:expr) => {
                match &self.format {
                    #[cfg(feature = "json-log")]
                    LogFormat::Json => {
                        let layer = subscriber_fmt::layer().json().with_writer($writer);
                        tracing_subscriber::registry()
                            .with(layer)
                            .with(filter)
                            .try_init()
                    }
                    LogFormat::Compact => {
                        let layer = subscriber_fmt::layer()
                            .compact()
                            .with_target(self.with_target)
                            .with_writer($writer);
                        tracing_subscriber::registry()
                            .with(layer)
                            .with(filter)
                            .try_init()
                    }
                    LogFormat::Full => {
                        let layer = subscriber_fmt::layer()
                            .with_target(self.with_target)
                            .with_writer($writer);
                        tracing_subscriber::registry()
                            .with(layer)
                            .with(filter)
                            .try_init()
                    }
                    LogFormat::Pretty => {
                        let layer = subscriber_fmt::layer()
                            .pretty()
                            .with_target(self.with_target)
                            .with_writer($writer);
                        tracing_subscriber::registry()
                            .with(layer)
                            .with(filter)
                            .try_init()
                    }
                }
            };
        }

        match &self.output {
            LogOutput::Stdout => init_with_writer!(std::io::stdout),
            LogOutput::Stderr => init_with_writer!(std::io::stderr),
            LogOutput::File => {
                if let Some(path) = &self.file_path {
                    let file_appender = tracing_appender::rolling::never(
                        path.parent()
                            .filter(|p| !p.as_os_str().is_empty())
                            .unwrap_or_else(|| Path::new(".")),
                        path.file_name()
                            .unwrap_or_else(|| OsStr::new(DEFAULT_LOG_FILE)),
                    );
                    init_with_writer!(file_appender)
                } else {
                    init_with_writer!(std::io::stderr)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthcheck_config::{AliasIndex, PropertiesSource, Resolver, SourceBacking};
    use std::sync::Arc;

    fn options(pairs: &[(&str, &str)]) -> Resolver<dyn RunnerOptions> {
        let index = Arc::new(AliasIndex::of::<dyn RunnerOptions>().unwrap());
        let source = PropertiesSource::from_pairs("test", pairs.iter().copied());
        Resolver::new(SourceBacking::new(index, source)).unwrap()
    }

    #[test]
    fn test_defaults_when_unset() {
        let builder = LoggingBuilder::from_options(&options(&[])).unwrap();
        assert_eq!(builder.level, None);
        assert_eq!(builder.format, LogFormat::Compact);
        assert_eq!(builder.output, LogOutput::Stderr);
    }

    #[test]
    fn test_from_options() {
        let builder = LoggingBuilder::from_options(&options(&[
            ("log-level", "DEBUG"),
            ("log_format", "pretty"),
            ("log_file", "logs/run.log"),
        ]))
        .unwrap();
        assert_eq!(builder.level, Some(tracing::Level::DEBUG));
        assert_eq!(builder.format, LogFormat::Pretty);
        assert_eq!(builder.output, LogOutput::File);
        assert_eq!(builder.file_path, Some(PathBuf::from("logs/run.log")));
    }

    #[test]
    fn test_invalid_settings() {
        let err = LoggingBuilder::from_options(&options(&[("log_level", "loud")])).unwrap_err();
        assert!(matches!(err, RunnerError::InvalidLogSetting { setting: "level", .. }));

        let err = LoggingBuilder::from_options(&options(&[("log_format", "xml")])).unwrap_err();
        assert!(matches!(err, RunnerError::InvalidLogSetting { setting: "format", .. }));
    }

    #[test]
    fn test_format_round_trip() {
        for format in [LogFormat::Compact, LogFormat::Full, LogFormat::Pretty] {
            assert_eq!(format.to_string().parse::<LogFormat>().unwrap(), format);
        }
    }
}
