//! Assembly of the runner's configuration cascade.
//!
//! # Priority (highest to lowest)
//!
//! 1. Command line
//! 2. The `--config` property files, or else `database.properties` found in
//!    the current directory or the user configuration directory
//! 3. `HEALTHCHECK_*` environment variables
//! 4. Built-in defaults

use std::ffi::OsString;
use std::sync::Arc;

use healthcheck_config::{
    AliasIndex, Backing, CascadeBuilder, CommandLineSource, Resolver, SourceBacking,
};
use tracing::debug;

use crate::error::RunnerResult;
use crate::options::RunnerOptions;

/// Built-in defaults.
pub const DEFAULTS: &str = include_str!("defaults.properties");

/// Property file searched for when no `--config` is given.
pub const PROPERTIES_FILE: &str = "database.properties";

/// Prefix of the environment variables read as options.
pub const ENV_PREFIX: &str = "HEALTHCHECK_";

/// Parses `args` (including the binary name) and builds the full cascade.
pub fn load_configuration<I, T>(args: I) -> RunnerResult<Arc<dyn Backing>>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let index = Arc::new(AliasIndex::of::<dyn RunnerOptions>()?);
    let command_line = CommandLineSource::parse_from(&index, args)?;

    // Which files to read is only ever decided by the command line.
    let early: Resolver<dyn RunnerOptions> = Resolver::with_index(
        index.clone(),
        Arc::new(SourceBacking::new(index.clone(), command_line.clone())),
    );

    let mut builder = CascadeBuilder::new(index)
        .label("healthcheck configuration")
        .command_line_source(command_line);

    if early.is_config() {
        for path in early.get_config()? {
            debug!(path = %path, "Using property file from the command line");
            builder = builder.file(path);
        }
    } else {
        builder = builder
            .with_current_dir()
            .with_user_config_dir()
            .search(PROPERTIES_FILE);
    }

    let cascade = builder.with_env(ENV_PREFIX).defaults_str(DEFAULTS)?.build()?;
    Ok(Arc::new(cascade))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RunnerError;
    use healthcheck_config::{ConfigError, OptionValue};
    use std::fs;

    #[test]
    fn test_defaults_parse() {
        let defaults = healthcheck_config::PropertiesSource::parse("defaults", DEFAULTS).unwrap();
        assert!(!defaults.is_empty());
    }

    #[test]
    fn test_config_files_from_command_line() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.properties");
        let second = dir.path().join("second.properties");
        fs::write(&first, "host=first-host\ndatabases=core\n").unwrap();
        fs::write(&second, "host=second-host\nuser=second-user\n").unwrap();

        let config = format!("{},{}", first.display(), second.display());
        let backing =
            load_configuration(["healthcheck", "--config", config.as_str(), "-P", "3307"]).unwrap();

        assert_eq!(backing.get("port").unwrap(), OptionValue::Scalar("3307".into()));
        assert_eq!(backing.get("host").unwrap(), OptionValue::Scalar("first-host".into()));
        assert_eq!(backing.get("user").unwrap(), OptionValue::Scalar("second-user".into()));
        assert_eq!(
            backing.get("driver").unwrap(),
            OptionValue::Scalar("org.gjt.mm.mysql.Driver".into())
        );
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.properties");
        let err = load_configuration(["healthcheck".into(), "-c".into(), missing.into_os_string()])
            .unwrap_err();
        assert!(matches!(err, RunnerError::Config(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_help_request() {
        let err = load_configuration(["healthcheck", "--help"]).unwrap_err();
        assert_eq!(err.exit_status(), 0);

        let err = load_configuration(["healthcheck", "--no-such-option"]).unwrap_err();
        assert_eq!(err.exit_status(), 2);
    }
}
