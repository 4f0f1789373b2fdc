//! Option schemas of the healthcheck runner.
//!
//! Both schemas resolve against the same cascade. [`RunnerOptions`] is the
//! full set accepted on the command line; [`DatabaseOptions`] is the subset
//! needed to reach the server under test.

use healthcheck_config::{ConfigResult, option_schema};

/// Connection settings of the database server under test.
#[option_schema]
pub trait DatabaseOptions {
    #[option(short = "h", long = "host")]
    fn get_host(&self) -> ConfigResult<String>;

    fn is_host(&self) -> bool;

    #[option(short = "P", long = "port")]
    fn get_port(&self) -> ConfigResult<String>;

    fn is_port(&self) -> bool;

    #[option(short = "u", long = "user")]
    fn get_user(&self) -> ConfigResult<String>;

    #[option(short = "p", long = "password", alias = "pass")]
    fn get_password(&self) -> ConfigResult<String>;

    fn is_password(&self) -> bool;

    #[option(long = "driver")]
    fn get_driver(&self) -> ConfigResult<String>;

    /// Database name patterns, e.g. `homo_sapiens_core_.*`.
    #[option(short = "d", long = "databases", alias = "database")]
    fn get_databases(&self) -> ConfigResult<Vec<String>>;

    fn is_databases(&self) -> bool;
}

/// Everything a healthcheck run is configured with.
#[option_schema]
pub trait RunnerOptions {
    #[option(short = "h", long = "host")]
    fn get_host(&self) -> ConfigResult<String>;

    #[option(short = "P", long = "port")]
    fn get_port(&self) -> ConfigResult<String>;

    #[option(short = "u", long = "user")]
    fn get_user(&self) -> ConfigResult<String>;

    #[option(short = "p", long = "password", alias = "pass")]
    fn get_password(&self) -> ConfigResult<String>;

    #[option(long = "driver")]
    fn get_driver(&self) -> ConfigResult<String>;

    #[option(short = "d", long = "databases", alias = "database")]
    fn get_databases(&self) -> ConfigResult<Vec<String>>;

    /// Individual tests to run.
    #[option(short = "t", long = "tests", alias = "test")]
    fn get_tests(&self) -> ConfigResult<Vec<String>>;

    fn is_tests(&self) -> bool;

    /// Test groups to run.
    #[option(short = "g", long = "groups", alias = "group")]
    fn get_groups(&self) -> ConfigResult<Vec<String>>;

    fn is_groups(&self) -> bool;

    /// Output level, one of `all`, `none`, `problem`, `correct`, `summary`, `info`.
    #[option(short = "o", long = "output")]
    fn get_output(&self) -> ConfigResult<String>;

    /// Property files to read instead of `database.properties`.
    #[option(short = "c", long = "config")]
    fn get_config(&self) -> ConfigResult<Vec<String>>;

    fn is_config(&self) -> bool;

    #[option(long = "log-level")]
    fn get_log_level(&self) -> ConfigResult<String>;

    fn is_log_level(&self) -> bool;

    #[option(long = "log-format")]
    fn get_log_format(&self) -> ConfigResult<String>;

    fn is_log_format(&self) -> bool;

    #[option(long = "log-file")]
    fn get_log_file(&self) -> ConfigResult<String>;

    fn is_log_file(&self) -> bool;

    /// Print the resolved run plan as JSON.
    #[option(long = "show-config")]
    fn is_show_config(&self) -> bool;

    /// Help is answered by the command-line parser before any option is read.
    fn is_help(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthcheck_config::{AliasIndex, OptionSchema, ValueKind};

    #[test]
    fn test_runner_index() {
        let index = AliasIndex::of::<dyn RunnerOptions>().unwrap();
        assert_eq!(index.schema(), "RunnerOptions");
        assert_eq!(index.aliases_of("host"), ["host", "h"].map(String::from));
        assert_eq!(index.aliases_of("log_level"), ["log_level", "log-level"].map(String::from));
        assert_eq!(index.kind_of("databases"), Some(ValueKind::ListOfStrings));
        assert_eq!(index.kind_of("output"), Some(ValueKind::Scalar));
        assert!(index.descriptor("show_config").unwrap().is_flag());
        assert!(!index.contains("help"));
        assert_eq!(<dyn RunnerOptions as OptionSchema>::excluded(), ["is_help"]);
    }

    #[test]
    fn test_database_options_match_runner_options() {
        let database = AliasIndex::of::<dyn DatabaseOptions>().unwrap();
        let runner = AliasIndex::of::<dyn RunnerOptions>().unwrap();
        for descriptor in database.descriptors() {
            assert_eq!(
                runner.aliases_of(&descriptor.name),
                descriptor.aliases.as_slice(),
                "{}",
                descriptor.name
            );
            assert_eq!(runner.kind_of(&descriptor.name), Some(descriptor.kind));
        }
    }
}
