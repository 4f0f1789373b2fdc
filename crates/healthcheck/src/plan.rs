//! The resolved plan of a healthcheck run.
//!
//! A [`RunPlan`] is read once from the option schemas and validated before
//! anything connects to a database.

use std::fmt;
use std::str::FromStr;

use healthcheck_config::ConfigResult;
use serde::Serialize;

use crate::error::{RunnerError, RunnerResult};
use crate::options::{DatabaseOptions, RunnerOptions};

/// Where and how to connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub driver: String,
}

impl ConnectionSettings {
    /// Reads the connection settings.
    pub fn from_options(options: &dyn DatabaseOptions) -> RunnerResult<Self> {
        let port = options.get_port()?;
        let port: u16 = port
            .trim()
            .parse()
            .map_err(|_| RunnerError::InvalidPort(port.clone()))?;

        let password = if options.is_password() {
            Some(options.get_password()?)
        } else {
            None
        };

        Ok(Self {
            host: options.get_host()?,
            port,
            user: options.get_user()?,
            password,
            driver: options.get_driver()?,
        })
    }

    /// Server URL without credentials, e.g. `mysql://ensro@localhost:3306/`.
    pub fn url(&self) -> String {
        format!("mysql://{}@{}:{}/", self.user, self.host, self.port)
    }
}

/// Which tests to run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TestSelection {
    pub tests: Vec<String>,
    pub groups: Vec<String>,
}

impl TestSelection {
    pub fn from_options(options: &dyn RunnerOptions) -> ConfigResult<Self> {
        let tests = if options.is_tests() {
            options.get_tests()?
        } else {
            Vec::new()
        };
        let groups = if options.is_groups() {
            options.get_groups()?
        } else {
            Vec::new()
        };
        Ok(Self { tests, groups })
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty() && self.groups.is_empty()
    }
}

/// Which results are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputLevel {
    All,
    None,
    #[default]
    Problem,
    Correct,
    Summary,
    Info,
}

impl OutputLevel {
    pub const ALL: [Self; 6] = [
        Self::All,
        Self::None,
        Self::Problem,
        Self::Correct,
        Self::Summary,
        Self::Info,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::None => "none",
            Self::Problem => "problem",
            Self::Correct => "correct",
            Self::Summary => "summary",
            Self::Info => "info",
        }
    }
}

impl FromStr for OutputLevel {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| RunnerError::UnknownOutputLevel(s.to_owned()))
    }
}

impl fmt::Display for OutputLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a run needs, resolved and validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunPlan {
    pub connection: ConnectionSettings,
    pub databases: Vec<String>,
    pub selection: TestSelection,
    pub output: OutputLevel,
}

impl RunPlan {
    /// Resolves and validates the plan.
    pub fn resolve(
        database: &dyn DatabaseOptions,
        runner: &dyn RunnerOptions,
    ) -> RunnerResult<Self> {
        let plan = Self {
            connection: ConnectionSettings::from_options(database)?,
            databases: database.get_databases()?,
            selection: TestSelection::from_options(runner)?,
            output: runner.get_output()?.parse()?,
        };
        plan.validate()?;
        Ok(plan)
    }

    /// Validates the plan.
    pub fn validate(&self) -> RunnerResult<()> {
        validate_connection(&self.connection)?;
        validate_databases(&self.databases)?;
        validate_selection(&self.selection)?;
        Ok(())
    }
}

fn validate_connection(connection: &ConnectionSettings) -> RunnerResult<()> {
    if connection.host.trim().is_empty() {
        return Err(RunnerError::validation("Host cannot be empty"));
    }
    if connection.port == 0 {
        return Err(RunnerError::InvalidPort(connection.port.to_string()));
    }
    if connection.user.trim().is_empty() {
        return Err(RunnerError::validation("User cannot be empty"));
    }
    Ok(())
}

fn validate_databases(databases: &[String]) -> RunnerResult<()> {
    if databases.iter().all(|pattern| pattern.trim().is_empty()) {
        return Err(RunnerError::validation(
            "At least one database pattern is required",
        ));
    }
    Ok(())
}

fn validate_selection(selection: &TestSelection) -> RunnerResult<()> {
    if selection.is_empty() {
        return Err(RunnerError::validation(
            "No tests or groups selected; use --tests or --groups",
        ));
    }
    Ok(())
}
