//! Healthcheck - configuration front end for the Ensembl database healthchecks.
//!
//! This crate provides:
//! - The option schemas of a run (`DatabaseOptions`, `RunnerOptions`)
//! - The configuration cascade of the `healthcheck` binary (`load_configuration`)
//! - The resolved and validated plan of a run (`RunPlan`)
//! - Logging setup driven by the same options (`LoggingBuilder`)

pub mod error;
pub mod load;
pub mod logging;
pub mod options;
pub mod plan;

// Re-exports
pub use error::{RunnerError, RunnerResult};
pub use load::load_configuration;
pub use logging::{LogFormat, LogOutput, LoggingBuilder};
pub use options::{DatabaseOptions, RunnerOptions};
pub use plan::{ConnectionSettings, OutputLevel, RunPlan, TestSelection};
