//! Healthcheck Config - alias-aware cascading configuration for healthchecks.
//!
//! This crate provides:
//! - Option schemas declared as `get*` / `is*` accessor tables (`OptionSchema`)
//! - The alias index derived from a schema (`AliasIndex`)
//! - Configuration sources: property files, the environment and the command line
//! - Single-source and cascading backings with first-source-wins resolution
//! - Typed accessor dispatch over a backing (`Resolver`)
//!
//! # Resolution Model
//!
//! ```text
//!  schema trait ──#[option_schema]──▶ OptionSchema ──▶ AliasIndex
//!                                                        │
//!  command line ─┐                                       ▼
//!  files ...     ├──▶ SourceBacking (one per source) ──▶ CascadingBacking
//!  environment   │                                       │
//!  defaults ─────┘                                       ▼
//!                                          Resolver<dyn Trait>::get_host()
//! ```
//!
//! Resolution is synchronous, read-only and uncached; every index and
//! backing is immutable after construction and can be shared across threads.
//!
//! # Example
//!
//! ```rust,ignore
//! use healthcheck_config::{CascadeBuilder, ConfigResult, Resolver, option_schema};
//!
//! #[option_schema]
//! pub trait Connection {
//!     #[option(short = "h", long = "host")]
//!     fn get_host(&self) -> ConfigResult<String>;
//!     fn is_host(&self) -> bool;
//! }
//!
//! let cascade = CascadeBuilder::for_schema::<dyn Connection>()?
//!     .command_line(std::env::args_os())
//!     .search("database.properties")
//!     .build()?;
//! let options = Resolver::<dyn Connection>::new(cascade)?;
//! println!("{}", options.get_host()?);
//! ```

pub mod backing;
pub mod cascade;
#[cfg(feature = "cmdline")]
pub mod cmdline;
pub mod dispatch;
pub mod error;
pub mod index;
pub mod loader;
pub mod properties;
pub mod schema;
pub mod source;
pub mod value;

// Re-exports
pub use backing::{Backing, Lookup, SourceBacking};
pub use cascade::CascadingBacking;
#[cfg(feature = "cmdline")]
pub use cmdline::CommandLineSource;
pub use dispatch::{Resolved, Resolver};
pub use error::{ConfigError, ConfigResult};
pub use index::{AliasIndex, OptionDescriptor};
pub use loader::CascadeBuilder;
pub use schema::{Accessor, OptionSchema, ReturnKind, SchemaMethod};
pub use source::{ConfigSource, EnvSource, PropertiesSource};
pub use value::{OptionValue, RawValue, ValueKind};

#[cfg(feature = "macros")]
pub use healthcheck_macros::option_schema;
