//! Cascade construction from the usual configuration sources.
//!
//! # Priority (highest to lowest)
//!
//! 1. Command line
//! 2. Property files, in the order they were added
//! 3. Environment variables (opt-in, prefixed)
//! 4. Defaults
//!
//! # Example
//!
//! ```rust,ignore
//! use healthcheck_config::CascadeBuilder;
//!
//! let cascade = CascadeBuilder::for_schema::<dyn RunnerOptions>()?
//!     .command_line(std::env::args_os())
//!     .file("run.properties")
//!     .search("database.properties")
//!     .with_env("HEALTHCHECK_")
//!     .defaults_str(include_str!("defaults.properties"))?
//!     .build()?;
//! ```

#[cfg(feature = "cmdline")]
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backing::{Backing, SourceBacking};
#[cfg(feature = "cmdline")]
use crate::cmdline::CommandLineSource;
use crate::cascade::CascadingBacking;
use crate::error::{ConfigError, ConfigResult};
use crate::index::AliasIndex;
use crate::schema::OptionSchema;
use crate::source::{EnvSource, PropertiesSource};

/// Directory name used under the user configuration directory.
pub const USER_CONFIG_DIR: &str = "healthcheck";

/// One property file layer.
#[derive(Debug, Clone)]
enum FileLayer {
    /// Must exist.
    Required(PathBuf),
    /// Looked up in the search paths; skipped if not found.
    Search(String),
}

/// Builder for the standard configuration cascade.
#[derive(Debug)]
pub struct CascadeBuilder {
    index: Arc<AliasIndex>,
    label: String,
    #[cfg(feature = "cmdline")]
    command_line: Option<CommandLineLayer>,
    files: Vec<FileLayer>,
    search_paths: Vec<PathBuf>,
    env_prefix: Option<String>,
    defaults: Option<PropertiesSource>,
}

#[cfg(feature = "cmdline")]
#[derive(Debug)]
enum CommandLineLayer {
    Args(Vec<OsString>),
    Parsed(CommandLineSource),
}

impl CascadeBuilder {
    /// Creates a builder whose sources are interpreted through `index`.
    pub fn new(index: Arc<AliasIndex>) -> Self {
        Self {
            label: format!("{} configuration", index.schema()),
            index,
            #[cfg(feature = "cmdline")]
            command_line: None,
            files: Vec::new(),
            search_paths: Vec::new(),
            env_prefix: None,
            defaults: None,
        }
    }

    /// Creates a builder for a schema type.
    pub fn for_schema<S: OptionSchema + ?Sized>() -> ConfigResult<Self> {
        Ok(Self::new(Arc::new(AliasIndex::of::<S>()?)))
    }

    /// Returns the index sources are interpreted through.
    pub fn index(&self) -> &Arc<AliasIndex> {
        &self.index
    }

    /// Sets the cascade label used in dumps.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Parses `args` (including the binary name) as the command-line layer
    /// when the cascade is built.
    #[cfg(feature = "cmdline")]
    pub fn command_line<I, T>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.command_line = Some(CommandLineLayer::Args(
            args.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Uses an already parsed command line.
    #[cfg(feature = "cmdline")]
    pub fn command_line_source(mut self, source: CommandLineSource) -> Self {
        self.command_line = Some(CommandLineLayer::Parsed(source));
        self
    }

    /// Adds a property file that must exist.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.files
            .push(FileLayer::Required(path.as_ref().to_path_buf()));
        self
    }

    /// Adds a property file looked up by name in the search paths.
    pub fn search(mut self, file_name: impl Into<String>) -> Self {
        self.files.push(FileLayer::Search(file_name.into()));
        self
    }

    /// Adds a search path for [`search`](Self::search) files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Adds the current directory to the search paths.
    pub fn with_current_dir(self) -> Self {
        if let Ok(cwd) = std::env::current_dir() {
            self.search_path(cwd)
        } else {
            self
        }
    }

    /// Adds the user configuration directory to the search paths.
    pub fn with_user_config_dir(self) -> Self {
        if let Some(config_dir) = dirs::config_dir() {
            self.search_path(config_dir.join(USER_CONFIG_DIR))
        } else {
            self
        }
    }

    /// Enables the environment layer for variables starting with `prefix`.
    pub fn with_env(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Disables the environment layer.
    pub fn without_env(mut self) -> Self {
        self.env_prefix = None;
        self
    }

    /// Sets the lowest-priority defaults.
    pub fn defaults(mut self, defaults: PropertiesSource) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Parses properties text as the defaults layer.
    pub fn defaults_str(self, text: &str) -> ConfigResult<Self> {
        let defaults = PropertiesSource::parse("defaults", text)?;
        Ok(self.defaults(defaults))
    }

    /// Builds the cascade.
    pub fn build(self) -> ConfigResult<CascadingBacking> {
        let search_paths = self.resolve_search_paths();
        let mut layers: Vec<Box<dyn Backing>> = Vec::new();

        #[cfg(feature = "cmdline")]
        if let Some(layer) = self.command_line {
            let source = match layer {
                CommandLineLayer::Args(args) => CommandLineSource::parse_from(&self.index, args)?,
                CommandLineLayer::Parsed(source) => source,
            };
            layers.push(Box::new(SourceBacking::new(self.index.clone(), source)));
        }

        for file in &self.files {
            let path = match file {
                FileLayer::Required(path) => {
                    if !path.is_file() {
                        return Err(ConfigError::FileNotFound(path.clone()));
                    }
                    path.clone()
                }
                FileLayer::Search(name) => match find_in(&search_paths, name) {
                    Some(path) => path,
                    None => {
                        warn!(
                            file = %name,
                            paths = ?search_paths,
                            "Property file not found in search paths"
                        );
                        continue;
                    }
                },
            };
            info!(path = %path.display(), "Loading property file");
            let source = PropertiesSource::from_path(&path)?;
            layers.push(Box::new(SourceBacking::new(self.index.clone(), source)));
        }

        if let Some(prefix) = &self.env_prefix {
            let source = EnvSource::prefixed(prefix);
            debug!(prefix = %prefix, "Loading environment variables");
            layers.push(Box::new(SourceBacking::new(self.index.clone(), source)));
        }

        if let Some(defaults) = self.defaults {
            layers.push(Box::new(SourceBacking::new(self.index.clone(), defaults)));
        }

        if layers.is_empty() {
            warn!(cascade = %self.label, "Configuration cascade has no sources");
        }

        Ok(CascadingBacking::new(self.label, layers))
    }

    /// Resolves the effective list of search paths.
    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if !self.search_paths.is_empty() {
            return self.search_paths.clone();
        }
        let mut paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            paths.push(cwd);
        }
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join(USER_CONFIG_DIR));
        }
        paths
    }
}

fn find_in(search_paths: &[PathBuf], name: &str) -> Option<PathBuf> {
    search_paths
        .iter()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
