//! Cascading backing: first source wins.
//!
//! A [`CascadingBacking`] composes backings in a fixed priority order, the
//! first one being the highest priority. Conventionally the order is
//! command line, then property files in the order given, then defaults.
//!
//! Value lookups stop at the first backing that both recognizes the option
//! and has it set. Presence queries succeed if *any* backing has the option
//! set, so `is_set` can be satisfied by a lower-priority backing than the
//! one `get` answers from:
//!
//! ```rust
//! use std::sync::Arc;
//! use healthcheck_config::{Backing, CascadingBacking, PropertiesSource, SourceBacking};
//! use healthcheck_config::index::AliasIndex;
//! use healthcheck_config::schema::{ReturnKind, SchemaMethod};
//!
//! const METHODS: &[SchemaMethod] = &[
//!     SchemaMethod::new("get_host", ReturnKind::Str),
//!     SchemaMethod::new("get_port", ReturnKind::Str),
//! ];
//! let index = Arc::new(AliasIndex::build("Example", METHODS, &[]).unwrap());
//!
//! let cascade = CascadingBacking::new(
//!     "example",
//!     vec![
//!         Box::new(SourceBacking::new(
//!             index.clone(),
//!             PropertiesSource::from_pairs("command line", [("host", "X")]),
//!         )),
//!         Box::new(SourceBacking::new(
//!             index.clone(),
//!             PropertiesSource::from_pairs("defaults", [("host", "Z"), ("port", "3306")]),
//!         )),
//!     ],
//! );
//!
//! assert_eq!(cascade.get("host").unwrap().to_string(), "X");
//! assert!(cascade.is_set("port"));
//! ```

use std::fmt::Write as _;

use tracing::{debug, trace};

use crate::backing::{Backing, Lookup};
use crate::error::{ConfigError, ConfigResult};
use crate::value::OptionValue;

/// An ordered composition of backings with first-match-wins resolution.
#[derive(Debug)]
pub struct CascadingBacking {
    label: String,
    sources: Vec<Box<dyn Backing>>,
}

impl CascadingBacking {
    /// Creates a cascade. `sources` is in priority order, highest first.
    pub fn new(label: impl Into<String>, sources: Vec<Box<dyn Backing>>) -> Self {
        let label = label.into();
        debug!(
            cascade = %label,
            sources = ?sources.iter().map(|s| s.label()).collect::<Vec<_>>(),
            "Created configuration cascade"
        );
        Self { label, sources }
    }

    /// Returns the backings in priority order.
    pub fn sources(&self) -> &[Box<dyn Backing>] {
        &self.sources
    }

    /// Returns the number of backings.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns `true` if the cascade has no backings.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Returns the label of the backing that `get` would answer from.
    pub fn winning_source(&self, name: &str) -> ConfigResult<Option<&str>> {
        for source in &self.sources {
            if let Lookup::Present(_) = source.lookup(name)? {
                return Ok(Some(source.label()));
            }
        }
        Ok(None)
    }
}

impl Backing for CascadingBacking {
    fn label(&self) -> &str {
        &self.label
    }

    fn recognizes(&self, name: &str) -> bool {
        self.sources.iter().any(|s| s.recognizes(name))
    }

    fn is_set(&self, name: &str) -> bool {
        self.sources.iter().any(|s| s.is_set(name))
    }

    fn lookup(&self, name: &str) -> ConfigResult<Lookup> {
        let mut recognized = false;

        for source in &self.sources {
            match source.lookup(name)? {
                Lookup::Present(value) => {
                    trace!(
                        cascade = %self.label,
                        option = name,
                        source = source.label(),
                        "Option resolved"
                    );
                    return Ok(Lookup::Present(value));
                }
                Lookup::Absent => recognized = true,
                Lookup::Unrecognized => {
                    trace!(option = name, source = source.label(), "Option not declared by source");
                }
            }
        }

        Ok(if recognized {
            Lookup::Absent
        } else {
            Lookup::Unrecognized
        })
    }

    fn dump(&self) -> String {
        let mut out = format!("{} ({} sources)", self.label, self.sources.len());
        for (position, source) in self.sources.iter().enumerate() {
            let _ = write!(out, "\n[{}] ", position + 1);
            for (i, line) in source.dump().lines().enumerate() {
                if i > 0 {
                    out.push_str("\n    ");
                }
                out.push_str(line);
            }
        }
        out
    }

    fn get(&self, name: &str) -> ConfigResult<OptionValue> {
        match self.lookup(name)? {
            Lookup::Present(value) => Ok(value),
            Lookup::Absent | Lookup::Unrecognized => {
                debug!(cascade = %self.label, option = name, "Option not set in any source");
                Err(ConfigError::not_present(name, self.dump()))
            }
        }
    }
}
