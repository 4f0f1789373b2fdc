//! Option backings.
//!
//! A [`Backing`] answers presence and value queries for options by canonical
//! name. [`SourceBacking`] does so against a single [`ConfigSource`], trying
//! every alias of the requested option in the index's fixed order.

use std::fmt::{self, Write as _};
use std::sync::Arc;

use tracing::trace;

use crate::error::{ConfigError, ConfigResult};
use crate::index::AliasIndex;
use crate::source::ConfigSource;
use crate::value::OptionValue;

/// Outcome of looking up one option in a backing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The option is not part of this backing's schema.
    Unrecognized,
    /// The option is known but not set.
    Absent,
    /// The option is set.
    Present(OptionValue),
}

/// Answers option queries by canonical name.
pub trait Backing: fmt::Debug + Send + Sync {
    /// Human-readable name used in dumps.
    fn label(&self) -> &str;

    /// Returns `true` if the option belongs to this backing's schema.
    fn recognizes(&self, name: &str) -> bool;

    /// Returns `true` if the option is set. Never fails.
    fn is_set(&self, name: &str) -> bool;

    /// Looks up an option.
    ///
    /// Absence is an ordinary [`Lookup`] outcome; errors are reserved for
    /// failures such as unreadable values or kind mismatches.
    fn lookup(&self, name: &str) -> ConfigResult<Lookup>;

    /// Returns a description of the backing's current state.
    fn dump(&self) -> String;

    /// Resolves an option, failing with [`ConfigError::OptionNotPresent`]
    /// if it is not set.
    fn get(&self, name: &str) -> ConfigResult<OptionValue> {
        match self.lookup(name)? {
            Lookup::Present(value) => Ok(value),
            Lookup::Absent | Lookup::Unrecognized => {
                Err(ConfigError::not_present(name, self.dump()))
            }
        }
    }
}

impl<B: Backing + ?Sized> Backing for Box<B> {
    fn label(&self) -> &str {
        (**self).label()
    }

    fn recognizes(&self, name: &str) -> bool {
        (**self).recognizes(name)
    }

    fn is_set(&self, name: &str) -> bool {
        (**self).is_set(name)
    }

    fn lookup(&self, name: &str) -> ConfigResult<Lookup> {
        (**self).lookup(name)
    }

    fn dump(&self) -> String {
        (**self).dump()
    }
}

impl<B: Backing + ?Sized> Backing for Arc<B> {
    fn label(&self) -> &str {
        (**self).label()
    }

    fn recognizes(&self, name: &str) -> bool {
        (**self).recognizes(name)
    }

    fn is_set(&self, name: &str) -> bool {
        (**self).is_set(name)
    }

    fn lookup(&self, name: &str) -> ConfigResult<Lookup> {
        (**self).lookup(name)
    }

    fn dump(&self) -> String {
        (**self).dump()
    }
}

/// Backing over a single configuration source.
#[derive(Debug, Clone)]
pub struct SourceBacking<S> {
    index: Arc<AliasIndex>,
    source: S,
}

impl<S: ConfigSource> SourceBacking<S> {
    /// Creates a backing that interprets `source` through `index`.
    pub fn new(index: Arc<AliasIndex>, source: S) -> Self {
        Self { index, source }
    }

    /// Returns the alias index.
    pub fn index(&self) -> &Arc<AliasIndex> {
        &self.index
    }

    /// Returns the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: ConfigSource> Backing for SourceBacking<S> {
    fn label(&self) -> &str {
        self.source.label()
    }

    fn recognizes(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    fn is_set(&self, name: &str) -> bool {
        self.index
            .aliases_of(name)
            .iter()
            .any(|alias| self.source.contains(alias))
    }

    fn lookup(&self, name: &str) -> ConfigResult<Lookup> {
        let Some(kind) = self.index.kind_of(name) else {
            return Ok(Lookup::Unrecognized);
        };

        for alias in self.index.aliases_of(name) {
            if let Some(raw) = self.source.raw(alias)? {
                trace!(
                    source = self.source.label(),
                    option = name,
                    alias = %alias,
                    "Resolved option"
                );
                return raw.into_value(name, kind).map(Lookup::Present);
            }
        }

        Ok(Lookup::Absent)
    }

    fn dump(&self) -> String {
        let mut out = format!("{}:", self.source.label());
        let mut any = false;
        // Every key naming an option, shadowed aliases included.
        for key in self.source.keys() {
            let Some(option) = self.index.canonical_for(&key) else {
                continue;
            };
            let value = match self.source.raw(&key) {
                Ok(Some(raw)) => mask(option, raw.to_string()),
                Ok(None) => continue,
                Err(err) => format!("<{err}>"),
            };
            let _ = write!(out, "\n  {}={}", key, value);
            any = true;
        }
        if !any {
            out.push_str(" <no options set>");
        }
        out
    }
}

fn mask(name: &str, value: String) -> String {
    if name.contains("password") && !value.is_empty() {
        "********".to_owned()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ReturnKind, SchemaMethod};
    use crate::source::{EnvSource, PropertiesSource};

    const METHODS: &[SchemaMethod] = &[
        SchemaMethod::new("get_host", ReturnKind::Str).short("h").long("hostname"),
        SchemaMethod::new("get_password", ReturnKind::Str).short("p"),
        SchemaMethod::new("get_databases", ReturnKind::StrList).short("d"),
        SchemaMethod::new("is_verbose", ReturnKind::Bool).short("v"),
    ];

    fn index() -> Arc<AliasIndex> {
        Arc::new(AliasIndex::build("Test", METHODS, &[]).unwrap())
    }

    fn backing(pairs: &[(&str, &str)]) -> SourceBacking<PropertiesSource> {
        SourceBacking::new(
            index(),
            PropertiesSource::from_pairs("props", pairs.iter().copied()),
        )
    }

    #[test]
    fn test_alias_lookup() {
        let b = backing(&[("h", "short-host")]);
        assert!(b.is_set("host"));
        assert_eq!(b.get("host").unwrap(), OptionValue::Scalar("short-host".into()));
    }

    #[test]
    fn test_first_alias_wins() {
        let b = backing(&[("h", "short"), ("hostname", "long"), ("host", "canonical")]);
        assert_eq!(b.get("host").unwrap(), OptionValue::Scalar("canonical".into()));

        let b = backing(&[("h", "short"), ("hostname", "long")]);
        for _ in 0..3 {
            assert_eq!(b.get("host").unwrap(), OptionValue::Scalar("long".into()));
        }
    }

    #[test]
    fn test_absent_and_unrecognized() {
        let b = backing(&[("unrelated", "x")]);
        assert!(!b.is_set("host"));
        assert_eq!(b.lookup("host").unwrap(), Lookup::Absent);
        assert_eq!(b.lookup("unrelated").unwrap(), Lookup::Unrecognized);
        assert!(!b.recognizes("unrelated"));

        let err = b.get("host").unwrap_err();
        assert!(err.is_not_present());
    }

    #[test]
    fn test_is_set_agrees_with_get() {
        let b = backing(&[("host", "a"), ("d", "x,y")]);
        for name in ["host", "password", "databases", "verbose", "unknown"] {
            let get_ok = match b.get(name) {
                Ok(_) => true,
                Err(e) if e.is_not_present() => false,
                Err(e) => panic!("unexpected error: {e}"),
            };
            assert_eq!(b.is_set(name), get_ok, "option {name}");
        }
    }

    #[test]
    fn test_list_option() {
        let b = backing(&[("databases", "a,b,c")]);
        assert_eq!(
            b.get("databases").unwrap(),
            OptionValue::List(vec!["a".into(), "b".into(), "c".into()])
        );
    }

    #[test]
    fn test_flag_option() {
        let b = backing(&[("v", "")]);
        assert!(b.is_set("verbose"));
        assert_eq!(b.get("verbose").unwrap(), OptionValue::Scalar(String::new()));
    }

    #[cfg(unix)]
    #[test]
    fn test_read_failure_is_not_absence() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let env = EnvSource::from_vars(
            "env",
            [(OsString::from("host"), OsString::from_vec(vec![0xff]))],
        );
        let b = SourceBacking::new(index(), env);
        assert!(b.is_set("host"));
        let err = b.get("host").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEncoding { .. }));
    }

    #[test]
    fn test_dump_masks_password() {
        let b = backing(&[("host", "a"), ("p", "secret")]);
        let dump = b.dump();
        assert!(dump.starts_with("props:"));
        assert!(dump.contains("host=a"));
        assert!(dump.contains("p=********"));
        assert!(!dump.contains("secret"));

        assert_eq!(backing(&[]).dump(), "props: <no options set>");
    }

    #[test]
    fn test_dump_lists_source_keys_of_options() {
        let b = backing(&[("h", "short"), ("hostname", "long"), ("unrelated", "x")]);
        assert_eq!(b.dump(), "props:\n  h=short\n  hostname=long");
        assert_eq!(
            backing(&[("unrelated", "x")]).dump(),
            "props: <no options set>"
        );
    }
}
