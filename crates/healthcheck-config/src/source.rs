//! Configuration sources.
//!
//! A source is a flat, read-only key/value provider. Sources know nothing
//! about option schemas; alias handling lives in [`crate::backing`].

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::properties;
use crate::value::RawValue;

/// A provider of raw option values.
pub trait ConfigSource: fmt::Debug + Send + Sync {
    /// Human-readable name used in dumps and error messages.
    fn label(&self) -> &str;

    /// Returns `true` if the key is present.
    fn contains(&self, key: &str) -> bool;

    /// Returns the raw value of a key, `Ok(None)` if absent.
    ///
    /// Errors are reserved for genuine read failures.
    fn raw(&self, key: &str) -> ConfigResult<Option<RawValue>>;

    /// Returns all keys, ordered. Dumps list a source through this.
    fn keys(&self) -> Vec<String>;
}

/// A flat string map, typically loaded from a `.properties` file.
#[derive(Debug, Clone, Default)]
pub struct PropertiesSource {
    label: String,
    entries: BTreeMap<String, String>,
}

impl PropertiesSource {
    /// Creates an empty source.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            entries: BTreeMap::new(),
        }
    }

    /// Creates a source from literal pairs. Later pairs overwrite earlier ones.
    pub fn from_pairs<I, K, V>(label: impl Into<String>, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            label: label.into(),
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parses properties text.
    pub fn parse(label: impl Into<String>, text: &str) -> ConfigResult<Self> {
        let label = label.into();
        let pairs = properties::parse(&label, text)?;
        Ok(Self::from_pairs(label, pairs))
    }

    /// Reads and parses a properties file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let label = format!("properties file '{}'", path.display());
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound(path.to_path_buf())
            } else {
                ConfigError::source_read(label.clone(), e)
            }
        })?;
        let source = Self::parse(label, &text)?;
        debug!(path = %path.display(), keys = source.entries.len(), "Loaded properties file");
        Ok(source)
    }

    /// Sets a value, replacing any previous one.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the source has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ConfigSource for PropertiesSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn raw(&self, key: &str) -> ConfigResult<Option<RawValue>> {
        Ok(self.entries.get(key).cloned().map(RawValue::Text))
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

/// A snapshot of the process environment.
///
/// Values are captured once at construction; later changes to the process
/// environment are not observed. Values that are not valid UTF-8 are kept
/// and reported as [`ConfigError::InvalidEncoding`] when read.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    label: String,
    vars: BTreeMap<String, OsString>,
}

impl EnvSource {
    /// Snapshots every environment variable, keys unchanged.
    pub fn snapshot() -> Self {
        Self::from_vars("environment", std::env::vars_os())
    }

    /// Snapshots variables starting with `prefix`.
    ///
    /// The prefix is stripped and the remainder lower-cased, so
    /// `HEALTHCHECK_HOST` is seen as `host`.
    pub fn prefixed(prefix: &str) -> Self {
        let vars = std::env::vars_os().filter_map(|(key, value)| {
            let key = key.into_string().ok()?;
            let stripped = key.strip_prefix(prefix)?;
            (!stripped.is_empty()).then(|| (stripped.to_lowercase(), value))
        });
        Self::from_vars(format!("environment ({prefix}*)"), vars)
    }

    /// Creates a source from explicit variables. Keys that are not valid
    /// UTF-8 are dropped.
    pub fn from_vars<I, K, V>(label: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            label: label.into(),
            vars: vars
                .into_iter()
                .filter_map(|(k, v)| Some((k.into().into_string().ok()?, v.into())))
                .collect(),
        }
    }
}

impl ConfigSource for EnvSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    fn raw(&self, key: &str) -> ConfigResult<Option<RawValue>> {
        let Some(value) = self.vars.get(key) else {
            return Ok(None);
        };
        value
            .to_str()
            .map(|v| Some(RawValue::Text(v.to_owned())))
            .ok_or_else(|| ConfigError::InvalidEncoding {
                key: key.to_owned(),
                source_name: self.label.clone(),
            })
    }

    fn keys(&self) -> Vec<String> {
        self.vars.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_properties_from_pairs_last_wins() {
        let source = PropertiesSource::from_pairs("literal", [("a", "1"), ("a", "2")]);
        assert_eq!(source.raw("a").unwrap(), Some(RawValue::Text("2".into())));
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn test_properties_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "host=ensembldb.ensembl.org\nport=5306").unwrap();

        let source = PropertiesSource::from_path(file.path()).unwrap();
        assert!(source.contains("host"));
        assert_eq!(source.raw("port").unwrap(), Some(RawValue::Text("5306".into())));
        assert!(source.label().contains("properties file"));
        assert_eq!(source.keys(), vec!["host".to_string(), "port".to_string()]);
    }

    #[test]
    fn test_properties_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = PropertiesSource::from_path(dir.path().join("absent.properties")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_properties_parse_error_names_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bad=\\uXYZ1").unwrap();

        let err = PropertiesSource::from_path(file.path()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains(&file.path().display().to_string()));
        assert!(message.contains("line 1"));
    }

    #[test]
    fn test_env_from_vars() {
        let source = EnvSource::from_vars("env", [("host", "a"), ("port", "1")]);
        assert!(source.contains("host"));
        assert!(!source.contains("user"));
        assert_eq!(source.raw("user").unwrap(), None);
        assert_eq!(source.raw("host").unwrap(), Some(RawValue::Text("a".into())));
    }

    #[cfg(unix)]
    #[test]
    fn test_env_invalid_encoding() {
        use std::os::unix::ffi::OsStringExt;

        let bad = OsString::from_vec(vec![0x66, 0xff, 0x6f]);
        let source = EnvSource::from_vars("env", [(OsString::from("host"), bad)]);
        assert!(source.contains("host"));
        let err = source.raw("host").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEncoding { .. }));
    }

    #[test]
    fn test_env_prefixed() {
        // SAFETY: the variable name is unique to this test
        unsafe {
            std::env::set_var("HCTEST_PREFIXED_HOST", "env-host");
        }
        let source = EnvSource::prefixed("HCTEST_PREFIXED_");
        assert_eq!(source.raw("host").unwrap(), Some(RawValue::Text("env-host".into())));
        unsafe {
            std::env::remove_var("HCTEST_PREFIXED_HOST");
        }
    }
}
