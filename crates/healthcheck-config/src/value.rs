//! Option value types.

use std::fmt;

use crate::error::{ConfigError, ConfigResult};

/// Delimiter used to encode list values in flat sources.
pub const LIST_DELIMITER: char = ',';

/// Declared kind of an option value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// A single string.
    Scalar,
    /// An ordered list of strings.
    ListOfStrings,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar => f.write_str("scalar"),
            Self::ListOfStrings => f.write_str("list of strings"),
        }
    }
}

/// A resolved option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Scalar(String),
    List(Vec<String>),
}

impl OptionValue {
    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Scalar(_) => ValueKind::Scalar,
            Self::List(_) => ValueKind::ListOfStrings,
        }
    }

    /// Unwraps a scalar value, failing with [`ConfigError::KindMismatch`] otherwise.
    pub fn into_scalar(self, name: &str) -> ConfigResult<String> {
        match self {
            Self::Scalar(value) => Ok(value),
            Self::List(_) => Err(ConfigError::kind_mismatch(
                name,
                ValueKind::Scalar,
                ValueKind::ListOfStrings,
            )),
        }
    }

    /// Unwraps a list value, failing with [`ConfigError::KindMismatch`] otherwise.
    pub fn into_list(self, name: &str) -> ConfigResult<Vec<String>> {
        match self {
            Self::List(items) => Ok(items),
            Self::Scalar(_) => Err(ConfigError::kind_mismatch(
                name,
                ValueKind::ListOfStrings,
                ValueKind::Scalar,
            )),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(value) => f.write_str(value),
            Self::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// A value as stored by a configuration source, before kind conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    /// Flat text, as found in properties files and the environment.
    Text(String),
    /// Already separated items, as produced by repeated command-line flags.
    Items(Vec<String>),
}

impl RawValue {
    /// Converts the raw value into an [`OptionValue`] of the given kind.
    ///
    /// Text requested as a list is split on [`LIST_DELIMITER`] with no
    /// trimming. A single item requested as a scalar is unwrapped; several
    /// items cannot be narrowed to a scalar.
    pub fn into_value(self, name: &str, kind: ValueKind) -> ConfigResult<OptionValue> {
        match (self, kind) {
            (Self::Text(text), ValueKind::Scalar) => Ok(OptionValue::Scalar(text)),
            (Self::Text(text), ValueKind::ListOfStrings) => Ok(OptionValue::List(
                text.split(LIST_DELIMITER).map(str::to_owned).collect(),
            )),
            (Self::Items(items), ValueKind::ListOfStrings) => Ok(OptionValue::List(items)),
            (Self::Items(mut items), ValueKind::Scalar) if items.len() == 1 => {
                Ok(OptionValue::Scalar(items.remove(0)))
            }
            (Self::Items(_), ValueKind::Scalar) => Err(ConfigError::kind_mismatch(
                name,
                ValueKind::Scalar,
                ValueKind::ListOfStrings,
            )),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Items(items) => f.write_str(&items.join(",")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_splitting() {
        let value = RawValue::Text("a,b,c".into())
            .into_value("dbs", ValueKind::ListOfStrings)
            .unwrap();
        assert_eq!(value, OptionValue::List(vec!["a".into(), "b".into(), "c".into()]));
    }

    #[test]
    fn test_single_token_list() {
        let value = RawValue::Text("a".into())
            .into_value("dbs", ValueKind::ListOfStrings)
            .unwrap();
        assert_eq!(value, OptionValue::List(vec!["a".into()]));
    }

    #[test]
    fn test_list_splitting_does_not_trim() {
        let value = RawValue::Text("a, b".into())
            .into_value("dbs", ValueKind::ListOfStrings)
            .unwrap();
        assert_eq!(value, OptionValue::List(vec!["a".into(), " b".into()]));
    }

    #[test]
    fn test_scalar_keeps_commas() {
        let value = RawValue::Text("a,b".into())
            .into_value("host", ValueKind::Scalar)
            .unwrap();
        assert_eq!(value, OptionValue::Scalar("a,b".into()));
    }

    #[test]
    fn test_items_narrowing() {
        let single = RawValue::Items(vec!["x".into()])
            .into_value("host", ValueKind::Scalar)
            .unwrap();
        assert_eq!(single, OptionValue::Scalar("x".into()));

        let err = RawValue::Items(vec!["x".into(), "y".into()])
            .into_value("host", ValueKind::Scalar)
            .unwrap_err();
        assert!(matches!(err, ConfigError::KindMismatch { .. }));
    }

    #[test]
    fn test_into_scalar_mismatch() {
        let err = OptionValue::List(vec![]).into_scalar("host").unwrap_err();
        assert!(!err.is_not_present());
        assert_eq!(err.to_string(), "Option 'host' has kind list of strings, expected scalar");
    }
}
