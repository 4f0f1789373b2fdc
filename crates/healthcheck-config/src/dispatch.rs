//! Typed dispatch of schema accessors onto a backing.
//!
//! A [`Resolver<S>`] makes a backing usable through the accessor methods of
//! schema `S`. Calls are routed by method name: `get*` resolves the option's
//! value with its declared kind, `is*` answers whether it is set, and
//! anything else is rejected. The `#[option_schema]` macro implements schema
//! traits for `Resolver<dyn Trait>` on top of [`Resolver::invoke`], so
//! callers write `options.get_host()?` rather than a key lookup.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::backing::Backing;
use crate::error::{ConfigError, ConfigResult};
use crate::index::AliasIndex;
use crate::schema::{Accessor, OptionSchema};
use crate::value::OptionValue;

/// Result of dispatching one accessor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Value of a `get*` accessor.
    Value(OptionValue),
    /// Answer of an `is*` accessor.
    Flag(bool),
}

/// Accessor dispatch for schema `S` over a shared backing.
pub struct Resolver<S: ?Sized> {
    index: Arc<AliasIndex>,
    backing: Arc<dyn Backing>,
    _schema: PhantomData<fn(&S)>,
}

impl<S: OptionSchema + ?Sized> Resolver<S> {
    /// Creates a resolver, building the schema's index.
    pub fn new<B: Backing + 'static>(backing: B) -> ConfigResult<Self> {
        Self::shared(Arc::new(backing))
    }

    /// Creates a resolver over a backing shared with other resolvers.
    pub fn shared(backing: Arc<dyn Backing>) -> ConfigResult<Self> {
        let index = Arc::new(AliasIndex::of::<S>()?);
        Ok(Self::with_index(index, backing))
    }
}

impl<S: ?Sized> Resolver<S> {
    /// Creates a resolver from a prebuilt index.
    pub fn with_index(index: Arc<AliasIndex>, backing: Arc<dyn Backing>) -> Self {
        Self {
            index,
            backing,
            _schema: PhantomData,
        }
    }

    /// Returns the schema's index.
    pub fn index(&self) -> &Arc<AliasIndex> {
        &self.index
    }

    /// Returns the backing.
    pub fn backing(&self) -> &Arc<dyn Backing> {
        &self.backing
    }

    /// Dispatches an accessor call by method name.
    pub fn invoke(&self, method: &str) -> ConfigResult<Resolved> {
        let unsupported = || ConfigError::unsupported_operation(self.index.schema(), method);

        let accessor = Accessor::parse(method).ok_or_else(unsupported)?;
        let descriptor = self
            .index
            .descriptor(accessor.canonical())
            .ok_or_else(unsupported)?;

        match accessor {
            Accessor::Get(_) if descriptor.has_getter => {
                let value = self.backing.get(&descriptor.name)?;
                if value.kind() != descriptor.kind {
                    return Err(ConfigError::kind_mismatch(
                        &descriptor.name,
                        descriptor.kind,
                        value.kind(),
                    ));
                }
                Ok(Resolved::Value(value))
            }
            Accessor::Is(_) if descriptor.has_presence => {
                Ok(Resolved::Flag(self.backing.is_set(&descriptor.name)))
            }
            _ => Err(unsupported()),
        }
    }

    /// Dispatches a `get*` accessor declared as a string.
    pub fn scalar(&self, method: &str) -> ConfigResult<String> {
        match self.invoke(method)? {
            Resolved::Value(value) => value.into_scalar(method),
            Resolved::Flag(_) => Err(ConfigError::unsupported_operation(
                self.index.schema(),
                method,
            )),
        }
    }

    /// Dispatches a `get*` accessor declared as a list of strings.
    pub fn list(&self, method: &str) -> ConfigResult<Vec<String>> {
        match self.invoke(method)? {
            Resolved::Value(value) => value.into_list(method),
            Resolved::Flag(_) => Err(ConfigError::unsupported_operation(
                self.index.schema(),
                method,
            )),
        }
    }

    /// Body of the `is*` accessors generated by `#[option_schema]`.
    ///
    /// Presence queries never fail, so every error, including
    /// `UnsupportedOperation` for a method that is not a presence query,
    /// answers `false`. Call [`invoke`](Self::invoke) to see the error.
    #[doc(hidden)]
    pub fn flag(&self, method: &str) -> bool {
        matches!(self.invoke(method), Ok(Resolved::Flag(true)))
    }
}

impl<S: ?Sized> Clone for Resolver<S> {
    fn clone(&self) -> Self {
        Self {
            index: Arc::clone(&self.index),
            backing: Arc::clone(&self.backing),
            _schema: PhantomData,
        }
    }
}

impl<S: ?Sized> fmt::Debug for Resolver<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("schema", &self.index.schema())
            .field("backing", &self.backing.label())
            .finish()
    }
}

impl<S: ?Sized> fmt::Display for Resolver<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.backing.dump())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backing::SourceBacking;
    use crate::cascade::CascadingBacking;
    use crate::schema::{ReturnKind, SchemaMethod};
    use crate::source::PropertiesSource;

    struct Connection;

    impl OptionSchema for Connection {
        fn schema_name() -> &'static str {
            "Connection"
        }

        fn methods() -> &'static [SchemaMethod] {
            const METHODS: &[SchemaMethod] = &[
                SchemaMethod::new("get_host", ReturnKind::Str).short("h"),
                SchemaMethod::new("is_host", ReturnKind::Bool),
                SchemaMethod::new("get_databases", ReturnKind::StrList),
                SchemaMethod::new("is_repair", ReturnKind::Bool),
                SchemaMethod::new("to_display", ReturnKind::Str),
            ];
            METHODS
        }

        fn excluded() -> &'static [&'static str] {
            &["to_display"]
        }
    }

    struct Broken;

    impl OptionSchema for Broken {
        fn schema_name() -> &'static str {
            "Broken"
        }

        fn methods() -> &'static [SchemaMethod] {
            const METHODS: &[SchemaMethod] = &[SchemaMethod::new("host", ReturnKind::Str)];
            METHODS
        }
    }

    fn resolver(pairs: &[(&str, &str)]) -> Resolver<Connection> {
        let index = Arc::new(AliasIndex::of::<Connection>().unwrap());
        let backing = SourceBacking::new(
            index,
            PropertiesSource::from_pairs("props", pairs.iter().copied()),
        );
        Resolver::new(backing).unwrap()
    }

    #[test]
    fn test_get_dispatch() {
        let r = resolver(&[("h", "db-host"), ("databases", "a,b")]);
        assert_eq!(r.scalar("get_host").unwrap(), "db-host");
        assert_eq!(r.list("get_databases").unwrap(), vec!["a", "b"]);
        assert_eq!(
            r.invoke("get_host").unwrap(),
            Resolved::Value(OptionValue::Scalar("db-host".into()))
        );
    }

    #[test]
    fn test_is_dispatch() {
        let r = resolver(&[("repair", "")]);
        assert!(r.flag("is_repair"));
        assert!(!r.flag("is_host"));
        assert_eq!(r.invoke("is_host").unwrap(), Resolved::Flag(false));
    }

    #[test]
    fn test_missing_value() {
        let r = resolver(&[]);
        assert!(r.scalar("get_host").unwrap_err().is_not_present());
    }

    #[test]
    fn test_unsupported_operations() {
        let r = resolver(&[("host", "a")]);
        for method in ["to_display", "display", "get_port", "get_repair", "is_databases"] {
            let err = r.invoke(method).unwrap_err();
            assert!(
                matches!(err, ConfigError::UnsupportedOperation { .. }),
                "{method}: {err}"
            );
        }
        // The generated presence body swallows the error; `invoke` reports it.
        assert!(!r.flag("get_host"));
        assert!(matches!(
            r.invoke("get_host"),
            Ok(Resolved::Value(_))
        ));
        assert!(matches!(
            r.invoke("is_port"),
            Err(ConfigError::UnsupportedOperation { .. })
        ));
        assert!(!r.flag("is_port"));
    }

    #[test]
    fn test_kind_mismatch_between_schemas() {
        const LISTY: &[SchemaMethod] = &[SchemaMethod::new("get_host", ReturnKind::StrList)];
        let listy = Arc::new(AliasIndex::build("Listy", LISTY, &[]).unwrap());
        let cascade = CascadingBacking::new(
            "cascade",
            vec![Box::new(SourceBacking::new(
                listy,
                PropertiesSource::from_pairs("props", [("host", "a,b")]),
            ))],
        );
        let r: Resolver<Connection> = Resolver::new(cascade).unwrap();
        let err = r.scalar("get_host").unwrap_err();
        assert!(matches!(err, ConfigError::KindMismatch { .. }));
    }

    #[test]
    fn test_schema_errors_are_fatal() {
        let backing = SourceBacking::new(
            Arc::new(AliasIndex::default()),
            PropertiesSource::new("empty"),
        );
        let err = Resolver::<Broken>::new(backing).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMethodName { .. }));
    }

    #[test]
    fn test_shared_backing() {
        let r = resolver(&[("host", "a")]);
        let other: Resolver<Connection> =
            Resolver::with_index(Arc::clone(r.index()), Arc::clone(r.backing()));
        assert_eq!(other.scalar("get_host").unwrap(), "a");
        assert!(other.to_string().contains("host=a"));
    }
}
