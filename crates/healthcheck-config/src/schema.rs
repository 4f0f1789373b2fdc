//! Option schema declarations.
//!
//! An option schema is a set of accessor methods following the `get*` / `is*`
//! convention. The `#[option_schema]` attribute in `healthcheck-macros`
//! derives an [`OptionSchema`] implementation from a trait; schemas can also
//! be written by hand:
//!
//! ```rust
//! use healthcheck_config::schema::{OptionSchema, ReturnKind, SchemaMethod};
//!
//! struct Connection;
//!
//! impl OptionSchema for Connection {
//!     fn schema_name() -> &'static str {
//!         "Connection"
//!     }
//!
//!     fn methods() -> &'static [SchemaMethod] {
//!         const METHODS: &[SchemaMethod] = &[
//!             SchemaMethod::new("get_host", ReturnKind::Str).short("h").long("host"),
//!             SchemaMethod::new("is_host", ReturnKind::Bool),
//!         ];
//!         METHODS
//!     }
//! }
//! ```

/// Declared return type of an accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnKind {
    /// `String`.
    Str,
    /// `Vec<String>`.
    StrList,
    /// `bool`, only valid for `is*` presence queries.
    Bool,
    /// Any other type, carried by name for error reporting.
    Other(&'static str),
}

impl ReturnKind {
    /// Returns the type name as written in a schema.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Str => "String",
            Self::StrList => "Vec<String>",
            Self::Bool => "bool",
            Self::Other(name) => name,
        }
    }
}

/// One accessor method of an option schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaMethod {
    /// Method name, e.g. `get_host` or `isVerbose`.
    pub name: &'static str,
    /// Short alias (command-line `-x` form).
    pub short: Option<&'static str>,
    /// Long alias (command-line `--xxx` form).
    pub long: Option<&'static str>,
    /// Additional aliases.
    pub aliases: &'static [&'static str],
    /// Declared return type.
    pub returns: ReturnKind,
}

impl SchemaMethod {
    /// Creates a method with no aliases beyond its canonical name.
    pub const fn new(name: &'static str, returns: ReturnKind) -> Self {
        Self {
            name,
            short: None,
            long: None,
            aliases: &[],
            returns,
        }
    }

    /// Sets the short alias.
    pub const fn short(mut self, short: &'static str) -> Self {
        self.short = Some(short);
        self
    }

    /// Sets the long alias.
    pub const fn long(mut self, long: &'static str) -> Self {
        self.long = Some(long);
        self
    }

    /// Sets additional aliases.
    pub const fn aliases(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }
}

/// A statically declared option schema.
///
/// The macro implements this for `dyn Trait`, hence `?Sized` everywhere it is
/// used as a bound.
pub trait OptionSchema {
    /// Schema name used in diagnostics.
    fn schema_name() -> &'static str;

    /// Every accessor of the schema, in declaration order.
    fn methods() -> &'static [SchemaMethod];

    /// Methods that are not options and must be skipped by the index builder.
    fn excluded() -> &'static [&'static str] {
        &[]
    }
}

/// An accessor name decomposed by the `get*` / `is*` convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accessor {
    /// `get_x` / `getX`: resolve the value of `x`.
    Get(String),
    /// `is_x` / `isX`: query whether `x` is set.
    Is(String),
}

impl Accessor {
    /// Parses a method name, returning `None` if it follows neither convention.
    ///
    /// The prefix must be followed by `_` or an upper-case ASCII letter and a
    /// non-empty stem; the canonical name is the stem in lower case.
    pub fn parse(method: &str) -> Option<Self> {
        if let Some(stem) = accessor_stem(method, "get") {
            Some(Self::Get(stem))
        } else {
            accessor_stem(method, "is").map(Self::Is)
        }
    }

    /// Returns the canonical option name.
    pub fn canonical(&self) -> &str {
        match self {
            Self::Get(name) | Self::Is(name) => name,
        }
    }
}

fn accessor_stem(method: &str, prefix: &str) -> Option<String> {
    let rest = method.strip_prefix(prefix)?;
    let stem = match rest.chars().next()? {
        '_' => &rest[1..],
        c if c.is_ascii_uppercase() => rest,
        _ => return None,
    };
    if stem.is_empty() || stem.starts_with('_') {
        return None;
    }
    Some(stem.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snake_case() {
        assert_eq!(Accessor::parse("get_host"), Some(Accessor::Get("host".into())));
        assert_eq!(Accessor::parse("is_verbose"), Some(Accessor::Is("verbose".into())));
        assert_eq!(
            Accessor::parse("get_output_dir"),
            Some(Accessor::Get("output_dir".into()))
        );
    }

    #[test]
    fn test_parse_camel_case() {
        assert_eq!(Accessor::parse("getHost"), Some(Accessor::Get("host".into())));
        assert_eq!(Accessor::parse("isOutputDir"), Some(Accessor::Is("outputdir".into())));
    }

    #[test]
    fn test_parse_rejects_other_names() {
        assert_eq!(Accessor::parse("host"), None);
        assert_eq!(Accessor::parse("get"), None);
        assert_eq!(Accessor::parse("get_"), None);
        assert_eq!(Accessor::parse("getter"), None);
        assert_eq!(Accessor::parse("isolate"), None);
        assert_eq!(Accessor::parse("display"), None);
    }

    #[test]
    fn test_const_builder() {
        const METHOD: SchemaMethod = SchemaMethod::new("get_host", ReturnKind::Str)
            .short("h")
            .long("host")
            .aliases(&["hostname"]);
        assert_eq!(METHOD.short, Some("h"));
        assert_eq!(METHOD.long, Some("host"));
        assert_eq!(METHOD.aliases, &["hostname"]);
        assert_eq!(METHOD.returns.type_name(), "String");
    }
}
