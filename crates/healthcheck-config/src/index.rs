//! Alias index built from an option schema.
//!
//! The index answers three questions for every option of a schema:
//!
//! - which aliases a source may know it by (`aliases_of`)
//! - which kind of value it holds (`kind_of`)
//! - which option an alias belongs to (`canonical_for`)
//!
//! It is computed once and never mutated, so it is shared behind an `Arc`.

use std::collections::{BTreeMap, HashMap};

use tracing::{trace, warn};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{Accessor, OptionSchema, ReturnKind, SchemaMethod};
use crate::value::ValueKind;

/// Everything known about one option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDescriptor {
    /// Canonical name, the lower-cased accessor stem.
    pub name: String,
    /// Short alias, if declared.
    pub short: Option<String>,
    /// Long alias, if declared.
    pub long: Option<String>,
    /// All aliases in lookup order: canonical, long, short, extras.
    pub aliases: Vec<String>,
    /// Declared value kind.
    pub kind: ValueKind,
    /// Whether the schema has a `get*` accessor for this option.
    pub has_getter: bool,
    /// Whether the schema has an `is*` accessor for this option.
    pub has_presence: bool,
}

impl OptionDescriptor {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            short: None,
            long: None,
            aliases: vec![name.to_owned()],
            kind: ValueKind::Scalar,
            has_getter: false,
            has_presence: false,
        }
    }

    fn add_alias(&mut self, alias: &str) {
        if !self.aliases.iter().any(|a| a == alias) {
            self.aliases.push(alias.to_owned());
        }
    }

    /// Returns `true` for options that only have a presence query.
    pub fn is_flag(&self) -> bool {
        self.has_presence && !self.has_getter
    }
}

/// Immutable alias index of one option schema.
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    schema: String,
    options: BTreeMap<String, OptionDescriptor>,
    by_alias: HashMap<String, String>,
}

impl AliasIndex {
    /// Builds the index of a schema type.
    pub fn of<S: OptionSchema + ?Sized>() -> ConfigResult<Self> {
        Self::build(S::schema_name(), S::methods(), S::excluded())
    }

    /// Builds an index from a method table and a deny-list.
    pub fn build(
        schema: &str,
        methods: &[SchemaMethod],
        excluded: &[&str],
    ) -> ConfigResult<Self> {
        let mut options: BTreeMap<String, OptionDescriptor> = BTreeMap::new();

        for method in methods {
            if excluded.contains(&method.name) {
                trace!(schema, method = method.name, "Skipping excluded method");
                continue;
            }

            let accessor =
                Accessor::parse(method.name).ok_or_else(|| ConfigError::InvalidMethodName {
                    schema: schema.to_owned(),
                    method: method.name.to_owned(),
                })?;

            let descriptor = options
                .entry(accessor.canonical().to_owned())
                .or_insert_with(|| OptionDescriptor::new(accessor.canonical()));

            match (&accessor, method.returns) {
                (Accessor::Get(_), ReturnKind::Str) => {
                    descriptor.kind = ValueKind::Scalar;
                    descriptor.has_getter = true;
                }
                (Accessor::Get(_), ReturnKind::StrList) => {
                    descriptor.kind = ValueKind::ListOfStrings;
                    descriptor.has_getter = true;
                }
                (Accessor::Is(_), ReturnKind::Bool) => descriptor.has_presence = true,
                (_, other) => {
                    return Err(ConfigError::UnsupportedValueKind {
                        schema: schema.to_owned(),
                        method: method.name.to_owned(),
                        found: other.type_name().to_owned(),
                    });
                }
            }

            if let Some(long) = method.long {
                descriptor.long.get_or_insert_with(|| long.to_owned());
            }
            if let Some(short) = method.short {
                descriptor.short.get_or_insert_with(|| short.to_owned());
            }
            for alias in method.aliases {
                descriptor.add_alias(alias);
            }
        }

        // Long and short go right after the canonical name, whichever
        // accessor declared them.
        for descriptor in options.values_mut() {
            let extras = descriptor.aliases.split_off(1);
            if let Some(long) = descriptor.long.clone() {
                descriptor.add_alias(&long);
            }
            if let Some(short) = descriptor.short.clone() {
                descriptor.add_alias(&short);
            }
            for alias in extras {
                descriptor.add_alias(&alias);
            }
        }

        // Canonical names always belong to their own option; any other alias
        // goes to the first option (in canonical order) that declares it.
        let mut by_alias: HashMap<String, String> = options
            .keys()
            .map(|name| (name.clone(), name.clone()))
            .collect();
        for descriptor in options.values_mut() {
            let name = descriptor.name.clone();
            descriptor.aliases.retain(|alias| {
                if *alias == name {
                    return true;
                }
                match by_alias.get(alias) {
                    Some(owner) => {
                        warn!(
                            schema,
                            alias = %alias,
                            owner = %owner,
                            dropped_from = %name,
                            "Alias declared by two options, keeping the first"
                        );
                        false
                    }
                    None => {
                        by_alias.insert(alias.clone(), name.clone());
                        true
                    }
                }
            });
            // A dropped long or short no longer names this option anywhere.
            let aliases = &descriptor.aliases;
            if descriptor.long.as_ref().is_some_and(|l| !aliases.contains(l)) {
                descriptor.long = None;
            }
            if descriptor.short.as_ref().is_some_and(|s| !aliases.contains(s)) {
                descriptor.short = None;
            }
        }

        trace!(schema, options = options.len(), "Built alias index");

        Ok(Self {
            schema: schema.to_owned(),
            options,
            by_alias,
        })
    }

    /// Returns the schema name.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Returns `true` if the schema declares the option.
    pub fn contains(&self, name: &str) -> bool {
        self.options.contains_key(name)
    }

    /// Returns the descriptor of an option.
    pub fn descriptor(&self, name: &str) -> Option<&OptionDescriptor> {
        self.options.get(name)
    }

    /// Iterates over all descriptors, ordered by canonical name.
    pub fn descriptors(&self) -> impl Iterator<Item = &OptionDescriptor> {
        self.options.values()
    }

    /// Returns the aliases of an option in lookup order.
    pub fn aliases_of(&self, name: &str) -> &[String] {
        self.options
            .get(name)
            .map(|d| d.aliases.as_slice())
            .unwrap_or(&[])
    }

    /// Returns the declared kind of an option.
    pub fn kind_of(&self, name: &str) -> Option<ValueKind> {
        self.options.get(name).map(|d| d.kind)
    }

    /// Returns the canonical option an alias belongs to.
    pub fn canonical_for(&self, alias: &str) -> Option<&str> {
        self.by_alias.get(alias).map(String::as_str)
    }

    /// Returns the number of options.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns `true` if the schema declares no options.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
