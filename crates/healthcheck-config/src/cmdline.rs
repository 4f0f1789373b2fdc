//! Command-line configuration source.
//!
//! The argument grammar is left to clap; this module only derives a clap
//! [`Command`] from an [`AliasIndex`] and exposes the parsed result as a
//! [`ConfigSource`]:
//!
//! - every option becomes `--<long>` (the canonical name if no long alias is
//!   declared) and `-<short>` when the short alias is a single character
//! - other aliases become hidden long aliases
//! - list options may be repeated and split on `,`
//! - presence-only options are flags
//!
//! clap's automatic `-h` is disabled so that `-h` stays available to
//! options; help is reachable through `--help`.

use std::collections::BTreeMap;
use std::ffi::OsString;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::debug;

use crate::error::ConfigResult;
use crate::index::{AliasIndex, OptionDescriptor};
use crate::source::ConfigSource;
use crate::value::{LIST_DELIMITER, RawValue, ValueKind};

const HELP_ID: &str = "help";

/// Values given on the command line, keyed by canonical option name.
#[derive(Debug, Clone, Default)]
pub struct CommandLineSource {
    label: String,
    values: BTreeMap<String, RawValue>,
}

impl CommandLineSource {
    /// Builds the clap command for an index.
    pub fn command(index: &AliasIndex) -> Command {
        let mut command = Command::new(index.schema().to_owned())
            .disable_help_flag(true)
            .disable_version_flag(true);

        let help_taken = index.contains(HELP_ID) || index.canonical_for(HELP_ID).is_some();
        if !help_taken {
            command = command.arg(
                Arg::new(HELP_ID)
                    .long(HELP_ID)
                    .action(ArgAction::Help)
                    .help("Print help"),
            );
        }

        for descriptor in index.descriptors() {
            command = command.arg(option_arg(descriptor));
        }
        command
    }

    /// Parses `args` (including the binary name) against an index.
    ///
    /// Help requests and grammar errors are returned as
    /// [`ConfigError::CommandLine`](crate::ConfigError::CommandLine).
    pub fn parse_from<I, T>(index: &AliasIndex, args: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = Self::command(index).try_get_matches_from(args)?;
        Ok(Self::from_matches(index, &matches))
    }

    /// Extracts the values that were actually given on the command line.
    pub fn from_matches(index: &AliasIndex, matches: &ArgMatches) -> Self {
        let mut values = BTreeMap::new();

        for descriptor in index.descriptors() {
            let id = descriptor.name.as_str();
            if matches.value_source(id) != Some(ValueSource::CommandLine) {
                continue;
            }

            let raw = if descriptor.is_flag() {
                RawValue::Text("true".to_owned())
            } else {
                match descriptor.kind {
                    ValueKind::ListOfStrings => RawValue::Items(
                        matches
                            .get_many::<String>(id)
                            .map(|items| items.cloned().collect())
                            .unwrap_or_default(),
                    ),
                    ValueKind::Scalar => match matches.get_one::<String>(id) {
                        Some(value) => RawValue::Text(value.clone()),
                        None => continue,
                    },
                }
            };
            values.insert(descriptor.name.clone(), raw);
        }

        debug!(options = ?values.keys().collect::<Vec<_>>(), "Parsed command line");

        Self {
            label: "command line".to_owned(),
            values,
        }
    }
}

fn option_arg(descriptor: &OptionDescriptor) -> Arg {
    let long = descriptor
        .long
        .clone()
        .unwrap_or_else(|| descriptor.name.clone());

    let mut arg = Arg::new(descriptor.name.clone()).long(long.clone());

    for alias in &descriptor.aliases {
        if *alias == long {
            continue;
        }
        let mut chars = alias.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if descriptor.short.as_deref() == Some(alias.as_str()) => {
                arg = arg.short(c);
            }
            (Some(c), None) => arg = arg.short_alias(c),
            _ => arg = arg.alias(alias.clone()),
        }
    }

    if descriptor.is_flag() {
        return arg.action(ArgAction::SetTrue);
    }

    match descriptor.kind {
        ValueKind::ListOfStrings => arg
            .action(ArgAction::Append)
            .value_delimiter(LIST_DELIMITER)
            .value_parser(clap::value_parser!(String)),
        ValueKind::Scalar => arg
            .action(ArgAction::Set)
            .value_parser(clap::value_parser!(String)),
    }
}

impl ConfigSource for CommandLineSource {
    fn label(&self) -> &str {
        &self.label
    }

    fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn raw(&self, key: &str) -> ConfigResult<Option<RawValue>> {
        Ok(self.values.get(key).cloned())
    }

    fn keys(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use crate::backing::{Backing, SourceBacking};
    use crate::schema::{ReturnKind, SchemaMethod};
    use crate::value::OptionValue;
    use clap::error::ErrorKind;
    use std::sync::Arc;

    const METHODS: &[SchemaMethod] = &[
        SchemaMethod::new("get_host", ReturnKind::Str).short("h").long("host"),
        SchemaMethod::new("get_port", ReturnKind::Str).short("P"),
        SchemaMethod::new("get_databases", ReturnKind::StrList)
            .short("d")
            .aliases(&["dbs"]),
        SchemaMethod::new("is_repair", ReturnKind::Bool).long("repair"),
    ];

    fn index() -> AliasIndex {
        AliasIndex::build("healthcheck", METHODS, &[]).unwrap()
    }

    fn parse(args: &[&str]) -> ConfigResult<CommandLineSource> {
        let mut full = vec!["healthcheck"];
        full.extend_from_slice(args);
        CommandLineSource::parse_from(&index(), full)
    }

    #[test]
    fn test_command_is_valid() {
        CommandLineSource::command(&index()).debug_assert();
    }

    #[test]
    fn test_overlapping_aliases_keep_grammar_unambiguous() {
        const OVERLAP: &[SchemaMethod] = &[
            SchemaMethod::new("get_database", ReturnKind::Str).short("d"),
            SchemaMethod::new("get_databases", ReturnKind::StrList)
                .short("d")
                .long("database"),
        ];
        let index = AliasIndex::build("healthcheck", OVERLAP, &[]).unwrap();
        CommandLineSource::command(&index).debug_assert();

        let source = CommandLineSource::parse_from(
            &index,
            ["healthcheck", "--database", "x", "--databases", "a,b"],
        )
        .unwrap();
        assert_eq!(source.raw("database").unwrap(), Some(RawValue::Text("x".into())));
        assert_eq!(
            source.raw("databases").unwrap(),
            Some(RawValue::Items(vec!["a".into(), "b".into()]))
        );

        let source = CommandLineSource::parse_from(&index, ["healthcheck", "-d", "y"]).unwrap();
        assert_eq!(source.raw("database").unwrap(), Some(RawValue::Text("y".into())));
        assert!(!source.contains("databases"));
    }

    #[test]
    fn test_short_and_long() {
        let source = parse(&["-h", "ens-staging", "--port", "3306"]).unwrap();
        assert_eq!(source.raw("host").unwrap(), Some(RawValue::Text("ens-staging".into())));
        assert_eq!(source.raw("port").unwrap(), Some(RawValue::Text("3306".into())));
    }

    #[test]
    fn test_list_values() {
        let source = parse(&["-d", "a,b", "--dbs", "c"]).unwrap();
        assert_eq!(
            source.raw("databases").unwrap(),
            Some(RawValue::Items(vec!["a".into(), "b".into(), "c".into()]))
        );
    }

    #[test]
    fn test_flags_only_when_given() {
        let source = parse(&[]).unwrap();
        assert!(!source.contains("repair"));
        assert!(source.keys().is_empty());

        let source = parse(&["--repair"]).unwrap();
        assert_eq!(source.raw("repair").unwrap(), Some(RawValue::Text("true".into())));
    }

    #[test]
    fn test_help_is_an_error() {
        let err = parse(&["--help"]).unwrap_err();
        match err {
            ConfigError::CommandLine(e) => assert_eq!(e.kind(), ErrorKind::DisplayHelp),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_argument() {
        let err = parse(&["--no-such-option"]).unwrap_err();
        assert!(matches!(err, ConfigError::CommandLine(_)));
    }

    #[test]
    fn test_backing_over_command_line() {
        let index = Arc::new(index());
        let source = CommandLineSource::parse_from(&index, ["healthcheck", "-d", "x"]).unwrap();
        let backing = SourceBacking::new(index, source);
        assert!(backing.is_set("databases"));
        assert!(!backing.is_set("host"));
        assert_eq!(
            backing.get("databases").unwrap(),
            OptionValue::List(vec!["x".into()])
        );
    }
}
