//! Procedural macros for healthcheck option schemas.
//!
//! This crate provides:
//!
//! - `#[option_schema]` - Turns a trait of `get_*` / `is_*` accessors into an
//!   option schema that a `Resolver` can implement
//!
//! # Option Schemas
//!
//! ```rust,ignore
//! use healthcheck_config::{ConfigResult, Resolver, option_schema};
//!
//! #[option_schema]
//! pub trait DatabaseOptions {
//!     #[option(short = "h", long = "host")]
//!     fn get_host(&self) -> ConfigResult<String>;
//!
//!     #[option(short = "d")]
//!     fn get_databases(&self) -> ConfigResult<Vec<String>>;
//!
//!     fn is_host(&self) -> bool;
//!
//!     // Default bodies are not options.
//!     fn describe(&self) -> String {
//!         String::from("database options")
//!     }
//! }
//!
//! let options: Resolver<dyn DatabaseOptions> = Resolver::new(backing)?;
//! let host = options.get_host()?;
//! ```

mod schema;

use proc_macro::TokenStream;
use syn::{ItemTrait, meta, parse_macro_input};

/// Declares an option schema.
///
/// Generates, next to the unchanged trait:
/// - `impl OptionSchema for dyn Trait` - the accessor table, with methods that
///   have a default body listed as excluded
/// - `impl Trait for Resolver<dyn Trait>` - every bodiless accessor dispatched
///   through the resolver
///
/// # Attributes
///
/// - `#[option_schema(name = "...")]` - Override the schema name (default: the trait name)
/// - `#[option(short = "...")]` - Short alias, the `-x` command-line form
/// - `#[option(long = "...")]` - Long alias, the `--xxx` command-line form
/// - `#[option(alias = "...")]` - Extra alias, may be repeated
///
/// Accessors must be `get_*` methods returning `ConfigResult<String>` or
/// `ConfigResult<Vec<String>>`, or `is_*` methods returning `bool`.
#[proc_macro_attribute]
pub fn option_schema(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut args = schema::SchemaArgs::default();
    let parser = meta::parser(|meta| args.parse_meta(meta));
    parse_macro_input!(attr with parser);
    let item = parse_macro_input!(item as ItemTrait);

    match schema::expand(args, item) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
