use proc_macro2::TokenStream;
use quote::quote;
use syn::{
    GenericArgument, ItemTrait, LitStr, PathArguments, ReturnType, Signature, TraitItem,
    TraitItemFn, Type, meta::ParseNestedMeta, parse::Result,
};

const OPTION_ATTR: &str = "option";

// ─── Input AST types ─────────────────────────────────────────────────────────

/// Arguments of `#[option_schema(...)]`.
#[derive(Default)]
pub struct SchemaArgs {
    name: Option<LitStr>,
}

impl SchemaArgs {
    pub fn parse_meta(&mut self, meta: ParseNestedMeta) -> Result<()> {
        if meta.path.is_ident("name") {
            self.name = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unknown option_schema argument; expected `name`"))
        }
    }
}

/// Aliases from `#[option(short = "...", long = "...", alias = "...")]`.
#[derive(Default)]
struct OptionAttrs {
    short: Option<LitStr>,
    long: Option<LitStr>,
    aliases: Vec<LitStr>,
}

/// What an accessor returns once the `Result` wrapper is peeled off.
enum Returns {
    Str,
    StrList,
    Bool,
}

enum Prefix {
    Get,
    Is,
}

/// One bodiless accessor.
struct Accessor {
    sig: Signature,
    attrs: OptionAttrs,
    returns: Returns,
}

// ─── Parsing ──────────────────────────────────────────────────────────────────

fn parse_option_attrs(method: &mut TraitItemFn) -> Result<OptionAttrs> {
    let mut attrs = OptionAttrs::default();
    let mut error: Option<syn::Error> = None;

    method.attrs.retain(|attr| {
        if !attr.path().is_ident(OPTION_ATTR) {
            return true;
        }
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("short") {
                attrs.short = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("long") {
                attrs.long = Some(meta.value()?.parse()?);
            } else if meta.path.is_ident("alias") {
                attrs.aliases.push(meta.value()?.parse()?);
            } else {
                return Err(meta.error("unknown option key; expected short, long, or alias"));
            }
            Ok(())
        });
        if let Err(e) = parsed {
            push_error(&mut error, e);
        }
        false
    });

    match error {
        Some(e) => Err(e),
        None => Ok(attrs),
    }
}

/// `get_x` / `is_x`; anything else is not an accessor.
fn accessor_prefix(name: &str) -> Option<Prefix> {
    let (prefix, rest) = if let Some(rest) = name.strip_prefix("get") {
        (Prefix::Get, rest)
    } else if let Some(rest) = name.strip_prefix("is") {
        (Prefix::Is, rest)
    } else {
        return None;
    };
    let stem = rest.strip_prefix('_').unwrap_or(rest);
    let marked = rest.starts_with('_') || rest.starts_with(|c: char| c.is_ascii_uppercase());
    if !marked || stem.is_empty() || stem.starts_with('_') {
        return None;
    }
    Some(prefix)
}

fn last_segment(ty: &Type) -> Option<&syn::PathSegment> {
    match ty {
        Type::Path(path) if path.qself.is_none() => path.path.segments.last(),
        _ => None,
    }
}

fn first_type_arg(segment: &syn::PathSegment) -> Option<&Type> {
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    }
}

fn is_ident(ty: &Type, name: &str) -> bool {
    last_segment(ty).is_some_and(|s| s.ident == name && s.arguments.is_none())
}

/// `String` or `Vec<String>` inside `Result<_>` / `ConfigResult<_>`.
fn result_payload(ty: &Type) -> Option<Returns> {
    let segment = last_segment(ty)?;
    if segment.ident != "Result" && segment.ident != "ConfigResult" {
        return None;
    }
    let inner = first_type_arg(segment)?;
    if is_ident(inner, "String") {
        return Some(Returns::Str);
    }
    let vec = last_segment(inner)?;
    if vec.ident == "Vec" && first_type_arg(vec).is_some_and(|t| is_ident(t, "String")) {
        return Some(Returns::StrList);
    }
    None
}

fn classify(method: &TraitItemFn, attrs: OptionAttrs) -> Result<Accessor> {
    let sig = &method.sig;
    let name = sig.ident.to_string();

    let Some(prefix) = accessor_prefix(&name) else {
        return Err(syn::Error::new_spanned(
            &sig.ident,
            format!(
                "`{name}` is neither a get_* nor an is_* accessor; \
                 give it a default body to exclude it from the schema"
            ),
        ));
    };

    let takes_self_only = sig.inputs.len() == 1
        && matches!(
            sig.inputs.first(),
            Some(syn::FnArg::Receiver(r)) if r.reference.is_some() && r.mutability.is_none()
        );
    if !takes_self_only || !sig.generics.params.is_empty() || sig.asyncness.is_some() {
        return Err(syn::Error::new_spanned(
            sig,
            "option accessors take `&self` and nothing else",
        ));
    }

    let ReturnType::Type(_, ty) = &sig.output else {
        return Err(syn::Error::new_spanned(sig, "option accessors must return a value"));
    };

    let returns = match prefix {
        Prefix::Is if is_ident(ty, "bool") => Returns::Bool,
        Prefix::Is => {
            return Err(syn::Error::new_spanned(ty, "is_* accessors must return `bool`"));
        }
        Prefix::Get => result_payload(ty).ok_or_else(|| {
            syn::Error::new_spanned(
                ty,
                "get_* accessors must return `ConfigResult<String>` or `ConfigResult<Vec<String>>`",
            )
        })?,
    };

    Ok(Accessor {
        sig: sig.clone(),
        attrs,
        returns,
    })
}

// ─── Code generation ──────────────────────────────────────────────────────────

pub fn expand(args: SchemaArgs, mut item: ItemTrait) -> Result<TokenStream> {
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "option schemas cannot be generic",
        ));
    }
    if !item.supertraits.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.supertraits,
            "option schemas cannot have supertraits",
        ));
    }

    let hc = quote! { ::healthcheck_config };
    let trait_name = item.ident.clone();
    let schema_name = args
        .name
        .unwrap_or_else(|| LitStr::new(&trait_name.to_string(), trait_name.span()));

    let mut accessors = Vec::new();
    let mut excluded = Vec::new();
    let mut errors: Option<syn::Error> = None;

    for trait_item in &mut item.items {
        let TraitItem::Fn(method) = trait_item else {
            continue;
        };
        let attrs = match parse_option_attrs(method) {
            Ok(attrs) => attrs,
            Err(e) => {
                push_error(&mut errors, e);
                continue;
            }
        };
        if method.default.is_some() {
            if attrs.short.is_some() || attrs.long.is_some() || !attrs.aliases.is_empty() {
                push_error(
                    &mut errors,
                    syn::Error::new_spanned(
                        &method.sig.ident,
                        "methods with a default body are not options and take no #[option]",
                    ),
                );
            }
            excluded.push(method.sig.ident.to_string());
            continue;
        }
        match classify(method, attrs) {
            Ok(accessor) => accessors.push(accessor),
            Err(e) => push_error(&mut errors, e),
        }
    }

    if let Some(e) = errors {
        return Err(e);
    }

    let table = accessors.iter().map(|accessor| {
        let name = accessor.sig.ident.to_string();
        let kind = match accessor.returns {
            Returns::Str => quote! { #hc::ReturnKind::Str },
            Returns::StrList => quote! { #hc::ReturnKind::StrList },
            Returns::Bool => quote! { #hc::ReturnKind::Bool },
        };
        let short = accessor.attrs.short.iter();
        let long = accessor.attrs.long.iter();
        let aliases = &accessor.attrs.aliases;
        let aliases = if aliases.is_empty() {
            quote! {}
        } else {
            quote! { .aliases(&[ #( #aliases ),* ]) }
        };
        quote! {
            #hc::SchemaMethod::new(#name, #kind)
                #( .short(#short) )*
                #( .long(#long) )*
                #aliases
        }
    });

    let bodies = accessors.iter().map(|accessor| {
        let sig = &accessor.sig;
        let name = sig.ident.to_string();
        let body = match accessor.returns {
            Returns::Str => quote! { self.scalar(#name) },
            Returns::StrList => quote! { self.list(#name) },
            Returns::Bool => quote! { self.flag(#name) },
        };
        quote! {
            #sig {
                #body
            }
        }
    });

    Ok(quote! {
        #item

        impl #hc::OptionSchema for dyn #trait_name {
            fn schema_name() -> &'static str {
                #schema_name
            }

            fn methods() -> &'static [#hc::SchemaMethod] {
                const METHODS: &[#hc::SchemaMethod] = &[ #( #table ),* ];
                METHODS
            }

            fn excluded() -> &'static [&'static str] {
                &[ #( #excluded ),* ]
            }
        }

        impl #trait_name for #hc::Resolver<dyn #trait_name> {
            #( #bodies )*
        }
    })
}

fn push_error(errors: &mut Option<syn::Error>, error: syn::Error) {
    let combined = match errors.take() {
        Some(mut existing) => {
            existing.combine(error);
            existing
        }
        None => error,
    };
    *errors = Some(combined);
}
