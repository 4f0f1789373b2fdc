//! Java `.properties` codec.
//!
//! Handles the subset of the format that configuration files use in practice:
//!
//! - `key=value`, `key:value` and `key value` pairs
//! - `#` and `!` comment lines
//! - line continuation with a trailing backslash
//! - `\t`, `\n`, `\r`, `\f`, `\\` and `\uXXXX` escapes

use crate::error::{ConfigError, ConfigResult};

/// Parses properties text into `(key, value)` pairs in file order.
///
/// `source_name` is only used for error reporting. Duplicate keys are
/// returned as-is; callers decide which one wins.
pub fn parse(source_name: &str, text: &str) -> ConfigResult<Vec<(String, String)>> {
    let mut entries = Vec::new();
    let mut lines = text.lines().enumerate();

    while let Some((index, line)) = lines.next() {
        let line_no = index + 1;
        let trimmed = line.trim_start_matches(is_blank);
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }

        let mut logical = String::from(trimmed);
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start_matches(is_blank)),
                None => break,
            }
        }

        let (raw_key, raw_value) = split_key_value(&logical);
        let key = unescape(raw_key).map_err(|message| ConfigError::Parse {
            source_name: source_name.to_owned(),
            line: line_no,
            message,
        })?;
        let value = unescape(raw_value).map_err(|message| ConfigError::Parse {
            source_name: source_name.to_owned(),
            line: line_no,
            message,
        })?;
        entries.push((key, value));
    }

    Ok(entries)
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// A line continues when it ends in an odd number of backslashes.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Splits a logical line at the first unescaped separator.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    let mut separator = None;

    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = i;
                separator = Some(c);
                break;
            }
            c if is_blank(c) => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = &line[key_end..];
    if separator.is_some() {
        rest = &rest[1..];
    } else {
        rest = rest.trim_start_matches(is_blank);
        if let Some(stripped) = rest.strip_prefix(['=', ':']) {
            rest = stripped;
        }
    }
    (key, rest.trim_start_matches(is_blank))
}

fn unescape(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let unit = utf16_unit(&mut chars)?;
                let ch = if (0xD800..0xDC00).contains(&unit) {
                    // High surrogate; the low half must follow as another escape.
                    let mut rest = chars.clone();
                    let low = match (rest.next(), rest.next()) {
                        (Some('\\'), Some('u')) => Some(utf16_unit(&mut rest)?),
                        _ => None,
                    };
                    match low.filter(|low| (0xDC00..0xE000).contains(low)) {
                        Some(low) => {
                            chars = rest;
                            char::decode_utf16([unit, low]).next().and_then(Result::ok)
                        }
                        None => None,
                    }
                } else {
                    char::from_u32(u32::from(unit))
                };
                let ch = ch.ok_or_else(|| {
                    format!("escape '\\u{unit:04X}' is a lone UTF-16 surrogate")
                })?;
                out.push(ch);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

/// Reads the four hex digits of a `\uXXXX` escape.
fn utf16_unit(chars: &mut std::str::Chars<'_>) -> Result<u16, String> {
    let hex: String = chars.by_ref().take(4).collect();
    (hex.len() == 4)
        .then(|| u16::from_str_radix(&hex, 16).ok())
        .flatten()
        .ok_or_else(|| format!("malformed \\uXXXX escape '\\u{hex}'"))
}
