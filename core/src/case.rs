//! Key-convention conversion for transport payloads
//!
//! The orchestrating caller speaks PascalCase (`PhysicalResourceId`), while
//! everything inside the provider uses camelCase (`physicalResourceId`). This
//! module renames mapping keys between the two conventions, recursively over
//! nested objects and arrays, leaving scalar values untouched.
//!
//! Conversion is idempotent: a payload already in the target convention comes
//! back unchanged. Keys that collide after conversion (`"my_key"` and
//! `"MyKey"` both map to `"myKey"`) are not deduplicated; the last key in
//! iteration order wins.

use serde_json::{Map, Value};

/// Target key-naming convention at a transport boundary
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyConvention {
    /// `lowerCamelCase` - used internally and for handler inputs
    Camel,
    /// `UpperCamelCase` - expected by the orchestrating caller on responses
    Pascal,
}

/// Rename every mapping key in `value` to the given convention
///
/// Recurses into nested objects and into each element of nested arrays.
/// Non-object values are returned as-is (cloned).
#[must_use]
pub fn convert_keys(value: &Value, convention: KeyConvention) -> Value {
    match value {
        Value::Object(map) => {
            let mut converted = Map::new();
            for (key, nested) in map {
                // Colliding keys overwrite each other here: last writer wins.
                converted.insert(convert_key(key, convention), convert_keys(nested, convention));
            }
            Value::Object(converted)
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| convert_keys(item, convention))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Rename a single key to the given convention
///
/// Tokenizes on separators (`-`, `_`, `.`, space) and on case boundaries,
/// including acronym runs (`HTTPServer` splits into `http`, `server`), then
/// rejoins the lowercase tokens in the target convention. Digits stay
/// attached to the token they follow.
///
/// A key with no word characters (e.g. `"__"`) is returned unchanged.
#[must_use]
pub fn convert_key(key: &str, convention: KeyConvention) -> String {
    let words = split_words(key);
    if words.is_empty() {
        return key.to_string();
    }

    let mut converted = String::with_capacity(key.len());
    for (index, word) in words.iter().enumerate() {
        if index == 0 && convention == KeyConvention::Camel {
            converted.push_str(word);
        } else {
            converted.push_str(&capitalize(word));
        }
    }
    converted
}

/// Split a key into lowercase word tokens at separator and case boundaries.
fn split_words(key: &str) -> Vec<String> {
    let chars: Vec<char> = key.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (index, &c) in chars.iter().enumerate() {
        if matches!(c, '-' | '_' | '.' | ' ') {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let after_lower = chars[index - 1].is_lowercase() || chars[index - 1].is_ascii_digit();
            // End of an acronym run: the last uppercase letter before a
            // lowercase one starts the next word (HTTPServer -> http, server).
            let acronym_end = chars[index - 1].is_uppercase()
                && chars.get(index + 1).is_some_and(|next| next.is_lowercase());
            if after_lower || acronym_end {
                words.push(std::mem::take(&mut current));
            }
        }

        current.extend(c.to_lowercase());
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Uppercase the first character of a lowercase token.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
