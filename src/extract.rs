//! Recovering structured data from free-text provider replies.
//!
//! Providers are asked for JSON but may wrap it in prose or a fenced code
//! block. [`json_object`] locates the object; [`decode`] turns it into a
//! typed reply; [`probability`] is the one numeric salvage path used for
//! bare-probability replies.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Probability used when a reply carries no recoverable number.
pub const DEFAULT_PROBABILITY: f64 = 0.5;

static DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.\d+").expect("decimal pattern is valid"));

/// Locate a JSON object inside `text`.
///
/// Tries, in order: a ```json fenced block, any ``` fenced block, the first
/// balanced `{...}` span. Returns `None` if no candidate is found.
pub fn json_object(text: &str) -> Option<&str> {
    if let Some(inner) = fenced_block(text) {
        return Some(inner);
    }
    balanced_object(text)
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    // Skip the info string (e.g. "json") up to the end of the line
    let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after[body_start..];
    let end = body.find("```")?;
    let inner = body[..end].trim();
    if inner.starts_with('{') {
        Some(inner)
    } else {
        None
    }
}

fn balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, byte) in text.as_bytes()[start..].iter().enumerate() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match byte {
            b'\\' if in_string => escape_next = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Decode a typed reply from free text.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, String> {
    let candidate = json_object(text).unwrap_or(text.trim());
    serde_json::from_str(candidate).map_err(|e| format!("malformed provider reply: {}", e))
}

/// Recover a raw probability from a classifier reply.
///
/// Accepts a JSON object with `fake_probability` or `probability`, a bare
/// JSON number, or any text containing a decimal number. Falls back to
/// [`DEFAULT_PROBABILITY`]. The returned value is not yet scaled or clamped.
pub fn probability(text: &str) -> f64 {
    if let Ok(value) = serde_json::from_str::<Value>(text.trim()) {
        let field = match &value {
            Value::Number(n) => n.as_f64(),
            Value::Object(map) => map
                .get("fake_probability")
                .or_else(|| map.get("probability"))
                .and_then(Value::as_f64),
            _ => None,
        };
        if let Some(p) = field {
            return p;
        }
    }
    salvage_decimal(text).unwrap_or(DEFAULT_PROBABILITY)
}

/// First `digits.digits` run in `text`.
pub fn salvage_decimal(text: &str) -> Option<f64> {
    DECIMAL.find(text).and_then(|m| m.as_str().parse().ok())
}
