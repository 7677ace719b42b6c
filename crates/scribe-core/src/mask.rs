//! Redaction of credentials
//!
//! Document masking keeps a recognisable prefix of bearer tokens and `token`
//! fields. Log masking keeps only the last four characters.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters of a bearer credential kept in documents.
pub const BEARER_VISIBLE: usize = 20;
/// Characters of a `"token"` value kept in documents.
pub const TOKEN_VISIBLE: usize = 15;

static AUTHORIZATION_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"("authorization"\s*:\s*"Bearer\s+)([^"]{20})[^"]+"#).expect("valid regex")
});

static TOKEN_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"("token"\s*:\s*")([^"\s]{15})[^"\s]+"#).expect("valid regex")
});

/// Truncates `authorization` bearer values and `token` values in JSON text,
/// appending `...` in place of the dropped characters. Values no longer than
/// the visible prefix are left as they are.
///
/// Run this on pretty-printed JSON so a cut never lands inside an escape
/// sequence of the raw bytes.
pub fn mask_sensitive_json(json: &str) -> String {
    let masked = AUTHORIZATION_FIELD.replace_all(json, "${1}${2}...");
    TOKEN_FIELD.replace_all(&masked, "${1}${2}...").into_owned()
}

/// `***` followed by the last four characters. Shorter values are returned
/// as they are.
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 4 {
        return value.to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("***{tail}")
}
