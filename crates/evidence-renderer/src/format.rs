//! Text shaping for document cells

use crate::mask::BEARER_VISIBLE;
use serde_json::Value;

/// Pretty-prints JSON bodies. Non-JSON text is returned as given and a blank
/// body becomes the empty string.
pub fn pretty_json(body: &str) -> String {
    if body.trim().is_empty() {
        return String::new();
    }
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| body.to_string())
}

/// One `Name=value` line per header. `Accept` lists continue one media type
/// per line and `Authorization` is cut after its first 20 characters.
pub fn format_headers(headers: &[(String, String)]) -> String {
    let mut lines = Vec::with_capacity(headers.len());
    for (name, value) in headers {
        let value = value.trim();
        if name.eq_ignore_ascii_case("Accept") {
            let mut types = value.split(',').map(str::trim);
            lines.push(format!("{name}={}", types.next().unwrap_or_default()));
            lines.extend(types.map(str::to_string));
        } else if name.eq_ignore_ascii_case("Authorization")
            && value.chars().count() > BEARER_VISIBLE
        {
            let visible: String = value.chars().take(BEARER_VISIBLE).collect();
            lines.push(format!("{name}={visible}..."));
        } else {
            lines.push(format!("{name}={value}"));
        }
    }
    lines.join("\n")
}

/// `name: value` lines, used for parameter sections.
pub fn format_params(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `name=value` lines, used for cookies.
pub fn format_assignments(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn expand_tabs(text: &str) -> String {
    text.replace('\t', "    ")
}
