//! Colour coding used by the DOCX renderer, as `RRGGBB` hex

pub const PASSED: &str = "00B050";
pub const FAILED: &str = "FF0000";

pub fn method_color(method: &str) -> Option<&'static str> {
    match method.to_ascii_uppercase().as_str() {
        "GET" => Some("28A745"),
        "POST" => Some("FD7E14"),
        "PUT" => Some("0D6EFD"),
        "DELETE" => Some("DC3545"),
        "PATCH" => Some("7F3CFF"),
        _ => None,
    }
}

pub fn status_color(status: u16) -> Option<&'static str> {
    match status {
        200..=299 => Some("28A745"),
        300..=399 => Some("0D6EFD"),
        400..=499 => Some("FD7E14"),
        500..=599 => Some("DC3545"),
        _ => None,
    }
}
