//! Response assertions used by step definitions
//!
//! Each helper logs the full response body and appends a line to the
//! scenario's failure narrative before returning `ValidationFailed`, so the
//! evidence document and the logs both explain what went wrong. Tokens in the
//! body are masked before it reaches either.

use crate::error_body::ErrorBody;
use crate::response::ApiResponse;
use once_cell::sync::Lazy;
use regex::Regex;
use scribe_core::mask::mask_sensitive_json;
use scribe_core::{Result, ScenarioContext, ScribeError};
use tracing::{error, info};

static LIST_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*,\s*").expect("valid regex"));

fn fail(ctx: &mut ScenarioContext, response: &ApiResponse, reason: String) -> ScribeError {
    let body = mask_sensitive_json(&response.body);
    error!(
        target: "automation",
        status = response.status,
        body = %body,
        "{reason}"
    );
    ctx.record_failure(format!("{reason}\nResponse body:\n{body}"));
    ScribeError::ValidationFailed { reason }
}

pub fn expect_status(ctx: &mut ScenarioContext, response: &ApiResponse, expected: u16) -> Result<()> {
    if response.status != expected {
        let reason = format!(
            "Status code mismatch: expected {expected}, actual {}",
            response.status
        );
        return Err(fail(ctx, response, reason));
    }
    info!(target: "automation", "Status code {expected} received as expected");
    Ok(())
}

/// Succeeds when the error body carries any of the comma-separated
/// `expected` messages, returning the one found.
pub fn expect_any_error_message(
    ctx: &mut ScenarioContext,
    response: &ApiResponse,
    expected: &str,
) -> Result<String> {
    let candidates: Vec<&str> = LIST_SEPARATOR
        .split(expected.trim())
        .filter(|m| !m.is_empty())
        .collect();
    let parsed = ErrorBody::parse(&response.body);
    let messages = parsed.messages();

    match candidates.iter().find(|c| messages.contains(c)) {
        Some(found) => {
            info!(
                target: "automation",
                shape = parsed.variant_name(),
                "Error message found: {found}"
            );
            Ok(found.to_string())
        }
        None => {
            let reason = format!(
                "None of the expected messages [{}] found in {} error body",
                candidates.join(", "),
                parsed.variant_name()
            );
            Err(fail(ctx, response, reason))
        }
    }
}

/// Compares a dotted JSON path of the body with `expected`.
pub fn expect_field(
    ctx: &mut ScenarioContext,
    response: &ApiResponse,
    path: &str,
    expected: &str,
) -> Result<()> {
    match response.field(path) {
        Some(actual) if actual == expected => Ok(()),
        actual => {
            let reason = format!(
                "Field {path} mismatch: expected {expected}, actual {}",
                actual.as_deref().unwrap_or("<absent>")
            );
            Err(fail(ctx, response, reason))
        }
    }
}

/// Returns the value at `path`, failing when it is absent.
pub fn require_field(ctx: &mut ScenarioContext, response: &ApiResponse, path: &str) -> Result<String> {
    response
        .field(path)
        .ok_or_else(|| fail(ctx, response, format!("Field {path} missing from response")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> ApiResponse {
        ApiResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_status_mismatch_records_narrative() {
        let mut ctx = ScenarioContext::new();
        let res = response(500, r#"{"erro":"boom"}"#);

        assert!(expect_status(&mut ctx, &res, 500).is_ok());
        assert!(ctx.failure_log().is_none());

        let err = expect_status(&mut ctx, &res, 201).unwrap_err();
        assert!(matches!(err, ScribeError::ValidationFailed { .. }));
        let narrative = ctx.failure_log().unwrap();
        assert!(narrative.contains("expected 201, actual 500"));
        assert!(narrative.contains("boom"));
    }

    #[test]
    fn test_failure_narrative_masks_tokens() {
        let mut ctx = ScenarioContext::new();
        let res = response(200, r#"{"token":"abcdefghijklmnopqrstuvwxyz"}"#);

        assert!(expect_status(&mut ctx, &res, 201).is_err());
        let narrative = ctx.failure_log().unwrap();
        assert!(narrative.contains(r#""token":"abcdefghijklmno...""#));
        assert!(!narrative.contains("abcdefghijklmnopqrstuvwxyz"));
    }

    #[test]
    fn test_any_of_comma_separated_messages() {
        let mut ctx = ScenarioContext::new();
        let res = response(400, r#"{"erro":"Email já cadastrado"}"#);

        let found =
            expect_any_error_message(&mut ctx, &res, "Usuário já existe ,  Email já cadastrado")
                .unwrap();
        assert_eq!(found, "Email já cadastrado");

        assert!(expect_any_error_message(&mut ctx, &res, "Outro erro").is_err());
        assert!(ctx.failure_log().unwrap().contains("Outro erro"));
    }

    #[test]
    fn test_expect_field() {
        let mut ctx = ScenarioContext::new();
        let res = response(200, r#"{"user":{"id":"u-1"}}"#);
        assert!(expect_field(&mut ctx, &res, "user.id", "u-1").is_ok());
        assert!(expect_field(&mut ctx, &res, "user.name", "x").is_err());
        assert_eq!(require_field(&mut ctx, &res, "user.id").unwrap(), "u-1");
    }
}
