//! Error response bodies
//!
//! The API answers errors in several shapes. Parsing tries them in order and
//! keeps the first that fits: the structured envelope, the bad-request
//! envelope, a bare `erro` field, and finally the raw text.

use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: Option<i64>,
    pub status_error: Option<String>,
    pub path: Option<String>,
    pub error: Option<ErrorModel>,
    pub erros: Option<Vec<ErrorFieldModel>>,
    pub errors: Option<Vec<ErrorFieldModel>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorModel {
    pub code: Option<Value>,
    pub message: Option<String>,
    pub fields: Option<Vec<ErrorFieldModel>>,
    pub data: Option<Value>,
    pub erro: Option<String>,
    pub errors: Option<Vec<ApiErrorDetail>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorFieldModel {
    pub campo: Option<String>,
    pub mensagem: Option<String>,
    pub msg: Option<String>,
    pub path: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub value: Option<Value>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiErrorDetail {
    pub msg: Option<String>,
    pub param: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ErrorBadRequestResponse {
    pub timestamp: Option<String>,
    pub code: Option<i64>,
    pub exception: Option<String>,
    pub message: Option<String>,
    pub path: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorBody {
    Structured(ErrorResponse),
    BadRequest(ErrorBadRequestResponse),
    Simple { erro: String },
    Unparsed(String),
}

impl ErrorBody {
    pub fn parse(body: &str) -> Self {
        let Ok(json) = serde_json::from_str::<Value>(body) else {
            return ErrorBody::Unparsed(body.to_string());
        };

        if let Ok(structured) = ErrorResponse::deserialize(&json) {
            if structured.error.is_some()
                || structured.erros.is_some()
                || structured.errors.is_some()
            {
                return ErrorBody::Structured(structured);
            }
        }

        if let Ok(bad_request) = ErrorBadRequestResponse::deserialize(&json) {
            if bad_request.message.is_some() || bad_request.exception.is_some() {
                return ErrorBody::BadRequest(bad_request);
            }
        }

        match json.get("erro").and_then(Value::as_str) {
            Some(erro) => ErrorBody::Simple {
                erro: erro.to_string(),
            },
            None => ErrorBody::Unparsed(body.to_string()),
        }
    }

    /// Every human-readable message the body carries, outermost first.
    pub fn messages(&self) -> Vec<&str> {
        match self {
            ErrorBody::Structured(response) => {
                let mut messages = Vec::new();
                if let Some(error) = &response.error {
                    messages.extend(error.erro.as_deref());
                    messages.extend(error.message.as_deref());
                    for detail in error.errors.iter().flatten() {
                        messages.extend(detail.msg.as_deref());
                    }
                    for field in error.fields.iter().flatten() {
                        messages.extend(field_messages(field));
                    }
                }
                for field in response.erros.iter().chain(response.errors.iter()).flatten() {
                    messages.extend(field_messages(field));
                }
                messages
            }
            ErrorBody::BadRequest(response) => response.message.as_deref().into_iter().collect(),
            ErrorBody::Simple { erro } => vec![erro.as_str()],
            ErrorBody::Unparsed(_) => Vec::new(),
        }
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            ErrorBody::Structured(_) => "structured",
            ErrorBody::BadRequest(_) => "bad-request",
            ErrorBody::Simple { .. } => "simple",
            ErrorBody::Unparsed(_) => "unparsed",
        }
    }
}

fn field_messages(field: &ErrorFieldModel) -> impl Iterator<Item = &str> {
    field.mensagem.as_deref().into_iter().chain(field.msg.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_structured_envelope() {
        let body = r#"{
            "statusCode": 400,
            "error": {"erro": "Email já cadastrado", "errors": [{"msg": "email inválido", "param": "email"}]},
            "erros": [{"campo": "senha", "mensagem": "senha curta"}]
        }"#;
        let parsed = ErrorBody::parse(body);
        assert_eq!(parsed.variant_name(), "structured");
        assert_eq!(
            parsed.messages(),
            vec!["Email já cadastrado", "email inválido", "senha curta"]
        );
    }

    #[test]
    fn test_validation_errors_array() {
        let body = r#"{"errors": [{"type": "field", "value": 12, "msg": "Nome obrigatório", "path": "nome", "location": "body"}]}"#;
        assert_eq!(ErrorBody::parse(body).messages(), vec!["Nome obrigatório"]);
    }

    #[test]
    fn test_bad_request_envelope() {
        let body = r#"{"timestamp": "2024-01-01T00:00:00Z", "code": 400, "exception": "BadRequest", "message": "Requisição inválida", "path": "/x"}"#;
        let parsed = ErrorBody::parse(body);
        assert_eq!(parsed.variant_name(), "bad-request");
        assert_eq!(parsed.messages(), vec!["Requisição inválida"]);
    }

    #[test]
    fn test_falls_back_to_erro_field() {
        // `error` as a plain string does not fit the structured envelope.
        let body = r#"{"error": "Not Found", "erro": "Usuário não encontrado"}"#;
        let parsed = ErrorBody::parse(body);
        assert_eq!(
            parsed,
            ErrorBody::Simple {
                erro: "Usuário não encontrado".to_string()
            }
        );
    }

    #[test]
    fn test_unparsed_body() {
        assert_eq!(
            ErrorBody::parse("<html>502</html>"),
            ErrorBody::Unparsed("<html>502</html>".to_string())
        );
        assert!(ErrorBody::parse(r#"{"ok": true}"#).messages().is_empty());
    }
}
