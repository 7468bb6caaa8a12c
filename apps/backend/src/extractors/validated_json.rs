use std::future::Future;
use std::pin::Pin;

use actix_web::dev::Payload;
use actix_web::web::Bytes;
use actix_web::{FromRequest, HttpRequest};
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use tracing::debug;

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::trace_ctx;

/// JSON command body. Parse failures become `BAD_REQUEST` problem details
/// that name the offending field or position, so the operator console and
/// player clients can show something useful.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> FromRequest for ValidatedJson<T>
where
    T: DeserializeOwned + 'static,
{
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let body = Bytes::from_request(req, payload);
        let path = req.path().to_string();

        Box::pin(async move {
            let body = body.await.map_err(|e| {
                debug!(trace_id = %trace_ctx::trace_id(), %path, error = %e, "body read failed");
                AppError::bad_request(ErrorCode::BadRequest, "Request body could not be read")
            })?;

            serde_json::from_slice::<T>(&body).map(ValidatedJson).map_err(|e| {
                debug!(
                    trace_id = %trace_ctx::trace_id(),
                    %path,
                    body_size = body.len(),
                    error = %e,
                    "command body rejected"
                );
                AppError::bad_request(ErrorCode::BadRequest, describe(&e))
            })
        })
    }
}

fn describe(error: &serde_json::Error) -> String {
    match error.classify() {
        Category::Eof => "Request body ended before the JSON object was complete".to_string(),
        Category::Syntax => format!(
            "Malformed JSON at line {}, column {}",
            error.line(),
            error.column()
        ),
        // serde's data messages name the field ("missing field `name`").
        Category::Data => {
            let message = error.to_string();
            let field_part = message.split(" at line ").next().unwrap_or(&message);
            format!("Invalid command body: {field_part}")
        }
        Category::Io => "Request body could not be read".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Answer {
        player_id: i64,
        answer: String,
    }

    fn detail_for(raw: &str) -> String {
        describe(&serde_json::from_str::<Answer>(raw).unwrap_err())
    }

    #[test]
    fn truncated_body_is_reported_as_incomplete() {
        assert!(detail_for(r#"{"player_id": 1"#).contains("ended before"));
    }

    #[test]
    fn syntax_errors_carry_a_position() {
        let detail = detail_for(r#"{"player_id": , "answer": "A"}"#);
        assert!(detail.starts_with("Malformed JSON at line 1"), "{detail}");
    }

    #[test]
    fn missing_fields_are_named_without_position() {
        let detail = detail_for(r#"{"player_id": 1}"#);
        assert_eq!(detail, "Invalid command body: missing field `answer`");
    }

    #[test]
    fn wrong_types_name_the_expectation() {
        let detail = detail_for(r#"{"player_id": "one", "answer": "A"}"#);
        assert!(detail.starts_with("Invalid command body: invalid type"), "{detail}");
        assert!(!detail.contains(" at line "), "{detail}");
    }
}
