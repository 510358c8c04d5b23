use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use chrono::{SecondsFormat, Utc};
use shared::ErrorEnvelope;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("{0}")]
    MissingFields(&'static str),
    #[error("Uploaded file exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: u64 },
    #[error("field '{0}' is too long")]
    FieldTooLong(String),
    #[error("{0}")]
    Upstream(#[from] reqwest::Error),
    #[error("Invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("{0}")]
    Multipart(#[from] actix_multipart::MultipartError),
    #[error("{0}")]
    Payload(#[from] actix_web::error::PayloadError),
    #[error("Temporary upload failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Temporary upload failed: {0}")]
    Blocking(#[from] actix_web::error::BlockingError),
}

/// ISO-8601 UTC with milliseconds, the format clients already parse.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl ResponseError for ProxyError {
    fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::MissingFields(_) | ProxyError::FieldTooLong(_) => StatusCode::BAD_REQUEST,
            ProxyError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let envelope = match self {
            ProxyError::MissingFields(_) | ProxyError::FieldTooLong(_) => {
                ErrorEnvelope::new(self.to_string())
            }
            _ => ErrorEnvelope::new("Prediction request failed")
                .with_details(self.to_string())
                .with_timestamp(timestamp()),
        };
        HttpResponse::build(status).json(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn validation_errors_carry_only_the_message() {
        let err = ProxyError::MissingFields("Missing required field: mode");
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Missing required field: mode" }));
    }

    #[actix_web::test]
    async fn failures_use_the_generic_envelope() {
        let err = ProxyError::Io(std::io::Error::other("disk full"));
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let envelope: ErrorEnvelope = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope.error, "Prediction request failed");
        assert_eq!(envelope.details.as_deref(), Some("Temporary upload failed: disk full"));
        assert!(envelope.timestamp.is_some());
    }

    #[test]
    fn oversized_uploads_map_to_413() {
        let err = ProxyError::PayloadTooLarge { limit: 8 };
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
