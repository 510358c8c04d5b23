pub mod error;
pub mod multipart;
pub mod upstream;

use std::path::PathBuf;
use std::str::FromStr;

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use log::info;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use shared::Mode;

use self::error::ProxyError;
use self::multipart::{upload_mime, PredictForm};
use self::upstream::{UpstreamClient, UpstreamResponse};

/// Everything the proxy handlers share across requests.
#[derive(Clone)]
pub struct ProxyState {
    pub upstream: UpstreamClient,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: u64,
}

/// Adds the mode's `ref_img` to a successful prediction body.
/// Leaves anything that is not a 200 JSON object with a known mode untouched.
pub fn enrich_with_reference(status: u16, mode: &str, body: &mut Value) {
    if status != 200 {
        return;
    }
    let (Ok(mode), Some(object)) = (Mode::from_str(mode), body.as_object_mut()) else {
        return;
    };
    object.insert(
        "ref_img".to_string(),
        Value::String(mode.reference_image().to_string()),
    );
}

/// Mirrors the upstream status and body. JSON bodies are re-serialized (after
/// enrichment), anything else is passed through byte for byte.
pub fn relay(upstream: UpstreamResponse, mode: &str) -> HttpResponse {
    let status = StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
    match upstream.json() {
        Some(mut body) => {
            enrich_with_reference(upstream.status, mode, &mut body);
            HttpResponse::build(status).json(body)
        }
        None => {
            let mut builder = HttpResponse::build(status);
            if let Some(content_type) = upstream.content_type {
                builder.content_type(content_type);
            }
            builder.body(upstream.body)
        }
    }
}

/// Answers-only submission: `{ mode, answers }` as JSON.
pub async fn forward_json(state: &ProxyState, body: &[u8]) -> Result<HttpResponse, ProxyError> {
    let body: Value = serde_json::from_slice(body)?;
    let mode = body.get("mode").filter(|v| !v.is_null()).cloned();
    let answers = body.get("answers").filter(|v| !v.is_null()).cloned();
    let (Some(mode), Some(answers)) = (mode, answers) else {
        return Err(ProxyError::MissingFields(
            "Missing required fields: mode and answers are required for answers-only mode",
        ));
    };

    let mode_name = mode.as_str().unwrap_or_default().to_string();
    info!("Forwarding answers-only prediction (mode={})", mode_name);
    let upstream = state
        .upstream
        .predict_json(&serde_json::json!({ "mode": mode, "answers": answers }))
        .await?;
    info!("Upstream prediction returned {}", upstream.status);
    Ok(relay(upstream, &mode_name))
}

/// Multipart submission: `mode`, optional `answers` string, optional image file.
/// The spooled file is removed when `form` goes out of scope, on every path.
pub async fn forward_multipart(
    state: &ProxyState,
    form: PredictForm,
) -> Result<HttpResponse, ProxyError> {
    let Some(mode) = form.mode.clone().filter(|m| !m.is_empty()) else {
        return Err(ProxyError::MissingFields("Missing required field: mode"));
    };

    let mut outgoing = Form::new().text("mode", mode.clone());
    if let Some(answers) = form.answers.clone() {
        outgoing = outgoing.text("answers", answers);
    }
    if let Some(upload) = &form.file {
        let bytes = upload.read().await?;
        let mime = upload_mime(upload, &bytes);
        info!(
            "Forwarding image prediction (mode={}, file={}, {} bytes, {})",
            mode, upload.filename, upload.size, mime
        );
        let part = Part::bytes(bytes)
            .file_name(upload.filename.clone())
            .mime_str(&mime)?;
        outgoing = outgoing.part("file", part);
    } else {
        info!("Forwarding multipart prediction without image (mode={})", mode);
    }

    let upstream = state.upstream.predict_multipart(outgoing).await?;
    info!("Upstream prediction returned {}", upstream.status);
    drop(form);
    Ok(relay(upstream, &mode))
}
