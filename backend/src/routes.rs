use std::path::PathBuf;

use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::StreamExt;
use log::{error, info};
use shared::{ErrorEnvelope, HealthStatus};

use crate::proxy::error::{timestamp, ProxyError};
use crate::proxy::multipart::parse_predict_form;
use crate::proxy::{forward_json, forward_multipart, ProxyState};
use crate::questions::get_questions;

const MAX_JSON_BYTES: usize = 1024 * 1024;

pub fn configure_routes(cfg: &mut web::ServiceConfig, frontend_dir: PathBuf, ref_dir: PathBuf) {
    configure_api(cfg);
    cfg.service(Files::new("/ref", ref_dir))
        .service(Files::new("/", frontend_dir).index_file("index.html"));
}

pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/health")
            .route(web::get().to(health_check))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/api/predict")
            .route(web::post().to(predict))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/api/questions")
            .route(web::get().to(get_questions))
            .default_service(web::to(method_not_allowed)),
    );
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(ErrorEnvelope::new("Method not allowed"))
}

async fn health_check(state: web::Data<ProxyState>) -> HttpResponse {
    match state.upstream.health().await {
        Ok(upstream) => match upstream.json() {
            Some(body) => {
                let status =
                    StatusCode::from_u16(upstream.status).unwrap_or(StatusCode::BAD_GATEWAY);
                HttpResponse::build(status).json(body)
            }
            None => {
                error!("Health check returned a non-JSON body (status {})", upstream.status);
                backend_offline(format!(
                    "Backend returned a non-JSON response with status {}",
                    upstream.status
                ))
            }
        },
        Err(e) => {
            error!("Health check failed: {}", e);
            backend_offline(e.to_string())
        }
    }
}

fn backend_offline(details: String) -> HttpResponse {
    let mut status = HealthStatus::offline("Backend connection failed", details);
    status
        .extra
        .insert("timestamp".to_string(), serde_json::Value::String(timestamp()));
    HttpResponse::InternalServerError().json(status)
}

async fn predict(
    req: HttpRequest,
    payload: web::Payload,
    state: web::Data<ProxyState>,
) -> Result<HttpResponse, ProxyError> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let result = proxy_predict(&req, payload, &state, &content_type).await;
    if let Err(e) = &result {
        error!(
            "Prediction proxy failed: {} (content-type={}, method={}, url={})",
            e,
            content_type,
            req.method(),
            req.uri()
        );
    }
    result
}

async fn proxy_predict(
    req: &HttpRequest,
    mut payload: web::Payload,
    state: &ProxyState,
    content_type: &str,
) -> Result<HttpResponse, ProxyError> {
    if content_type.contains("application/json") {
        let body = read_body(&mut payload, MAX_JSON_BYTES).await?;
        forward_json(state, &body).await
    } else {
        let multipart = Multipart::new(req.headers(), payload);
        let form = parse_predict_form(multipart, &state.upload_dir, state.max_upload_bytes).await?;
        info!(
            "Parsed multipart prediction (mode={:?}, answers={}, file={})",
            form.mode,
            form.answers.is_some(),
            form.file.is_some()
        );
        forward_multipart(state, form).await
    }
}

async fn read_body(payload: &mut web::Payload, limit: usize) -> Result<web::Bytes, ProxyError> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk?;
        if body.len() + chunk.len() > limit {
            return Err(ProxyError::PayloadTooLarge {
                limit: limit as u64,
            });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::upstream::UpstreamClient;
    use actix_web::{test, App, HttpServer};
    use futures::TryStreamExt;
    use serde_json::{json, Value};
    use std::path::Path;
    use std::time::Duration;
    use url::Url;
    use uuid::Uuid;

    const BOUNDARY: &str = "----proxytestboundary";

    async fn collect(payload: web::Payload) -> Vec<u8> {
        payload
            .try_fold(Vec::new(), |mut acc, chunk| async move {
                acc.extend_from_slice(&chunk);
                Ok(acc)
            })
            .await
            .unwrap()
    }

    /// Stand-in prediction service. Echoes what it received; the mode selects
    /// special behaviours.
    async fn mock_predict(req: HttpRequest, payload: web::Payload) -> HttpResponse {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        let mut seen = serde_json::Map::new();
        if is_json {
            let body: Value = serde_json::from_slice(&collect(payload).await).unwrap();
            seen = body.as_object().cloned().unwrap_or_default();
        } else {
            let mut multipart = Multipart::new(req.headers(), payload);
            while let Some(mut field) = multipart.try_next().await.unwrap() {
                let name = field.name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(|m| m.to_string());
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .map(str::to_string);
                let mut data = Vec::new();
                while let Some(chunk) = field.try_next().await.unwrap() {
                    data.extend_from_slice(&chunk);
                }
                if name == "file" {
                    seen.insert("file_bytes".into(), json!(data.len()));
                    seen.insert("file_type".into(), json!(content_type));
                    seen.insert("file_name".into(), json!(filename));
                } else {
                    seen.insert(name, json!(String::from_utf8_lossy(&data)));
                }
            }
        }

        match seen.get("mode").and_then(Value::as_str) {
            Some("broken") => {
                HttpResponse::UnprocessableEntity().json(json!({ "detail": "unsupported mode" }))
            }
            Some("plain") => HttpResponse::Ok().content_type("text/plain").body("not json"),
            _ => HttpResponse::Ok().json(json!({
                "received": seen,
                "fusion": { "detected": true, "reason": "combined" }
            })),
        }
    }

    fn spawn_upstream() -> Url {
        let server = HttpServer::new(|| {
            App::new()
                .route(
                    "/health",
                    web::get().to(|| async { HttpResponse::Ok().json(json!({ "ok": true, "models": 2 })) }),
                )
                .route("/predict", web::post().to(mock_predict))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        Url::parse(&format!("http://{}/", addr)).unwrap()
    }

    /// Prediction service that answers only after the client has given up.
    fn spawn_slow_upstream(delay: Duration) -> Url {
        let server = HttpServer::new(move || {
            App::new().default_service(web::to(move || async move {
                actix_web::rt::time::sleep(delay).await;
                HttpResponse::Ok().json(json!({ "ok": true }))
            }))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        Url::parse(&format!("http://{}/", addr)).unwrap()
    }

    fn upload_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("proxy-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn dir_is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).unwrap().next().is_none()
    }

    fn state(base: &Url, dir: &Path, max_upload_bytes: u64) -> ProxyState {
        state_with_timeout(base, dir, max_upload_bytes, Duration::from_secs(5))
    }

    fn state_with_timeout(
        base: &Url,
        dir: &Path,
        max_upload_bytes: u64,
        timeout: Duration,
    ) -> ProxyState {
        ProxyState {
            upstream: UpstreamClient::new(base, timeout).unwrap(),
            upload_dir: dir.to_path_buf(),
            max_upload_bytes,
        }
    }

    fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((field, filename, bytes)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: image/jpeg\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(body: Vec<u8>) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/predict")
            .insert_header((
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
    }

    #[actix_web::test]
    async fn health_relays_upstream_body() {
        let base = spawn_upstream();
        let dir = upload_dir();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(&base, &dir, 1024)))
                .configure(configure_api),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "ok": true, "models": 2 }));
    }

    #[actix_web::test]
    async fn health_reports_offline_when_backend_is_unreachable() {
        let base = Url::parse("http://127.0.0.1:1/").unwrap();
        let dir = upload_dir();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(&base, &dir, 1024)))
                .configure(configure_api),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: HealthStatus = test::read_body_json(resp).await;
        assert!(!body.ok);
        assert_eq!(body.error.as_deref(), Some("Backend connection failed"));
        assert!(body.extra.contains_key("timestamp"));
    }

    #[actix_web::test]
    async fn json_prediction_is_forwarded_and_enriched() {
        let base = spawn_upstream();
        let dir = upload_dir();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(&base, &dir, 1024)))
                .configure(configure_api),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(json!({ "mode": "disease", "answers": { "central_shoot_dry": 1 } }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["received"]["mode"], "disease");
        assert_eq!(body["received"]["answers"]["central_shoot_dry"], 1);
        assert_eq!(body["ref_img"], "deadheart_01.jpg");
    }

    #[actix_web::test]
    async fn json_prediction_requires_mode_and_answers() {
        let base = spawn_upstream();
        let dir = upload_dir();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(&base, &dir, 1024)))
                .configure(configure_api),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(json!({ "mode": "pest", "answers": null }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorEnvelope = test::read_body_json(resp).await;
        assert_eq!(
            body.error,
            "Missing required fields: mode and answers are required for answers-only mode"
        );
    }

    #[actix_web::test]
    async fn upstream_error_status_is_relayed_unchanged() {
        let base = spawn_upstream();
        let dir = upload_dir();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(&base, &dir, 1024)))
                .configure(configure_api),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(json!({ "mode": "broken", "answers": [] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "detail": "unsupported mode" }));
    }

    #[actix_web::test]
    async fn non_json_upstream_body_passes_through() {
        let base = spawn_upstream();
        let dir = upload_dir();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(&base, &dir, 1024)))
                .configure(configure_api),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/predict")
            .set_json(json!({ "mode": "plain", "answers": {} }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await, web::Bytes::from_static(b"not json"));
    }

    #[actix_web::test]
    async fn multipart_prediction_forwards_file_and_removes_temp_file() {
        let base = spawn_upstream();
        let dir = upload_dir();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(&base, &dir, 1024)))
                .configure(configure_api),
        )
        .await;

        let image = [0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3, 4];
        let body = multipart_body(
            &[("mode", "pest"), ("answers", r#"{"bore_holes_near_base":1}"#)],
            Some(("image", "field.jpg", &image)),
        );
        let resp = test::call_service(&app, multipart_request(body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["received"]["mode"], "pest");
        assert_eq!(body["received"]["answers"], r#"{"bore_holes_near_base":1}"#);
        assert_eq!(body["received"]["file_bytes"], image.len());
        assert_eq!(body["received"]["file_type"], "image/jpeg");
        assert_eq!(body["received"]["file_name"], "field.jpg");
        assert_eq!(body["ref_img"], "esb_01.jpg");
        assert!(dir_is_empty(&dir));
    }

    #[actix_web::test]
    async fn multipart_without_mode_is_rejected_and_cleaned_up() {
        let base = spawn_upstream();
        let dir = upload_dir();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(&base, &dir, 1024)))
                .configure(configure_api),
        )
        .await;

        let body = multipart_body(&[("answers", "{}")], Some(("file", "leaf.jpg", b"jpegdata")));
        let resp = test::call_service(&app, multipart_request(body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorEnvelope = test::read_body_json(resp).await;
        assert_eq!(body.error, "Missing required field: mode");
        assert!(dir_is_empty(&dir));
    }

    #[actix_web::test]
    async fn oversized_upload_is_refused() {
        let base = spawn_upstream();
        let dir = upload_dir();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(&base, &dir, 16)))
                .configure(configure_api),
        )
        .await;

        let image = vec![0u8; 64];
        let body = multipart_body(&[("mode", "disease")], Some(("file", "big.jpg", &image)));
        let resp = test::call_service(&app, multipart_request(body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(dir_is_empty(&dir));
    }

    #[actix_web::test]
    async fn transport_failure_yields_generic_envelope() {
        let base = Url::parse("http://127.0.0.1:1/").unwrap();
        let dir = upload_dir();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(&base, &dir, 1024)))
                .configure(configure_api),
        )
        .await;

        let body = multipart_body(&[("mode", "disease")], Some(("file", "leaf.jpg", b"jpegdata")));
        let resp = test::call_service(&app, multipart_request(body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorEnvelope = test::read_body_json(resp).await;
        assert_eq!(body.error, "Prediction request failed");
        assert!(body.details.is_some());
        assert!(body.timestamp.is_some());
        assert!(dir_is_empty(&dir));
    }

    #[actix_web::test]
    async fn slow_backend_is_cut_off_by_the_upstream_timeout() {
        let base = spawn_slow_upstream(Duration::from_secs(5));
        let dir = upload_dir();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state_with_timeout(
                    &base,
                    &dir,
                    1024,
                    Duration::from_secs(1),
                )))
                .configure(configure_api),
        )
        .await;

        let started = std::time::Instant::now();
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: HealthStatus = test::read_body_json(resp).await;
        assert!(!body.ok);
        assert_eq!(body.error.as_deref(), Some("Backend connection failed"));

        let body = multipart_body(&[("mode", "disease")], Some(("file", "leaf.jpg", b"jpegdata")));
        let resp = test::call_service(&app, multipart_request(body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorEnvelope = test::read_body_json(resp).await;
        assert_eq!(body.error, "Prediction request failed");
        assert!(body.details.is_some());
        assert!(body.timestamp.is_some());
        assert!(dir_is_empty(&dir));

        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[actix_web::test]
    async fn wrong_methods_get_405() {
        let base = spawn_upstream();
        let dir = upload_dir();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(&base, &dir, 1024)))
                .configure(configure_api),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/predict").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);

        let req = test::TestRequest::post().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        let body: ErrorEnvelope = test::read_body_json(resp).await;
        assert_eq!(body.error, "Method not allowed");
    }
}
