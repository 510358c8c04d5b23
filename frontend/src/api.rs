use gloo_file::File as GlooFile;
use gloo_net::http::{Request, Response};
use shared::{
    extract_error_message, HealthStatus, Mode, PredictRequest, PredictResponse, QuestionBank,
};
use wasm_bindgen::JsValue;
use web_sys::FormData;

const DEFAULT_API_BASE: &str = "/api";
const NETWORK_ERROR: &str = "Unable to connect to server";

/// Base path of the proxy API, fixed at build time through `API_BASE_URL`.
pub fn api_base() -> &'static str {
    option_env!("API_BASE_URL")
        .filter(|base| !base.is_empty())
        .unwrap_or(DEFAULT_API_BASE)
}

fn endpoint(path: &str) -> String {
    format!("{}/{}", api_base().trim_end_matches('/'), path)
}

fn js_error(e: JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{:?}", e))
}

pub async fn fetch_questions() -> Result<QuestionBank, String> {
    let response = Request::get(&endpoint("questions"))
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    if !response.ok() {
        return Err(format!("Failed to load questions ({})", response.status()));
    }
    response
        .json::<QuestionBank>()
        .await
        .map_err(|e| format!("Failed to parse questions: {}", e))
}

/// Never fails: transport problems are reported as an offline status.
pub async fn check_health() -> HealthStatus {
    let response = match Request::get(&endpoint("health")).send().await {
        Ok(response) => response,
        Err(e) => {
            log::warn!("Health check failed: {}", e);
            return HealthStatus::offline("Network error", e.to_string());
        }
    };

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<HealthStatus>(&text) {
        Ok(mut health) => {
            if !(200..300).contains(&status) {
                health.ok = false;
            }
            health
        }
        Err(_) => HealthStatus::offline(
            format!("Health check returned {}", status),
            text,
        ),
    }
}

/// Submits one analysis. `answers` is the already-shaped wire value.
/// With an image the request is multipart, otherwise plain JSON.
pub async fn predict(
    mode: Mode,
    answers: serde_json::Value,
    image: Option<GlooFile>,
) -> Result<PredictResponse, String> {
    let url = endpoint("predict");
    let request = match image {
        Some(file) => {
            let form_data = FormData::new().map_err(js_error)?;
            form_data
                .append_with_str("mode", mode.as_ref())
                .map_err(js_error)?;
            form_data
                .append_with_str("answers", &answers.to_string())
                .map_err(js_error)?;
            let filename = file.name();
            let raw_file: &web_sys::File = file.as_ref();
            form_data
                .append_with_blob_and_filename("file", raw_file, &filename)
                .map_err(js_error)?;
            Request::post(&url).body(form_data)
        }
        None => Request::post(&url).json(&PredictRequest { mode, answers }),
    }
    .map_err(|e| format!("Failed to build request: {}", e))?;

    let response = request.send().await.map_err(|e| {
        log::error!("Prediction request failed: {}", e);
        NETWORK_ERROR.to_string()
    })?;

    read_prediction(mode, response).await
}

async fn read_prediction(mode: Mode, response: Response) -> Result<PredictResponse, String> {
    let status = response.status();
    let text = response.text().await.map_err(|_| NETWORK_ERROR.to_string())?;

    if !response.ok() {
        return Err(extract_error_message(status, &text));
    }

    let mut prediction: PredictResponse = serde_json::from_str(&text)
        .map_err(|e| format!("Failed to parse response: {}", e))?;
    if prediction.ref_img.is_none() {
        prediction.ref_img = Some(mode.reference_image().to_string());
    }
    Ok(prediction)
}
