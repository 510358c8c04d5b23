use serde::{Deserialize, Deserializer, Serialize};

use crate::mode::Mode;

/// JSON body of an answers-only prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub mode: Mode,
    pub answers: serde_json::Value,
}

/// Which inputs a submission carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    Combined,
    AnswersOnly,
}

impl SubmissionKind {
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionKind::Combined => "combined",
            SubmissionKind::AnswersOnly => "answers only",
        }
    }
}

// Sections for a model that did not run may carry nulls.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Older backends send booleans where newer ones send 0/1 class labels.
fn flag_or_int<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Flag(bool),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => 0,
        Some(Raw::Flag(flag)) => flag as i32,
        Some(Raw::Int(value)) => value as i32,
        Some(Raw::Float(value)) => value as i32,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YoloResult {
    #[serde(default, alias = "present", deserialize_with = "null_as_default")]
    pub available: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub conf: f64,
    #[serde(default, deserialize_with = "flag_or_int")]
    pub label: i32,
    #[serde(default, alias = "boxes", deserialize_with = "null_as_default")]
    pub bboxes: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabNetResult {
    #[serde(default, alias = "proba", deserialize_with = "null_as_default")]
    pub conf: f64,
    #[serde(default, alias = "pred", deserialize_with = "flag_or_int")]
    pub label: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub top_positive_keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FusionThresholds {
    #[serde(default)]
    pub yolo: f64,
    #[serde(default)]
    pub tabnet: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FusionResult {
    #[serde(default, alias = "present", deserialize_with = "null_as_default")]
    pub detected: bool,
    #[serde(default, alias = "rule", deserialize_with = "null_as_default")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<FusionThresholds>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceNumbers {
    pub yolo_conf: Option<f64>,
    pub tabnet_conf: Option<f64>,
    #[serde(default)]
    pub yes_count: u32,
    #[serde(default)]
    pub no_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default)]
    pub numbers: TraceNumbers,
}

/// Classification returned by the prediction service, relayed through `/api/predict`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub mode: Mode,
    #[serde(default, deserialize_with = "null_as_default")]
    pub used_image: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub yolo: YoloResult,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tabnet: TabNetResult,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fusion: FusionResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Trace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_img: Option<String>,
}

impl PredictResponse {
    pub fn reference_image(&self) -> &str {
        self.ref_img
            .as_deref()
            .unwrap_or_else(|| self.mode.reference_image())
    }

    pub fn reference_image_path(&self) -> String {
        self.mode.reference_image_path(self.reference_image())
    }

    pub fn tabnet_threshold(&self) -> Option<f64> {
        self.fusion
            .thresholds
            .map(|t| t.tabnet)
            .or(self.tabnet.threshold)
    }

    /// The fusion reason with underscores spelled out, e.g. `image_and_answers`.
    pub fn reason_text(&self) -> String {
        self.fusion.reason.replace('_', " ")
    }
}

/// Generic failure body produced by the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            timestamp: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }
}

/// Health payload as seen by the client. Extra upstream fields are kept as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl HealthStatus {
    pub fn offline(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
            details: Some(details.into()),
            extra: serde_json::Map::new(),
        }
    }
}

/// User-facing message for a failed prediction response body.
pub fn extract_error_message(status: u16, body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return "Unknown error".to_string();
    };
    ["error", "detail"]
        .iter()
        .find_map(|field| value.get(field).and_then(|v| v.as_str()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("API error {}", status))
}
