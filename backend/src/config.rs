use std::path::PathBuf;
use std::time::Duration;

use url::Url;

const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid BACKEND_URL '{value}': {source}")]
    BackendUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("BACKEND_URL must use http or https, got '{0}'")]
    BackendScheme(String),
    #[error("invalid {name} '{value}': expected a positive integer")]
    Number { name: &'static str, value: String },
}

/// Server settings, read from the environment (and `.env`) once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend_url: Url,
    pub bind_address: String,
    pub port: u16,
    pub frontend_dir: PathBuf,
    pub ref_dir: PathBuf,
    pub questions_path: PathBuf,
    pub upload_dir: PathBuf,
    pub upstream_timeout: Duration,
    pub max_upload_bytes: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // BACKEND_ORIGIN is the older name for the same setting.
        let raw_url = lookup("BACKEND_URL")
            .or_else(|| lookup("BACKEND_ORIGIN"))
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        let backend_url = parse_backend_url(&raw_url)?;

        let workspace_dir = lookup("CARGO_MANIFEST_DIR")
            .map(|dir| PathBuf::from(dir).join(".."))
            .unwrap_or_else(|| PathBuf::from("/usr/src/app"));

        let frontend_dir = lookup("FRONTEND_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| workspace_dir.join("frontend/dist"));
        let ref_dir = lookup("REF_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| workspace_dir.join("frontend/static/ref"));
        let questions_path = lookup("QUESTIONS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| workspace_dir.join("config/questions.yaml"));

        let upload_dir = lookup("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);

        let port = parse_number(&lookup, "PORT", 8081)?;
        let timeout_secs = parse_number(&lookup, "UPSTREAM_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let max_upload_bytes =
            parse_number(&lookup, "MAX_UPLOAD_BYTES", shared::MAX_UPLOAD_BYTES)?;

        Ok(Self {
            backend_url,
            bind_address: lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            frontend_dir,
            ref_dir,
            questions_path,
            upload_dir,
            upstream_timeout: Duration::from_secs(timeout_secs),
            max_upload_bytes,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

fn parse_backend_url(raw: &str) -> Result<Url, ConfigError> {
    // A trailing slash keeps `join("predict")` from replacing the last path segment.
    let normalized = format!("{}/", raw.trim_end_matches('/'));
    let url = Url::parse(&normalized).map_err(|source| ConfigError::BackendUrl {
        value: raw.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::BackendScheme(other.to_string())),
    }
}

fn parse_number<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + PartialOrd + Default,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) if parsed > T::default() => Ok(parsed),
            _ => Err(ConfigError::Number { name, value }),
        },
    }
}
