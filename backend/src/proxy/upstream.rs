use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use reqwest::Client;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum UpstreamInitError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("failed to derive upstream endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Status, content type and raw body of one upstream reply.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    pub fn json(&self) -> Option<serde_json::Value> {
        serde_json::from_slice(&self.body).ok()
    }
}

/// Single shared client for the prediction service. Every call is bounded by
/// the configured timeout and is never retried.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
    health_url: Url,
    predict_url: Url,
}

impl UpstreamClient {
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, UpstreamInitError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            health_url: base_url.join("health")?,
            predict_url: base_url.join("predict")?,
        })
    }

    pub fn predict_url(&self) -> &Url {
        &self.predict_url
    }

    pub async fn health(&self) -> Result<UpstreamResponse, reqwest::Error> {
        let response = self.client.get(self.health_url.clone()).send().await?;
        Self::collect(response).await
    }

    pub async fn predict_json(
        &self,
        body: &serde_json::Value,
    ) -> Result<UpstreamResponse, reqwest::Error> {
        let response = self
            .client
            .post(self.predict_url.clone())
            .json(body)
            .send()
            .await?;
        Self::collect(response).await
    }

    pub async fn predict_multipart(&self, form: Form) -> Result<UpstreamResponse, reqwest::Error> {
        let response = self
            .client
            .post(self.predict_url.clone())
            .multipart(form)
            .send()
            .await?;
        Self::collect(response).await
    }

    async fn collect(response: reqwest::Response) -> Result<UpstreamResponse, reqwest::Error> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();
        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}
