//! HTTP client for an external sentence encoder.
//!
//! The encoder service exposes one route that takes `{"text": "..."}` and
//! answers `{"embedding": [...]}`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uservec_core::{StoreError, StoreResult, TextEncoder};

#[derive(Serialize)]
struct EmbedRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// [`TextEncoder`] backed by a remote `/embed` endpoint.
#[derive(Debug, Clone)]
pub struct HttpTextEncoder {
    client: reqwest::Client,
    url: String,
}

impl HttpTextEncoder {
    /// Creates a client for the endpoint at `url`, e.g. `http://encoder:5001/embed`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Encoder(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TextEncoder for HttpTextEncoder {
    async fn encode(&self, text: &str) -> StoreResult<Vec<f32>> {
        let response = self
            .client
            .post(&self.url)
            .json(&EmbedRequest { text })
            .send()
            .await
            .map_err(|e| StoreError::Encoder(format!("request to {} failed: {}", self.url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Encoder(format!(
                "{} answered with status {}",
                self.url, status
            )));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Encoder(format!("invalid response body: {}", e)))?;
        tracing::debug!(components = body.embedding.len(), "Encoded text");
        Ok(body.embedding)
    }
}
