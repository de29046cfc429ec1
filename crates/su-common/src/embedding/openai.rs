use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{EmbeddingConfig, EmbeddingProvider};
use crate::error::EmbeddingError;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

/// OpenAI-compatible `/v1/embeddings` client.
///
/// Transport errors, timeouts and non-2xx responses all surface as
/// `EmbeddingError::Unavailable`.
pub struct OpenAiEmbeddingProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    dimension: usize,
}

impl OpenAiEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| EmbeddingError::Unavailable("embedding API key is not configured".into()))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|err| EmbeddingError::Unavailable(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key,
            dimension: config.dimension,
        })
    }

    async fn request(&self, input: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                model = %self.model,
                inputs = input.len(),
                "embedding request failed"
            );
            return Err(EmbeddingError::Unavailable(format!(
                "provider responded with {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        let body: EmbeddingResponse = response.json().await?;
        debug!(inputs = input.len(), returned = body.data.len(), "embedding response");
        order_by_index(body.data, input.len())
    }
}

/// The API may return data out of order; place each vector at its `index`.
fn order_by_index(data: Vec<EmbeddingDatum>, expected: usize) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if data.len() != expected {
        return Err(EmbeddingError::InvalidResponse(format!(
            "expected {expected} embeddings, got {}",
            data.len()
        )));
    }

    let mut ordered: Vec<Option<Vec<f32>>> = vec![None; expected];
    for datum in data {
        let slot = ordered.get_mut(datum.index).ok_or_else(|| {
            EmbeddingError::InvalidResponse(format!("embedding index {} out of range", datum.index))
        })?;
        *slot = Some(datum.embedding);
    }

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, v)| v.ok_or_else(|| EmbeddingError::InvalidResponse(format!("missing embedding {i}"))))
        .collect()
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        let mut vectors = self.request(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::InvalidResponse("empty embedding response".into()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.iter().any(|t| t.trim().is_empty()) {
            return Err(EmbeddingError::EmptyInput);
        }
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts).await
    }
}
