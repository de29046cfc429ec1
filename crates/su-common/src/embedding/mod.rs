pub mod config;
pub mod hash_provider;
pub mod openai;
pub mod parse;
pub mod profile;
pub mod regenerate;
pub mod similarity;

use async_trait::async_trait;
use tracing::warn;

use crate::error::EmbeddingError;
pub use config::{EmbeddingConfig, ProviderKind};
pub use hash_provider::HashEmbeddingProvider;
pub use openai::OpenAiEmbeddingProvider;
pub use parse::parse_embedding;
pub use profile::{generate_profile_embeddings, FallbackContext};
pub use regenerate::{regenerate_embeddings, RegenerationItem, RegenerationReport};
pub use similarity::{cosine_similarity, mean_pool, rescale_unit, try_cosine_similarity};

/// Abstract embedding backend.
///
/// Implementations:
/// - `HashEmbeddingProvider`: feature hashing, deterministic, no network
/// - `OpenAiEmbeddingProvider`: OpenAI-compatible `/v1/embeddings` endpoint
///
/// Implementations must fail on empty input rather than return a zero vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Implementation name ("hash", "openai"), recorded in regeneration reports.
    fn name(&self) -> &'static str;

    fn dimension(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// One vector per input, same order. Default: sequential `embed` calls.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

fn check_dimension(provider: &dyn EmbeddingProvider, vector: &[f32]) -> Result<(), EmbeddingError> {
    if vector.len() != provider.dimension() {
        warn!(
            provider = provider.name(),
            expected = provider.dimension(),
            actual = vector.len(),
            "provider returned embedding with unexpected dimension"
        );
        return Err(EmbeddingError::DimensionMismatch {
            expected: provider.dimension(),
            actual: vector.len(),
        });
    }
    Ok(())
}

/// Embed one trimmed, non-empty text.
pub async fn generate_embedding(
    provider: &dyn EmbeddingProvider,
    text: &str,
) -> Result<Vec<f32>, EmbeddingError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EmbeddingError::EmptyInput);
    }

    let vector = provider.embed(trimmed).await?;
    check_dimension(provider, &vector)?;
    Ok(vector)
}

/// Embed many texts. Blank inputs are dropped first; the result has one vector per
/// surviving input, in input order.
pub async fn generate_embeddings(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let surviving: Vec<String> = texts
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if surviving.is_empty() {
        return Ok(Vec::new());
    }

    let vectors = provider.embed_batch(&surviving).await?;
    if vectors.len() != surviving.len() {
        return Err(EmbeddingError::InvalidResponse(format!(
            "expected {} embeddings, got {}",
            surviving.len(),
            vectors.len()
        )));
    }
    for vector in &vectors {
        check_dimension(provider, vector)?;
    }
    Ok(vectors)
}

/// Provider factory. An `openai` configuration that cannot be built (no API key, broken
/// client) is `EmbeddingError::Unavailable`; it never degrades to the hash provider.
pub fn create_provider(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>, EmbeddingError> {
    let provider: Box<dyn EmbeddingProvider> = match config.provider {
        ProviderKind::OpenAi => Box::new(OpenAiEmbeddingProvider::new(config)?),
        ProviderKind::Hash => Box::new(HashEmbeddingProvider::new(config.dimension)),
    };
    Ok(provider)
}
