use std::time::Duration;

use strum::{AsRefStr, EnumString};

use crate::EMBEDDING_DIMENSION;

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProviderKind {
    Hash,
    #[strum(serialize = "openai")]
    OpenAi,
}

#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    /// Vector length every provider must return.
    pub dimension: usize,
    pub timeout_secs: u64,
    /// Pause between sequential provider calls during bulk regeneration.
    pub batch_delay_ms: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Hash,
            model: "text-embedding-3-small".into(),
            endpoint: "https://api.openai.com/v1/embeddings".into(),
            api_key: None,
            dimension: EMBEDDING_DIMENSION,
            timeout_secs: 30,
            batch_delay_ms: 350,
        }
    }
}

impl EmbeddingConfig {
    /// Read settings through `lookup` (normally `std::env::var`). Unparseable values fall back
    /// to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let api_key = lookup("SU_EMBEDDING_API_KEY")
            .or_else(|| lookup("OPENAI_API_KEY"))
            .filter(|key| !key.trim().is_empty());

        Self {
            provider: lookup("SU_EMBEDDING_PROVIDER")
                .and_then(|raw| raw.trim().parse().ok())
                .unwrap_or(defaults.provider),
            model: lookup("SU_EMBEDDING_MODEL").unwrap_or(defaults.model),
            endpoint: lookup("SU_EMBEDDING_ENDPOINT").unwrap_or(defaults.endpoint),
            api_key,
            dimension: lookup("SU_EMBEDDING_DIMENSION")
                .and_then(|raw| raw.parse().ok())
                .filter(|d: &usize| *d > 0)
                .unwrap_or(defaults.dimension),
            timeout_secs: lookup("SU_EMBEDDING_TIMEOUT_SECONDS")
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.timeout_secs),
            batch_delay_ms: lookup("SU_EMBEDDING_BATCH_DELAY_MS")
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.batch_delay_ms),
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch_delay_ms)
    }
}
