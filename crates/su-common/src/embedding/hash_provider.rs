use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use siphasher::sip::SipHasher13;
use unicode_normalization::UnicodeNormalization;

use super::{similarity::l2_normalize, EmbeddingProvider};
use crate::error::EmbeddingError;

/// Fixed seed for deterministic hashing.
/// Changing these values changes every stored vector; regenerate embeddings afterwards.
const HASH_SEED_K0: u64 = 0x5375_7265_5573_0001;
const HASH_SEED_K1: u64 = 0x1000_5375_7265_5573;

const WORD_WEIGHT: f32 = 1.0;
const BIGRAM_WEIGHT: f32 = 0.5;

/// Feature-hashing embedder.
///
/// - no model, no network; identical text always yields the identical vector
/// - word tokens plus character bigrams, so Korean compounds without spaces still overlap
/// - SipHash13 with a fixed seed keeps vectors stable across Rust releases
pub struct HashEmbeddingProvider {
    dimension: usize,
}

impl HashEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash_token(&self, token: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        token.hash(&mut hasher);
        hasher.finish()
    }

    fn weighted_tokens(text: &str) -> Vec<(String, f32)> {
        let normalized: String = text.nfkc().collect::<String>().to_lowercase();
        let mut tokens = Vec::new();

        for word in normalized
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            tokens.push((word.to_string(), WORD_WEIGHT));

            let chars: Vec<char> = word.chars().collect();
            for pair in chars.windows(2) {
                tokens.push((format!("#{}{}", pair[0], pair[1]), BIGRAM_WEIGHT));
            }
        }

        tokens
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for (token, weight) in Self::weighted_tokens(text) {
            let hash = self.hash_token(&token);
            let idx = (hash % self.dimension as u64) as usize;
            // Sign hashing: an independent bit decides the sign so collisions cancel out.
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign * weight;
        }

        l2_normalize(&mut vector);
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    fn name(&self) -> &'static str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }
        Ok(self.vectorize(text))
    }
}
