use crate::{
    embedding::EmbeddingConfig,
    error::MatchError,
    matching::{
        pipeline::{RankingOptions, DEFAULT_PAGE_SIZE, DEFAULT_POOL_LIMIT},
        weights::{ClubWeightOverrides, ClubWeights, WeightOverrides, Weights},
    },
};

/// Process-wide matcher settings.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    pub weights: Weights,
    pub club_weights: ClubWeights,
    pub embedding: EmbeddingConfig,
    pub page_size: usize,
    pub pool_limit: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            club_weights: ClubWeights::default(),
            embedding: EmbeddingConfig::default(),
            page_size: DEFAULT_PAGE_SIZE,
            pool_limit: DEFAULT_POOL_LIMIT,
        }
    }
}

impl MatcherConfig {
    /// Weight overrides go through `resolve`, so invalid values are an error rather than a
    /// silent default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, MatchError> {
        fn parse_usize(raw: Option<String>, default: usize) -> usize {
            raw.and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        }

        let weight_overrides = WeightOverrides::from_lookup(&lookup)?;
        let club_overrides = ClubWeightOverrides::from_lookup(&lookup)?;

        Ok(Self {
            weights: Weights::resolve(Some(&weight_overrides))?,
            club_weights: ClubWeights::resolve(Some(&club_overrides))?,
            embedding: EmbeddingConfig::from_lookup(&lookup),
            page_size: parse_usize(lookup("SU_MATCH_PAGE_SIZE"), DEFAULT_PAGE_SIZE),
            pool_limit: parse_usize(lookup("SU_CANDIDATE_POOL_LIMIT"), DEFAULT_POOL_LIMIT),
        })
    }

    pub fn from_env() -> Result<Self, MatchError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn ranking(&self) -> RankingOptions {
        RankingOptions {
            page_size: self.page_size,
            pool_limit: self.pool_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        embedding::ProviderKind,
        matching::weights::{DEFAULT_CLUB_WEIGHTS, DEFAULT_WEIGHTS},
    };
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = MatcherConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.weights, DEFAULT_WEIGHTS);
        assert_eq!(config.club_weights, DEFAULT_CLUB_WEIGHTS);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.pool_limit, 100);
        assert_eq!(config.embedding.provider, ProviderKind::Hash);
    }

    #[test]
    fn reads_every_section() {
        let config = MatcherConfig::from_lookup(lookup_from(&[
            ("SU_WEIGHT_LOCATION", "0.05"),
            ("SU_CLUB_WEIGHT_ACTIVITY_LEVEL", "0.10"),
            ("SU_EMBEDDING_PROVIDER", "OpenAI"),
            ("SU_MATCH_PAGE_SIZE", "25"),
            ("SU_CANDIDATE_POOL_LIMIT", "0"),
        ]))
        .unwrap();

        assert_eq!(config.weights.location, 0.05);
        assert_eq!(config.embedding.provider, ProviderKind::OpenAi);
        assert_eq!(config.ranking().page_size, 25);
        assert_eq!(config.ranking().pool_limit, 100);
    }

    #[test]
    fn invalid_weights_are_rejected() {
        let err = MatcherConfig::from_lookup(lookup_from(&[("SU_WEIGHT_TAGS", "-1")])).unwrap_err();
        assert!(matches!(err, MatchError::InvalidWeights(_)));
    }

    #[test]
    fn non_numeric_weight_is_rejected() {
        let err = MatcherConfig::from_lookup(lookup_from(&[("SU_WEIGHT_MBTI", "lots")])).unwrap_err();
        assert!(matches!(err, MatchError::InvalidWeights(_)));
    }

    #[test]
    fn unbalanced_weights_are_renormalized() {
        let config =
            MatcherConfig::from_lookup(lookup_from(&[("SU_CLUB_WEIGHT_TAG_MATCH", "1.35")])).unwrap();
        assert!((config.club_weights.sum() - 1.0).abs() < 1e-9);
    }
}
