//! Profile search over structured query hints.
//!
//! An external model turns a free-text query into a [`QueryExpansion`]; only those fields reach
//! the scorer. [`KeywordQueryExpander`] is the local stand-in when no model is configured or the
//! model call fails.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::MatchError,
    matching::mbti,
    synonyms::{match_with_synonyms, normalize_term},
    Profile,
};

const KEYWORD_WEIGHT: f64 = 0.5;
const HOBBY_WEIGHT: f64 = 0.3;
const MBTI_WEIGHT: f64 = 0.2;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryExpansion {
    pub suggested_mbti_types: Vec<String>,
    pub suggested_hobbies: Vec<String>,
    pub keywords: Vec<String>,
    /// Model confidence in [0,1]; 0 for the keyword fallback.
    pub confidence: f64,
}

impl QueryExpansion {
    pub fn is_empty(&self) -> bool {
        self.suggested_mbti_types.is_empty()
            && self.suggested_hobbies.is_empty()
            && self.keywords.is_empty()
    }
}

#[async_trait]
pub trait QueryExpander: Send + Sync {
    fn name(&self) -> &'static str;

    async fn expand(&self, query: &str) -> Result<QueryExpansion, MatchError>;
}

/// Splits the query on whitespace and punctuation. Tokens that are valid MBTI codes become
/// suggested types; everything else is a keyword.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordQueryExpander;

impl KeywordQueryExpander {
    pub fn expand_local(query: &str) -> QueryExpansion {
        let mut expansion = QueryExpansion::default();

        for token in query
            .split(|c: char| !c.is_alphanumeric())
            .map(normalize_term)
            .filter(|t| !t.is_empty())
        {
            if mbti::normalize(&token).is_some() {
                let code = token.to_ascii_uppercase();
                if !expansion.suggested_mbti_types.contains(&code) {
                    expansion.suggested_mbti_types.push(code);
                }
            } else if !expansion.keywords.contains(&token) {
                expansion.keywords.push(token);
            }
        }
        expansion
    }
}

#[async_trait]
impl QueryExpander for KeywordQueryExpander {
    fn name(&self) -> &'static str {
        "keyword"
    }

    async fn expand(&self, query: &str) -> Result<QueryExpansion, MatchError> {
        Ok(Self::expand_local(query))
    }
}

/// Ask `expander`, falling back to [`KeywordQueryExpander`] when it fails.
pub async fn expand_query(expander: &dyn QueryExpander, query: &str) -> QueryExpansion {
    match expander.expand(query).await {
        Ok(expansion) => expansion,
        Err(err) => {
            warn!(expander = expander.name(), error = %err, "query expansion failed; using keyword fallback");
            KeywordQueryExpander::expand_local(query)
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchScore {
    pub keyword: f64,
    pub hobby: f64,
    pub mbti: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub user_id: String,
    pub display_name: String,
    pub score: SearchScore,
}

/// Components whose hint list is empty are left out and the remaining weights renormalized.
pub fn score_search_candidate(profile: &Profile, expansion: &QueryExpansion) -> SearchScore {
    let mut score = SearchScore::default();
    let mut weighted = 0.0;
    let mut active = 0.0;

    if !expansion.keywords.is_empty() {
        score.keyword = match_with_synonyms(&profile.search_text(), &expansion.keywords);
        weighted += KEYWORD_WEIGHT * score.keyword;
        active += KEYWORD_WEIGHT;
    }

    if !expansion.suggested_hobbies.is_empty() {
        let hobbies = profile
            .hobbies
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        score.hobby = match_with_synonyms(&hobbies, &expansion.suggested_hobbies);
        weighted += HOBBY_WEIGHT * score.hobby;
        active += HOBBY_WEIGHT;
    }

    if !expansion.suggested_mbti_types.is_empty() {
        score.mbti = mbti::best_compatibility(profile.mbti.as_deref(), &expansion.suggested_mbti_types);
        weighted += MBTI_WEIGHT * score.mbti;
        active += MBTI_WEIGHT;
    }

    if active > 0.0 {
        score.total = weighted / active;
    }
    score
}

/// Score, drop zero totals, sort descending (ties keep input order), truncate.
pub fn search_profiles(
    profiles: &[Profile],
    expansion: &QueryExpansion,
    exclude_user_id: Option<&str>,
    limit: usize,
) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = profiles
        .iter()
        .filter(|p| Some(p.user_id.as_str()) != exclude_user_id)
        .filter_map(|profile| {
            let score = score_search_candidate(profile, expansion);
            (score.total > 0.0).then(|| SearchResult {
                user_id: profile.user_id.clone(),
                display_name: profile.display_name.clone(),
                score,
            })
        })
        .collect();

    results.sort_by(|a, b| b.score.total.total_cmp(&a.score.total));
    results.truncate(limit);

    debug!(
        candidates = profiles.len(),
        matched = results.len(),
        confidence = expansion.confidence,
        "profile search finished"
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, role: &str, mbti: &str, hobbies: &[&str]) -> Profile {
        Profile {
            user_id: id.into(),
            job_role: Some(role.into()),
            mbti: Some(mbti.into()),
            hobbies: hobbies.iter().map(|h| h.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn local_expander_splits_and_detects_mbti() {
        let expansion = KeywordQueryExpander::expand_local("등산 좋아하는, ENFP 개발자! enfp");
        assert_eq!(expansion.keywords, vec!["등산", "좋아하는", "개발자"]);
        assert_eq!(expansion.suggested_mbti_types, vec!["ENFP"]);
        assert!(expansion.suggested_hobbies.is_empty());
        assert_eq!(expansion.confidence, 0.0);
    }

    #[test]
    fn missing_hint_lists_are_renormalized_away() {
        let p = profile("a", "백엔드 개발자", "INTJ", &["등산"]);
        let expansion = QueryExpansion {
            keywords: vec!["backend".into()],
            ..Default::default()
        };
        let score = score_search_candidate(&p, &expansion);
        assert_eq!(score.keyword, 1.0);
        assert_eq!(score.total, 1.0);
    }

    #[test]
    fn blends_all_components() {
        let p = profile("a", "디자이너", "INTP", &["hiking"]);
        let expansion = QueryExpansion {
            keywords: vec!["디자이너".into(), "zzqx".into()],
            suggested_hobbies: vec!["등산".into()],
            suggested_mbti_types: vec!["INTJ".into()],
            confidence: 0.8,
        };
        let score = score_search_candidate(&p, &expansion);
        assert_eq!(score.keyword, 0.5);
        assert_eq!(score.hobby, 1.0);
        assert_eq!(score.mbti, 0.7);
        let expected = 0.5 * 0.5 + 0.3 * 1.0 + 0.2 * 0.7;
        assert!((score.total - expected).abs() < 1e-9);
    }

    #[test]
    fn search_drops_zero_scores_and_sorts_stably() {
        let profiles = vec![
            profile("none", "회계", "ESTJ", &["게임"]),
            profile("half", "디자이너", "ESTJ", &[]),
            profile("me", "디자이너", "ESTJ", &["등산"]),
            profile("full", "디자이너", "ESTJ", &["등산"]),
            profile("half2", "디자이너", "ESTJ", &[]),
        ];
        let expansion = QueryExpansion {
            keywords: vec!["디자이너".into(), "등산".into()],
            ..Default::default()
        };

        let results = search_profiles(&profiles, &expansion, Some("me"), 10);
        let ids: Vec<&str> = results.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(ids, ["full", "half", "half2"]);
    }

    #[test]
    fn empty_expansion_matches_nothing() {
        let profiles = vec![profile("a", "디자이너", "ENFP", &["등산"])];
        assert!(search_profiles(&profiles, &QueryExpansion::default(), None, 10).is_empty());
    }

    struct BrokenExpander;

    #[async_trait]
    impl QueryExpander for BrokenExpander {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn expand(&self, _query: &str) -> Result<QueryExpansion, MatchError> {
            Err(MatchError::QueryExpansion("model timeout".into()))
        }
    }

    #[tokio::test]
    async fn failed_expander_falls_back_to_keywords() {
        let expansion = expand_query(&BrokenExpander, "요리 ISTP").await;
        assert_eq!(expansion.keywords, vec!["요리"]);
        assert_eq!(expansion.suggested_mbti_types, vec!["ISTP"]);
    }
}
