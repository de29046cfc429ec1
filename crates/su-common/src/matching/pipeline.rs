use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{
    club::{score_club, ClubRecommendation},
    explanation::{generate_explanation, MatchExplanation},
    preferences::UserPreferences,
    scoring::{calculate_score, ScoreBreakdown},
    weights::{ClubWeights, Weights},
};
use crate::{
    embedding::{generate_profile_embeddings, EmbeddingProvider, FallbackContext},
    Club, ClubMembership, Profile,
};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_POOL_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingOptions {
    /// Results returned after sorting.
    pub page_size: usize,
    /// Candidates considered at most, in input order.
    pub pool_limit: usize,
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            pool_limit: DEFAULT_POOL_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub user_id: String,
    pub display_name: String,
    pub score: ScoreBreakdown,
    pub explanation: MatchExplanation,
}

/// Everything needed to rank clubs for one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClubPool {
    pub user: Profile,
    pub clubs: Vec<Club>,
    pub member_profiles: Vec<Profile>,
    pub memberships: Vec<ClubMembership>,
    pub recommended_user_ids: Vec<String>,
}

/// Score every candidate against the viewer, sort by total and cut to the page size.
///
/// Candidates must already be redacted. The viewer is skipped if present in the pool; ties keep
/// input order.
pub fn rank_candidates(
    viewer: &Profile,
    candidates: &[Profile],
    preferences: Option<&UserPreferences>,
    weights: &Weights,
    options: RankingOptions,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .filter(|candidate| candidate.user_id != viewer.user_id)
        .take(options.pool_limit)
        .map(|candidate| {
            let score = calculate_score(viewer, candidate, preferences, weights);
            RankedCandidate {
                user_id: candidate.user_id.clone(),
                display_name: candidate.display_name.clone(),
                explanation: generate_explanation(viewer, candidate, &score),
                score,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total.total_cmp(&a.score.total));
    ranked.truncate(options.page_size);

    info!(
        viewer_id = %viewer.user_id,
        pool = candidates.len(),
        returned = ranked.len(),
        "candidates ranked"
    );
    ranked
}

/// Score every club in the pool for `pool.user`. With `exclude_joined`, clubs where the user has
/// an active membership are dropped before scoring.
pub fn recommend_clubs(
    pool: &ClubPool,
    weights: &ClubWeights,
    exclude_joined: bool,
    limit: usize,
) -> Vec<ClubRecommendation> {
    let joined: HashSet<&str> = if exclude_joined {
        pool.memberships
            .iter()
            .filter(|m| m.user_id == pool.user.user_id && m.is_active())
            .map(|m| m.club_id.as_str())
            .collect()
    } else {
        HashSet::new()
    };

    let mut recommendations: Vec<ClubRecommendation> = pool
        .clubs
        .iter()
        .filter(|club| !joined.contains(club.id.as_str()))
        .map(|club| {
            score_club(
                &pool.user,
                club,
                &pool.member_profiles,
                &pool.recommended_user_ids,
                &pool.memberships,
                weights,
            )
        })
        .collect();

    recommendations.sort_by(|a, b| b.total.total_cmp(&a.total));
    recommendations.truncate(limit);

    info!(
        user_id = %pool.user.user_id,
        clubs = pool.clubs.len(),
        excluded = joined.len(),
        returned = recommendations.len(),
        "clubs recommended"
    );
    recommendations
}

/// Generate embeddings for profiles that have none.
///
/// When the provider is unavailable the remaining profiles keep empty slots, so scoring falls
/// back to tag and attribute components. Returns how many profiles were filled.
pub async fn fill_missing_embeddings(
    provider: &dyn EmbeddingProvider,
    profiles: &mut [Profile],
) -> usize {
    let mut filled = 0;

    for profile in profiles.iter_mut().filter(|p| p.embeddings.is_empty()) {
        let fallback = FallbackContext::from_profile(profile);
        match generate_profile_embeddings(provider, &profile.text, Some(&fallback)).await {
            Ok(Some(embeddings)) => {
                profile.embeddings = embeddings;
                filled += 1;
            }
            Ok(None) => {}
            Err(err) if err.is_unavailable() => {
                warn!(
                    provider = provider.name(),
                    error = %err,
                    "embedding provider unavailable; scoring without embeddings"
                );
                break;
            }
            Err(err) => {
                warn!(user_id = %profile.user_id, error = %err, "embedding generation failed");
            }
        }
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        embedding::HashEmbeddingProvider,
        error::EmbeddingError,
        matching::weights::{DEFAULT_CLUB_WEIGHTS, DEFAULT_WEIGHTS},
        MembershipStatus,
    };
    use async_trait::async_trait;

    fn person(id: &str, dept: &str, hobbies: &[&str]) -> Profile {
        Profile {
            user_id: id.into(),
            display_name: id.into(),
            department: Some(dept.into()),
            hobbies: hobbies.iter().map(|h| h.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn ranks_descending_and_truncates() {
        let viewer = person("me", "플랫폼팀", &["등산", "요리"]);
        let candidates = vec![
            person("far", "디자인팀", &["게임"]),
            person("close", "플랫폼팀", &["등산", "요리"]),
            person("me", "플랫폼팀", &["등산", "요리"]),
            person("mid", "플랫폼팀", &["게임"]),
        ];

        let ranked = rank_candidates(
            &viewer,
            &candidates,
            None,
            &DEFAULT_WEIGHTS,
            RankingOptions {
                page_size: 2,
                pool_limit: 100,
            },
        );

        let ids: Vec<&str> = ranked.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(ids, ["close", "mid"]);
        assert!(!ranked[0].explanation.summary.is_empty());
    }

    #[test]
    fn ties_keep_input_order() {
        let viewer = person("me", "플랫폼팀", &[]);
        let candidates = vec![
            person("b", "디자인팀", &[]),
            person("a", "디자인팀", &[]),
            person("c", "디자인팀", &[]),
        ];
        let ranked = rank_candidates(&viewer, &candidates, None, &DEFAULT_WEIGHTS, RankingOptions::default());
        let ids: Vec<&str> = ranked.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "c"]);
    }

    #[test]
    fn pool_limit_applies_before_scoring() {
        let viewer = person("me", "플랫폼팀", &[]);
        let candidates = vec![person("x", "디자인팀", &[]), person("y", "플랫폼팀", &[])];
        let ranked = rank_candidates(
            &viewer,
            &candidates,
            None,
            &DEFAULT_WEIGHTS,
            RankingOptions {
                page_size: 10,
                pool_limit: 1,
            },
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].user_id, "x");
    }

    #[test]
    fn empty_pool_is_empty_result() {
        let viewer = person("me", "플랫폼팀", &[]);
        assert!(rank_candidates(&viewer, &[], None, &DEFAULT_WEIGHTS, RankingOptions::default()).is_empty());
    }

    #[test]
    fn joined_clubs_are_excluded_on_request() {
        let pool = ClubPool {
            user: person("me", "플랫폼팀", &["등산"]),
            clubs: vec![
                Club {
                    id: "joined".into(),
                    tags: ["등산".to_string()].into_iter().collect(),
                    ..Default::default()
                },
                Club {
                    id: "pending".into(),
                    ..Default::default()
                },
                Club {
                    id: "new".into(),
                    ..Default::default()
                },
            ],
            memberships: vec![
                ClubMembership {
                    user_id: "me".into(),
                    club_id: "joined".into(),
                    status: MembershipStatus::Active,
                },
                ClubMembership {
                    user_id: "me".into(),
                    club_id: "pending".into(),
                    status: MembershipStatus::Pending,
                },
            ],
            ..Default::default()
        };

        let excluded = recommend_clubs(&pool, &DEFAULT_CLUB_WEIGHTS, true, 10);
        let ids: Vec<&str> = excluded.iter().map(|r| r.club_id.as_str()).collect();
        assert_eq!(ids, ["pending", "new"]);

        let included = recommend_clubs(&pool, &DEFAULT_CLUB_WEIGHTS, false, 10);
        assert_eq!(included[0].club_id, "joined");
        assert_eq!(included.len(), 3);
    }

    struct DownProvider;

    #[async_trait]
    impl EmbeddingProvider for DownProvider {
        fn name(&self) -> &'static str {
            "down"
        }

        fn dimension(&self) -> usize {
            8
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
            Err(EmbeddingError::Unavailable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn unavailable_provider_leaves_slots_empty() {
        let mut profiles = vec![person("a", "플랫폼팀", &["등산"]), person("b", "디자인팀", &["요리"])];
        let filled = fill_missing_embeddings(&DownProvider, &mut profiles).await;
        assert_eq!(filled, 0);
        assert!(profiles.iter().all(|p| p.embeddings.is_empty()));
    }

    #[tokio::test]
    async fn fills_only_missing_embeddings() {
        let provider = HashEmbeddingProvider::new(16);
        let mut existing = person("a", "플랫폼팀", &["등산"]);
        existing.embeddings.combined = Some(vec![0.0; 16]);
        let mut profiles = vec![existing, person("b", "디자인팀", &["요리"]), Profile::default()];

        let filled = fill_missing_embeddings(&provider, &mut profiles).await;

        assert_eq!(filled, 1);
        assert_eq!(profiles[0].embeddings.combined, Some(vec![0.0; 16]));
        assert_eq!(profiles[1].embeddings.combined.as_ref().map(Vec::len), Some(16));
        assert!(profiles[2].embeddings.is_empty());
    }
}
