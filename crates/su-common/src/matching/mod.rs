pub mod club;
pub mod explanation;
pub mod mbti;
pub mod pipeline;
pub mod preferences;
pub mod scoring;
pub mod weights;

pub use club::{score_club, ClubBreakdown, ClubRecommendation};
pub use explanation::{generate_explanation, MatchExplanation};
pub use pipeline::{rank_candidates, recommend_clubs, ClubPool, RankedCandidate};
pub use preferences::UserPreferences;
pub use scoring::{calculate_score, ScoreBreakdown, ScoreDimension};
pub use weights::{ClubWeights, Weights, DEFAULT_CLUB_WEIGHTS, DEFAULT_WEIGHTS};
