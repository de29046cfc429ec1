use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, IntoEnumIterator};
use tracing::debug;

use super::{
    mbti,
    preferences::{list_membership, UserPreferences},
    weights::Weights,
};
use crate::{
    embedding::{cosine_similarity, rescale_unit},
    synonyms::jaccard,
    Profile,
};

/// Named compatibility components, in breakdown order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ScoreDimension {
    Embedding,
    Tags,
    Mbti,
    JobRole,
    Department,
    Location,
    Preference,
}

/// Seven component scores in [0,1] plus their weighted total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub embedding: f64,
    pub tags: f64,
    pub mbti: f64,
    pub job_role: f64,
    pub department: f64,
    pub location: f64,
    pub preference: f64,
    /// Dot product with the weights, not clamped.
    pub total: f64,
}

impl ScoreBreakdown {
    pub fn component(&self, dimension: ScoreDimension) -> f64 {
        match dimension {
            ScoreDimension::Embedding => self.embedding,
            ScoreDimension::Tags => self.tags,
            ScoreDimension::Mbti => self.mbti,
            ScoreDimension::JobRole => self.job_role,
            ScoreDimension::Department => self.department,
            ScoreDimension::Location => self.location,
            ScoreDimension::Preference => self.preference,
        }
    }

    pub fn components(&self) -> impl Iterator<Item = (ScoreDimension, f64)> + '_ {
        ScoreDimension::iter().map(|dimension| (dimension, self.component(dimension)))
    }
}

impl Weights {
    pub fn weight(&self, dimension: ScoreDimension) -> f64 {
        match dimension {
            ScoreDimension::Embedding => self.embedding,
            ScoreDimension::Tags => self.tags,
            ScoreDimension::Mbti => self.mbti,
            ScoreDimension::JobRole => self.job_role,
            ScoreDimension::Department => self.department,
            ScoreDimension::Location => self.location,
            ScoreDimension::Preference => self.preference,
        }
    }
}

/// Compatibility of `candidate` as seen by `viewer`, one score per dimension plus the weighted total.
///
/// `candidate` must already have private fields redacted. Weights are used as-is; validation
/// and renormalization happen in [`Weights::resolve`].
pub fn calculate_score(
    viewer: &Profile,
    candidate: &Profile,
    preferences: Option<&UserPreferences>,
    weights: &Weights,
) -> ScoreBreakdown {
    let mut breakdown = ScoreBreakdown {
        embedding: score_embedding(viewer, candidate),
        tags: jaccard(&viewer.hobbies, &candidate.hobbies),
        mbti: mbti::compatibility(viewer.mbti.as_deref(), candidate.mbti.as_deref()),
        job_role: score_categorical(
            viewer.job_role.as_deref(),
            candidate.job_role.as_deref(),
            preferences.map(|p| p.preferred_job_roles.as_slice()),
        ),
        department: score_department(viewer, candidate, preferences),
        location: score_categorical(
            viewer.office_location.as_deref(),
            candidate.office_location.as_deref(),
            preferences.map(|p| p.preferred_locations.as_slice()),
        ),
        preference: preferences.map_or(0.0, |p| score_preference(candidate, p)),
        total: 0.0,
    };

    breakdown.total = breakdown
        .components()
        .map(|(dimension, score)| score * weights.weight(dimension))
        .sum();

    debug!(
        candidate_id = %candidate.user_id,
        total = breakdown.total,
        "compatibility scored"
    );
    breakdown
}

/// Mean of rescaled cosine similarity over the slots both profiles carry.
fn score_embedding(viewer: &Profile, candidate: &Profile) -> f64 {
    let similarities: Vec<f64> = viewer
        .embeddings
        .slots()
        .into_iter()
        .zip(candidate.embeddings.slots())
        .filter_map(|pair| match pair {
            (Some(a), Some(b)) => Some(rescale_unit(cosine_similarity(a, b))),
            _ => None,
        })
        .collect();

    if similarities.is_empty() {
        return 0.0;
    }
    similarities.iter().sum::<f64>() / similarities.len() as f64
}

fn exact_match(a: Option<&str>, b: Option<&str>) -> f64 {
    match (a, b) {
        (Some(a), Some(b)) if a == b => 1.0,
        _ => 0.0,
    }
}

/// A populated preferred list replaces plain equality.
fn score_categorical(viewer: Option<&str>, candidate: Option<&str>, preferred: Option<&[String]>) -> f64 {
    match preferred.and_then(|list| list_membership(list, candidate)) {
        Some(true) => 1.0,
        Some(false) => 0.0,
        None => exact_match(viewer, candidate),
    }
}

fn score_department(viewer: &Profile, candidate: &Profile, preferences: Option<&UserPreferences>) -> f64 {
    let own = viewer.department.as_deref();
    let theirs = candidate.department.as_deref();

    let Some(prefs) = preferences else {
        return exact_match(own, theirs);
    };

    let explicit = list_membership(&prefs.preferred_departments, theirs);
    if explicit == Some(true) {
        return 1.0;
    }

    if prefs.prefer_cross_department {
        return match (own, theirs) {
            (Some(own), Some(theirs)) if own != theirs => 1.0,
            _ => 0.0,
        };
    }

    match explicit {
        Some(_) => 0.0,
        None => exact_match(own, theirs),
    }
}

/// Share of populated preference lists the candidate satisfies.
fn score_preference(candidate: &Profile, prefs: &UserPreferences) -> f64 {
    let populated = prefs.populated_lists();
    if populated == 0 {
        return 0.0;
    }

    let candidate_mbti = candidate.mbti.as_deref().and_then(mbti::normalize);
    let checks = [
        list_membership(&prefs.preferred_departments, candidate.department.as_deref()),
        list_membership(&prefs.preferred_job_roles, candidate.job_role.as_deref()),
        list_membership(&prefs.preferred_locations, candidate.office_location.as_deref()),
        (!prefs.preferred_mbti_types.is_empty()).then(|| {
            candidate_mbti.is_some_and(|code| {
                prefs
                    .preferred_mbti_types
                    .iter()
                    .any(|t| mbti::normalize(t) == Some(code))
            })
        }),
    ];

    let satisfied = checks.iter().filter(|c| **c == Some(true)).count();
    satisfied as f64 / populated as f64
}
