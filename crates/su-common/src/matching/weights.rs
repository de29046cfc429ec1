use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::MatchError;

const SUM_TOLERANCE: f64 = 1e-6;

/// Compatibility weights shipped with the product.
/// Embedding similarity and tag overlap carry the most signal; categorical matches are
/// tie-breakers.
pub const DEFAULT_WEIGHTS: Weights = Weights {
    embedding: 0.30,
    tags: 0.20,
    mbti: 0.10,
    job_role: 0.10,
    department: 0.10,
    location: 0.05,
    preference: 0.15,
};

pub const DEFAULT_CLUB_WEIGHTS: ClubWeights = ClubWeights {
    tag_match: 0.35,
    social_graph: 0.25,
    member_composition: 0.20,
    activity_level: 0.10,
    category_preference: 0.10,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub embedding: f64,
    pub tags: f64,
    pub mbti: f64,
    pub job_role: f64,
    pub department: f64,
    pub location: f64,
    pub preference: f64,
}

impl Default for Weights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.embedding
            + self.tags
            + self.mbti
            + self.job_role
            + self.department
            + self.location
            + self.preference
    }

    fn named(&self) -> [(&'static str, f64); 7] {
        [
            ("embedding", self.embedding),
            ("tags", self.tags),
            ("mbti", self.mbti),
            ("job_role", self.job_role),
            ("department", self.department),
            ("location", self.location),
            ("preference", self.preference),
        ]
    }

    fn scaled(&self, factor: f64) -> Self {
        Self {
            embedding: self.embedding * factor,
            tags: self.tags * factor,
            mbti: self.mbti * factor,
            job_role: self.job_role * factor,
            department: self.department * factor,
            location: self.location * factor,
            preference: self.preference * factor,
        }
    }

    /// Merge overrides onto the defaults, validate, and renormalize to sum 1.
    ///
    /// This is the only place where a weight record coming from outside (env, a stored user
    /// preference row) is turned into scorer weights.
    pub fn resolve(overrides: Option<&WeightOverrides>) -> Result<Self, MatchError> {
        let merged = match overrides {
            Some(o) => Self {
                embedding: o.embedding.unwrap_or(DEFAULT_WEIGHTS.embedding),
                tags: o.tags.unwrap_or(DEFAULT_WEIGHTS.tags),
                mbti: o.mbti.unwrap_or(DEFAULT_WEIGHTS.mbti),
                job_role: o.job_role.unwrap_or(DEFAULT_WEIGHTS.job_role),
                department: o.department.unwrap_or(DEFAULT_WEIGHTS.department),
                location: o.location.unwrap_or(DEFAULT_WEIGHTS.location),
                preference: o.preference.unwrap_or(DEFAULT_WEIGHTS.preference),
            },
            None => DEFAULT_WEIGHTS,
        };

        let sum = validate_named(&merged.named())?;
        if (sum - 1.0).abs() > SUM_TOLERANCE {
            warn!(sum, "compatibility weights do not sum to 1; renormalizing");
            return Ok(merged.scaled(1.0 / sum));
        }
        Ok(merged)
    }
}

/// Partial weight record; missing fields take the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightOverrides {
    pub embedding: Option<f64>,
    pub tags: Option<f64>,
    pub mbti: Option<f64>,
    pub job_role: Option<f64>,
    pub department: Option<f64>,
    pub location: Option<f64>,
    pub preference: Option<f64>,
}

impl WeightOverrides {
    /// `SU_WEIGHT_EMBEDDING`, `SU_WEIGHT_TAGS`, ... A value that is set but not a number is
    /// `MatchError::InvalidWeights`.
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, MatchError> {
        let read = |name: &str| read_weight(lookup, &format!("SU_WEIGHT_{name}"));
        Ok(Self {
            embedding: read("EMBEDDING")?,
            tags: read("TAGS")?,
            mbti: read("MBTI")?,
            job_role: read("JOB_ROLE")?,
            department: read("DEPARTMENT")?,
            location: read("LOCATION")?,
            preference: read("PREFERENCE")?,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClubWeights {
    pub tag_match: f64,
    pub social_graph: f64,
    pub member_composition: f64,
    pub activity_level: f64,
    pub category_preference: f64,
}

impl Default for ClubWeights {
    fn default() -> Self {
        DEFAULT_CLUB_WEIGHTS
    }
}

impl ClubWeights {
    pub fn sum(&self) -> f64 {
        self.tag_match
            + self.social_graph
            + self.member_composition
            + self.activity_level
            + self.category_preference
    }

    pub fn resolve(overrides: Option<&ClubWeightOverrides>) -> Result<Self, MatchError> {
        let merged = match overrides {
            Some(o) => Self {
                tag_match: o.tag_match.unwrap_or(DEFAULT_CLUB_WEIGHTS.tag_match),
                social_graph: o.social_graph.unwrap_or(DEFAULT_CLUB_WEIGHTS.social_graph),
                member_composition: o
                    .member_composition
                    .unwrap_or(DEFAULT_CLUB_WEIGHTS.member_composition),
                activity_level: o.activity_level.unwrap_or(DEFAULT_CLUB_WEIGHTS.activity_level),
                category_preference: o
                    .category_preference
                    .unwrap_or(DEFAULT_CLUB_WEIGHTS.category_preference),
            },
            None => DEFAULT_CLUB_WEIGHTS,
        };

        let sum = validate_named(&[
            ("tag_match", merged.tag_match),
            ("social_graph", merged.social_graph),
            ("member_composition", merged.member_composition),
            ("activity_level", merged.activity_level),
            ("category_preference", merged.category_preference),
        ])?;

        if (sum - 1.0).abs() > SUM_TOLERANCE {
            warn!(sum, "club weights do not sum to 1; renormalizing");
            return Ok(Self {
                tag_match: merged.tag_match / sum,
                social_graph: merged.social_graph / sum,
                member_composition: merged.member_composition / sum,
                activity_level: merged.activity_level / sum,
                category_preference: merged.category_preference / sum,
            });
        }
        Ok(merged)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClubWeightOverrides {
    pub tag_match: Option<f64>,
    pub social_graph: Option<f64>,
    pub member_composition: Option<f64>,
    pub activity_level: Option<f64>,
    pub category_preference: Option<f64>,
}

impl ClubWeightOverrides {
    /// `SU_CLUB_WEIGHT_TAG_MATCH`, `SU_CLUB_WEIGHT_SOCIAL_GRAPH`, ...
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, MatchError> {
        let read = |name: &str| read_weight(lookup, &format!("SU_CLUB_WEIGHT_{name}"));
        Ok(Self {
            tag_match: read("TAG_MATCH")?,
            social_graph: read("SOCIAL_GRAPH")?,
            member_composition: read("MEMBER_COMPOSITION")?,
            activity_level: read("ACTIVITY_LEVEL")?,
            category_preference: read("CATEGORY_PREFERENCE")?,
        })
    }
}

/// Unset or blank → `None`; anything else must parse as a number.
fn read_weight(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<f64>, MatchError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .map(Some)
        .map_err(|_| MatchError::InvalidWeights(format!("{key} is not a number: {raw:?}")))
}

/// Reject negative or non-finite weights and an all-zero set. Returns the sum.
fn validate_named(weights: &[(&'static str, f64)]) -> Result<f64, MatchError> {
    for (name, value) in weights {
        if !value.is_finite() || *value < 0.0 {
            return Err(MatchError::InvalidWeights(format!(
                "{name} must be a non-negative number, got {value}"
            )));
        }
    }

    let sum: f64 = weights.iter().map(|(_, v)| v).sum();
    if sum <= 0.0 {
        return Err(MatchError::InvalidWeights("all weights are zero".into()));
    }
    Ok(sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_sum_to_one() {
        assert!((DEFAULT_WEIGHTS.sum() - 1.0).abs() < 1e-9);
        assert!((DEFAULT_CLUB_WEIGHTS.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn resolve_without_overrides_is_default() {
        assert_eq!(Weights::resolve(None).unwrap(), DEFAULT_WEIGHTS);
        assert_eq!(ClubWeights::resolve(None).unwrap(), DEFAULT_CLUB_WEIGHTS);
    }

    #[test]
    fn resolve_keeps_overrides_that_sum_to_one() {
        let overrides = WeightOverrides {
            embedding: Some(0.20),
            tags: Some(0.30),
            ..Default::default()
        };
        let weights = Weights::resolve(Some(&overrides)).unwrap();
        assert_eq!(weights.embedding, 0.20);
        assert_eq!(weights.tags, 0.30);
        assert_eq!(weights.mbti, DEFAULT_WEIGHTS.mbti);
    }

    #[test]
    fn resolve_renormalizes_other_sums() {
        let overrides = WeightOverrides {
            embedding: Some(1.30),
            ..Default::default()
        };
        let weights = Weights::resolve(Some(&overrides)).unwrap();
        assert!((weights.sum() - 1.0).abs() < 1e-9);
        assert!((weights.embedding - 1.30 / 2.0).abs() < 1e-9);
    }

    #[test]
    fn resolve_rejects_negative_and_zero() {
        let negative = WeightOverrides {
            tags: Some(-0.1),
            ..Default::default()
        };
        assert!(matches!(
            Weights::resolve(Some(&negative)),
            Err(MatchError::InvalidWeights(_))
        ));

        let zero = ClubWeightOverrides {
            tag_match: Some(0.0),
            social_graph: Some(0.0),
            member_composition: Some(0.0),
            activity_level: Some(0.0),
            category_preference: Some(0.0),
        };
        assert!(ClubWeights::resolve(Some(&zero)).is_err());

        let nan = WeightOverrides {
            mbti: Some(f64::NAN),
            ..Default::default()
        };
        assert!(Weights::resolve(Some(&nan)).is_err());
    }

    #[test]
    fn overrides_read_from_lookup() {
        let lookup = |key: &str| match key {
            "SU_WEIGHT_TAGS" => Some("0.4".to_string()),
            "SU_WEIGHT_MBTI" => Some("  ".to_string()),
            "SU_CLUB_WEIGHT_SOCIAL_GRAPH" => Some(" 0.5 ".to_string()),
            _ => None,
        };
        let overrides = WeightOverrides::from_lookup(&lookup).unwrap();
        assert_eq!(overrides.tags, Some(0.4));
        assert_eq!(overrides.mbti, None);
        assert!(!overrides.is_empty());

        let club = ClubWeightOverrides::from_lookup(&lookup).unwrap();
        assert_eq!(club.social_graph, Some(0.5));
    }

    #[test]
    fn unparseable_override_is_rejected() {
        let lookup = |key: &str| (key == "SU_WEIGHT_MBTI").then(|| "lots".to_string());
        let err = WeightOverrides::from_lookup(&lookup).unwrap_err();
        assert!(matches!(err, MatchError::InvalidWeights(ref msg) if msg.contains("SU_WEIGHT_MBTI")));

        let lookup = |key: &str| (key == "SU_CLUB_WEIGHT_ACTIVITY_LEVEL").then(|| "0,3".to_string());
        assert!(ClubWeightOverrides::from_lookup(&lookup).is_err());
    }

    #[test]
    fn overrides_deserialize_partially() {
        let overrides: WeightOverrides = serde_json::from_str(r#"{"location":0.2}"#).unwrap();
        assert_eq!(overrides.location, Some(0.2));
        assert_eq!(overrides.tags, None);
    }
}
