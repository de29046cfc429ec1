//! Persisted row shapes and their conversion into scoring types.
//!
//! This is the only place where raw embedding values and per-field visibility are interpreted.
//! Everything downstream sees a redacted [`Profile`] with concrete vectors.

use std::{collections::BTreeMap, fs, path::Path};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    embedding::parse_embedding, error::MatchError, Profile, ProfileEmbeddings, ProfileField,
    ProfileText,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

/// A profile row as stored: embeddings are raw JSON (array or encoded string).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub job_role: Option<String>,
    #[serde(default)]
    pub office_location: Option<String>,
    #[serde(default)]
    pub mbti: Option<String>,
    #[serde(default)]
    pub hobbies: Vec<String>,
    #[serde(flatten)]
    pub text: ProfileText,
    #[serde(default)]
    pub embedding: Value,
    #[serde(default)]
    pub collaboration_style_embedding: Value,
    #[serde(default)]
    pub strengths_embedding: Value,
    #[serde(default)]
    pub preferred_colleague_embedding: Value,
    /// Fields not listed are public.
    #[serde(default)]
    pub visibility: BTreeMap<ProfileField, Visibility>,
}

impl ProfileRecord {
    pub fn is_private(&self, field: ProfileField) -> bool {
        self.visibility.get(&field) == Some(&Visibility::Private)
    }

    /// Parse embeddings, drop blank values, and redact private fields together with the
    /// embedding slot generated from them. A private field with content also drops the stored
    /// `combined` vector, which was pooled over it.
    pub fn into_profile(self, expected_dimension: usize) -> Profile {
        let non_blank = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let private: Vec<ProfileField> = self
            .visibility
            .iter()
            .filter(|(_, visibility)| **visibility == Visibility::Private)
            .map(|(field, _)| *field)
            .collect();

        let mut profile = Profile {
            embeddings: ProfileEmbeddings {
                combined: parse_embedding(&self.embedding, expected_dimension),
                collaboration_style: parse_embedding(
                    &self.collaboration_style_embedding,
                    expected_dimension,
                ),
                strengths: parse_embedding(&self.strengths_embedding, expected_dimension),
                preferred_colleague: parse_embedding(
                    &self.preferred_colleague_embedding,
                    expected_dimension,
                ),
            },
            user_id: self.user_id,
            display_name: self.display_name,
            department: non_blank(self.department),
            job_role: non_blank(self.job_role),
            office_location: non_blank(self.office_location),
            mbti: non_blank(self.mbti),
            hobbies: self
                .hobbies
                .into_iter()
                .map(|h| h.trim().to_string())
                .filter(|h| !h.is_empty())
                .collect(),
            text: self.text,
        };

        for field in private {
            profile.redact(field);
        }
        profile
    }
}

/// Read a JSON document from disk.
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, MatchError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Read a JSON array of profile rows and convert each into a redacted [`Profile`].
pub fn load_profiles(path: impl AsRef<Path>, expected_dimension: usize) -> Result<Vec<Profile>, MatchError> {
    let records: Vec<ProfileRecord> = load_json(path)?;
    Ok(records
        .into_iter()
        .map(|record| record.into_profile(expected_dimension))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> ProfileRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn parses_array_and_string_embeddings() {
        let profile = record(json!({
            "user_id": "u1",
            "embedding": [0.1, 0.2, 0.3],
            "strengths_embedding": "[1.0, 0.0, 0.0]",
            "collaboration_style_embedding": [1.0, 2.0],
        }))
        .into_profile(3);

        assert_eq!(profile.embeddings.combined, Some(vec![0.1, 0.2, 0.3]));
        assert_eq!(profile.embeddings.strengths, Some(vec![1.0, 0.0, 0.0]));
        assert_eq!(profile.embeddings.collaboration_style, None);
        assert_eq!(profile.embeddings.preferred_colleague, None);
    }

    #[test]
    fn private_fields_are_redacted_with_their_slot_and_combined() {
        let profile = record(json!({
            "user_id": "u1",
            "strengths": "꼼꼼한 코드 리뷰",
            "interests": "사이드 프로젝트",
            "embedding": [0.0, 1.0],
            "strengths_embedding": [1.0, 0.0],
            "visibility": { "strengths": "private", "interests": "public" },
        }))
        .into_profile(2);

        assert_eq!(profile.text.strengths, None);
        assert_eq!(profile.embeddings.strengths, None);
        assert_eq!(profile.text.interests.as_deref(), Some("사이드 프로젝트"));
        assert_eq!(profile.embeddings.combined, None);
    }

    #[test]
    fn public_records_keep_combined() {
        let profile = record(json!({
            "user_id": "u1",
            "interests": "사이드 프로젝트",
            "embedding": [0.0, 1.0],
            "visibility": { "interests": "public", "career_goals": "private" },
        }))
        .into_profile(2);

        assert_eq!(profile.embeddings.combined, Some(vec![0.0, 1.0]));
    }

    #[test]
    fn blank_attributes_and_tags_are_dropped() {
        let profile = record(json!({
            "user_id": "u1",
            "department": "  ",
            "mbti": " INTJ ",
            "hobbies": ["등산", " ", "등산", "요리 "],
        }))
        .into_profile(2);

        assert_eq!(profile.department, None);
        assert_eq!(profile.mbti.as_deref(), Some("INTJ"));
        assert_eq!(profile.hobbies.into_iter().collect::<Vec<_>>(), vec!["등산", "요리"]);
    }

    #[test]
    fn visibility_defaults_to_public() {
        let rec = record(json!({ "user_id": "u1" }));
        assert!(!rec.is_private(ProfileField::Strengths));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_profiles("/definitely/not/here.json", 2).unwrap_err();
        assert!(matches!(err, MatchError::Io(_)));
    }
}
