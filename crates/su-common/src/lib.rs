pub mod config;
pub mod embedding;
pub mod error;
pub mod logging;
pub mod matching;
pub mod records;
pub mod run_id;
pub mod search;
pub mod synonyms;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter};

pub use error::{EmbeddingError, MatchError};

/// Embedding length produced by the configured provider (text-embedding-3-small).
pub const EMBEDDING_DIMENSION: usize = 1536;

// Commonly used data models for matching functions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    #[serde(default)]
    pub display_name: String,
    pub department: Option<String>,
    pub job_role: Option<String>,
    pub office_location: Option<String>,
    pub mbti: Option<String>,
    #[serde(default)]
    pub hobbies: BTreeSet<String>,
    #[serde(default)]
    pub text: ProfileText,
    #[serde(default)]
    pub embeddings: ProfileEmbeddings,
}

impl Profile {
    /// Null out a free-text field and the embedding slot generated from it.
    ///
    /// `combined` is the mean of every field's vector, so it is dropped as well whenever the
    /// field carried text or had its own slot.
    pub fn redact(&mut self, field: ProfileField) {
        let text = self.text.field_mut(field).take();
        let mut fed_combined = text.is_some_and(|t| !t.trim().is_empty());
        if let Some(slot) = self.embeddings.slot_mut(field) {
            fed_combined |= slot.take().is_some();
        }
        if fed_combined {
            self.embeddings.combined = None;
        }
    }

    /// Everything a keyword search may look at, lower-cased and space-joined.
    pub fn search_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        parts.extend(self.department.as_deref());
        parts.extend(self.job_role.as_deref());
        parts.extend(self.office_location.as_deref());
        parts.extend(self.mbti.as_deref());
        parts.extend(self.hobbies.iter().map(String::as_str));
        parts.extend(self.text.present_fields().into_iter().map(|(_, value)| value));
        parts.join(" ").to_lowercase()
    }
}

/// Free-text profile fields that may be embedded or marked private.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, AsRefStr, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProfileField {
    CollaborationStyle,
    Strengths,
    PreferredColleagueType,
    WorkDescription,
    TechStack,
    Interests,
    CareerGoals,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileText {
    pub collaboration_style: Option<String>,
    pub strengths: Option<String>,
    pub preferred_colleague_type: Option<String>,
    pub work_description: Option<String>,
    pub tech_stack: Option<String>,
    pub interests: Option<String>,
    pub career_goals: Option<String>,
}

impl ProfileText {
    pub fn field(&self, field: ProfileField) -> Option<&str> {
        match field {
            ProfileField::CollaborationStyle => self.collaboration_style.as_deref(),
            ProfileField::Strengths => self.strengths.as_deref(),
            ProfileField::PreferredColleagueType => self.preferred_colleague_type.as_deref(),
            ProfileField::WorkDescription => self.work_description.as_deref(),
            ProfileField::TechStack => self.tech_stack.as_deref(),
            ProfileField::Interests => self.interests.as_deref(),
            ProfileField::CareerGoals => self.career_goals.as_deref(),
        }
    }

    fn field_mut(&mut self, field: ProfileField) -> &mut Option<String> {
        match field {
            ProfileField::CollaborationStyle => &mut self.collaboration_style,
            ProfileField::Strengths => &mut self.strengths,
            ProfileField::PreferredColleagueType => &mut self.preferred_colleague_type,
            ProfileField::WorkDescription => &mut self.work_description,
            ProfileField::TechStack => &mut self.tech_stack,
            ProfileField::Interests => &mut self.interests,
            ProfileField::CareerGoals => &mut self.career_goals,
        }
    }

    /// Non-blank fields in declaration order, trimmed.
    pub fn present_fields(&self) -> Vec<(ProfileField, &str)> {
        use strum::IntoEnumIterator;

        ProfileField::iter()
            .filter_map(|field| {
                self.field(field)
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(|value| (field, value))
            })
            .collect()
    }
}

/// Up to four independent embedding slots; `None` means the source text was never supplied
/// (or was redacted).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileEmbeddings {
    pub combined: Option<Vec<f32>>,
    pub collaboration_style: Option<Vec<f32>>,
    pub strengths: Option<Vec<f32>>,
    pub preferred_colleague: Option<Vec<f32>>,
}

impl ProfileEmbeddings {
    pub fn is_empty(&self) -> bool {
        self.combined.is_none()
            && self.collaboration_style.is_none()
            && self.strengths.is_none()
            && self.preferred_colleague.is_none()
    }

    /// Slot generated from a single source field. Fields without their own slot only feed
    /// `combined`.
    pub fn slot(&self, field: ProfileField) -> Option<&Vec<f32>> {
        match field {
            ProfileField::CollaborationStyle => self.collaboration_style.as_ref(),
            ProfileField::Strengths => self.strengths.as_ref(),
            ProfileField::PreferredColleagueType => self.preferred_colleague.as_ref(),
            _ => None,
        }
    }

    fn slot_mut(&mut self, field: ProfileField) -> Option<&mut Option<Vec<f32>>> {
        match field {
            ProfileField::CollaborationStyle => Some(&mut self.collaboration_style),
            ProfileField::Strengths => Some(&mut self.strengths),
            ProfileField::PreferredColleagueType => Some(&mut self.preferred_colleague),
            _ => None,
        }
    }

    /// (combined, collaboration, strengths, preferred colleague) pairs in a fixed order.
    pub fn slots(&self) -> [Option<&Vec<f32>>; 4] {
        [
            self.combined.as_ref(),
            self.collaboration_style.as_ref(),
            self.strengths.as_ref(),
            self.preferred_colleague.as_ref(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Club {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub member_count: u32,
    /// Posts plus chat messages in the trailing 7 days.
    #[serde(default)]
    pub recent_activity_count: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MembershipStatus {
    #[default]
    Active,
    Pending,
    Left,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubMembership {
    pub user_id: String,
    pub club_id: String,
    #[serde(default)]
    pub status: MembershipStatus,
}

impl ClubMembership {
    pub fn is_active(&self) -> bool {
        self.status == MembershipStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_clears_text_and_matching_slot() {
        let mut profile = Profile {
            text: ProfileText {
                strengths: Some("문제 해결".into()),
                tech_stack: Some("rust".into()),
                ..Default::default()
            },
            embeddings: ProfileEmbeddings {
                combined: Some(vec![1.0, 0.0]),
                strengths: Some(vec![0.0, 1.0]),
                ..Default::default()
            },
            ..Default::default()
        };

        profile.redact(ProfileField::Strengths);
        profile.redact(ProfileField::TechStack);

        assert_eq!(profile.text.strengths, None);
        assert_eq!(profile.text.tech_stack, None);
        assert_eq!(profile.embeddings.strengths, None);
        assert_eq!(profile.embeddings.combined, None);
    }

    #[test]
    fn redacting_an_empty_field_keeps_combined() {
        let mut profile = Profile {
            text: ProfileText {
                interests: Some("등산".into()),
                career_goals: Some("  ".into()),
                ..Default::default()
            },
            embeddings: ProfileEmbeddings {
                combined: Some(vec![1.0, 0.0]),
                ..Default::default()
            },
            ..Default::default()
        };

        profile.redact(ProfileField::CareerGoals);
        profile.redact(ProfileField::PreferredColleagueType);

        assert_eq!(profile.text.career_goals, None);
        assert_eq!(profile.embeddings.combined, Some(vec![1.0, 0.0]));
    }

    #[test]
    fn present_fields_skips_blank_values() {
        let text = ProfileText {
            collaboration_style: Some("  ".into()),
            interests: Some(" 등산 ".into()),
            ..Default::default()
        };

        assert_eq!(
            text.present_fields(),
            vec![(ProfileField::Interests, "등산")]
        );
    }

    #[test]
    fn search_text_is_lowercase() {
        let profile = Profile {
            department: Some("Platform".into()),
            hobbies: ["Hiking".to_string()].into_iter().collect(),
            ..Default::default()
        };

        assert_eq!(profile.search_text(), "platform hiking");
    }

    #[test]
    fn membership_defaults_to_active() {
        let membership: ClubMembership =
            serde_json::from_str(r#"{"user_id":"u1","club_id":"c1"}"#).unwrap();
        assert!(membership.is_active());
    }
}
