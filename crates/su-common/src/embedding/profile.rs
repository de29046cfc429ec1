use tracing::debug;

use super::{generate_embedding, generate_embeddings, mean_pool, EmbeddingProvider};
use crate::error::EmbeddingError;
use crate::{Profile, ProfileEmbeddings, ProfileField, ProfileText};

/// Structured attributes used to synthesize a pseudo-sentence when a profile has no free text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FallbackContext {
    pub department: Option<String>,
    pub job_role: Option<String>,
    pub mbti: Option<String>,
    pub hobbies: Vec<String>,
}

impl FallbackContext {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            department: profile.department.clone(),
            job_role: profile.job_role.clone(),
            mbti: profile.mbti.clone(),
            hobbies: profile.hobbies.iter().cloned().collect(),
        }
    }

    /// `None` when every attribute is blank.
    pub fn sentence(&self) -> Option<String> {
        let mut parts = Vec::new();

        let department = non_blank(self.department.as_deref());
        let job_role = non_blank(self.job_role.as_deref());
        match (department, job_role) {
            (Some(dept), Some(role)) => parts.push(format!("{dept} 소속 {role}입니다.")),
            (Some(dept), None) => parts.push(format!("{dept} 소속입니다.")),
            (None, Some(role)) => parts.push(format!("직무는 {role}입니다.")),
            (None, None) => {}
        }

        if let Some(mbti) = non_blank(self.mbti.as_deref()) {
            parts.push(format!("MBTI는 {mbti}입니다."));
        }

        let hobbies: Vec<&str> = self
            .hobbies
            .iter()
            .map(|h| h.trim())
            .filter(|h| !h.is_empty())
            .collect();
        if !hobbies.is_empty() {
            parts.push(format!("취미는 {}입니다.", hobbies.join(", ")));
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Embed every non-empty free-text field and derive the combined vector.
///
/// - collaboration style / strengths / preferred colleague type fill their own slots
/// - `combined` is the element-wise mean of all per-field vectors (no re-embedding)
/// - without free text, the fallback sentence becomes the only (combined) vector
/// - `Ok(None)` when there is nothing to embed at all
pub async fn generate_profile_embeddings(
    provider: &dyn EmbeddingProvider,
    text: &ProfileText,
    fallback: Option<&FallbackContext>,
) -> Result<Option<ProfileEmbeddings>, EmbeddingError> {
    let fields = text.present_fields();

    if fields.is_empty() {
        let Some(sentence) = fallback.and_then(FallbackContext::sentence) else {
            return Ok(None);
        };
        debug!(provider = provider.name(), "embedding synthesized fallback sentence");
        let combined = generate_embedding(provider, &sentence).await?;
        return Ok(Some(ProfileEmbeddings {
            combined: Some(combined),
            ..Default::default()
        }));
    }

    let inputs: Vec<String> = fields.iter().map(|(_, value)| value.to_string()).collect();
    let vectors = generate_embeddings(provider, &inputs).await?;

    let mut embeddings = ProfileEmbeddings {
        combined: mean_pool(&vectors),
        ..Default::default()
    };

    for ((field, _), vector) in fields.iter().zip(vectors.into_iter()) {
        match field {
            ProfileField::CollaborationStyle => embeddings.collaboration_style = Some(vector),
            ProfileField::Strengths => embeddings.strengths = Some(vector),
            ProfileField::PreferredColleagueType => embeddings.preferred_colleague = Some(vector),
            _ => {}
        }
    }

    debug!(
        provider = provider.name(),
        fields = fields.len(),
        "generated profile embeddings"
    );
    Ok(Some(embeddings))
}
