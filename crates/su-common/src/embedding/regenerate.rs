use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{generate_profile_embeddings, EmbeddingProvider, FallbackContext};
use crate::{run_id, Profile, ProfileEmbeddings, ProfileText};

#[derive(Debug, Clone, Default)]
pub struct RegenerationItem {
    pub user_id: String,
    pub text: ProfileText,
    pub fallback: Option<FallbackContext>,
}

impl RegenerationItem {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            user_id: profile.user_id.clone(),
            text: profile.text.clone(),
            fallback: Some(FallbackContext::from_profile(profile)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedEmbeddings {
    pub user_id: String,
    pub embeddings: ProfileEmbeddings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedRegeneration {
    pub user_id: String,
    pub error: String,
    pub unavailable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegenerationReport {
    pub run_id: String,
    pub provider: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub generated: Vec<GeneratedEmbeddings>,
    /// Users with neither free text nor fallback attributes.
    pub skipped: Vec<String>,
    pub failed: Vec<FailedRegeneration>,
}

/// Regenerate embeddings for many users, one at a time, pausing `delay` between users that
/// hit the provider. A failing user is recorded and the run continues.
pub async fn regenerate_embeddings(
    provider: &dyn EmbeddingProvider,
    items: &[RegenerationItem],
    delay: Duration,
) -> RegenerationReport {
    let run_id = run_id::generate();
    let started_at = Utc::now();
    let mut generated = Vec::new();
    let mut skipped = Vec::new();
    let mut failed = Vec::new();

    info!(%run_id, provider = provider.name(), users = items.len(), "embedding regeneration started");

    let mut called_provider = false;
    for item in items {
        let needs_call = !item.text.present_fields().is_empty()
            || item
                .fallback
                .as_ref()
                .and_then(FallbackContext::sentence)
                .is_some();

        if needs_call && called_provider && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        called_provider |= needs_call;

        match generate_profile_embeddings(provider, &item.text, item.fallback.as_ref()).await {
            Ok(Some(embeddings)) => generated.push(GeneratedEmbeddings {
                user_id: item.user_id.clone(),
                embeddings,
            }),
            Ok(None) => skipped.push(item.user_id.clone()),
            Err(err) => {
                warn!(%run_id, user_id = %item.user_id, error = %err, "embedding regeneration failed");
                failed.push(FailedRegeneration {
                    user_id: item.user_id.clone(),
                    unavailable: err.is_unavailable(),
                    error: err.to_string(),
                });
            }
        }
    }

    let report = RegenerationReport {
        run_id,
        provider: provider.name().to_string(),
        started_at,
        finished_at: Utc::now(),
        generated,
        skipped,
        failed,
    };

    info!(
        run_id = %report.run_id,
        generated = report.generated.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "embedding regeneration finished"
    );
    report
}
