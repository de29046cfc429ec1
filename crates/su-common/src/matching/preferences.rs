use serde::{Deserialize, Serialize};

/// Viewer-stated matching preferences. Empty lists mean "no preference" and never penalize.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    pub preferred_departments: Vec<String>,
    pub preferred_job_roles: Vec<String>,
    pub preferred_locations: Vec<String>,
    pub preferred_mbti_types: Vec<String>,
    pub prefer_cross_department: bool,
}

impl UserPreferences {
    /// Number of preference lists that carry at least one entry.
    pub fn populated_lists(&self) -> usize {
        [
            &self.preferred_departments,
            &self.preferred_job_roles,
            &self.preferred_locations,
            &self.preferred_mbti_types,
        ]
        .iter()
        .filter(|list| !list.is_empty())
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.populated_lists() == 0 && !self.prefer_cross_department
    }
}

/// `Some(true/false)` when `list` is populated, `None` when it expresses no preference.
pub(crate) fn list_membership(list: &[String], value: Option<&str>) -> Option<bool> {
    if list.is_empty() {
        return None;
    }
    Some(value.is_some_and(|v| list.iter().any(|item| item == v)))
}
