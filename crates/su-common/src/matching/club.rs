use std::collections::HashSet;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::weights::ClubWeights;
use crate::{
    synonyms::{common_tags, jaccard, normalize_tags, normalize_term},
    Club, ClubMembership, Profile,
};

/// Recommended colleagues needed for a full social score.
const SOCIAL_SATURATION: f64 = 5.0;
/// Matched category keywords needed for a full category score.
const CATEGORY_SATURATION: f64 = 2.0;
/// Used when the user has no tags or the club has no known category.
const NEUTRAL_CATEGORY_SCORE: f64 = 0.5;
const MAX_REASONS: usize = 3;

const COMPOSITION_TAG_WEIGHT: f64 = 1.0;
const COMPOSITION_DEPARTMENT_WEIGHT: f64 = 0.5;
const COMPOSITION_JOB_ROLE_WEIGHT: f64 = 0.3;
const COMPOSITION_LOCATION_WEIGHT: f64 = 0.2;

/// (category key, display aliases, representative keywords)
const CATEGORY_TABLE: &[(&str, &[&str], &[&str])] = &[
    (
        "sports",
        &["운동", "스포츠", "sport"],
        &["운동", "축구", "풋살", "농구", "야구", "배드민턴", "테니스", "러닝", "마라톤", "헬스", "요가", "필라테스", "클라이밍", "수영", "자전거", "등산"],
    ),
    (
        "outdoor",
        &["아웃도어", "야외활동"],
        &["등산", "캠핑", "트레킹", "낚시", "서핑", "스키", "스노보드", "자전거"],
    ),
    (
        "culture",
        &["문화", "예술", "문화예술", "art"],
        &["영화", "전시", "미술", "뮤지컬", "연극", "공연", "그림", "드로잉", "캘리그라피"],
    ),
    (
        "music",
        &["음악", "밴드"],
        &["음악", "노래", "기타", "피아노", "드럼", "밴드", "합창", "작곡", "디제잉"],
    ),
    (
        "reading",
        &["독서", "책", "book"],
        &["독서", "책", "글쓰기", "에세이", "소설", "인문학", "북클럽"],
    ),
    (
        "study",
        &["스터디", "자기계발", "학습"],
        &["스터디", "영어", "외국어", "자격증", "개발", "코딩", "알고리즘", "ai", "데이터", "재테크"],
    ),
    (
        "games",
        &["게임", "gaming"],
        &["게임", "보드게임", "e스포츠", "롤", "닌텐도", "콘솔", "방탈출"],
    ),
    (
        "food",
        &["맛집", "요리", "푸드", "미식"],
        &["요리", "베이킹", "맛집", "커피", "와인", "맥주", "디저트", "카페"],
    ),
    (
        "travel",
        &["여행"],
        &["여행", "캠핑", "사진", "드라이브", "해외여행"],
    ),
    (
        "photography",
        &["사진", "영상"],
        &["사진", "카메라", "필름", "영상", "유튜브", "브이로그"],
    ),
    (
        "volunteer",
        &["봉사", "사회공헌"],
        &["봉사", "기부", "환경", "플로깅", "멘토링"],
    ),
    (
        "pets",
        &["반려동물", "펫"],
        &["반려동물", "강아지", "고양이", "산책"],
    ),
];

/// normalized category key or alias → representative keywords
static CATEGORY_KEYWORDS: LazyLock<Vec<(HashSet<String>, Vec<String>)>> = LazyLock::new(|| {
    CATEGORY_TABLE
        .iter()
        .map(|(key, aliases, keywords)| {
            let names = std::iter::once(*key)
                .chain(aliases.iter().copied())
                .map(normalize_term)
                .collect();
            let keywords = keywords.iter().map(|k| normalize_term(k)).collect();
            (names, keywords)
        })
        .collect()
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClubBreakdown {
    pub tag_match: f64,
    pub social_graph: f64,
    pub member_composition: f64,
    pub activity_level: f64,
    pub category_preference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClubRecommendation {
    pub club_id: String,
    pub club_name: String,
    pub breakdown: ClubBreakdown,
    pub total: f64,
    pub reasons: Vec<String>,
}

/// Five-component recommendation score of one club for one user.
///
/// `member_profiles` may include people who are not active members; only profiles with an
/// active membership row for `club` are compared. Joined-club exclusion is the caller's job.
pub fn score_club(
    user: &Profile,
    club: &Club,
    member_profiles: &[Profile],
    recommended_user_ids: &[String],
    memberships: &[ClubMembership],
    weights: &ClubWeights,
) -> ClubRecommendation {
    let active_members: HashSet<&str> = memberships
        .iter()
        .filter(|m| m.club_id == club.id && m.is_active())
        .map(|m| m.user_id.as_str())
        .collect();

    let breakdown = ClubBreakdown {
        tag_match: jaccard(&user.hobbies, &club.tags),
        social_graph: social_score(recommended_user_ids, &active_members),
        member_composition: composition_score(user, member_profiles, &active_members),
        activity_level: activity_score(club.recent_activity_count),
        category_preference: category_score(&user.hobbies, club.category.as_deref()),
    };

    let total = breakdown.tag_match * weights.tag_match
        + breakdown.social_graph * weights.social_graph
        + breakdown.member_composition * weights.member_composition
        + breakdown.activity_level * weights.activity_level
        + breakdown.category_preference * weights.category_preference;

    debug!(club_id = %club.id, total, "club scored");

    ClubRecommendation {
        club_id: club.id.clone(),
        club_name: club.name.clone(),
        reasons: reasons(user, club, &breakdown),
        breakdown,
        total,
    }
}

fn social_score(recommended_user_ids: &[String], active_members: &HashSet<&str>) -> f64 {
    let matched = recommended_user_ids
        .iter()
        .map(String::as_str)
        .collect::<HashSet<_>>()
        .intersection(active_members)
        .count();
    (matched as f64 / SOCIAL_SATURATION).min(1.0)
}

fn composition_score(user: &Profile, member_profiles: &[Profile], active_members: &HashSet<&str>) -> f64 {
    let similarities: Vec<f64> = member_profiles
        .iter()
        .filter(|member| member.user_id != user.user_id)
        .filter(|member| active_members.contains(member.user_id.as_str()))
        .map(|member| member_similarity(user, member))
        .collect();

    if similarities.is_empty() {
        return 0.0;
    }
    similarities.iter().sum::<f64>() / similarities.len() as f64
}

/// Weighted blend over the factors both sides carry.
fn member_similarity(user: &Profile, member: &Profile) -> f64 {
    let mut weighted = 0.0;
    let mut applicable = 0.0;

    if !user.hobbies.is_empty() && !member.hobbies.is_empty() {
        weighted += COMPOSITION_TAG_WEIGHT * jaccard(&user.hobbies, &member.hobbies);
        applicable += COMPOSITION_TAG_WEIGHT;
    }

    for (weight, a, b) in [
        (COMPOSITION_DEPARTMENT_WEIGHT, &user.department, &member.department),
        (COMPOSITION_JOB_ROLE_WEIGHT, &user.job_role, &member.job_role),
        (COMPOSITION_LOCATION_WEIGHT, &user.office_location, &member.office_location),
    ] {
        if let (Some(a), Some(b)) = (a, b) {
            applicable += weight;
            if a == b {
                weighted += weight;
            }
        }
    }

    if applicable == 0.0 {
        return 0.0;
    }
    weighted / applicable
}

/// Posts plus chat messages over the trailing 7 days.
pub fn activity_score(recent_activity_count: u32) -> f64 {
    match recent_activity_count {
        50.. => 1.0,
        30..=49 => 0.8,
        10..=29 => 0.6,
        5..=9 => 0.4,
        1..=4 => 0.2,
        0 => 0.0,
    }
}

pub fn category_score<'a, I>(user_tags: I, category: Option<&str>) -> f64
where
    I: IntoIterator<Item = &'a String>,
{
    let tags = normalize_tags(user_tags);
    if tags.is_empty() {
        return NEUTRAL_CATEGORY_SCORE;
    }

    let Some(keywords) = category.and_then(category_keywords) else {
        return NEUTRAL_CATEGORY_SCORE;
    };

    let matched = keywords
        .iter()
        .filter(|keyword| {
            tags.iter()
                .any(|tag| tag.contains(keyword.as_str()) || keyword.contains(tag.as_str()))
        })
        .count();
    (matched as f64 / CATEGORY_SATURATION).min(1.0)
}

fn category_keywords(category: &str) -> Option<&'static [String]> {
    let key = normalize_term(category);
    CATEGORY_KEYWORDS
        .iter()
        .find(|(names, _)| names.contains(&key))
        .map(|(_, keywords)| keywords.as_slice())
}

fn reasons(user: &Profile, club: &Club, breakdown: &ClubBreakdown) -> Vec<String> {
    let mut reasons = Vec::new();

    if breakdown.tag_match >= 0.5 {
        let common = common_tags(&user.hobbies, &club.tags);
        reasons.push(match common.as_slice() {
            [] => "관심사와 잘 맞는 동호회예요".to_string(),
            tags => format!("관심 태그({})가 겹쳐요", tags.iter().take(3).cloned().collect::<Vec<_>>().join(", ")),
        });
    }
    if breakdown.social_graph > 0.0 {
        reasons.push("추천 동료가 이미 활동하고 있어요".to_string());
    }
    if breakdown.member_composition >= 0.5 {
        reasons.push("나와 비슷한 동료들이 모여 있어요".to_string());
    }
    if breakdown.activity_level >= 0.6 {
        reasons.push("최근 활동이 활발해요".to_string());
    }
    if breakdown.category_preference >= 0.5 {
        reasons.push(match club.category.as_deref() {
            Some(category) => format!("{category} 분야에 어울리는 동호회예요"),
            None => "관심 분야에 어울리는 동호회예요".to_string(),
        });
    }

    if reasons.is_empty() {
        reasons.push("새로운 동료를 만나기 좋은 동호회예요".to_string());
    }
    reasons.truncate(MAX_REASONS);
    reasons
}
