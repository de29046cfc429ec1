use serde::{Deserialize, Serialize};

use super::scoring::{ScoreBreakdown, ScoreDimension};
use crate::{synonyms::common_tags, Profile};

/// A component at or above this value is worth telling the user about.
pub const NOTABLE_THRESHOLD: f64 = 0.6;
pub const MAX_HIGHLIGHTS: usize = 3;
pub const MAX_CONVERSATION_STARTERS: usize = 3;

/// User-facing text only. Scores are never rendered as numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchExplanation {
    pub summary: String,
    pub highlights: Vec<String>,
    pub conversation_starters: Vec<String>,
}

pub fn generate_explanation(
    viewer: &Profile,
    candidate: &Profile,
    breakdown: &ScoreBreakdown,
) -> MatchExplanation {
    let mut notable: Vec<(ScoreDimension, f64)> = breakdown
        .components()
        .filter(|(_, score)| *score >= NOTABLE_THRESHOLD)
        .collect();
    // stable: ties keep breakdown order
    notable.sort_by(|a, b| b.1.total_cmp(&a.1));

    let who = display_name(candidate);
    let summary = match notable.first() {
        Some((dimension, _)) => summary_for(*dimension, &who),
        None => format!(
            "{} 이야기를 나누다 보면 뜻밖의 공통점을 발견할 수 있을 거예요.",
            with_particle(&who, "과", "와")
        ),
    };

    let highlights = notable
        .iter()
        .take(MAX_HIGHLIGHTS)
        .map(|(dimension, _)| highlight_for(*dimension, viewer, candidate))
        .collect();

    MatchExplanation {
        summary,
        highlights,
        conversation_starters: conversation_starters(viewer, candidate),
    }
}

fn display_name(profile: &Profile) -> String {
    let name = profile.display_name.trim();
    if name.is_empty() {
        "이 동료".to_string()
    } else {
        format!("{name}님")
    }
}

/// Attach `with_final` after a closed Hangul syllable, `without_final` otherwise.
fn with_particle(word: &str, with_final: &str, without_final: &str) -> String {
    let closed = word.chars().last().is_some_and(|c| {
        let code = c as u32;
        (0xAC00..=0xD7A3).contains(&code) && (code - 0xAC00) % 28 != 0
    });
    format!("{word}{}", if closed { with_final } else { without_final })
}

fn summary_for(dimension: ScoreDimension, who: &str) -> String {
    let subject = with_particle(who, "은", "는");
    match dimension {
        ScoreDimension::Embedding => {
            format!("{subject} 일하는 방식과 관심사가 잘 통하는 동료예요.")
        }
        ScoreDimension::Tags => format!("{subject} 취미를 함께 나눌 수 있는 동료예요."),
        ScoreDimension::Mbti => format!("{subject} 성향이 잘 맞아 편하게 대화할 수 있는 동료예요."),
        ScoreDimension::JobRole => format!("{subject} 직무 고민을 함께 나눌 수 있는 동료예요."),
        ScoreDimension::Department => format!("{subject} 가까이에서 협업하기 좋은 동료예요."),
        ScoreDimension::Location => format!("{subject} 가까운 곳에서 일해 쉽게 만날 수 있는 동료예요."),
        ScoreDimension::Preference => format!("{subject} 찾고 있던 조건에 잘 맞는 동료예요."),
    }
}

fn highlight_for(dimension: ScoreDimension, viewer: &Profile, candidate: &Profile) -> String {
    let same = |a: &Option<String>, b: &Option<String>| a.is_some() && a == b;

    match dimension {
        ScoreDimension::Embedding => "업무 스타일과 관심사가 비슷해요".to_string(),
        ScoreDimension::Tags => {
            let common = common_tags(&viewer.hobbies, &candidate.hobbies);
            if common.is_empty() {
                "취미가 많이 겹쳐요".to_string()
            } else {
                format!("공통 관심사: {}", common.iter().take(3).cloned().collect::<Vec<_>>().join(", "))
            }
        }
        ScoreDimension::Mbti => match candidate.mbti.as_deref() {
            Some(code) => format!("MBTI 궁합이 좋아요 ({})", code.trim().to_ascii_uppercase()),
            None => "MBTI 궁합이 좋아요".to_string(),
        },
        ScoreDimension::JobRole => match candidate.job_role.as_deref() {
            Some(role) if same(&viewer.job_role, &candidate.job_role) => {
                format!("같은 직무({role})에서 일해요")
            }
            Some(role) => format!("관심 있는 직무({role})의 동료예요"),
            None => "직무 궁합이 좋아요".to_string(),
        },
        ScoreDimension::Department => match candidate.department.as_deref() {
            Some(dept) if same(&viewer.department, &candidate.department) => {
                format!("같은 부서({dept}) 소속이에요")
            }
            Some(dept) => format!("{}의 부서 간 협업 기회예요", with_particle(dept, "과", "와")),
            None => "부서 궁합이 좋아요".to_string(),
        },
        ScoreDimension::Location => match candidate.office_location.as_deref() {
            Some(place) if same(&viewer.office_location, &candidate.office_location) => {
                format!("같은 근무지({place})에서 일해요")
            }
            Some(place) => format!("선호하는 근무지({place})에서 일해요"),
            None => "근무지가 가까워요".to_string(),
        },
        ScoreDimension::Preference => "설정한 선호 조건에 잘 맞아요".to_string(),
    }
}

fn conversation_starters(viewer: &Profile, candidate: &Profile) -> Vec<String> {
    let mut starters: Vec<String> = common_tags(&viewer.hobbies, &candidate.hobbies)
        .into_iter()
        .take(2)
        .map(|tag| format!("{tag}에 관심이 있으시군요! 요즘은 어떻게 즐기고 계세요?"))
        .collect();

    if let (Some(own), Some(theirs)) = (viewer.department.as_deref(), candidate.department.as_deref()) {
        if own != theirs {
            starters.push(format!("{theirs}에서는 요즘 어떤 프로젝트를 진행하고 있나요?"));
        }
    }

    if let (Some(own), Some(theirs)) = (viewer.job_role.as_deref(), candidate.job_role.as_deref()) {
        if own != theirs {
            starters.push(format!("{theirs} 업무에서 가장 보람 있었던 순간은 언제였나요?"));
        }
    }

    if starters.is_empty() {
        starters.push("요즘 가장 몰입하고 있는 일이 무엇인지 물어보세요.".to_string());
    }

    starters.truncate(MAX_CONVERSATION_STARTERS);
    starters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ProfileText, matching::{scoring::calculate_score, weights::DEFAULT_WEIGHTS}};

    fn person(name: &str, dept: &str, role: &str, hobbies: &[&str]) -> Profile {
        Profile {
            user_id: name.into(),
            display_name: name.into(),
            department: Some(dept.into()),
            job_role: Some(role.into()),
            office_location: Some("판교".into()),
            mbti: Some("ENFP".into()),
            hobbies: hobbies.iter().map(|h| h.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn highlights_are_ordered_and_capped() {
        let viewer = person("민수", "플랫폼팀", "백엔드 개발자", &["등산", "요리"]);
        let candidate = person("지연", "플랫폼팀", "백엔드 개발자", &["등산", "요리"]);
        let breakdown = ScoreBreakdown {
            tags: 0.7,
            department: 1.0,
            job_role: 0.9,
            location: 0.8,
            ..Default::default()
        };

        let explanation = generate_explanation(&viewer, &candidate, &breakdown);

        assert_eq!(
            explanation.highlights,
            vec![
                "같은 부서(플랫폼팀) 소속이에요".to_string(),
                "같은 직무(백엔드 개발자)에서 일해요".to_string(),
                "같은 근무지(판교)에서 일해요".to_string(),
            ]
        );
        assert_eq!(explanation.summary, "지연님은 가까이에서 협업하기 좋은 동료예요.");
    }

    #[test]
    fn generic_summary_when_nothing_is_notable() {
        let viewer = person("민수", "플랫폼팀", "백엔드 개발자", &[]);
        let candidate = person("지연", "디자인팀", "디자이너", &[]);
        let breakdown = ScoreBreakdown {
            embedding: 0.59,
            ..Default::default()
        };

        let explanation = generate_explanation(&viewer, &candidate, &breakdown);

        assert!(explanation.highlights.is_empty());
        assert_eq!(
            explanation.summary,
            "지연님과 이야기를 나누다 보면 뜻밖의 공통점을 발견할 수 있을 거예요."
        );
    }

    #[test]
    fn particle_follows_final_consonant() {
        let anonymous = Profile::default();
        let explanation = generate_explanation(&anonymous, &anonymous, &ScoreBreakdown::default());
        assert!(explanation.summary.starts_with("이 동료와 "));
    }

    #[test]
    fn starters_use_common_tags_then_complementary_attributes() {
        let viewer = person("민수", "플랫폼팀", "백엔드 개발자", &["등산", "러닝", "요리"]);
        let candidate = person("지연", "디자인팀", "디자이너", &["요리", "등산", "러닝"]);

        let explanation = generate_explanation(&viewer, &candidate, &ScoreBreakdown::default());

        assert_eq!(explanation.conversation_starters.len(), MAX_CONVERSATION_STARTERS);
        assert!(explanation.conversation_starters[0].starts_with("등산"));
        assert!(explanation.conversation_starters[1].starts_with("러닝"));
        assert!(explanation.conversation_starters[2].contains("디자인팀"));
    }

    #[test]
    fn starters_have_a_fallback() {
        let viewer = person("민수", "플랫폼팀", "백엔드 개발자", &[]);
        let explanation = generate_explanation(&viewer, &viewer.clone(), &ScoreBreakdown::default());
        assert_eq!(explanation.conversation_starters.len(), 1);
    }

    #[test]
    fn never_renders_numbers_or_private_text() {
        let viewer = person("민수", "플랫폼팀", "백엔드 개발자", &["등산"]);
        let mut candidate = person("지연", "플랫폼팀", "백엔드 개발자", &["등산"]);
        candidate.text = ProfileText {
            strengths: Some("비밀 강점 문장".into()),
            ..Default::default()
        };
        candidate.redact(crate::ProfileField::Strengths);

        let breakdown = calculate_score(&viewer, &candidate, None, &DEFAULT_WEIGHTS);
        let explanation = generate_explanation(&viewer, &candidate, &breakdown);

        let rendered = [
            vec![explanation.summary.clone()],
            explanation.highlights.clone(),
            explanation.conversation_starters.clone(),
        ]
        .concat()
        .join("\n");
        assert!(!rendered.chars().any(|c| c.is_ascii_digit()));
        assert!(!rendered.contains('%'));
        assert!(!rendered.contains("비밀 강점"));
    }
}
