//! Fixed placeholder readings used when every backend has failed.
//!
//! Values are constants so repeated fallbacks serialize identically. They sit
//! inside the documented ranges the product shows for generated readings.

use std::ops::RangeInclusive;

use crate::analysis::{
    AnalysisKind, AnalysisResult, CareerSuggestion, CompanionMessage, Compatibility,
    CompatibilityTraits, DailyInsight, HealthNotice, LifeMap, MainImpression, PersonalityScores,
    Recommendations, SelfDiscovery, TodaySuggestion,
};

pub const SHINE_INDEX_RANGE: RangeInclusive<u32> = 50..=100;

pub const COMPATIBILITY_WORK_RANGE: RangeInclusive<u32> = 70..=100;
pub const COMPATIBILITY_RELATIONSHIP_RANGE: RangeInclusive<u32> = 60..=100;
pub const COMPATIBILITY_OVERALL_RANGE: RangeInclusive<u32> = 75..=100;

pub const OPENNESS_RANGE: RangeInclusive<u32> = 70..=100;
pub const CONSCIENTIOUSNESS_RANGE: RangeInclusive<u32> = 65..=100;
pub const EXTRAVERSION_RANGE: RangeInclusive<u32> = 60..=100;
pub const AGREEABLENESS_RANGE: RangeInclusive<u32> = 75..=100;
pub const NEUROTICISM_RANGE: RangeInclusive<u32> = 30..=80;

/// Deterministic fallback for `kind`.
pub fn mock_result(kind: AnalysisKind) -> AnalysisResult {
    match kind {
        AnalysisKind::DailyInsight => AnalysisResult::DailyInsight(mock_daily_insight()),
        AnalysisKind::LifeMap => AnalysisResult::LifeMap(mock_life_map()),
        AnalysisKind::Compatibility => AnalysisResult::Compatibility(mock_compatibility()),
    }
}

pub fn mock_daily_insight() -> DailyInsight {
    DailyInsight {
        main_impression: MainImpression {
            shine_index: 78,
            energy_color: "Golden Amber".into(),
            day_keyword: "Radiance".into(),
        },
        companion_message: CompanionMessage {
            title: "Your Inner Light Shines Bright".into(),
            emotional_analysis: "Your features show a blend of determination and sensitivity. \
                Your eyes suggest empathy and intuition, and your expression carries a quiet \
                optimism mixed with thoughtful consideration."
                .into(),
            health_notices: vec![
                HealthNotice {
                    category: "Energy".into(),
                    icon: "⚡".into(),
                    message: "Your eyes show good vitality; a little more rest will keep it up"
                        .into(),
                },
                HealthNotice {
                    category: "Stress".into(),
                    icon: "🧘".into(),
                    message: "Slight tension around the forehead suggests time to unwind".into(),
                },
            ],
        },
        today_suggestion: TodaySuggestion {
            title: "Today's Cosmic Guidance for You".into(),
            focus_on: Recommendations {
                icon: "star".into(),
                recommendations: vec![
                    "Trust your intuitive insights in important decisions".into(),
                    "Express your creative ideas with confidence".into(),
                    "Take initiative in social situations".into(),
                ],
            },
            should_avoid: Recommendations {
                icon: "shield".into(),
                recommendations: vec![
                    "Impulsive financial decisions made without reflection".into(),
                    "Overanalyzing situations that call for a heartfelt response".into(),
                ],
            },
        },
        self_discovery: SelfDiscovery {
            title: "Your Cosmic Nature".into(),
            content: "You bridge the analytical and the intuitive. Natural leadership paired \
                with deep empathy makes you a guide others turn to."
                .into(),
        },
    }
}

pub fn mock_life_map() -> LifeMap {
    LifeMap {
        personality_scores: PersonalityScores {
            openness: 85,
            conscientiousness: 78,
            extraversion: 72,
            agreeableness: 88,
            neuroticism: 42,
        },
        career_suggestions: vec![
            CareerSuggestion {
                title: "Creative Artist".into(),
                description: "High openness points to a natural talent for creative expression \
                    and innovative thinking."
                    .into(),
                match_score: 92,
            },
            CareerSuggestion {
                title: "Innovation Manager".into(),
                description: "Conscientiousness combined with openness suits leading creative \
                    projects."
                    .into(),
                match_score: 88,
            },
            CareerSuggestion {
                title: "Explorer/Researcher".into(),
                description: "Curiosity and a systematic approach fit discovery and \
                    investigation."
                    .into(),
                match_score: 85,
            },
        ],
    }
}

pub fn mock_compatibility() -> Compatibility {
    Compatibility {
        work: 86,
        relationship: 79,
        overall: 88,
        traits: CompatibilityTraits {
            communication: 84,
            trust: 76,
            creativity: 81,
            empathy: 89,
            ambition: 83,
            stability: 90,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_is_byte_identical_across_calls() {
        for kind in AnalysisKind::ALL {
            let first = serde_json::to_vec(&mock_result(kind)).unwrap();
            let second = serde_json::to_vec(&mock_result(kind)).unwrap();
            assert_eq!(first, second, "{kind}");
        }
    }

    #[test]
    fn mock_kind_matches_request() {
        for kind in AnalysisKind::ALL {
            assert_eq!(mock_result(kind).kind(), kind);
        }
    }

    #[test]
    fn compatibility_mock_sits_in_documented_ranges() {
        let score = mock_compatibility();
        assert!(COMPATIBILITY_OVERALL_RANGE.contains(&score.overall));
        assert!(COMPATIBILITY_WORK_RANGE.contains(&score.work));
        assert!(COMPATIBILITY_RELATIONSHIP_RANGE.contains(&score.relationship));
    }

    #[test]
    fn life_map_mock_sits_in_documented_ranges() {
        let scores = mock_life_map().personality_scores;
        assert!(OPENNESS_RANGE.contains(&scores.openness));
        assert!(CONSCIENTIOUSNESS_RANGE.contains(&scores.conscientiousness));
        assert!(EXTRAVERSION_RANGE.contains(&scores.extraversion));
        assert!(AGREEABLENESS_RANGE.contains(&scores.agreeableness));
        assert!(NEUROTICISM_RANGE.contains(&scores.neuroticism));
    }

    #[test]
    fn daily_insight_mock_shine_index_in_range() {
        assert!(SHINE_INDEX_RANGE.contains(&mock_daily_insight().shine_index()));
    }
}
