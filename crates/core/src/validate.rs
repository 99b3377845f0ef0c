use crate::analysis::{AnalysisResult, Compatibility, DailyInsight, LifeMap};
use thiserror::Error;

/// Upper bound for every score, index, and match percentage.
pub const MAX_SCORE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SchemaViolation {
    #[error("{field} = {value} is outside 0..=100")]
    ScoreOutOfRange { field: String, value: u32 },
    #[error("{field} must not be empty")]
    EmptyText { field: String },
    #[error("{field} must contain at least one entry")]
    EmptyList { field: String },
}

/// Validate a parsed result by composing independent per-kind validators.
pub fn validate_result(result: &AnalysisResult) -> Result<(), Vec<SchemaViolation>> {
    let errors = match result {
        AnalysisResult::DailyInsight(payload) => validate_daily_insight(payload),
        AnalysisResult::LifeMap(payload) => validate_life_map(payload),
        AnalysisResult::Compatibility(payload) => validate_compatibility(payload),
    };

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_daily_insight(payload: &DailyInsight) -> Vec<SchemaViolation> {
    let scores = [("mainImpression.shineIndex", payload.main_impression.shine_index)];

    let texts = [
        ("mainImpression.energyColor", payload.main_impression.energy_color.as_str()),
        ("mainImpression.dayKeyword", payload.main_impression.day_keyword.as_str()),
        (
            "companionMessage.emotionalAnalysis",
            payload.companion_message.emotional_analysis.as_str(),
        ),
        ("selfDiscovery.content", payload.self_discovery.content.as_str()),
    ];

    let lists = [
        (
            "companionMessage.healthNotices",
            payload.companion_message.health_notices.len(),
        ),
        (
            "todaySuggestion.focusOn.recommendations",
            payload.today_suggestion.focus_on.recommendations.len(),
        ),
        (
            "todaySuggestion.shouldAvoid.recommendations",
            payload.today_suggestion.should_avoid.recommendations.len(),
        ),
    ];

    check_scores(&scores)
        .chain(check_texts(&texts))
        .chain(check_lists(&lists))
        .collect()
}

fn validate_life_map(payload: &LifeMap) -> Vec<SchemaViolation> {
    let axes = payload
        .personality_scores
        .axes()
        .map(|(name, value)| (format!("personalityScores.{name}"), value));

    let matches = payload
        .career_suggestions
        .iter()
        .enumerate()
        .map(|(i, career)| (format!("careerSuggestions[{i}].match"), career.match_score));

    let scores: Vec<(String, u32)> = axes.into_iter().chain(matches).collect();

    let titles = payload
        .career_suggestions
        .iter()
        .enumerate()
        .filter(|(_, career)| career.title.trim().is_empty())
        .map(|(i, _)| SchemaViolation::EmptyText {
            field: format!("careerSuggestions[{i}].title"),
        });

    let lists = [("careerSuggestions", payload.career_suggestions.len())];

    scores
        .iter()
        .filter_map(|(field, value)| out_of_range(field, *value))
        .chain(titles)
        .chain(check_lists(&lists))
        .collect()
}

fn validate_compatibility(payload: &Compatibility) -> Vec<SchemaViolation> {
    let headline = [
        ("work", payload.work),
        ("relationship", payload.relationship),
        ("overall", payload.overall),
    ];

    let traits = payload
        .traits
        .axes()
        .map(|(name, value)| (format!("traits.{name}"), value));

    check_scores(&headline)
        .chain(
            traits
                .iter()
                .filter_map(|(field, value)| out_of_range(field, *value)),
        )
        .collect()
}

fn out_of_range(field: &str, value: u32) -> Option<SchemaViolation> {
    (value > MAX_SCORE).then(|| SchemaViolation::ScoreOutOfRange {
        field: field.to_string(),
        value,
    })
}

fn check_scores<'a>(
    scores: &'a [(&'a str, u32)],
) -> impl Iterator<Item = SchemaViolation> + 'a {
    scores
        .iter()
        .filter_map(|(field, value)| out_of_range(field, *value))
}

fn check_texts<'a>(
    texts: &'a [(&'a str, &'a str)],
) -> impl Iterator<Item = SchemaViolation> + 'a {
    texts
        .iter()
        .filter(|(_, text)| text.trim().is_empty())
        .map(|(field, _)| SchemaViolation::EmptyText {
            field: field.to_string(),
        })
}

fn check_lists<'a>(
    lists: &'a [(&'a str, usize)],
) -> impl Iterator<Item = SchemaViolation> + 'a {
    lists
        .iter()
        .filter(|(_, len)| *len == 0)
        .map(|(field, _)| SchemaViolation::EmptyList {
            field: field.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::mock_result;
    use crate::testing;
    use crate::AnalysisKind;

    #[test]
    fn mocks_are_schema_valid() {
        for kind in AnalysisKind::ALL {
            assert!(validate_result(&mock_result(kind)).is_ok(), "{kind}");
        }
    }

    #[test]
    fn flags_out_of_range_scores() {
        let mut payload: Compatibility =
            serde_json::from_str(testing::COMPATIBILITY_JSON).unwrap();
        payload.overall = 140;
        payload.traits.trust = 101;

        let errors = validate_result(&AnalysisResult::Compatibility(payload)).unwrap_err();
        assert_eq!(
            errors,
            vec![
                SchemaViolation::ScoreOutOfRange {
                    field: "overall".into(),
                    value: 140,
                },
                SchemaViolation::ScoreOutOfRange {
                    field: "traits.trust".into(),
                    value: 101,
                },
            ]
        );
    }

    #[test]
    fn flags_empty_required_lists() {
        let mut payload: DailyInsight =
            serde_json::from_str(testing::DAILY_INSIGHT_JSON).unwrap();
        payload.today_suggestion.focus_on.recommendations.clear();
        payload.companion_message.health_notices.clear();

        let errors = validate_result(&AnalysisResult::DailyInsight(payload)).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(e, SchemaViolation::EmptyList { .. })));
    }

    #[test]
    fn flags_blank_text_and_career_match() {
        let mut payload: LifeMap = serde_json::from_str(testing::LIFE_MAP_JSON).unwrap();
        payload.career_suggestions[0].title = "  ".into();
        payload.career_suggestions[1].match_score = 250;

        let errors = validate_result(&AnalysisResult::LifeMap(payload)).unwrap_err();
        assert!(errors.contains(&SchemaViolation::EmptyText {
            field: "careerSuggestions[0].title".into()
        }));
        assert!(errors.contains(&SchemaViolation::ScoreOutOfRange {
            field: "careerSuggestions[1].match".into(),
            value: 250
        }));
    }

    #[test]
    fn life_map_requires_careers() {
        let mut payload: LifeMap = serde_json::from_str(testing::LIFE_MAP_JSON).unwrap();
        payload.career_suggestions.clear();
        let errors = validate_result(&AnalysisResult::LifeMap(payload)).unwrap_err();
        assert_eq!(
            errors,
            vec![SchemaViolation::EmptyList {
                field: "careerSuggestions".into()
            }]
        );
    }
}
