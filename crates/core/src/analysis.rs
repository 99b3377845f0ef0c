//! Reading kinds, requests, and the typed result payloads.
//!
//! Payload structs mirror the JSON the AI backends produce (camelCase keys).
//! Every field is required on the wire; schema-level constraints such as score
//! ranges live in [`crate::validate`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::asset::AssetId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisKind {
    DailyInsight,
    LifeMap,
    Compatibility,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 3] = [Self::DailyInsight, Self::LifeMap, Self::Compatibility];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DailyInsight => "daily-insight",
            Self::LifeMap => "life-map",
            Self::Compatibility => "compatibility",
        }
    }

    /// Number of photos a request of this kind carries.
    pub fn required_assets(&self) -> usize {
        match self {
            Self::Compatibility => 2,
            Self::DailyInsight | Self::LifeMap => 1,
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "daily-insight" | "daily" => Ok(Self::DailyInsight),
            "life-map" | "lifemap" => Ok(Self::LifeMap),
            "compatibility" | "compat" => Ok(Self::Compatibility),
            other => Err(format!(
                "unknown analysis kind '{other}' (expected daily-insight, life-map, or compatibility)"
            )),
        }
    }
}

/// Identifies one wizard run. At most one analysis is active per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// An issued analysis request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    kind: AnalysisKind,
    asset_ids: Vec<AssetId>,
    session_id: SessionId,
    user_id: Option<String>,
}

impl AnalysisRequest {
    pub fn new(
        kind: AnalysisKind,
        asset_ids: Vec<AssetId>,
        session_id: SessionId,
        user_id: Option<String>,
    ) -> Self {
        Self {
            kind,
            asset_ids,
            session_id,
            user_id: user_id.filter(|id| !id.trim().is_empty()),
        }
    }

    pub fn kind(&self) -> AnalysisKind {
        self.kind
    }

    pub fn asset_ids(&self) -> &[AssetId] {
        &self.asset_ids
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

// ─── Daily Insight ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyInsight {
    pub main_impression: MainImpression,
    pub companion_message: CompanionMessage,
    pub today_suggestion: TodaySuggestion,
    pub self_discovery: SelfDiscovery,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainImpression {
    pub shine_index: u32,
    pub energy_color: String,
    pub day_keyword: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanionMessage {
    pub title: String,
    pub emotional_analysis: String,
    pub health_notices: Vec<HealthNotice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthNotice {
    #[serde(rename = "type")]
    pub category: String,
    pub icon: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodaySuggestion {
    pub title: String,
    pub focus_on: Recommendations,
    pub should_avoid: Recommendations,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    pub icon: String,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfDiscovery {
    pub title: String,
    pub content: String,
}

impl DailyInsight {
    pub fn shine_index(&self) -> u32 {
        self.main_impression.shine_index
    }

    pub fn energy_color(&self) -> &str {
        &self.main_impression.energy_color
    }

    pub fn day_keyword(&self) -> &str {
        &self.main_impression.day_keyword
    }

    pub fn emotional_analysis(&self) -> &str {
        &self.companion_message.emotional_analysis
    }

    pub fn health_notices(&self) -> &[HealthNotice] {
        &self.companion_message.health_notices
    }

    pub fn focus_on(&self) -> &[String] {
        &self.today_suggestion.focus_on.recommendations
    }

    pub fn should_avoid(&self) -> &[String] {
        &self.today_suggestion.should_avoid.recommendations
    }

    pub fn self_discovery_text(&self) -> &str {
        &self.self_discovery.content
    }
}

// ─── Life Map ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifeMap {
    pub personality_scores: PersonalityScores,
    pub career_suggestions: Vec<CareerSuggestion>,
}

/// Big Five scores, 0-100 each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalityScores {
    pub openness: u32,
    pub conscientiousness: u32,
    pub extraversion: u32,
    pub agreeableness: u32,
    pub neuroticism: u32,
}

impl PersonalityScores {
    /// Axis label and value pairs in radar-chart order.
    pub fn axes(&self) -> [(&'static str, u32); 5] {
        [
            ("openness", self.openness),
            ("conscientiousness", self.conscientiousness),
            ("extraversion", self.extraversion),
            ("agreeableness", self.agreeableness),
            ("neuroticism", self.neuroticism),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerSuggestion {
    pub title: String,
    pub description: String,
    #[serde(rename = "match")]
    pub match_score: u32,
}

// ─── Compatibility ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compatibility {
    pub work: u32,
    pub relationship: u32,
    pub overall: u32,
    pub traits: CompatibilityTraits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityTraits {
    pub communication: u32,
    pub trust: u32,
    pub creativity: u32,
    pub empathy: u32,
    pub ambition: u32,
    pub stability: u32,
}

impl CompatibilityTraits {
    pub fn axes(&self) -> [(&'static str, u32); 6] {
        [
            ("communication", self.communication),
            ("trust", self.trust),
            ("creativity", self.creativity),
            ("empathy", self.empathy),
            ("ambition", self.ambition),
            ("stability", self.stability),
        ]
    }
}

// ─── Result ──────────────────────────────────────────────────────────────────

/// A validated reading, discriminated by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "kebab-case")]
pub enum AnalysisResult {
    DailyInsight(DailyInsight),
    LifeMap(LifeMap),
    Compatibility(Compatibility),
}

impl AnalysisResult {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            Self::DailyInsight(_) => AnalysisKind::DailyInsight,
            Self::LifeMap(_) => AnalysisKind::LifeMap,
            Self::Compatibility(_) => AnalysisKind::Compatibility,
        }
    }

    /// The bare payload in backend wire shape, without the kind tag.
    pub fn payload_json(&self) -> serde_json::Value {
        let value = match self {
            Self::DailyInsight(p) => serde_json::to_value(p),
            Self::LifeMap(p) => serde_json::to_value(p),
            Self::Compatibility(p) => serde_json::to_value(p),
        };
        value.unwrap_or(serde_json::Value::Null)
    }

    pub fn as_daily_insight(&self) -> Option<&DailyInsight> {
        match self {
            Self::DailyInsight(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_life_map(&self) -> Option<&LifeMap> {
        match self {
            Self::LifeMap(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_compatibility(&self) -> Option<&Compatibility> {
        match self {
            Self::Compatibility(p) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn kind_parses_aliases_and_wire_names() {
        let parse = |s: &str| s.parse::<AnalysisKind>().unwrap();
        assert_eq!(parse("daily-insight"), AnalysisKind::DailyInsight);
        assert_eq!(parse("LIFE_MAP"), AnalysisKind::LifeMap);
        assert_eq!(parse("compat"), AnalysisKind::Compatibility);
        assert!("horoscope".parse::<AnalysisKind>().is_err());
    }

    #[test]
    fn kind_serializes_as_kebab_case() {
        let json = serde_json::to_string(&AnalysisKind::LifeMap).unwrap();
        assert_eq!(json, "\"life-map\"");
    }

    #[test]
    fn request_drops_blank_user_id() {
        let request = AnalysisRequest::new(
            AnalysisKind::DailyInsight,
            vec![AssetId::new()],
            SessionId::new(),
            Some("   ".to_string()),
        );
        assert_eq!(request.user_id(), None);
    }

    #[test]
    fn daily_insight_accessors_expose_flat_fields() {
        let payload: DailyInsight =
            serde_json::from_str(testing::DAILY_INSIGHT_JSON).unwrap();
        assert_eq!(payload.shine_index(), 82);
        assert_eq!(payload.energy_color(), "Sunrise Coral");
        assert_eq!(payload.day_keyword(), "Momentum");
        assert_eq!(payload.health_notices()[0].category, "Energy");
        assert_eq!(payload.focus_on().len(), 3);
        assert_eq!(payload.should_avoid().len(), 2);
        assert!(payload.self_discovery_text().contains("bridge"));
    }

    #[test]
    fn result_is_tagged_by_kind() {
        let payload: Compatibility =
            serde_json::from_str(testing::COMPATIBILITY_JSON).unwrap();
        let result = AnalysisResult::Compatibility(payload);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["kind"], "compatibility");
        assert_eq!(value["data"]["overall"], 91);
        assert_eq!(result.payload_json()["traits"]["trust"], 77);
    }
}
