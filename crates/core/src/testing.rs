use crate::asset::{AssetRegistry, PhotoAsset};

/// Well-formed Daily Insight reply (shine index 82).
pub const DAILY_INSIGHT_JSON: &str = r#"{
  "mainImpression": {
    "shineIndex": 82,
    "energyColor": "Sunrise Coral",
    "dayKeyword": "Momentum"
  },
  "companionMessage": {
    "title": "A Bright and Steady Morning",
    "emotionalAnalysis": "Calm eyes and a relaxed jaw suggest you woke up ready for the day.",
    "healthNotices": [
      { "type": "Energy", "icon": "⚡", "message": "Good vitality, keep hydrated" }
    ]
  },
  "todaySuggestion": {
    "title": "Lean Into Your Natural Focus",
    "focusOn": {
      "icon": "star",
      "recommendations": ["Start the hard task first", "Reach out to a friend", "Take a short walk"]
    },
    "shouldAvoid": {
      "icon": "shield",
      "recommendations": ["Doom-scrolling before noon", "Skipping lunch"]
    }
  },
  "selfDiscovery": {
    "title": "The Quiet Strategist",
    "content": "You bridge careful planning with warm intuition."
  }
}"#;

/// Well-formed Life Map reply (openness 88).
pub const LIFE_MAP_JSON: &str = r#"{
  "personalityScores": {
    "openness": 88,
    "conscientiousness": 74,
    "extraversion": 63,
    "agreeableness": 81,
    "neuroticism": 35
  },
  "careerSuggestions": [
    { "title": "Product Designer", "description": "Curiosity meets craft.", "match": 90 },
    { "title": "Research Lead", "description": "Systematic and open.", "match": 84 }
  ]
}"#;

/// Well-formed Compatibility reply (work 84, overall 91, trust 77).
pub const COMPATIBILITY_JSON: &str = r#"{
  "work": 84,
  "relationship": 72,
  "overall": 91,
  "traits": {
    "communication": 80,
    "trust": 77,
    "creativity": 69,
    "empathy": 88,
    "ambition": 75,
    "stability": 83
  }
}"#;

/// Canned reply for `kind`.
pub fn sample_json(kind: crate::AnalysisKind) -> &'static str {
    match kind {
        crate::AnalysisKind::DailyInsight => DAILY_INSIGHT_JSON,
        crate::AnalysisKind::LifeMap => LIFE_MAP_JSON,
        crate::AnalysisKind::Compatibility => COMPATIBILITY_JSON,
    }
}

/// Wrap a payload the way chat models tend to answer.
pub fn in_markdown_fence(json: &str) -> String {
    format!("Here is your reading {{as requested}}:\n```json\n{json}\n```\nEnjoy your day!")
}

/// PNG signature followed by a few filler bytes.
pub fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(b"\0\0\0\rIHDR");
    bytes
}

/// JPEG SOI/APP0 marker followed by a few filler bytes.
pub fn jpeg_bytes() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F']
}

/// Register a small PNG under `name`.
pub fn photo(registry: &AssetRegistry, name: &str) -> PhotoAsset {
    registry
        .create(name, Some("image/png"), png_bytes())
        .expect("fixture png is a valid image")
}
