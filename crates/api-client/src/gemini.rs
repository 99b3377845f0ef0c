use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use cosmicface_core::AnalysisKind;

use crate::client::parse_response;
use crate::error::{BackendError, Result};

const ENDPOINT: &str = "gemini";

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 2048,
        }
    }
}

/// An image attached to a request as base64 inline data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: &'a InlineImage },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

/// Direct `generateContent` client used as the secondary analysis path.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_url: String,
    model: String,
    api_key: String,
    generation: GenerationConfig,
}

impl GeminiClient {
    pub fn new(api_url: &str, model: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| BackendError::Transport {
                endpoint: ENDPOINT.to_string(),
                source,
            })?;
        Ok(Self::with_client(client, api_url, model, api_key))
    }

    pub fn with_client(client: reqwest::Client, api_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.trim().to_string(),
            generation: GenerationConfig::default(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_url, self.model)
    }

    /// Ask the model for a reading of `kind` and return its raw text reply.
    pub async fn generate(&self, kind: AnalysisKind, images: &[InlineImage]) -> Result<String> {
        if !self.has_credentials() {
            return Err(BackendError::MissingCredentials("GEMINI_API_KEY or GOOGLE_API_KEY not set"));
        }

        let mut parts = vec![Part::Text {
            text: prompt_for(kind),
        }];
        parts.extend(images.iter().map(|image| Part::InlineData { inline_data: image }));
        let request_body = GenerateRequest {
            contents: [Content { parts }],
            generation_config: self.generation,
        };

        debug!(model = %self.model, %kind, images = images.len(), "calling Gemini");
        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| BackendError::from_send(ENDPOINT, e))?;

        let body: serde_json::Value = parse_response(ENDPOINT, resp).await?;
        let text = body
            .get("candidates")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(|parts| parts.as_array())
            .and_then(|arr| arr.first())
            .and_then(|part| part.get("text"))
            .and_then(|t| t.as_str())
            .unwrap_or("");

        if text.trim().is_empty() {
            return Err(BackendError::EmptyReply {
                endpoint: ENDPOINT.to_string(),
            });
        }
        Ok(text.to_string())
    }
}

/// Short instruction sent ahead of the photos.
pub fn prompt_for(kind: AnalysisKind) -> &'static str {
    match kind {
        AnalysisKind::DailyInsight => {
            "Read today's mood and energy from this face. Answer with one JSON object with keys \
             mainImpression{shineIndex,energyColor,dayKeyword}, \
             companionMessage{title,emotionalAnalysis,healthNotices[{type,icon,message}]}, \
             todaySuggestion{title,focusOn{icon,recommendations[]},shouldAvoid{icon,recommendations[]}}, \
             selfDiscovery{title,content}. Scores are integers from 0 to 100."
        }
        AnalysisKind::LifeMap => {
            "Estimate Big Five personality traits from this face. Answer with one JSON object with \
             keys personalityScores{openness,conscientiousness,extraversion,agreeableness,neuroticism} \
             and careerSuggestions[{title,description,match}]. Scores are integers from 0 to 100."
        }
        AnalysisKind::Compatibility => {
            "Compare the two people in these photos. Answer with one JSON object with keys work, \
             relationship, overall and traits{communication,trust,creativity,empathy,ambition,stability}. \
             Scores are integers from 0 to 100."
        }
    }
}
