//! Wire types for the cosmicface managed-function backend.
//!
//! This crate is the single source of truth for the callable functions'
//! request and response bodies. Field names follow the functions' camelCase
//! JSON contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cosmicface_core::{AnalysisKind, AnalysisResult, ParseError, parse_analysis_value};

/// Maximum number of entries the history function returns.
pub const HISTORY_LIMIT: usize = 50;

// ─── Function names ──────────────────────────────────────────────────────────

/// Callable functions exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionName {
    AnalyzeImage,
    AnalyzeLifeMap,
    AnalyzeCompatibility,
    SaveAnalysisResult,
    GetUserHistory,
}

impl FunctionName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnalyzeImage => "analyzeImage",
            Self::AnalyzeLifeMap => "analyzeLifeMap",
            Self::AnalyzeCompatibility => "analyzeCompatibility",
            Self::SaveAnalysisResult => "saveAnalysisResult",
            Self::GetUserHistory => "getUserHistory",
        }
    }

    /// The analysis function that serves `kind`.
    pub fn for_kind(kind: AnalysisKind) -> Self {
        match kind {
            AnalysisKind::DailyInsight => Self::AnalyzeImage,
            AnalysisKind::LifeMap => Self::AnalyzeLifeMap,
            AnalysisKind::Compatibility => Self::AnalyzeCompatibility,
        }
    }
}

impl std::fmt::Display for FunctionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Analysis ────────────────────────────────────────────────────────────────

/// Body for `analyzeImage` / `analyzeLifeMap`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImageRequest {
    pub image_base64: String,
    pub analysis_type: AnalysisKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Body for `analyzeCompatibility`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeCompatibilityRequest {
    pub image1_base64: String,
    pub image2_base64: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Envelope every analysis function answers with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyzeResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalyzeResponse {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

// ─── History ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaveAnalysisRequest {
    pub user_id: String,
    pub analysis_type: AnalysisKind,
    pub result: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveAnalysisResponse {
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRequest {
    pub user_id: String,
}

/// One stored reading, newest first in history listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub analysis_type: AnalysisKind,
    pub result: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// Decode and validate the stored payload.
    pub fn typed_result(&self) -> Result<AnalysisResult, ParseError> {
        parse_analysis_value(self.analysis_type, self.result.clone())
    }
}

/// Order entries newest first and cap them at [`HISTORY_LIMIT`].
pub fn normalize_history(mut entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries.truncate(HISTORY_LIMIT);
    entries
}
