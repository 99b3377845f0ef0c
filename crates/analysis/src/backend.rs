//! Seams between the orchestrator and the services it talks to.
//!
//! Production code plugs in the HTTP clients from `cosmicface-api-client`;
//! tests plug in scripted fakes.

use std::future::Future;
use std::sync::Mutex;

use cosmicface_api::{
    AnalyzeCompatibilityRequest, AnalyzeImageRequest, HistoryEntry, SaveAnalysisRequest,
    normalize_history,
};
use cosmicface_api_client::{BackendError, FunctionsClient, GeminiClient, InlineImage};
use cosmicface_core::{AnalysisKind, AnalysisRequest};

use crate::encode::EncodedImage;

/// What a backend answered with, before parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendReply {
    /// Already-decoded JSON (a string value is still scanned as text).
    Structured(serde_json::Value),
    /// Free-form model output that should contain a JSON object.
    Text(String),
}

pub trait AnalysisBackend: Send + Sync {
    fn name(&self) -> &str;

    fn analyze(
        &self,
        request: &AnalysisRequest,
        images: &[EncodedImage],
    ) -> impl Future<Output = Result<BackendReply, BackendError>> + Send;
}

/// Where backend-sourced readings are recorded.
pub trait HistoryStore: Send + Sync {
    fn save(&self, entry: &SaveAnalysisRequest) -> impl Future<Output = Result<(), BackendError>> + Send;

    fn history(&self, user_id: &str) -> impl Future<Output = Result<Vec<HistoryEntry>, BackendError>> + Send;
}

impl AnalysisBackend for FunctionsClient {
    fn name(&self) -> &str {
        "functions"
    }

    async fn analyze(
        &self,
        request: &AnalysisRequest,
        images: &[EncodedImage],
    ) -> Result<BackendReply, BackendError> {
        let user_id = request.user_id().map(str::to_string);
        let data = match (request.kind(), images) {
            (AnalysisKind::Compatibility, [first, second]) => {
                self.analyze_compatibility(&AnalyzeCompatibilityRequest {
                    image1_base64: first.data.clone(),
                    image2_base64: second.data.clone(),
                    user_id,
                })
                .await?
            }
            (kind, [image]) if kind != AnalysisKind::Compatibility => {
                self.analyze_image(&AnalyzeImageRequest {
                    image_base64: image.data.clone(),
                    analysis_type: kind,
                    user_id,
                })
                .await?
            }
            (kind, images) => {
                return Err(BackendError::Rejected {
                    endpoint: "functions".to_string(),
                    message: format!(
                        "{kind} takes {} image(s), got {}",
                        kind.required_assets(),
                        images.len()
                    ),
                });
            }
        };
        Ok(BackendReply::Structured(data))
    }
}

impl AnalysisBackend for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn analyze(
        &self,
        request: &AnalysisRequest,
        images: &[EncodedImage],
    ) -> Result<BackendReply, BackendError> {
        let inline: Vec<InlineImage> = images
            .iter()
            .map(|image| InlineImage {
                mime_type: image.mime_type.to_string(),
                data: image.data.clone(),
            })
            .collect();
        let text = self.generate(request.kind(), &inline).await?;
        Ok(BackendReply::Text(text))
    }
}

impl HistoryStore for FunctionsClient {
    async fn save(&self, entry: &SaveAnalysisRequest) -> Result<(), BackendError> {
        self.save_analysis(entry).await
    }

    async fn history(&self, user_id: &str) -> Result<Vec<HistoryEntry>, BackendError> {
        FunctionsClient::history(self, user_id).await
    }
}

/// Process-local history, used when no backend is configured and in tests.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: Mutex<Vec<(String, HistoryEntry)>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, HistoryEntry)>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl HistoryStore for MemoryHistory {
    async fn save(&self, entry: &SaveAnalysisRequest) -> Result<(), BackendError> {
        let mut entries = self.lock();
        let id = format!("local-{}", entries.len() + 1);
        entries.push((
            entry.user_id.clone(),
            HistoryEntry {
                id,
                analysis_type: entry.analysis_type,
                result: entry.result.clone(),
                timestamp: entry.timestamp,
            },
        ));
        Ok(())
    }

    async fn history(&self, user_id: &str) -> Result<Vec<HistoryEntry>, BackendError> {
        let entries = self
            .lock()
            .iter()
            .filter(|(owner, _)| owner == user_id)
            .map(|(_, entry)| entry.clone())
            .collect();
        Ok(normalize_history(entries))
    }
}
