use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use cosmicface_api::*;

use crate::error::{BackendError, Result};

/// Typed HTTP client for the managed-function backend.
///
/// Every function is a JSON `POST {base_url}/{functionName}`. The analysis
/// functions answer with an [`AnalyzeResponse`] envelope which is unwrapped
/// here, so callers only ever see the payload or a [`BackendError`].
#[derive(Debug, Clone)]
pub struct FunctionsClient {
    client: reqwest::Client,
    base_url: String,
}

impl FunctionsClient {
    /// Create a new client with the given base URL and per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| BackendError::Transport {
                endpoint: base_url.to_string(),
                source,
            })?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create from an existing `reqwest::Client` (e.g. shared in tests).
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, function: FunctionName) -> String {
        format!("{}/{}", self.base_url, function.as_str())
    }

    // ── Analysis ──────────────────────────────────────────────────────────

    /// Single-photo analysis (`analyzeImage` or `analyzeLifeMap`, chosen by
    /// the request's analysis type). Returns the envelope's `data`.
    pub async fn analyze_image(&self, req: &AnalyzeImageRequest) -> Result<serde_json::Value> {
        let function = FunctionName::for_kind(req.analysis_type);
        let envelope: AnalyzeResponse = self.call(function, req).await?;
        unwrap_envelope(function, envelope)
    }

    pub async fn analyze_compatibility(
        &self,
        req: &AnalyzeCompatibilityRequest,
    ) -> Result<serde_json::Value> {
        let function = FunctionName::AnalyzeCompatibility;
        let envelope: AnalyzeResponse = self.call(function, req).await?;
        unwrap_envelope(function, envelope)
    }

    // ── History ───────────────────────────────────────────────────────────

    pub async fn save_analysis(&self, req: &SaveAnalysisRequest) -> Result<()> {
        let function = FunctionName::SaveAnalysisResult;
        let resp: SaveAnalysisResponse = self.call(function, req).await?;
        if !resp.success {
            return Err(BackendError::Rejected {
                endpoint: function.to_string(),
                message: "save was not acknowledged".to_string(),
            });
        }
        Ok(())
    }

    /// Stored readings for `user_id`, newest first.
    pub async fn history(&self, user_id: &str) -> Result<Vec<HistoryEntry>> {
        let req = HistoryRequest {
            user_id: user_id.to_string(),
        };
        let entries: Vec<HistoryEntry> = self.call(FunctionName::GetUserHistory, &req).await?;
        Ok(normalize_history(entries))
    }

    async fn call<B: Serialize, T: DeserializeOwned>(&self, function: FunctionName, body: &B) -> Result<T> {
        let endpoint = function.as_str();
        debug!(function = endpoint, "calling backend function");
        let resp = self
            .client
            .post(self.url(function))
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::from_send(endpoint, e))?;
        parse_response(endpoint, resp).await
    }
}

fn unwrap_envelope(function: FunctionName, envelope: AnalyzeResponse) -> Result<serde_json::Value> {
    if !envelope.success {
        return Err(BackendError::Rejected {
            endpoint: function.to_string(),
            message: envelope
                .error
                .unwrap_or_else(|| "analysis failed".to_string()),
        });
    }
    match envelope.data {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(BackendError::EmptyReply {
            endpoint: function.to_string(),
        }),
    }
}

/// Parse an HTTP response: return the deserialized body on 2xx,
/// or an error containing the status and body text.
pub(crate) async fn parse_response<T: DeserializeOwned>(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(BackendError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            body,
        });
    }
    resp.json().await.map_err(|source| {
        if source.is_timeout() {
            BackendError::Timeout {
                endpoint: endpoint.to_string(),
            }
        } else {
            BackendError::Decode {
                endpoint: endpoint.to_string(),
                source,
            }
        }
    })
}
