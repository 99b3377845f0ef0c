use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use cosmicface_api::SaveAnalysisRequest;
use cosmicface_api_client::BackendError;
use cosmicface_core::{
    AnalysisKind, AnalysisRequest, AnalysisResult, ParseError, PhotoAsset, SessionId, mock_result,
    parse_analysis_text, parse_analysis_value,
};

use crate::backend::{AnalysisBackend, BackendReply, HistoryStore};
use crate::encode::{EncodedImage, EncodingError, encode_assets};

/// Bound on each backend attempt and on the history save.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultSource {
    Primary,
    Secondary,
    Mock,
}

impl ResultSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Mock => "mock",
        }
    }
}

impl std::fmt::Display for ResultSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved reading and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub request: AnalysisRequest,
    pub result: AnalysisResult,
    pub source: ResultSource,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalyzeError {
    #[error("could not prepare photo: {0}")]
    Encoding(#[from] EncodingError),
    #[error("analysis for session {0} was superseded by a newer request")]
    Superseded(SessionId),
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PersistenceError {
    #[error("history save failed: {0}")]
    Backend(#[from] BackendError),
    #[error("history save timed out after {0:?}")]
    Timeout(Duration),
}

/// One failed backend attempt.
#[derive(Debug, Error)]
enum AttemptError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Resolves analysis requests through the fallback chain
/// primary → secondary → deterministic mock.
///
/// At most one analysis is active per session: starting a new one for the
/// same [`SessionId`] makes the previous call resolve to
/// [`AnalyzeError::Superseded`].
///
/// History saves run as detached tasks and never delay a result; call
/// [`AnalysisOrchestrator::flush_saves`] before shutting the runtime down.
pub struct AnalysisOrchestrator<P, S, H> {
    primary: P,
    secondary: S,
    history: Arc<H>,
    timeout: Duration,
    user_id: Option<String>,
    sessions: Mutex<HashMap<SessionId, watch::Sender<u64>>>,
    pending_saves: Mutex<Vec<JoinHandle<()>>>,
}

impl<P, S, H> AnalysisOrchestrator<P, S, H>
where
    P: AnalysisBackend,
    S: AnalysisBackend,
    H: HistoryStore + 'static,
{
    pub fn new(primary: P, secondary: S, history: H) -> Self {
        Self {
            primary,
            secondary,
            history: Arc::new(history),
            timeout: DEFAULT_TIMEOUT,
            user_id: None,
            sessions: Mutex::new(HashMap::new()),
            pending_saves: Mutex::new(Vec::new()),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Readings are saved to history only when a user id is set.
    pub fn with_user_id(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id.filter(|id| !id.trim().is_empty());
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn history_store(&self) -> &H {
        &self.history
    }

    /// Wait for every history save started so far.
    pub async fn flush_saves(&self) {
        let pending = std::mem::take(&mut *self.lock_saves());
        for handle in pending {
            if let Err(e) = handle.await {
                warn!("history save task failed: {e}");
            }
        }
    }

    /// Analyze `assets` as a reading of `kind`.
    ///
    /// Only encoding problems and supersession are errors; every backend or
    /// parse failure is absorbed by the fallback chain.
    pub async fn analyze(
        &self,
        kind: AnalysisKind,
        assets: &[PhotoAsset],
        session_id: SessionId,
    ) -> Result<Analysis, AnalyzeError> {
        let (generation, mut superseded) = self.begin(session_id);

        let request = AnalysisRequest::new(
            kind,
            assets.iter().map(PhotoAsset::id).collect(),
            session_id,
            self.user_id.clone(),
        );
        let images = match encode_assets(kind, assets) {
            Ok(images) => images,
            Err(e) => {
                self.finish(session_id, generation);
                return Err(e.into());
            }
        };

        let outcome = tokio::select! {
            biased;
            _ = wait_superseded(&mut superseded, generation) => None,
            resolved = self.resolve(&request, &images) => Some(resolved),
        };
        self.finish(session_id, generation);

        match outcome {
            Some((result, source)) => Ok(Analysis {
                request,
                result,
                source,
            }),
            None => {
                debug!(session = %session_id, %kind, "analysis superseded");
                Err(AnalyzeError::Superseded(session_id))
            }
        }
    }

    async fn resolve(
        &self,
        request: &AnalysisRequest,
        images: &[EncodedImage],
    ) -> (AnalysisResult, ResultSource) {
        let kind = request.kind();

        let resolved = match self.attempt(&self.primary, request, images).await {
            Ok(result) => Some((result, ResultSource::Primary)),
            Err(e) => {
                warn!(backend = self.primary.name(), %kind, "primary analysis failed: {e}");
                match self.attempt(&self.secondary, request, images).await {
                    Ok(result) => {
                        info!(backend = self.secondary.name(), %kind, "using secondary analysis");
                        Some((result, ResultSource::Secondary))
                    }
                    Err(e) => {
                        warn!(backend = self.secondary.name(), %kind, "secondary analysis failed: {e}");
                        None
                    }
                }
            }
        };

        let Some((result, source)) = resolved else {
            info!(%kind, "all analysis backends failed, using mock result");
            return (mock_result(kind), ResultSource::Mock);
        };

        if let Some(user_id) = request.user_id() {
            self.spawn_save(user_id, &result);
        }

        (result, source)
    }

    async fn attempt<B: AnalysisBackend>(
        &self,
        backend: &B,
        request: &AnalysisRequest,
        images: &[EncodedImage],
    ) -> Result<AnalysisResult, AttemptError> {
        let reply = tokio::time::timeout(self.timeout, backend.analyze(request, images))
            .await
            .map_err(|_| BackendError::Timeout {
                endpoint: backend.name().to_string(),
            })??;

        let result = match reply {
            BackendReply::Structured(value) => parse_analysis_value(request.kind(), value)?,
            BackendReply::Text(text) => parse_analysis_text(request.kind(), &text)?,
        };
        Ok(result)
    }

    /// Start saving `result` to history without waiting for it.
    fn spawn_save(&self, user_id: &str, result: &AnalysisResult) {
        let entry = SaveAnalysisRequest {
            user_id: user_id.to_string(),
            analysis_type: result.kind(),
            result: result.payload_json(),
            timestamp: Utc::now(),
        };
        let history = Arc::clone(&self.history);
        let timeout = self.timeout;
        let handle = tokio::spawn(async move {
            match persist(history.as_ref(), &entry, timeout).await {
                Ok(()) => debug!(kind = %entry.analysis_type, "saved reading to history"),
                Err(e) => warn!(kind = %entry.analysis_type, "{e}"),
            }
        });

        let mut pending = self.lock_saves();
        pending.retain(|task| !task.is_finished());
        pending.push(handle);
    }

    /// Register a new generation for `session_id`, superseding any active one.
    fn begin(&self, session_id: SessionId) -> (u64, watch::Receiver<u64>) {
        let mut sessions = self.lock_sessions();
        let sender = sessions
            .entry(session_id)
            .or_insert_with(|| watch::channel(0).0);
        sender.send_modify(|generation| *generation += 1);
        let generation = *sender.borrow();
        (generation, sender.subscribe())
    }

    fn finish(&self, session_id: SessionId, generation: u64) {
        let mut sessions = self.lock_sessions();
        let current = sessions.get(&session_id).map(|sender| *sender.borrow());
        if current == Some(generation) {
            sessions.remove(&session_id);
        }
    }

    fn lock_saves(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.pending_saves.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_sessions(&self) -> MutexGuard<'_, HashMap<SessionId, watch::Sender<u64>>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

async fn persist<H: HistoryStore>(
    history: &H,
    entry: &SaveAnalysisRequest,
    timeout: Duration,
) -> Result<(), PersistenceError> {
    tokio::time::timeout(timeout, history.save(entry))
        .await
        .map_err(|_| PersistenceError::Timeout(timeout))??;
    Ok(())
}

/// Resolves once the session has moved past `generation`.
async fn wait_superseded(rx: &mut watch::Receiver<u64>, generation: u64) {
    loop {
        if *rx.borrow_and_update() != generation {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
