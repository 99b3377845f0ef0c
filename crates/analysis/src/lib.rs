//! Photo analysis with graceful degradation.
//!
//! [`AnalysisOrchestrator`] encodes the photos, asks the managed-function
//! backend, falls back to a direct model call, and finally to a fixed mock
//! reading, so callers always get a schema-valid [`cosmicface_core::AnalysisResult`].

pub mod backend;
pub mod encode;
pub mod orchestrator;

pub use backend::{AnalysisBackend, BackendReply, HistoryStore, MemoryHistory};
pub use encode::{EncodedImage, EncodingError, encode_asset, encode_assets};
pub use orchestrator::{
    Analysis, AnalysisOrchestrator, AnalyzeError, DEFAULT_TIMEOUT, PersistenceError, ResultSource,
};
