pub mod client;
pub mod error;
pub mod gemini;

pub use client::FunctionsClient;
pub use cosmicface_api;
pub use error::{BackendError, Result};
pub use gemini::{GeminiClient, GenerationConfig, InlineImage, prompt_for};
