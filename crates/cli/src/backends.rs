use std::time::Duration;

use anyhow::{Context, Result};
use cosmicface_analysis::AnalysisOrchestrator;
use cosmicface_api_client::{FunctionsClient, GeminiClient};
use cosmicface_runtime_config::CosmicConfig;

/// Managed functions first, Gemini second, history through the functions.
pub type Orchestrator = AnalysisOrchestrator<FunctionsClient, GeminiClient, FunctionsClient>;

pub fn functions_client(config: &CosmicConfig) -> Result<FunctionsClient> {
    FunctionsClient::new(
        &config.backend.functions_url,
        Duration::from_secs(config.backend.timeout_secs),
    )
    .context("Failed to build functions client")
}

fn gemini_client(config: &CosmicConfig) -> Result<GeminiClient> {
    let client = GeminiClient::new(
        &config.gemini.api_url,
        &config.gemini.model,
        &config.gemini.api_key,
        Duration::from_secs(config.gemini.timeout_secs),
    )
    .context("Failed to build Gemini client")?;
    if !client.has_credentials() {
        tracing::debug!("no Gemini API key configured; secondary analysis is unavailable");
    }
    Ok(client)
}

pub fn orchestrator(config: &CosmicConfig, user_id: Option<String>) -> Result<Orchestrator> {
    let functions = functions_client(config)?;
    let user_id = user_id.or_else(|| config.identity.user_id().map(str::to_string));
    Ok(AnalysisOrchestrator::new(
        functions.clone(),
        gemini_client(config)?,
        functions,
    )
    .with_timeout(Duration::from_secs(config.backend.timeout_secs))
    .with_user_id(user_id))
}
