use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cosmicface_core::{AnalysisKind, AssetRegistry, PhotoAsset, SessionId};
use serde_json::json;

use crate::backends;
use crate::config::load_config;

pub fn load_photos(registry: &AssetRegistry, paths: &[PathBuf]) -> Result<Vec<PhotoAsset>> {
    paths
        .iter()
        .map(|path| load_photo(registry, path))
        .collect()
}

fn load_photo(registry: &AssetRegistry, path: &Path) -> Result<PhotoAsset> {
    registry
        .load(path)
        .with_context(|| format!("Failed to load photo {}", path.display()))
}

pub async fn run_analyze(
    kind: &str,
    photos: &[PathBuf],
    user_id: Option<String>,
    session: Option<String>,
) -> Result<()> {
    let kind: AnalysisKind = kind.parse().map_err(anyhow::Error::msg)?;
    let session_id = match session {
        Some(raw) => raw
            .parse::<SessionId>()
            .with_context(|| format!("Invalid session id '{raw}'"))?,
        None => SessionId::new(),
    };

    let config = load_config()?;
    let orchestrator = backends::orchestrator(&config, user_id)?;
    let registry = AssetRegistry::new();
    let assets = load_photos(&registry, photos)?;

    let analysis = orchestrator.analyze(kind, &assets, session_id).await?;

    let out = json!({
        "kind": kind,
        "source": analysis.source,
        "sessionId": analysis.request.session_id(),
        "result": analysis.result.payload_json(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    orchestrator.flush_saves().await;
    Ok(())
}
