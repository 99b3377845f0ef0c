use anyhow::{Result, bail};
use cosmicface_api::HistoryEntry;
use cosmicface_core::AnalysisResult;

use crate::backends;
use crate::config::load_config;

pub async fn run_history(user_id: Option<String>, json: bool) -> Result<()> {
    let config = load_config()?;
    let Some(user_id) = user_id.or_else(|| config.identity.user_id().map(str::to_string)) else {
        bail!("No user id. Pass --user-id or run `cosmicface config --user-id <id>`.");
    };

    let client = backends::functions_client(&config)?;
    let mut entries = client.history(&user_id).await?;
    entries.truncate(config.history.limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("No saved readings for {user_id}.");
        return Ok(());
    }
    for entry in &entries {
        println!("{}", format_entry(entry));
    }
    Ok(())
}

fn format_entry(entry: &HistoryEntry) -> String {
    let headline = match entry.typed_result() {
        Ok(result) => headline(&result),
        Err(e) => format!("unreadable result ({e})"),
    };
    format!(
        "{}  {:<13}  {}  {}",
        entry.timestamp.format("%Y-%m-%d %H:%M"),
        entry.analysis_type.as_str(),
        entry.id,
        headline
    )
}

fn headline(result: &AnalysisResult) -> String {
    match result {
        AnalysisResult::DailyInsight(insight) => format!(
            "shine {} / {}",
            insight.shine_index(),
            insight.day_keyword()
        ),
        AnalysisResult::LifeMap(map) => {
            let top = map
                .career_suggestions
                .iter()
                .max_by_key(|career| career.match_score)
                .map_or("no careers", |career| career.title.as_str());
            format!("openness {} / {top}", map.personality_scores.openness)
        }
        AnalysisResult::Compatibility(score) => format!(
            "overall {} (work {}, relationship {})",
            score.overall, score.work, score.relationship
        ),
    }
}
