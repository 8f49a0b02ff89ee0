//! `coachd extract`: run the Sentinel for one user and report the outcome.

use coach_core::sentinel::SentinelOutcome;

use crate::state::AppState;

pub async fn extract(state: &AppState, user_id: &str, json: bool) -> anyhow::Result<()> {
    let user_id = super::parse_user_id(user_id)?;
    let outcome = state.coach_service.run_sentinel_extraction(user_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        SentinelOutcome::Applied(report) => {
            println!(
                "  {} notes +{} ~{} -{} ({} skipped)",
                console::style("✓").green().bold(),
                report.notes_added,
                report.notes_updated,
                report.notes_deleted,
                report.skipped.len()
            );
        }
        SentinelOutcome::Skipped { reason } => {
            println!("  {} skipped: {reason}", console::style("–").yellow().bold());
        }
    }
    Ok(())
}
