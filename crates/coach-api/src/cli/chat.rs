//! `coachd chat`: one coach turn from the command line.

use crate::state::AppState;

pub async fn chat_once(
    state: &AppState,
    user_id: &str,
    text: &str,
    show_prompt: bool,
    json: bool,
) -> anyhow::Result<()> {
    let user_id = super::parse_user_id(user_id)?;
    let reply = state.coach_service.handle_user_message(user_id, text).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&reply)?);
        return Ok(());
    }

    if show_prompt {
        println!("{}", console::style("── prompt ──").dim());
        println!("{}", reply.final_prompt);
        println!("{}", console::style("────────────").dim());
    }

    println!();
    println!(
        "  {} {}",
        console::style("coach:").magenta().bold(),
        reply.message.content
    );
    if let Some(component) = &reply.component {
        for option in &component.options {
            println!("    {} {}", console::style("›").dim(), option);
        }
    }

    let report = &reply.report;
    if !report.is_noop() {
        println!();
        println!(
            "  {}",
            console::style(format!(
                "notes +{} ~{} -{}, {} skipped",
                report.notes_added,
                report.notes_updated,
                report.notes_deleted,
                report.skipped.len()
            ))
            .dim()
        );
        if let Some(phase) = report.transitioned_to {
            println!("  {} {}", console::style("phase →").dim(), phase);
        }
    }
    println!();
    Ok(())
}
