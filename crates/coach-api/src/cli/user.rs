//! `coachd create-user` and `coachd skip-category`.

use coach_types::identity::category_label;

use crate::state::AppState;

pub async fn create_user(state: &AppState, name: &str, json: bool) -> anyhow::Result<()> {
    let (user, coach_state) = state.user_service.create_user(name).await?;

    if json {
        let out = serde_json::json!({ "user": user, "state": coach_state });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Created user '{}'",
        console::style("✓").green().bold(),
        console::style(&user.display_name).cyan()
    );
    println!("  {} {}", console::style("id:").dim(), user.id);
    println!(
        "  {} {}",
        console::style("phase:").dim(),
        coach_state.current_phase
    );
    println!();
    Ok(())
}

pub async fn skip_category(
    state: &AppState,
    user_id: &str,
    category: &str,
    json: bool,
) -> anyhow::Result<()> {
    let user_id = super::parse_user_id(user_id)?;
    let coach_state = state.coach_service.skip_category(user_id, category).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&coach_state)?);
        return Ok(());
    }

    let skipped: Vec<String> = coach_state
        .skipped_identity_categories
        .iter()
        .map(|c| category_label(c))
        .collect();
    println!(
        "  {} skipped categories: {}",
        console::style("✓").green().bold(),
        console::style(skipped.join(", ")).cyan()
    );
    Ok(())
}
