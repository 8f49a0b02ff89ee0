//! Context formatters.
//!
//! Pure functions that turn stored records into prompt-ready text. Every
//! formatter is total: an empty slice yields a fixed fallback string, and
//! unknown category values degrade to their raw form.

use coach_types::chat::ChatMessage;
use coach_types::identity::{Identity, category_label};
use coach_types::note::UserNote;

/// Separator placed between identity blocks and before trailing sections.
pub const BLOCK_SEPARATOR: &str = "\n\n---\n\n";

pub const NO_IDENTITIES: &str = "No identities found.";
pub const NO_IDENTITIES_NEED_REFINEMENT: &str = "No identities need refinement.";
pub const NO_MESSAGES: &str = "No messages found.";
pub const NO_NOTES: &str = "No notes found.";

const TRUNCATION_MARKER: char = '…';

/// Full-detail view of identities, one block per identity.
///
/// Each block starts with `**{name}** ({category label})`. Statement,
/// visualization and notes lines appear only when non-empty.
pub fn format_identities_detailed(identities: &[Identity]) -> String {
    if identities.is_empty() {
        return NO_IDENTITIES.to_string();
    }

    identities
        .iter()
        .map(format_identity_block)
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

fn format_identity_block(identity: &Identity) -> String {
    let mut block = format!(
        "**{}** ({})\nState: {}\n",
        identity.name,
        identity.category.label(),
        identity.state
    );

    if !identity.i_am_statement.trim().is_empty() {
        block.push_str(&format!("I Am Statement: {}\n", identity.i_am_statement.trim()));
    }
    if !identity.visualization.trim().is_empty() {
        block.push_str(&format!("Visualization: {}\n", identity.visualization.trim()));
    }

    let notes: Vec<&str> = identity
        .notes
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .collect();
    if !notes.is_empty() {
        block.push_str("Notes:\n");
        for note in notes {
            block.push_str(&format!("- {note}\n"));
        }
    }

    block.trim_end().to_string()
}

/// Short list of identities that still need refinement work.
///
/// Callers pass the identities they consider; completed ones are filtered
/// out here so the heading never lies.
pub fn format_identities_needing_refinement(identities: &[Identity]) -> String {
    let pending: Vec<&Identity> = identities.iter().filter(|i| i.needs_refinement()).collect();
    if pending.is_empty() {
        return NO_IDENTITIES_NEED_REFINEMENT.to_string();
    }

    let mut out = String::from("Identities needing refinement:");
    for identity in pending {
        out.push_str(&format!(
            "\n- {} ({})",
            identity.name,
            identity.category.label()
        ));
    }
    out
}

/// ID-list view: one line per identity carrying its id and state.
pub fn format_identity_index(identities: &[Identity]) -> String {
    if identities.is_empty() {
        return NO_IDENTITIES.to_string();
    }

    identities
        .iter()
        .map(|i| format!("- **{}**: {} ({})", i.name, i.id, i.state))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Trailing block listing skipped categories, or `""` when none.
///
/// Designed to be concatenated directly after another section, so it
/// carries its own leading separator.
pub fn format_skipped_categories(categories: &[String]) -> String {
    if categories.is_empty() {
        return String::new();
    }

    let mut out = format!("{BLOCK_SEPARATOR}Skipped identity categories:");
    for raw in categories {
        out.push_str(&format!("\n- {}", category_label(raw)));
    }
    out
}

/// Chronological transcript, one `Speaker: content` line per message.
pub fn format_recent_messages(messages: &[ChatMessage]) -> String {
    if messages.is_empty() {
        return NO_MESSAGES.to_string();
    }

    messages
        .iter()
        .map(|m| format!("{}: {}", m.role.speaker(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Detailed note view; ids are included so the model can target updates.
pub fn format_user_notes(notes: &[UserNote]) -> String {
    if notes.is_empty() {
        return NO_NOTES.to_string();
    }

    notes
        .iter()
        .map(|n| format!("- [{}] {}", n.id, n.note))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cap `content` at `max_chars` characters, appending `…` when cut.
pub fn truncate_chars(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            let mut out = content[..byte_idx].to_string();
            out.push(TRUNCATION_MARKER);
            out
        }
        None => content.to_string(),
    }
}
