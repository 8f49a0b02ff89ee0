//! Prompt manager.
//!
//! Composes static instructions and formatted context into the two prompt
//! flavors the oracle sees: the interactive coach prompt and the Sentinel
//! extraction prompt. Sections are titled `## {title}` and separated by a
//! blank line. In dev mode every inserted section is preceded by a
//! cache-busting comment so no two prompts are byte-identical; otherwise
//! output is a pure function of the inputs.

pub mod cache_bust;
pub mod instructions;
pub mod schema;

use std::collections::VecDeque;

use coach_types::chat::ChatMessage;
use coach_types::coach::CoachState;
use coach_types::config::PromptConfig;
use coach_types::identity::Identity;
use coach_types::note::UserNote;

use crate::context::{
    format_identities_detailed, format_identities_needing_refinement, format_identity_index,
    format_recent_messages, format_skipped_categories, format_user_notes, truncate_chars,
};

pub use schema::ResponseSchema;

use self::cache_bust::cache_bust_line;
use self::instructions::{COACH_BASE_INSTRUCTIONS, SENTINEL_INSTRUCTIONS, phase_instructions};

/// Knobs for prompt assembly.
#[derive(Debug, Clone)]
pub struct PromptSettings {
    pub dev_mode: bool,
    pub recent_message_limit: usize,
    pub max_message_chars: usize,
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self::from(&PromptConfig::default())
    }
}

impl From<&PromptConfig> for PromptSettings {
    fn from(config: &PromptConfig) -> Self {
        Self {
            dev_mode: config.dev_mode,
            recent_message_limit: config.recent_message_limit,
            max_message_chars: config.max_message_chars,
        }
    }
}

/// Where the user-notes section goes in a coach prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotesPlacement {
    /// Before everything else, including the base instructions.
    Prepend,
    /// After the recent-messages section.
    Append,
}

/// Everything a coach prompt is built from, borrowed from the caller.
#[derive(Debug, Clone, Copy)]
pub struct CoachContext<'a> {
    pub state: &'a CoachState,
    pub identities: &'a [Identity],
    /// Recent messages in chronological order. The manager keeps only the
    /// last `recent_message_limit` of them.
    pub messages: &'a [ChatMessage],
    pub notes: &'a [UserNote],
}

/// Prompt text plus the response schema the oracle must answer with.
#[derive(Debug, Clone)]
pub struct BuiltPrompt {
    pub text: String,
    pub schema: ResponseSchema,
}

/// Builds coach and Sentinel prompts.
#[derive(Debug, Clone, Default)]
pub struct PromptManager {
    settings: PromptSettings,
}

impl PromptManager {
    pub fn new(settings: PromptSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PromptSettings {
        &self.settings
    }

    /// Build the interactive coach prompt.
    ///
    /// Layout: base instructions, current phase, identity context, recent
    /// messages, then user notes at the front or back per `placement`.
    pub fn build_coach_prompt(
        &self,
        context: &CoachContext<'_>,
        placement: NotesPlacement,
    ) -> BuiltPrompt {
        let mut doc = PromptDocument::new(self.settings.dev_mode, COACH_BASE_INSTRUCTIONS);

        let phase = context.state.current_phase;
        doc.append(
            "Current Phase",
            &format!("{phase}\n\n{}", phase_instructions(phase)),
        );

        self.append_identity_context(&mut doc, context);

        let recent = self.recent_window(context.messages);
        doc.append("Recent Messages", &format_recent_messages(&recent));

        let notes = format_user_notes(context.notes);
        match placement {
            NotesPlacement::Prepend => doc.prepend("User Notes", &notes),
            NotesPlacement::Append => doc.append("User Notes", &notes),
        }

        BuiltPrompt {
            text: doc.finish(),
            schema: ResponseSchema::Coach,
        }
    }

    /// Build the Sentinel extraction prompt over the full, untruncated
    /// history and every existing note (with ids).
    pub fn build_sentinel_prompt(&self, messages: &[ChatMessage], notes: &[UserNote]) -> BuiltPrompt {
        let mut doc = PromptDocument::new(self.settings.dev_mode, SENTINEL_INSTRUCTIONS);
        doc.append("Chat History", &format_recent_messages(messages));
        doc.append("Existing User Notes", &format_user_notes(notes));

        BuiltPrompt {
            text: doc.finish(),
            schema: ResponseSchema::Sentinel,
        }
    }

    fn append_identity_context(&self, doc: &mut PromptDocument, context: &CoachContext<'_>) {
        if !context.state.is_refining() {
            doc.append(
                "User Identities",
                &format_identities_detailed(context.identities),
            );
            return;
        }

        let mut body = format_identities_needing_refinement(context.identities);
        body.push_str(&format_skipped_categories(
            &context.state.skipped_identity_categories,
        ));
        doc.append("Identities Needing Refinement", &body);
        doc.append("Identity Index", &format_identity_index(context.identities));

        let current = context
            .state
            .current_identity
            .and_then(|id| context.identities.iter().find(|i| i.id == id));
        if let Some(identity) = current {
            doc.append(
                "Identity Being Refined",
                &format_identities_detailed(std::slice::from_ref(identity)),
            );
        }
    }

    fn recent_window(&self, messages: &[ChatMessage]) -> Vec<ChatMessage> {
        let start = messages
            .len()
            .saturating_sub(self.settings.recent_message_limit);
        messages[start..]
            .iter()
            .map(|m| ChatMessage {
                content: truncate_chars(&m.content, self.settings.max_message_chars),
                ..m.clone()
            })
            .collect()
    }
}

/// Ordered list of prompt sections.
struct PromptDocument {
    dev_mode: bool,
    sections: VecDeque<String>,
}

impl PromptDocument {
    fn new(dev_mode: bool, base: &str) -> Self {
        let mut sections = VecDeque::with_capacity(6);
        sections.push_back(base.trim().to_string());
        Self { dev_mode, sections }
    }

    fn section(&self, title: &str, body: &str) -> String {
        let heading = format!("## {title}\n\n{}", body.trim_end());
        if self.dev_mode {
            format!("{}\n{heading}", cache_bust_line())
        } else {
            heading
        }
    }

    fn append(&mut self, title: &str, body: &str) {
        let section = self.section(title, body);
        self.sections.push_back(section);
    }

    fn prepend(&mut self, title: &str, body: &str) {
        let section = self.section(title, body);
        self.sections.push_front(section);
    }

    fn finish(self) -> String {
        Vec::from(self.sections).join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_types::chat::ChatRole;
    use coach_types::coach::CoachingPhase;
    use coach_types::identity::{IdentityCategory, IdentityState};
    use coach_types::user::UserId;

    use super::cache_bust::is_cache_bust_line;

    struct Fixture {
        state: CoachState,
        identities: Vec<Identity>,
        messages: Vec<ChatMessage>,
        notes: Vec<UserNote>,
    }

    impl Fixture {
        fn new() -> Self {
            let user = UserId::new();
            let mut musician = Identity::new(
                user,
                "Musician".to_string(),
                IdentityCategory::PassionsAndTalents,
            );
            musician.i_am_statement = "I am a musician".to_string();
            let runner = Identity::new(
                user,
                "Runner".to_string(),
                IdentityCategory::PhysicalExpression,
            );
            Self {
                state: CoachState::initial(user),
                identities: vec![musician, runner],
                messages: vec![
                    ChatMessage::new(user, ChatRole::User, "Hello".to_string()),
                    ChatMessage::new(user, ChatRole::Coach, "Hi there".to_string()),
                ],
                notes: vec![UserNote::new(user, "Lives in Lisbon".to_string())],
            }
        }

        fn context(&self) -> CoachContext<'_> {
            CoachContext {
                state: &self.state,
                identities: &self.identities,
                messages: &self.messages,
                notes: &self.notes,
            }
        }
    }

    fn manager(dev_mode: bool) -> PromptManager {
        PromptManager::new(PromptSettings {
            dev_mode,
            recent_message_limit: 20,
            max_message_chars: 2000,
        })
    }

    fn strip_cache_bust(text: &str) -> String {
        text.lines()
            .filter(|l| !is_cache_bust_line(l))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_prod_mode_is_deterministic() {
        let fx = Fixture::new();
        let pm = manager(false);
        let a = pm.build_coach_prompt(&fx.context(), NotesPlacement::Append);
        let b = pm.build_coach_prompt(&fx.context(), NotesPlacement::Append);
        assert_eq!(a.text, b.text);
        assert!(!a.text.contains("cache-bust"));
        assert_eq!(a.schema, ResponseSchema::Coach);
    }

    #[test]
    fn test_dev_mode_differs_only_in_cache_bust_lines() {
        let fx = Fixture::new();
        let pm = manager(true);
        let a = pm.build_coach_prompt(&fx.context(), NotesPlacement::Append);
        let b = pm.build_coach_prompt(&fx.context(), NotesPlacement::Append);
        assert_ne!(a.text, b.text);
        assert_eq!(strip_cache_bust(&a.text), strip_cache_bust(&b.text));

        // current phase, identities, recent messages, notes
        let busts = a.text.lines().filter(|l| is_cache_bust_line(l)).count();
        assert_eq!(busts, 4);

        let prod = manager(false).build_coach_prompt(&fx.context(), NotesPlacement::Append);
        assert_eq!(strip_cache_bust(&a.text), prod.text);
    }

    #[test]
    fn test_section_order_notes_appended() {
        let fx = Fixture::new();
        let text = manager(false)
            .build_coach_prompt(&fx.context(), NotesPlacement::Append)
            .text;
        let phase = text.find("## Current Phase").unwrap();
        let identities = text.find("## User Identities").unwrap();
        let recent = text.find("## Recent Messages").unwrap();
        let notes = text.find("## User Notes").unwrap();
        assert!(text.starts_with("You are an identity coach."));
        assert!(phase < identities && identities < recent && recent < notes);
        assert!(text.contains("**Musician** (Passions and Talents)"));
        assert!(text.contains("User: Hello\nCoach: Hi there"));
        assert!(text.contains("Lives in Lisbon"));
    }

    #[test]
    fn test_notes_prepended() {
        let fx = Fixture::new();
        let text = manager(false)
            .build_coach_prompt(&fx.context(), NotesPlacement::Prepend)
            .text;
        assert!(text.starts_with("## User Notes\n\n- ["));
        assert!(text.find("## User Notes").unwrap() < text.find("You are an identity coach.").unwrap());
    }

    #[test]
    fn test_refinement_context() {
        let mut fx = Fixture::new();
        fx.identities[1].state = IdentityState::RefinementComplete;
        fx.state.current_phase = CoachingPhase::IdentityRefinement;
        fx.state.current_identity = Some(fx.identities[0].id);
        fx.state.skipped_identity_categories = vec!["spiritual".to_string()];

        let text = manager(false)
            .build_coach_prompt(&fx.context(), NotesPlacement::Append)
            .text;
        assert!(!text.contains("## User Identities"));
        assert!(text.contains(
            "## Identities Needing Refinement\n\n\
             Identities needing refinement:\n- Musician (Passions and Talents)\n\n---\n\n\
             Skipped identity categories:\n- Spiritual"
        ));
        assert!(text.contains(&format!(
            "## Identity Index\n\n- **Musician**: {} (pending)\n- **Runner**: {} (refinement_complete)",
            fx.identities[0].id, fx.identities[1].id
        )));
        assert!(text.find("## Identity Index").unwrap() < text.find("## Identity Being Refined").unwrap());
        assert!(text.contains("## Identity Being Refined\n\n**Musician**"));
        assert!(!text.contains("Runner ("));
    }

    #[test]
    fn test_recent_messages_limited_and_truncated() {
        let mut fx = Fixture::new();
        let user = fx.state.user_id;
        fx.messages = vec![
            ChatMessage::new(user, ChatRole::User, "oldest".to_string()),
            ChatMessage::new(user, ChatRole::Coach, "middle".to_string()),
            ChatMessage::new(user, ChatRole::User, "abcdefghij".to_string()),
        ];
        let pm = PromptManager::new(PromptSettings {
            dev_mode: false,
            recent_message_limit: 2,
            max_message_chars: 4,
        });
        let text = pm.build_coach_prompt(&fx.context(), NotesPlacement::Append).text;
        assert!(!text.contains("oldest"));
        assert!(text.contains("Coach: midd…\nUser: abcd…"));
    }

    #[test]
    fn test_sentinel_prompt_uses_full_history() {
        let fx = Fixture::new();
        let long = "x".repeat(5_000);
        let mut messages = fx.messages.clone();
        messages.push(ChatMessage::new(fx.state.user_id, ChatRole::User, long.clone()));

        let pm = PromptManager::new(PromptSettings {
            dev_mode: false,
            recent_message_limit: 1,
            max_message_chars: 10,
        });
        let built = pm.build_sentinel_prompt(&messages, &fx.notes);
        assert_eq!(built.schema, ResponseSchema::Sentinel);
        assert!(built.text.contains("User: Hello"));
        assert!(built.text.contains(&long));
        assert!(built.text.contains(&format!("- [{}] Lives in Lisbon", fx.notes[0].id)));
        assert!(built.text.find("## Chat History").unwrap() < built.text.find("## Existing User Notes").unwrap());
    }

    #[test]
    fn test_empty_context_uses_fallbacks() {
        let state = CoachState::initial(UserId::new());
        let ctx = CoachContext {
            state: &state,
            identities: &[],
            messages: &[],
            notes: &[],
        };
        let text = manager(false)
            .build_coach_prompt(&ctx, NotesPlacement::Append)
            .text;
        assert!(text.contains("No identities found."));
        assert!(text.contains("No messages found."));
        assert!(text.contains("No notes found."));
    }
}
