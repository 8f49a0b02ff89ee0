//! Decoding oracle responses into typed actions.

use serde::de::DeserializeOwned;

use coach_types::action::{
    ADD_USER_NOTE, Action, ActionScope, AddUserNoteParams, DELETE_USER_NOTE,
    DeleteUserNoteParams, NoteUpdate, TRANSITION_STATE, TransitionStateParams, UPDATE_USER_NOTE,
    UpdateUserNoteParams,
};
use coach_types::error::DispatchError;

/// Validated actions in execution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionBatch {
    actions: Vec<Action>,
}

impl ActionBatch {
    /// Decode every recognised field of `response`.
    ///
    /// Unknown top-level fields are ignored and absent or `null` fields
    /// produce no action. The first field that fails to parse or validate
    /// aborts decoding with `DispatchError::Validation`, so nothing from a
    /// bad response is ever applied. Under [`ActionScope::NotesOnly`] the
    /// transition field is not read at all.
    pub fn decode(response: &serde_json::Value, scope: ActionScope) -> Result<Self, DispatchError> {
        let object = response
            .as_object()
            .ok_or_else(|| DispatchError::NotAnObject(json_type_name(response).to_string()))?;
        let field = |name: &str| object.get(name).filter(|v| !v.is_null());

        let mut actions = Vec::with_capacity(4);

        if let Some(value) = field(ADD_USER_NOTE) {
            let params: AddUserNoteParams = parse_params(ADD_USER_NOTE, value)?;
            actions.push(Action::AddUserNote(validate_add(params)?));
        }

        if let Some(value) = field(UPDATE_USER_NOTE) {
            let params: UpdateUserNoteParams = parse_params(UPDATE_USER_NOTE, value)?;
            actions.push(Action::UpdateUserNote(validate_update(params)?));
        }

        if let Some(value) = field(DELETE_USER_NOTE) {
            let params: DeleteUserNoteParams = parse_params(DELETE_USER_NOTE, value)?;
            actions.push(Action::DeleteUserNote(validate_delete(params)?));
        }

        if scope == ActionScope::All {
            if let Some(value) = field(TRANSITION_STATE) {
                let params: TransitionStateParams = parse_params(TRANSITION_STATE, value)?;
                actions.push(Action::TransitionState(params.to_state));
            }
        }

        Ok(Self { actions })
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn into_actions(self) -> Vec<Action> {
        self.actions
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }
}

fn parse_params<T: DeserializeOwned>(field: &str, value: &serde_json::Value) -> Result<T, DispatchError> {
    serde_json::from_value(value.clone()).map_err(|e| DispatchError::validation(field, e.to_string()))
}

fn validate_add(params: AddUserNoteParams) -> Result<Vec<String>, DispatchError> {
    if params.notes.is_empty() {
        return Err(DispatchError::validation(ADD_USER_NOTE, "notes must not be empty"));
    }
    params
        .notes
        .into_iter()
        .enumerate()
        .map(|(idx, note)| {
            let note = note.trim();
            if note.is_empty() {
                Err(DispatchError::validation(
                    ADD_USER_NOTE,
                    format!("notes[{idx}] is blank"),
                ))
            } else {
                Ok(note.to_string())
            }
        })
        .collect()
}

fn validate_update(params: UpdateUserNoteParams) -> Result<Vec<NoteUpdate>, DispatchError> {
    if params.items.is_empty() {
        return Err(DispatchError::validation(UPDATE_USER_NOTE, "items must not be empty"));
    }
    params
        .items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            let id = item.id.trim();
            let note = item.note.trim();
            if id.is_empty() {
                return Err(DispatchError::validation(
                    UPDATE_USER_NOTE,
                    format!("items[{idx}].id is blank"),
                ));
            }
            if note.is_empty() {
                return Err(DispatchError::validation(
                    UPDATE_USER_NOTE,
                    format!("items[{idx}].note is blank"),
                ));
            }
            Ok(NoteUpdate {
                id: id.to_string(),
                note: note.to_string(),
            })
        })
        .collect()
}

fn validate_delete(params: DeleteUserNoteParams) -> Result<Vec<String>, DispatchError> {
    if params.ids.is_empty() {
        return Err(DispatchError::validation(DELETE_USER_NOTE, "ids must not be empty"));
    }
    params
        .ids
        .into_iter()
        .enumerate()
        .map(|(idx, id)| {
            let id = id.trim();
            if id.is_empty() {
                Err(DispatchError::validation(
                    DELETE_USER_NOTE,
                    format!("ids[{idx}] is blank"),
                ))
            } else {
                Ok(id.to_string())
            }
        })
        .collect()
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coach_types::coach::CoachingPhase;
    use serde_json::json;

    #[test]
    fn test_decode_orders_actions() {
        let response = json!({
            "transition_state": { "to_state": "ACTION_PLANNING" },
            "delete_user_note": { "ids": ["n2"] },
            "message": "ignored here",
            "add_user_note": { "notes": ["  Likes tea  "] },
            "update_user_note": { "items": [{ "id": "n1", "note": "Has two kids" }] }
        });
        let batch = ActionBatch::decode(&response, ActionScope::All).unwrap();
        assert_eq!(
            batch.actions(),
            &[
                Action::AddUserNote(vec!["Likes tea".to_string()]),
                Action::UpdateUserNote(vec![NoteUpdate {
                    id: "n1".to_string(),
                    note: "Has two kids".to_string(),
                }]),
                Action::DeleteUserNote(vec!["n2".to_string()]),
                Action::TransitionState(CoachingPhase::ActionPlanning),
            ]
        );
    }

    #[test]
    fn test_absent_null_and_unknown_fields_produce_nothing() {
        let response = json!({
            "message": "hi",
            "component": null,
            "add_user_note": null,
            "something_new": { "x": 1 }
        });
        let batch = ActionBatch::decode(&response, ActionScope::All).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_unknown_phase_is_validation_error() {
        let response = json!({
            "add_user_note": { "notes": ["fine"] },
            "transition_state": { "to_state": "NOT_A_PHASE" }
        });
        match ActionBatch::decode(&response, ActionScope::All) {
            Err(DispatchError::Validation { field, .. }) => assert_eq!(field, "transition_state"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_notes_only_scope_ignores_transition() {
        let response = json!({
            "add_user_note": { "notes": ["fine"] },
            "transition_state": { "to_state": "NOT_A_PHASE" }
        });
        let batch = ActionBatch::decode(&response, ActionScope::NotesOnly).unwrap();
        assert_eq!(batch.len(), 1);
        assert!(batch.actions()[0].is_note_mutation());
    }

    #[test]
    fn test_empty_lists_rejected() {
        for (response, field) in [
            (json!({ "add_user_note": { "notes": [] } }), "add_user_note"),
            (json!({ "update_user_note": { "items": [] } }), "update_user_note"),
            (json!({ "delete_user_note": { "ids": [] } }), "delete_user_note"),
        ] {
            match ActionBatch::decode(&response, ActionScope::All) {
                Err(DispatchError::Validation { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected validation error for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_blank_text_rejected() {
        let response = json!({ "update_user_note": { "items": [{ "id": "n1", "note": "   " }] } });
        assert!(matches!(
            ActionBatch::decode(&response, ActionScope::All),
            Err(DispatchError::Validation { .. })
        ));
        let response = json!({ "add_user_note": { "notes": ["ok", ""] } });
        assert!(matches!(
            ActionBatch::decode(&response, ActionScope::All),
            Err(DispatchError::Validation { .. })
        ));
    }

    #[test]
    fn test_wrong_shape_rejected() {
        let response = json!({ "add_user_note": ["not", "wrapped"] });
        assert!(matches!(
            ActionBatch::decode(&response, ActionScope::All),
            Err(DispatchError::Validation { .. })
        ));
    }

    #[test]
    fn test_non_object_response() {
        assert!(matches!(
            ActionBatch::decode(&json!([1, 2]), ActionScope::All),
            Err(DispatchError::NotAnObject(t)) if t == "array"
        ));
    }

    #[test]
    fn test_non_uuid_id_is_not_a_decode_error() {
        let response = json!({ "delete_user_note": { "ids": ["bad-id"] } });
        let batch = ActionBatch::decode(&response, ActionScope::All).unwrap();
        assert_eq!(batch.actions(), &[Action::DeleteUserNote(vec!["bad-id".to_string()])]);
    }
}
