//! Coach state machine.
//!
//! Owns a user's coaching phase and the identity currently being refined.
//! Public operations take the user's lock themselves; the `*_locked`
//! variants are for callers (the action dispatcher) that already hold it.

use coach_types::coach::{CoachState, CoachingPhase};
use coach_types::error::RepositoryError;
use coach_types::identity::{Identity, IdentityState};
use coach_types::user::UserId;
use tracing::{debug, error, info};

use crate::lock::UserLocks;
use crate::repository::coach_state::CoachStateRepository;
use crate::repository::identity::IdentityRepository;

/// Pick the identity to refine next: the oldest (by `created_at`, then id)
/// that is not yet `refinement_complete`.
pub fn pick_identity_for_refinement(identities: &[Identity]) -> Option<&Identity> {
    identities
        .iter()
        .filter(|i| i.needs_refinement())
        .min_by_key(|i| (i.created_at, i.id))
}

/// Phase and refinement-pointer transitions for every user.
pub struct CoachStateMachine<S: CoachStateRepository, I: IdentityRepository> {
    states: S,
    identities: I,
    locks: UserLocks,
}

impl<S: CoachStateRepository, I: IdentityRepository> CoachStateMachine<S, I> {
    pub fn new(states: S, identities: I, locks: UserLocks) -> Self {
        Self {
            states,
            identities,
            locks,
        }
    }

    pub fn locks(&self) -> &UserLocks {
        &self.locks
    }

    pub fn identities(&self) -> &I {
        &self.identities
    }

    /// Current state for a user.
    ///
    /// Users are created together with their state, so a missing row means
    /// the user does not exist: `NotFound`.
    pub async fn load(&self, user_id: UserId) -> Result<CoachState, RepositoryError> {
        self.states
            .get(&user_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Move the user to `phase`. Any phase may follow any other.
    ///
    /// Entering `IDENTITY_REFINEMENT` also selects the identity to refine.
    /// The phase change stands even if that selection fails; the failure is
    /// logged and `current_identity` is left as it was.
    #[tracing::instrument(name = "coach.transition", skip(self), fields(user_id = %user_id))]
    pub async fn transition_to(
        &self,
        user_id: UserId,
        phase: CoachingPhase,
    ) -> Result<CoachState, RepositoryError> {
        let _guard = self.locks.lock(user_id).await;
        self.transition_to_locked(user_id, phase).await
    }

    /// [`transition_to`](Self::transition_to) for callers already holding
    /// the user's lock.
    pub(crate) async fn transition_to_locked(
        &self,
        user_id: UserId,
        phase: CoachingPhase,
    ) -> Result<CoachState, RepositoryError> {
        let mut state = self.load(user_id).await?;
        let from = state.current_phase;
        state.current_phase = phase;
        let state = self.states.save(&state).await?;
        info!(%from, to = %phase, version = state.version, "coaching phase changed");

        if phase != CoachingPhase::IdentityRefinement {
            return Ok(state);
        }
        match self.select_locked(state.clone()).await {
            Ok(selected) => Ok(selected),
            Err(e) => {
                error!(error = %e, "entered identity refinement but could not select an identity");
                Ok(state)
            }
        }
    }

    /// Point `current_identity` at the next identity needing refinement.
    ///
    /// No-op when every identity is complete (or there are none). Running
    /// it twice selects the same identity.
    #[tracing::instrument(name = "coach.select_identity", skip(self), fields(user_id = %user_id))]
    pub async fn select_identity_for_refinement(
        &self,
        user_id: UserId,
    ) -> Result<CoachState, RepositoryError> {
        let _guard = self.locks.lock(user_id).await;
        let state = self.load(user_id).await?;
        self.select_locked(state).await
    }

    async fn select_locked(&self, mut state: CoachState) -> Result<CoachState, RepositoryError> {
        let user_id = state.user_id;
        let identities = self.identities.list(&user_id).await?;

        let Some(next) = pick_identity_for_refinement(&identities) else {
            debug!("no identity needs refinement; current identity unchanged");
            return Ok(state);
        };

        if next.state == IdentityState::Pending {
            self.identities
                .update_state(&user_id, &next.id, IdentityState::Refinement)
                .await?;
        }

        if state.current_identity == Some(next.id) {
            return Ok(state);
        }

        state.current_identity = Some(next.id);
        let state = self.states.save(&state).await?;
        info!(identity_id = %next.id, identity = %next.name, "selected identity for refinement");
        Ok(state)
    }

    /// Record that the user skipped an identity category. Duplicates are
    /// ignored.
    #[tracing::instrument(name = "coach.skip_category", skip(self), fields(user_id = %user_id))]
    pub async fn skip_category(
        &self,
        user_id: UserId,
        category: &str,
    ) -> Result<CoachState, RepositoryError> {
        let category = category.trim();
        let _guard = self.locks.lock(user_id).await;
        let mut state = self.load(user_id).await?;

        if category.is_empty()
            || state
                .skipped_identity_categories
                .iter()
                .any(|c| c == category)
        {
            return Ok(state);
        }

        state
            .skipped_identity_categories
            .push(category.to_string());
        self.states.save(&state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryStore;
    use chrono::{Duration, Utc};
    use coach_types::identity::IdentityCategory;

    fn machine_with_user() -> (
        CoachStateMachine<InMemoryStore, InMemoryStore>,
        InMemoryStore,
        UserId,
    ) {
        let store = InMemoryStore::new();
        let user = store.seed_user("Ada");
        let machine = CoachStateMachine::new(store.clone(), store.clone(), UserLocks::new());
        (machine, store, user)
    }

    fn identity_at(user: UserId, name: &str, offset_secs: i64, state: IdentityState) -> Identity {
        let mut identity = Identity::new(user, name.to_string(), IdentityCategory::DoerOfThings);
        identity.created_at = Utc::now() + Duration::seconds(offset_secs);
        identity.state = state;
        identity
    }

    #[tokio::test]
    async fn test_transition_bumps_version_and_allows_jumps() {
        let (machine, _store, user) = machine_with_user();

        let state = machine
            .transition_to(user, CoachingPhase::Accountability)
            .await
            .unwrap();
        assert_eq!(state.current_phase, CoachingPhase::Accountability);
        assert_eq!(state.version, 1);

        let state = machine
            .transition_to(user, CoachingPhase::Introduction)
            .await
            .unwrap();
        assert_eq!(state.current_phase, CoachingPhase::Introduction);
        assert_eq!(state.version, 2);
    }

    #[tokio::test]
    async fn test_load_unknown_user_not_found() {
        let (machine, _store, _user) = machine_with_user();
        assert!(matches!(
            machine.load(UserId::new()).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_selects_oldest_incomplete_identity() {
        let (machine, store, user) = machine_with_user();
        let t1 = identity_at(user, "t1", 0, IdentityState::RefinementComplete);
        let t2 = identity_at(user, "t2", 10, IdentityState::Pending);
        let t3 = identity_at(user, "t3", 20, IdentityState::Refinement);
        for identity in [&t3, &t1, &t2] {
            store.add_identity(identity.clone());
        }

        let state = machine.select_identity_for_refinement(user).await.unwrap();
        assert_eq!(state.current_identity, Some(t2.id));

        let selected = store.identity(t2.id).unwrap();
        assert_eq!(selected.state, IdentityState::Refinement);
    }

    #[tokio::test]
    async fn test_selection_is_idempotent() {
        let (machine, store, user) = machine_with_user();
        store.add_identity(identity_at(user, "a", 0, IdentityState::Pending));
        store.add_identity(identity_at(user, "b", 5, IdentityState::Pending));

        let first = machine.select_identity_for_refinement(user).await.unwrap();
        let second = machine.select_identity_for_refinement(user).await.unwrap();
        assert_eq!(first.current_identity, second.current_identity);
        assert_eq!(first.version, second.version);
    }

    #[tokio::test]
    async fn test_selection_noop_when_all_complete() {
        let (machine, store, user) = machine_with_user();
        store.add_identity(identity_at(user, "done", 0, IdentityState::RefinementComplete));

        let state = machine.select_identity_for_refinement(user).await.unwrap();
        assert!(state.current_identity.is_none());
        assert_eq!(state.version, 0);
    }

    #[tokio::test]
    async fn test_selection_ignores_other_users_identities() {
        let (machine, store, user) = machine_with_user();
        let other = store.seed_user("Grace");
        store.add_identity(identity_at(other, "foreign", -100, IdentityState::Pending));
        let own = identity_at(user, "own", 0, IdentityState::Pending);
        store.add_identity(own.clone());

        let state = machine.select_identity_for_refinement(user).await.unwrap();
        assert_eq!(state.current_identity, Some(own.id));
    }

    #[tokio::test]
    async fn test_entering_refinement_selects_identity() {
        let (machine, store, user) = machine_with_user();
        let identity = identity_at(user, "a", 0, IdentityState::Pending);
        store.add_identity(identity.clone());

        let state = machine
            .transition_to(user, CoachingPhase::IdentityRefinement)
            .await
            .unwrap();
        assert_eq!(state.current_phase, CoachingPhase::IdentityRefinement);
        assert_eq!(state.current_identity, Some(identity.id));
    }

    #[tokio::test]
    async fn test_refinement_entry_survives_selection_failure() {
        let (machine, store, user) = machine_with_user();
        store.add_identity(identity_at(user, "a", 0, IdentityState::Pending));
        store.fail_identity_listing();

        let state = machine
            .transition_to(user, CoachingPhase::IdentityRefinement)
            .await
            .unwrap();
        assert_eq!(state.current_phase, CoachingPhase::IdentityRefinement);
        assert!(state.current_identity.is_none());
        assert_eq!(
            store.state(user).unwrap().current_phase,
            CoachingPhase::IdentityRefinement
        );
    }

    #[tokio::test]
    async fn test_skip_category_dedups() {
        let (machine, _store, user) = machine_with_user();
        machine.skip_category(user, "spiritual").await.unwrap();
        let state = machine.skip_category(user, " spiritual ").await.unwrap();
        assert_eq!(state.skipped_identity_categories, vec!["spiritual".to_string()]);
        assert_eq!(state.version, 1);
    }
}
