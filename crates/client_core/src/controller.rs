//! Character Collection Controller: owns the in-memory character list shown
//! by the roster view and keeps it in step with the API.
//!
//! Operations may overlap. Every list fetch takes a request sequence number
//! and only the latest issued one is applied; deletes are guarded per id;
//! nothing is applied after [`CollectionController::unmount`].
//!
//! The state lock is never held across an await, so a dropped operation
//! future can always settle its bookkeeping from `Drop`.

use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use shared::{
    domain::{Character, CharacterId},
    protocol::CharacterForm,
};
use tracing::{debug, info, warn};

use crate::{
    creation::submit_character,
    error::{ClientError, Operation},
    render::edit_route,
    session::Session,
    CharacterApi,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
    Errored,
}

/// Point-in-time copy of the view state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionSnapshot {
    pub phase: LoadPhase,
    pub characters: Vec<Character>,
    /// Set when the last applied list fetch failed.
    pub error: Option<String>,
    /// Set when a delete failed; does not hide the list.
    pub action_error: Option<String>,
    /// Whether a manual refetch would be accepted right now.
    pub can_retry: bool,
}

#[derive(Default)]
struct CollectionState {
    phase: LoadPhase,
    /// Last phase a fetch actually settled in; restored when a fetch is dropped.
    settled_phase: LoadPhase,
    characters: Vec<Character>,
    error: Option<String>,
    action_error: Option<String>,
    latest_request: u64,
    unmounted: bool,
    pending_deletes: HashSet<CharacterId>,
}

impl CollectionState {
    fn snapshot(&self) -> CollectionSnapshot {
        CollectionSnapshot {
            phase: self.phase,
            characters: self.characters.clone(),
            error: self.error.clone(),
            action_error: self.action_error.clone(),
            can_retry: self.can_retry(),
        }
    }

    fn can_retry(&self) -> bool {
        !self.unmounted && self.phase != LoadPhase::Loading
    }

    fn settle(&mut self, phase: LoadPhase) {
        self.phase = phase;
        self.settled_phase = phase;
    }
}

fn lock_state(state: &Mutex<CollectionState>) -> MutexGuard<'_, CollectionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Puts the phase back when the latest fetch is dropped before it settles.
struct FetchGuard<'a> {
    state: &'a Mutex<CollectionState>,
    seq: u64,
    armed: bool,
}

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = lock_state(self.state);
        if inner.latest_request == self.seq && inner.phase == LoadPhase::Loading {
            inner.phase = inner.settled_phase;
            debug!(seq = self.seq, "character list fetch abandoned");
        }
    }
}

/// Releases a character id from the in-flight delete set.
struct PendingDelete<'a> {
    state: &'a Mutex<CollectionState>,
    id: CharacterId,
}

impl Drop for PendingDelete<'_> {
    fn drop(&mut self) {
        lock_state(self.state).pending_deletes.remove(&self.id);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTarget {
    pub id: CharacterId,
    pub route: String,
}

/// What a character card may ask of its owner.
#[async_trait]
pub trait CardActions: Send + Sync {
    async fn delete(&self, id: CharacterId) -> Result<(), ClientError>;
    fn edit(&self, id: CharacterId) -> EditTarget;
}

pub struct CollectionController<A: CharacterApi> {
    api: A,
    session: Session,
    inner: Mutex<CollectionState>,
}

impl<A: CharacterApi> CollectionController<A> {
    pub fn new(api: A, session: Session) -> Self {
        Self {
            api,
            session,
            inner: Mutex::new(CollectionState::default()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn state(&self) -> MutexGuard<'_, CollectionState> {
        lock_state(&self.inner)
    }

    pub async fn snapshot(&self) -> CollectionSnapshot {
        self.state().snapshot()
    }

    /// Initial load when the view appears.
    pub async fn mount(&self) -> Result<Vec<Character>, ClientError> {
        self.fetch_all().await
    }

    /// Detaches the view; responses still in flight are dropped on arrival.
    pub async fn unmount(&self) {
        self.state().unmounted = true;
        debug!("character view unmounted");
    }

    pub async fn can_retry(&self) -> bool {
        self.state().can_retry()
    }

    /// Manual refetch. Refused while another fetch is in flight.
    pub async fn retry(&self) -> Result<Vec<Character>, ClientError> {
        self.run_fetch(true).await
    }

    pub async fn fetch_all(&self) -> Result<Vec<Character>, ClientError> {
        self.run_fetch(false).await
    }

    async fn run_fetch(&self, refuse_if_loading: bool) -> Result<Vec<Character>, ClientError> {
        let seq = {
            let mut inner = self.state();
            if inner.unmounted {
                return Err(ClientError::Detached);
            }
            if refuse_if_loading && inner.phase == LoadPhase::Loading {
                return Err(ClientError::FetchInFlight);
            }
            inner.latest_request += 1;
            inner.phase = LoadPhase::Loading;
            inner.latest_request
        };
        let mut guard = FetchGuard {
            state: &self.inner,
            seq,
            armed: true,
        };
        debug!(seq, "fetching character list");

        let result = self.api.list_characters(self.session.token()).await;

        guard.armed = false;
        let mut inner = self.state();
        if inner.unmounted {
            debug!(seq, "dropping character list response after unmount");
            return Err(ClientError::Detached);
        }
        if seq != inner.latest_request {
            debug!(
                seq,
                latest = inner.latest_request,
                "dropping superseded character list response"
            );
            return Err(ClientError::Superseded { seq });
        }

        match result {
            Ok(characters) => {
                info!(seq, count = characters.len(), "character list loaded");
                inner.characters = characters.clone();
                inner.error = None;
                inner.settle(LoadPhase::Loaded);
                Ok(characters)
            }
            Err(err) => {
                warn!(seq, error = %err, "failed to fetch characters");
                inner.settle(LoadPhase::Errored);
                inner.error = Some(err.user_message(Operation::FetchAll));
                Err(err)
            }
        }
    }

    /// Deletes a character server-side, then drops it from the local list.
    ///
    /// Without a token this fails before any request is made. A failed delete
    /// leaves the list untouched.
    pub async fn delete_one(&self, id: CharacterId) -> Result<(), ClientError> {
        let Some(token) = self.session.token() else {
            let err = ClientError::AuthRequired {
                action: "delete a character",
            };
            warn!(character_id = %id, "delete refused without a session token");
            let mut inner = self.state();
            if !inner.unmounted {
                inner.action_error = Some(err.user_message(Operation::Delete));
            }
            return Err(err);
        };

        {
            let mut inner = self.state();
            if inner.unmounted {
                return Err(ClientError::Detached);
            }
            if !inner.pending_deletes.insert(id) {
                return Err(ClientError::DeleteInFlight(id));
            }
            inner.action_error = None;
        }
        let pending = PendingDelete {
            state: &self.inner,
            id,
        };

        let result = self.api.delete_character(id, token).await;

        drop(pending);
        let mut inner = self.state();
        if inner.unmounted {
            // The server-side outcome is still reported; only the view is gone.
            debug!(character_id = %id, "delete finished after unmount");
            return result;
        }

        match result {
            Ok(()) => {
                let before = inner.characters.len();
                inner.characters.retain(|character| character.id != id);
                info!(
                    character_id = %id,
                    removed = before - inner.characters.len(),
                    "character deleted"
                );
                Ok(())
            }
            Err(err) => {
                warn!(character_id = %id, error = %err, "failed to delete character");
                inner.action_error = Some(err.user_message(Operation::Delete));
                Err(err)
            }
        }
    }

    /// Posts a new character. The list is not updated; the record shows up
    /// on the next fetch.
    pub async fn create_one(&self, form: &CharacterForm) -> Result<Character, ClientError> {
        submit_character(&self.api, &self.session, form).await
    }

    pub async fn dismiss_action_error(&self) {
        self.state().action_error = None;
    }
}

#[async_trait]
impl<A: CharacterApi> CardActions for CollectionController<A> {
    async fn delete(&self, id: CharacterId) -> Result<(), ClientError> {
        self.delete_one(id).await
    }

    fn edit(&self, id: CharacterId) -> EditTarget {
        EditTarget {
            id,
            route: edit_route(id),
        }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
