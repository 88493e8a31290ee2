//! Worker-global roster session.
//!
//! Uses `thread_local!` + `RefCell` like the rest of the in-browser server:
//! the Web Worker keeps the WASM module alive, so the storage mirror and the
//! in-flight drag survive across `handle_request` calls until the tab closes.

use std::cell::RefCell;

use crate::roster::clock::{Clock, SystemClock};
use crate::roster::drag::DragState;
use crate::roster::error::Result;
use crate::roster::pages::PageStore;
use crate::roster::players::PlayerStore;
use crate::roster::storage::{MemoryStorage, PersistedState};

pub struct Session {
    storage: MemoryStorage,
    clock: Box<dyn Clock>,
    pub drag: DragState,
}

impl Session {
    /// Fresh session with the sample roster, as on a first visit.
    pub fn new(clock: Box<dyn Clock>) -> Self {
        let session = Self::empty(clock);
        session.seed();
        session
    }

    /// Fresh session with nothing stored, not even sample players.
    pub fn empty(clock: Box<dyn Clock>) -> Self {
        Self {
            storage: MemoryStorage::default(),
            clock,
            drag: DragState::default(),
        }
    }

    fn seed(&self) {
        if let Err(e) = self.pages().ensure_pages_exist() {
            log::warn!("could not create the default page: {e}");
        }
        if let Err(e) = self.players().seed_if_unset() {
            log::warn!("could not seed sample players: {e}");
        }
    }

    pub fn storage(&self) -> &MemoryStorage {
        &self.storage
    }

    pub fn pages(&self) -> PageStore<'_, MemoryStorage> {
        PageStore::new(&self.storage, self.clock.as_ref())
    }

    pub fn players(&self) -> PlayerStore<'_, MemoryStorage> {
        PlayerStore::new(&self.storage, self.clock.as_ref())
    }
}

thread_local! {
    static SESSION: RefCell<Session> = RefCell::new(Session::new(Box::new(SystemClock)));
}

pub fn with_session<F, R>(f: F) -> R
where
    F: FnOnce(&Session) -> R,
{
    SESSION.with(|s| f(&s.borrow()))
}

pub fn with_session_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut Session) -> R,
{
    SESSION.with(|s| f(&mut s.borrow_mut()))
}

pub fn replace_session(session: Session) {
    SESSION.with(|s| {
        *s.borrow_mut() = session;
    });
}

/// Back to a first-visit session (sample players, wall clock).
pub fn reset_session() {
    replace_session(Session::new(Box::new(SystemClock)));
}

/// Every persisted key as a JSON object, for mirroring into `localStorage`.
pub fn export_state_json() -> String {
    with_session(|s| serde_json::to_string(&s.storage.export()).unwrap_or_else(|_| "{}".to_string()))
}

/// Replace the stored keys with a `localStorage` snapshot.
///
/// A snapshot without players gets the sample roster, like a first visit.
/// The in-flight drag is cleared.
pub fn restore_state_json(json: &str) -> Result<()> {
    let state: PersistedState = serde_json::from_str(json)?;
    with_session_mut(|s| {
        s.storage.restore(&state);
        s.drag.end();
        s.seed();
    });
    log::debug!("restored {} storage key(s)", state.0.len());
    Ok(())
}
