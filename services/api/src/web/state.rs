//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use exam_allotment_core::ports::{AllotmentStore, PortResult, RosterSource};
use exam_allotment_core::repository::AllotmentRepository;
use exam_allotment_core::roster::Roster;
use std::sync::Arc;
use tokio::sync::Mutex;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
pub struct AppState {
    pub config: Arc<Config>,
    pub roster_source: Arc<dyn RosterSource>,
    /// One actor at a time: every handler runs its engine call under this lock.
    pub workspace: Mutex<Workspace>,
}

/// The data one allotment session works on.
pub struct Workspace {
    pub roster: Roster,
    pub repository: AllotmentRepository,
}

//=========================================================================================
// AppState Implementation (Constructor)
//=========================================================================================

impl AppState {
    /// Loads the roster and the stored allotments through the given ports.
    pub fn new(
        config: Arc<Config>,
        roster_source: Arc<dyn RosterSource>,
        store: Arc<dyn AllotmentStore>,
    ) -> PortResult<Self> {
        let roster = roster_source.load_roster()?;
        let repository = AllotmentRepository::load(store)?;
        Ok(Self {
            config,
            roster_source,
            workspace: Mutex::new(Workspace { roster, repository }),
        })
    }
}
