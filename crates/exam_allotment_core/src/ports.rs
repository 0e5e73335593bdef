//! crates/exam_allotment_core/src/ports.rs
//!
//! Defines the service contracts (traits) through which the shell supplies
//! roster data and persists allotments. The engine never touches storage
//! directly; adapters in the service crate implement these traits.

use std::sync::Mutex;

use crate::domain::Allotment;
use crate::roster::Roster;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistence for the allotment collection. The collection is always read
/// and written whole.
pub trait AllotmentStore: Send + Sync {
    fn load(&self) -> PortResult<Vec<Allotment>>;

    fn save(&self, allotments: &[Allotment]) -> PortResult<()>;
}

/// Supplies the rooms, exams and students the engine works on.
pub trait RosterSource: Send + Sync {
    fn load_roster(&self) -> PortResult<Roster>;
}

//=========================================================================================
// In-memory Store
//=========================================================================================

/// An `AllotmentStore` that keeps the last saved collection in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    saved: Mutex<Vec<Allotment>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allotments(allotments: Vec<Allotment>) -> Self {
        Self {
            saved: Mutex::new(allotments),
        }
    }

    /// A copy of what was last saved.
    pub fn snapshot(&self) -> PortResult<Vec<Allotment>> {
        self.load()
    }
}

impl AllotmentStore for InMemoryStore {
    fn load(&self) -> PortResult<Vec<Allotment>> {
        self.saved
            .lock()
            .map(|saved| saved.clone())
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }

    fn save(&self, allotments: &[Allotment]) -> PortResult<()> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        *saved = allotments.to_vec();
        Ok(())
    }
}
