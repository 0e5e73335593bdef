//! services/api/src/adapters/json_store.rs
//!
//! This module contains the file adapter for the allotment collection. It
//! implements the `AllotmentStore` port from the `core` crate by keeping the
//! whole collection in a single JSON document.

use std::fs;
use std::path::{Path, PathBuf};

use exam_allotment_core::domain::Allotment;
use exam_allotment_core::ports::{AllotmentStore, PortError, PortResult};
use tracing::debug;

use super::read_json_list;

/// File name of the allotment collection inside the data directory.
pub const ALLOTMENTS_FILE: &str = "allotments.json";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `AllotmentStore` port on a JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a new `JsonFileStore` writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store for `allotments.json` inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(ALLOTMENTS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

//=========================================================================================
// `AllotmentStore` Trait Implementation
//=========================================================================================

impl AllotmentStore for JsonFileStore {
    fn load(&self) -> PortResult<Vec<Allotment>> {
        read_json_list(&self.path)
    }

    /// Rewrites the whole file. The new content is written next to the target
    /// and renamed over it, so readers never see a half-written document.
    fn save(&self, allotments: &[Allotment]) -> PortResult<()> {
        let unexpected = |e: std::io::Error| {
            PortError::Unexpected(format!("Failed to write {}: {}", self.path.display(), e))
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(unexpected)?;
        }

        let json = serde_json::to_string_pretty(allotments)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, json).map_err(unexpected)?;
        fs::rename(&staging, &self.path).map_err(unexpected)?;

        debug!(path = %self.path.display(), count = allotments.len(), "Allotments saved");
        Ok(())
    }
}
