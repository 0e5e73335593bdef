pub mod json_roster;
pub mod json_store;

pub use json_roster::JsonRoster;
pub use json_store::JsonFileStore;

use std::path::Path;

use exam_allotment_core::ports::{PortError, PortResult};
use serde::de::DeserializeOwned;

/// Reads a JSON array from `path`. A missing, empty or `null` file is an empty list.
pub(crate) fn read_json_list<T: DeserializeOwned>(path: &Path) -> PortResult<Vec<T>> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(PortError::Unexpected(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let list: Option<Vec<T>> = serde_json::from_str(&text).map_err(|e| {
        PortError::Unexpected(format!("Failed to parse {}: {}", path.display(), e))
    })?;
    Ok(list.unwrap_or_default())
}
