//! services/api/src/adapters/json_roster.rs
//!
//! Implements the `RosterSource` port by reading the room, exam and student
//! collections from JSON files in the data directory.

use std::path::PathBuf;

use exam_allotment_core::ports::{PortResult, RosterSource};
use exam_allotment_core::roster::Roster;
use tracing::{info, warn};

use super::read_json_list;

pub const ROOMS_FILE: &str = "rooms.json";
pub const EXAMS_FILE: &str = "exams.json";
pub const STUDENTS_FILE: &str = "studentData.json";

#[derive(Clone, Debug)]
pub struct JsonRoster {
    dir: PathBuf,
}

impl JsonRoster {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl RosterSource for JsonRoster {
    fn load_roster(&self) -> PortResult<Roster> {
        let roster = Roster {
            rooms: read_json_list(&self.dir.join(ROOMS_FILE))?,
            exams: read_json_list(&self.dir.join(EXAMS_FILE))?,
            students: read_json_list(&self.dir.join(STUDENTS_FILE))?,
        };
        let unknown_times = roster.exams.iter().filter(|exam| !exam.time.is_known()).count();
        if unknown_times > 0 {
            warn!(
                exams = unknown_times,
                "Exams with an unrecognized time only match that exact text"
            );
        }
        info!(
            rooms = roster.rooms.len(),
            exams = roster.exams.len(),
            students = roster.students.len(),
            "Roster loaded"
        );
        Ok(roster)
    }
}
