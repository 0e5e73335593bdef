//! crates/exam_allotment_core/src/roster.rs
//!
//! The rooms, exams and students supplied by the shell, and the lookups the
//! selection screens need.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{Exam, ExamSelector, ExamTime, Room, Student};

/// Everything the engine reads but never changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub exams: Vec<Exam>,
    #[serde(default)]
    pub students: Vec<Student>,
}

/// Seat-count ordering for the room list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomOrder {
    Increasing,
    #[default]
    Decreasing,
}

impl Roster {
    pub fn find_exam(&self, selector: &ExamSelector) -> Option<&Exam> {
        self.exams.iter().find(|exam| selector.matches(exam))
    }

    /// Distinct exam dates in first-seen order.
    pub fn exam_dates(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.exams
            .iter()
            .filter(|exam| seen.insert(exam.date.as_str()))
            .map(|exam| exam.date.clone())
            .collect()
    }

    /// Distinct exam times in first-seen order. Blank times are left out.
    pub fn exam_times(&self) -> Vec<ExamTime> {
        let mut times = Vec::new();
        for exam in &self.exams {
            if !exam.time.as_str().is_empty() && !times.contains(&exam.time) {
                times.push(exam.time.clone());
            }
        }
        times
    }

    /// Exams on the given date and time (either filter optional), one per
    /// subject/semester/branch/slot; a later duplicate replaces an earlier one.
    pub fn exams_for(&self, date: Option<&str>, time: Option<&ExamTime>) -> Vec<&Exam> {
        let mut picked: Vec<&Exam> = Vec::new();
        let candidates = self.exams.iter().filter(|exam| {
            date.map_or(true, |d| exam.date == d) && time.map_or(true, |t| &exam.time == t)
        });

        for exam in candidates {
            let same = |other: &&Exam| {
                other.subject == exam.subject
                    && other.semester == exam.semester
                    && other.branch == exam.branch
                    && other.slot == exam.slot
            };
            match picked.iter().position(same) {
                Some(index) => picked[index] = exam,
                None => picked.push(exam),
            }
        }
        picked
    }

    /// Rooms whose number, block, floor or seat count contains `term`
    /// (case-insensitive), sorted by seat count; equal counts keep roster order.
    pub fn search_rooms(&self, term: &str, order: RoomOrder) -> Vec<&Room> {
        let needle = term.to_lowercase();
        let mut rooms: Vec<&Room> = self
            .rooms
            .iter()
            .filter(|room| {
                needle.is_empty()
                    || room.room_no.to_lowercase().contains(&needle)
                    || room.block.to_lowercase().contains(&needle)
                    || room.floor_no.to_lowercase().contains(&needle)
                    || room.available_seats.to_string().contains(&needle)
            })
            .collect();

        match order {
            RoomOrder::Increasing => rooms.sort_by_key(|room| room.available_seats),
            RoomOrder::Decreasing => rooms.sort_by(|a, b| b.available_seats.cmp(&a.available_seats)),
        }
        rooms
    }

    /// Resolves selected room numbers in the given order. A number given more
    /// than once is resolved once, at its first position.
    ///
    /// Returns the numbers that matched no room as the error.
    pub fn rooms_by_number(&self, room_nos: &[String]) -> Result<Vec<Room>, Vec<String>> {
        let mut seen = HashSet::new();
        let mut found = Vec::with_capacity(room_nos.len());
        let mut unknown = Vec::new();
        for room_no in room_nos.iter().filter(|room_no| seen.insert(room_no.as_str())) {
            match self.rooms.iter().find(|room| &room.room_no == room_no) {
                Some(room) => found.push(room.clone()),
                None => unknown.push(room_no.clone()),
            }
        }
        if unknown.is_empty() {
            Ok(found)
        } else {
            Err(unknown)
        }
    }

    pub fn total_seats(&self) -> u64 {
        self.rooms.iter().map(|room| u64::from(room.available_seats)).sum()
    }
}
