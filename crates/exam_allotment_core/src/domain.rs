//! crates/exam_allotment_core/src/domain.rs
//!
//! Defines the core data structures for the allotment engine.
//!
//! The serde shape of these records is the shape of the collections the shell
//! already stores (rooms, exams, student data, allotments), so field names and
//! the lenient number handling below must stay compatible with those files.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Maximum number of subject slots a student record carries.
pub const MAX_SUBJECTS: usize = 5;

//=========================================================================================
// Rooms and Exams
//=========================================================================================

/// A physical exam hall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(default, deserialize_with = "loose_text")]
    pub room_no: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub block: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub floor_no: String,
    /// Negative, non-numeric or missing capacities read as 0.
    #[serde(default, deserialize_with = "loose_count")]
    pub available_seats: u32,
}

impl Room {
    pub fn new(room_no: impl Into<String>, available_seats: u32) -> Self {
        Self {
            room_no: room_no.into(),
            block: String::new(),
            floor_no: String::new(),
            available_seats,
        }
    }

    pub fn with_location(mut self, block: impl Into<String>, floor_no: impl Into<String>) -> Self {
        self.block = block.into();
        self.floor_no = floor_no.into();
        self
    }
}

/// The sitting of an exam: morning or evening.
///
/// Values that name neither sitting are kept verbatim as [`ExamTime::Other`]
/// and only ever match the same text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExamTime {
    Morning,
    Evening,
    Other(String),
}

impl ExamTime {
    pub fn as_str(&self) -> &str {
        match self {
            ExamTime::Morning => "MORNING",
            ExamTime::Evening => "EVENING",
            ExamTime::Other(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ExamTime::Other(_))
    }
}

impl Default for ExamTime {
    fn default() -> Self {
        ExamTime::Other(String::new())
    }
}

impl fmt::Display for ExamTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ExamTime {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "morning" | "forenoon" | "fn" | "am" => ExamTime::Morning,
            "evening" | "afternoon" | "an" | "pm" => ExamTime::Evening,
            _ => ExamTime::Other(raw.trim().to_string()),
        }
    }
}

impl FromStr for ExamTime {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(ExamTime::from(s))
    }
}

impl Serialize for ExamTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ExamTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ExamTime::from(raw.as_str()))
    }
}

/// A scheduled exam for one class (semester + branch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exam {
    #[serde(default, deserialize_with = "loose_text")]
    pub subject: String,
    /// `DD-MM-YYYY`.
    #[serde(default, deserialize_with = "loose_text")]
    pub date: String,
    #[serde(default, deserialize_with = "loose_time")]
    pub time: ExamTime,
    #[serde(default, deserialize_with = "loose_text")]
    pub semester: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub branch: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub slot: String,
}

impl Exam {
    pub fn selector(&self) -> ExamSelector {
        ExamSelector {
            semester: self.semester.clone(),
            branch: self.branch.clone(),
            slot: self.slot.clone(),
            date: self.date.clone(),
        }
    }

    pub fn group_key(&self) -> ExamGroupKey {
        ExamGroupKey::new(&self.date, &self.branch, &self.semester, &self.subject)
    }
}

/// Identifies the exam the user picked: (semester, branch, slot, date).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExamSelector {
    pub semester: String,
    pub branch: String,
    pub slot: String,
    pub date: String,
}

impl ExamSelector {
    pub fn matches(&self, exam: &Exam) -> bool {
        exam.semester == self.semester
            && exam.branch == self.branch
            && exam.slot == self.slot
            && exam.date == self.date
    }

    /// The `semester-branch-slot` label stored on allotments. Display only.
    pub fn legacy_label(&self) -> String {
        format!("{}-{}-{}", self.semester, self.branch, self.slot)
    }
}

/// Groups allotments that belong to the same exam sitting of one class.
///
/// Date, branch and semester compare exactly; the subject is normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExamGroupKey {
    pub date: String,
    pub branch: String,
    pub semester: String,
    pub subject: String,
}

impl ExamGroupKey {
    pub fn new(date: &str, branch: &str, semester: &str, subject: &str) -> Self {
        Self {
            date: date.to_string(),
            branch: branch.to_string(),
            semester: semester.to_string(),
            subject: crate::eligibility::normalize(subject),
        }
    }
}

//=========================================================================================
// Students
//=========================================================================================

/// A student on the roster. Roll numbers are not guaranteed to be unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StudentRecord", into = "StudentRecord")]
pub struct Student {
    pub roll_no: String,
    pub name: String,
    pub branch: String,
    pub semester: String,
    /// Up to [`MAX_SUBJECTS`] subject names, in slot order.
    pub subjects: Vec<String>,
}

impl Student {
    pub fn new(
        roll_no: impl Into<String>,
        name: impl Into<String>,
        branch: impl Into<String>,
        semester: impl Into<String>,
    ) -> Self {
        Self {
            roll_no: roll_no.into(),
            name: name.into(),
            branch: branch.into(),
            semester: semester.into(),
            subjects: Vec::new(),
        }
    }

    /// Adds a subject slot. Slots beyond the fifth are ignored.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        if self.subjects.len() < MAX_SUBJECTS {
            self.subjects.push(subject.into());
        }
        self
    }
}

/// The stored shape of a student: spreadsheet-style column names.
#[derive(Serialize, Deserialize)]
struct StudentRecord {
    #[serde(rename = "Roll No", default, deserialize_with = "loose_text")]
    roll_no: String,
    #[serde(rename = "Name", default, deserialize_with = "loose_text")]
    name: String,
    #[serde(rename = "Branch", default, deserialize_with = "loose_text")]
    branch: String,
    #[serde(rename = "Semester", default, deserialize_with = "loose_text")]
    semester: String,
    #[serde(rename = "Subject 1", default, deserialize_with = "loose_opt_text", skip_serializing_if = "Option::is_none")]
    subject_1: Option<String>,
    #[serde(rename = "Subject 2", default, deserialize_with = "loose_opt_text", skip_serializing_if = "Option::is_none")]
    subject_2: Option<String>,
    #[serde(rename = "Subject 3", default, deserialize_with = "loose_opt_text", skip_serializing_if = "Option::is_none")]
    subject_3: Option<String>,
    #[serde(rename = "Subject 4", default, deserialize_with = "loose_opt_text", skip_serializing_if = "Option::is_none")]
    subject_4: Option<String>,
    #[serde(rename = "Subject 5", default, deserialize_with = "loose_opt_text", skip_serializing_if = "Option::is_none")]
    subject_5: Option<String>,
}

impl From<StudentRecord> for Student {
    fn from(record: StudentRecord) -> Self {
        let subjects = [
            record.subject_1,
            record.subject_2,
            record.subject_3,
            record.subject_4,
            record.subject_5,
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect();

        Self {
            roll_no: record.roll_no,
            name: record.name,
            branch: record.branch,
            semester: record.semester,
            subjects,
        }
    }
}

impl From<Student> for StudentRecord {
    fn from(student: Student) -> Self {
        let mut slots = student.subjects.into_iter().map(Some);
        let mut next = || slots.next().flatten();
        Self {
            roll_no: student.roll_no,
            name: student.name,
            branch: student.branch,
            semester: student.semester,
            subject_1: next(),
            subject_2: next(),
            subject_3: next(),
            subject_4: next(),
            subject_5: next(),
        }
    }
}

//=========================================================================================
// Allotments
//=========================================================================================

/// The students seated in one room for one allotment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationEntry {
    #[serde(default, deserialize_with = "loose_text")]
    pub room_no: String,
    #[serde(default, deserialize_with = "loose_count")]
    pub allocated_seats: u32,
    #[serde(default)]
    pub participants: Vec<Student>,
}

impl AllocationEntry {
    /// One printable row per participant; seat numbers start at 1.
    pub fn seat_chart(&self) -> Vec<SeatRow> {
        self.participants
            .iter()
            .enumerate()
            .map(|(index, student)| SeatRow {
                serial: index + 1,
                roll_no: student.roll_no.clone(),
                name: student.name.clone(),
                seat_no: index + 1,
            })
            .collect()
    }
}

/// A line of a room's seating chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatRow {
    pub serial: usize,
    pub roll_no: String,
    pub name: String,
    pub seat_no: usize,
}

/// Unique identifier of a committed allotment.
///
/// Older stored allotments carry timestamp-derived ids, so any string is accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllotmentId(String);

impl AllotmentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for AllotmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AllotmentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for AllotmentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A committed room-by-room seat plan for one exam sitting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allotment {
    #[serde(default)]
    pub id: AllotmentId,
    /// `semester-branch-slot` label of the exam selection.
    #[serde(default, deserialize_with = "loose_text")]
    pub exam: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub subject: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub date: String,
    #[serde(default, deserialize_with = "loose_time")]
    pub time: ExamTime,
    #[serde(default, deserialize_with = "loose_text")]
    pub semester: String,
    #[serde(default, deserialize_with = "loose_text")]
    pub branch: String,
    #[serde(default)]
    pub allocation: Vec<AllocationEntry>,
    #[serde(default, deserialize_with = "loose_opt_count", skip_serializing_if = "Option::is_none")]
    pub total_students: Option<u32>,
    #[serde(default, deserialize_with = "loose_timestamp", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Allotment {
    /// Builds a fresh allotment for `exam` with a new id and the current time.
    pub fn new(exam: &Exam, allocation: Vec<AllocationEntry>) -> Self {
        let total = seat_total(&allocation);
        Self {
            id: AllotmentId::generate(),
            exam: exam.selector().legacy_label(),
            subject: exam.subject.clone(),
            date: exam.date.clone(),
            time: exam.time.clone(),
            semester: exam.semester.clone(),
            branch: exam.branch.clone(),
            allocation,
            total_students: Some(total),
            timestamp: Some(Utc::now()),
        }
    }

    /// Seated student count; falls back to the per-room counts for records
    /// stored without `totalStudents`.
    pub fn seated(&self) -> u32 {
        match self.total_students {
            Some(total) if total > 0 => total,
            _ => seat_total(&self.allocation),
        }
    }

    pub fn group_key(&self) -> ExamGroupKey {
        ExamGroupKey::new(&self.date, &self.branch, &self.semester, &self.subject)
    }

    pub fn uses_room(&self, room_no: &str) -> bool {
        self.allocation.iter().any(|entry| entry.room_no == room_no)
    }

    pub fn room_numbers(&self) -> Vec<&str> {
        self.allocation.iter().map(|entry| entry.room_no.as_str()).collect()
    }
}

fn seat_total(allocation: &[AllocationEntry]) -> u32 {
    allocation
        .iter()
        .fold(0u32, |total, entry| total.saturating_add(entry.allocated_seats))
}

//=========================================================================================
// Lenient field readers
//=========================================================================================

/// Scalar values as they may appear in hand-edited or spreadsheet-imported JSON.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Loose {
    fn into_text(self) -> String {
        match self {
            Loose::Text(s) => s,
            Loose::Int(i) => i.to_string(),
            Loose::Float(f) => f.to_string(),
            Loose::Bool(b) => b.to_string(),
        }
    }

    fn into_count(self) -> u32 {
        match self {
            Loose::Text(s) => leading_integer(&s),
            Loose::Int(i) => i.clamp(0, i64::from(u32::MAX)) as u32,
            Loose::Float(f) if f.is_finite() && f > 0.0 => f.min(f64::from(u32::MAX)) as u32,
            Loose::Float(_) | Loose::Bool(_) => 0,
        }
    }
}

/// Reads the leading integer of a string ("30 seats" is 30); anything else is 0.
fn leading_integer(raw: &str) -> u32 {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('-') {
        return 0;
    }
    let digits: String = trimmed
        .trim_start_matches('+')
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse::<u64>().map_or(0, |n| n.min(u64::from(u32::MAX)) as u32)
}

fn loose_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<Loose>::deserialize(deserializer)?
        .map(Loose::into_text)
        .unwrap_or_default())
}

fn loose_opt_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Loose>::deserialize(deserializer)?.map(Loose::into_text))
}

fn loose_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(Option::<Loose>::deserialize(deserializer)?.map_or(0, Loose::into_count))
}

fn loose_opt_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    Ok(Option::<Loose>::deserialize(deserializer)?.map(Loose::into_count))
}

fn loose_time<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ExamTime, D::Error> {
    Ok(Option::<Loose>::deserialize(deserializer)?
        .map(|raw| ExamTime::from(raw.into_text().as_str()))
        .unwrap_or_default())
}

fn loose_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(Option::<Loose>::deserialize(deserializer)?.and_then(|raw| {
        DateTime::parse_from_rfc3339(&raw.into_text())
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }))
}
