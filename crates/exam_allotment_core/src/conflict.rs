//! crates/exam_allotment_core/src/conflict.rs
//!
//! Read-only checks of a proposed exam/room selection against committed allotments.

use crate::domain::{Allotment, Exam, ExamTime};
use crate::eligibility::normalize;

/// True if `room_no` is already used by an allotment in the same date and time slot.
pub fn is_room_already_allotted(
    allotments: &[Allotment],
    room_no: &str,
    date: &str,
    time: &ExamTime,
) -> bool {
    if date.is_empty() {
        return false;
    }
    allotments
        .iter()
        .any(|a| a.date == date && &a.time == time && a.uses_room(room_no))
}

/// The subset of `room_nos` already allotted for the slot, in input order.
pub fn allotted_rooms<'a>(
    allotments: &[Allotment],
    room_nos: &[&'a str],
    date: &str,
    time: &ExamTime,
) -> Vec<&'a str> {
    room_nos
        .iter()
        .copied()
        .filter(|room_no| is_room_already_allotted(allotments, room_no, date, time))
        .collect()
}

/// True if the same class already has an allotment for a different subject on
/// the exam's date. Advisory: callers may proceed after confirmation.
pub fn has_schedule_conflict(allotments: &[Allotment], exam: &Exam) -> bool {
    if exam.date.is_empty() || exam.branch.is_empty() || exam.semester.is_empty() {
        return false;
    }
    let subject = normalize(&exam.subject);
    allotments.iter().any(|a| {
        a.date == exam.date
            && a.branch == exam.branch
            && a.semester == exam.semester
            && normalize(&a.subject) != subject
    })
}
