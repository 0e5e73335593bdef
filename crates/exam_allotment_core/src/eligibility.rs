//! crates/exam_allotment_core/src/eligibility.rs
//!
//! Decides which students sit a given exam.

use std::cmp::Ordering;

use crate::domain::{Exam, Student};

/// Trims and case-folds a field before comparison.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// A student is eligible when branch and semester match the exam and one of
/// their subject slots names the exam subject. All comparisons are normalized.
pub fn is_eligible(student: Option<&Student>, exam: Option<&Exam>) -> bool {
    let (Some(student), Some(exam)) = (student, exam) else {
        return false;
    };

    if normalize(&student.branch) != normalize(&exam.branch)
        || normalize(&student.semester) != normalize(&exam.semester)
    {
        return false;
    }

    let subject = normalize(&exam.subject);
    student
        .subjects
        .iter()
        .any(|slot| !slot.is_empty() && normalize(slot) == subject)
}

/// The eligible students for `exam`, in roster order. Duplicates are kept.
pub fn filter_eligible<'a>(students: &'a [Student], exam: &Exam) -> Vec<&'a Student> {
    students
        .iter()
        .filter(|student| is_eligible(Some(student), Some(exam)))
        .collect()
}

pub fn count_eligible(students: &[Student], exam: Option<&Exam>) -> usize {
    match exam {
        Some(exam) => students
            .iter()
            .filter(|student| is_eligible(Some(student), Some(exam)))
            .count(),
        None => 0,
    }
}

/// Ascending roll-number order: case-insensitive first, raw text as tie-break.
pub fn by_roll_number(a: &Student, b: &Student) -> Ordering {
    a.roll_no
        .to_lowercase()
        .cmp(&b.roll_no.to_lowercase())
        .then_with(|| a.roll_no.cmp(&b.roll_no))
}

/// Picks the students a new allocation run should seat.
///
/// Takes the first `eligible - already_allocated` eligible students in roster
/// order and sorts them by roll number. This relies on the roster order being
/// the same as in earlier runs for the same exam.
pub fn select_unallocated(
    students: &[Student],
    exam: &Exam,
    already_allocated: usize,
) -> Vec<Student> {
    let eligible = filter_eligible(students, exam);
    let to_allocate = eligible.len().saturating_sub(already_allocated);

    let mut selected: Vec<Student> = eligible
        .into_iter()
        .take(to_allocate)
        .cloned()
        .collect();
    selected.sort_by(by_roll_number);
    selected
}
