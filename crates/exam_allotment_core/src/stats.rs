//! crates/exam_allotment_core/src/stats.rs
//!
//! Summary counters for the allotment screen, recomputed from current state.

use serde::Serialize;

use crate::domain::{Exam, Room};
use crate::eligibility::count_eligible;
use crate::repository::AllotmentRepository;
use crate::roster::Roster;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Subject of the selected exam.
    pub subject: Option<String>,
    pub total_rooms: usize,
    pub total_seats: u64,
    pub rooms_selected: usize,
    pub selected_seats: u64,
    pub total_participants: usize,
    pub allocated_so_far: usize,
    pub remaining_participants: usize,
    pub empty_seats: u64,
}

/// Room counters always reflect the roster and selection; exam counters are
/// zero when no exam is selected.
pub fn compute(
    exam: Option<&Exam>,
    selected_rooms: &[Room],
    roster: &Roster,
    repository: &AllotmentRepository,
) -> Statistics {
    let selected_seats: u64 = selected_rooms
        .iter()
        .map(|room| u64::from(room.available_seats))
        .sum();

    let mut stats = Statistics {
        subject: None,
        total_rooms: roster.rooms.len(),
        total_seats: roster.total_seats(),
        rooms_selected: selected_rooms.len(),
        selected_seats,
        ..Statistics::default()
    };

    let Some(exam) = exam else {
        return stats;
    };

    let total = count_eligible(&roster.students, Some(exam));
    let allocated = repository.count_allocated(exam);
    let remaining = total.saturating_sub(allocated);

    stats.subject = Some(exam.subject.clone());
    stats.total_participants = total;
    stats.allocated_so_far = allocated;
    stats.remaining_participants = remaining;
    stats.empty_seats = selected_seats.saturating_sub(remaining as u64);

    tracing::debug!(
        subject = %exam.subject,
        total,
        allocated,
        remaining,
        "Statistics recomputed"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AllocationEntry, ExamTime, Student};
    use crate::ports::InMemoryStore;
    use std::sync::Arc;

    fn exam() -> Exam {
        Exam {
            subject: "DBMS".into(),
            date: "04-03-2025".into(),
            time: ExamTime::Morning,
            semester: "5".into(),
            branch: "CSE".into(),
            slot: "A".into(),
        }
    }

    fn roster(eligible: usize) -> Roster {
        Roster {
            rooms: vec![Room::new("R1", 50), Room::new("R2", 30)],
            exams: vec![exam()],
            students: (0..eligible)
                .map(|i| Student::new(format!("{i:03}"), "S", "CSE", "5").with_subject("DBMS"))
                .collect(),
        }
    }

    fn repository() -> AllotmentRepository {
        AllotmentRepository::load(Arc::new(InMemoryStore::new())).unwrap()
    }

    #[test]
    fn no_exam_zeroes_exam_counters() {
        let r = roster(10);
        let stats = compute(None, &r.rooms[..1], &r, &repository());

        assert_eq!(stats.subject, None);
        assert_eq!(stats.total_participants, 0);
        assert_eq!(stats.remaining_participants, 0);
        assert_eq!(stats.empty_seats, 0);
        assert_eq!(stats.total_rooms, 2);
        assert_eq!(stats.total_seats, 80);
        assert_eq!(stats.selected_seats, 50);
    }

    #[test]
    fn remaining_and_empty_seats_are_clamped() {
        let r = roster(75);
        let mut repo = repository();
        let seated = AllocationEntry {
            room_no: "R1".into(),
            allocated_seats: 60,
            participants: r.students[..60].to_vec(),
        };
        repo.commit(&exam(), vec![seated]).unwrap();

        let stats = compute(Some(&exam()), &r.rooms, &r, &repo);
        assert_eq!(stats.total_participants, 75);
        assert_eq!(stats.allocated_so_far, 60);
        assert_eq!(stats.remaining_participants, 15);
        assert_eq!(stats.empty_seats, 65);

        let none_selected = compute(Some(&exam()), &[], &r, &repo);
        assert_eq!(none_selected.empty_seats, 0);
    }

    #[test]
    fn over_allocation_never_goes_negative() {
        let r = roster(5);
        let mut repo = repository();
        let seated = AllocationEntry {
            room_no: "R1".into(),
            allocated_seats: 5,
            participants: r.students.clone(),
        };
        repo.commit(&exam(), vec![seated.clone()]).unwrap();
        repo.commit(&exam(), vec![seated]).unwrap();

        let stats = compute(Some(&exam()), &r.rooms, &r, &repo);
        assert_eq!(stats.remaining_participants, 0);
        assert_eq!(stats.empty_seats, 80);
    }
}
