//! crates/exam_allotment_core/src/arrange.rs
//!
//! One "arrange" action: validate the selection, pick the unseated students,
//! plan seats and commit the result.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::conflict::{allotted_rooms, has_schedule_conflict};
use crate::domain::{Allotment, ExamSelector, Room, Student};
use crate::eligibility::select_unallocated;
use crate::planner::allocate;
use crate::ports::PortError;
use crate::repository::AllotmentRepository;
use crate::roster::Roster;
use crate::stats::{compute, Statistics};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrangeRequest {
    pub exam: ExamSelector,
    pub rooms: Vec<String>,
    /// Proceed even though the class already sits another subject that day.
    #[serde(default)]
    pub confirm_schedule_conflict: bool,
    /// Proceed even though the selected rooms cannot seat everyone.
    #[serde(default)]
    pub confirm_capacity_shortfall: bool,
}

/// A condition the user has to confirm before the allotment is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    ScheduleConflict { semester: String, branch: String },
    CapacityShortfall { students: usize, seats: u64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ScheduleConflict { semester, branch } => write!(
                f,
                "class {semester}-{branch} already has another exam scheduled on the same day"
            ),
            Warning::CapacityShortfall { students, seats } => write!(
                f,
                "{students} students to allocate but only {seats} seats selected"
            ),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ArrangeError {
    #[error("No exam selected")]
    NoExamSelected,
    #[error("No room selected")]
    NoRoomSelected,
    #[error("Unknown rooms: {}", .0.join(", "))]
    UnknownRooms(Vec<String>),
    #[error("Rooms already allotted for this date and time: {}", .0.join(", "))]
    RoomsAlreadyAllotted(Vec<String>),
    #[error("All students for {0} have already been allocated")]
    AllStudentsAllocated(String),
    #[error("Confirmation required: {0}")]
    ConfirmationRequired(Warning),
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrangeOutcome {
    /// `None` when no selected room had a free seat.
    pub allotment: Option<Allotment>,
    pub unplaced: Vec<Student>,
    pub statistics: Statistics,
}

pub fn arrange(
    request: &ArrangeRequest,
    roster: &Roster,
    repository: &mut AllotmentRepository,
) -> Result<ArrangeOutcome, ArrangeError> {
    let exam = roster
        .find_exam(&request.exam)
        .ok_or(ArrangeError::NoExamSelected)?;

    if request.rooms.is_empty() {
        return Err(ArrangeError::NoRoomSelected);
    }
    let rooms = roster
        .rooms_by_number(&request.rooms)
        .map_err(ArrangeError::UnknownRooms)?;

    if has_schedule_conflict(repository.all(), exam) && !request.confirm_schedule_conflict {
        return Err(ArrangeError::ConfirmationRequired(Warning::ScheduleConflict {
            semester: exam.semester.clone(),
            branch: exam.branch.clone(),
        }));
    }

    let room_nos: Vec<&str> = rooms.iter().map(|room| room.room_no.as_str()).collect();
    let taken = allotted_rooms(repository.all(), &room_nos, &exam.date, &exam.time);
    if !taken.is_empty() {
        return Err(ArrangeError::RoomsAlreadyAllotted(
            taken.into_iter().map(str::to_string).collect(),
        ));
    }

    let already = repository.count_allocated(exam);
    let participants = select_unallocated(&roster.students, exam, already);
    if participants.is_empty() {
        return Err(ArrangeError::AllStudentsAllocated(exam.subject.clone()));
    }

    let seats: u64 = rooms.iter().map(|room| u64::from(room.available_seats)).sum();
    if seats < participants.len() as u64 {
        if !request.confirm_capacity_shortfall {
            return Err(ArrangeError::ConfirmationRequired(Warning::CapacityShortfall {
                students: participants.len(),
                seats,
            }));
        }
        warn!(
            subject = %exam.subject,
            students = participants.len(),
            seats,
            "Proceeding with a capacity shortfall"
        );
    }

    let plan = allocate(participants, &rooms);
    debug!(subject = %exam.subject, seated = plan.seated(), "Seat plan computed");
    if !plan.unplaced.is_empty() {
        warn!(
            subject = %exam.subject,
            unplaced = plan.unplaced.len(),
            "Students could not be allocated; more rooms are needed"
        );
    }

    let allotment = if plan.allocation.is_empty() {
        info!(subject = %exam.subject, "No seats available in the selected rooms");
        None
    } else {
        Some(repository.commit(exam, plan.allocation)?)
    };

    let still_selected: &[Room] = if allotment.is_some() { &[] } else { rooms.as_slice() };
    let statistics = compute(Some(exam), still_selected, roster, repository);

    Ok(ArrangeOutcome {
        allotment,
        unplaced: plan.unplaced,
        statistics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Exam, ExamTime};
    use crate::ports::InMemoryStore;
    use std::sync::Arc;

    fn exam(subject: &str, slot: &str, time: ExamTime) -> Exam {
        Exam {
            subject: subject.into(),
            date: "04-03-2025".into(),
            time,
            semester: "5".into(),
            branch: "CSE".into(),
            slot: slot.into(),
        }
    }

    fn roster() -> Roster {
        Roster {
            rooms: vec![Room::new("R1", 4), Room::new("R2", 2), Room::new("R0", 0)],
            exams: vec![
                exam("DBMS", "A", ExamTime::Morning),
                exam("Networks", "B", ExamTime::Evening),
            ],
            students: (0..5)
                .rev()
                .map(|i| {
                    Student::new(format!("CS{i:02}"), "S", "CSE", "5")
                        .with_subject("DBMS")
                        .with_subject("Networks")
                })
                .collect(),
        }
    }

    fn request(slot: &str, rooms: &[&str]) -> ArrangeRequest {
        ArrangeRequest {
            exam: ExamSelector {
                semester: "5".into(),
                branch: "CSE".into(),
                slot: slot.into(),
                date: "04-03-2025".into(),
            },
            rooms: rooms.iter().map(|r| (*r).to_string()).collect(),
            confirm_schedule_conflict: false,
            confirm_capacity_shortfall: false,
        }
    }

    fn repository() -> AllotmentRepository {
        AllotmentRepository::load(Arc::new(InMemoryStore::new())).unwrap()
    }

    #[test]
    fn seats_everyone_in_roll_order() {
        let r = roster();
        let mut repo = repository();
        let outcome = arrange(&request("A", &["R2", "R1"]), &r, &mut repo).unwrap();

        let allotment = outcome.allotment.unwrap();
        assert_eq!(allotment.total_students, Some(5));
        assert_eq!(allotment.allocation[0].room_no, "R1");
        assert_eq!(allotment.allocation[0].participants[0].roll_no, "CS00");
        assert_eq!(allotment.allocation[1].participants[0].roll_no, "CS04");
        assert!(outcome.unplaced.is_empty());
        assert_eq!(outcome.statistics.remaining_participants, 0);
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn validation_failures_leave_repository_untouched() {
        let r = roster();
        let mut repo = repository();

        let mut missing = request("A", &["R1"]);
        missing.exam.slot = "Z".into();
        assert!(matches!(arrange(&missing, &r, &mut repo), Err(ArrangeError::NoExamSelected)));
        assert!(matches!(arrange(&request("A", &[]), &r, &mut repo), Err(ArrangeError::NoRoomSelected)));
        assert!(matches!(
            arrange(&request("A", &["R9"]), &r, &mut repo),
            Err(ArrangeError::UnknownRooms(rooms)) if rooms == vec!["R9"]
        ));
        assert!(repo.is_empty());
    }

    #[test]
    fn shortfall_needs_confirmation_then_reports_unplaced() {
        let r = roster();
        let mut repo = repository();

        let err = arrange(&request("A", &["R1"]), &r, &mut repo).unwrap_err();
        assert!(matches!(
            err,
            ArrangeError::ConfirmationRequired(Warning::CapacityShortfall { students: 5, seats: 4 })
        ));
        assert!(repo.is_empty());

        let mut confirmed = request("A", &["R1"]);
        confirmed.confirm_capacity_shortfall = true;
        let outcome = arrange(&confirmed, &r, &mut repo).unwrap();
        assert_eq!(outcome.unplaced.len(), 1);
        assert_eq!(outcome.statistics.remaining_participants, 1);

        let top_up = arrange(&request("A", &["R2"]), &r, &mut repo).unwrap();
        assert_eq!(top_up.allotment.map(|a| a.seated()), Some(1));
        assert!(matches!(
            arrange(&request("A", &["R0"]), &r, &mut repo),
            Err(ArrangeError::AllStudentsAllocated(subject)) if subject == "DBMS"
        ));
    }

    #[test]
    fn booked_room_is_a_hard_block() {
        let r = roster();
        let mut repo = repository();
        arrange(&request("A", &["R1", "R2"]), &r, &mut repo).unwrap();

        let mut again = request("B", &["R2"]);
        again.confirm_schedule_conflict = true;
        again.confirm_capacity_shortfall = true;
        // Evening slot: same room is free again.
        assert!(arrange(&again, &r, &mut repo).is_ok());

        let mut morning = r.clone();
        morning.exams.push(exam("Compilers", "C", ExamTime::Morning));
        for s in &mut morning.students {
            s.subjects.push("Compilers".into());
        }
        let mut clash = request("C", &["R1"]);
        clash.confirm_schedule_conflict = true;
        clash.confirm_capacity_shortfall = true;
        assert!(matches!(
            arrange(&clash, &morning, &mut repo),
            Err(ArrangeError::RoomsAlreadyAllotted(rooms)) if rooms == vec!["R1"]
        ));
        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn same_day_other_subject_needs_confirmation() {
        let r = roster();
        let mut repo = repository();
        arrange(&request("A", &["R1", "R2"]), &r, &mut repo).unwrap();

        let err = arrange(&request("B", &["R1", "R2"]), &r, &mut repo).unwrap_err();
        assert!(matches!(
            err,
            ArrangeError::ConfirmationRequired(Warning::ScheduleConflict { .. })
        ));
    }

    #[test]
    fn rooms_without_seats_commit_nothing() {
        let r = roster();
        let mut repo = repository();
        let mut req = request("A", &["R0"]);
        req.confirm_capacity_shortfall = true;

        let outcome = arrange(&req, &r, &mut repo).unwrap();
        assert!(outcome.allotment.is_none());
        assert_eq!(outcome.unplaced.len(), 5);
        assert_eq!(outcome.statistics.rooms_selected, 1);
        assert!(repo.is_empty());
    }

    #[test]
    fn repeated_room_is_filled_only_once() {
        let r = roster();
        let mut repo = repository();

        // R1 seats 4: listing it twice must not double its capacity.
        let err = arrange(&request("A", &["R1", "R1"]), &r, &mut repo).unwrap_err();
        assert!(matches!(
            err,
            ArrangeError::ConfirmationRequired(Warning::CapacityShortfall { students: 5, seats: 4 })
        ));

        let mut confirmed = request("A", &["R1", "R1"]);
        confirmed.confirm_capacity_shortfall = true;
        let outcome = arrange(&confirmed, &r, &mut repo).unwrap();
        let allotment = outcome.allotment.unwrap();
        assert_eq!(allotment.room_numbers(), vec!["R1"]);
        assert_eq!(allotment.seated(), 4);
        assert_eq!(outcome.unplaced.len(), 1);
    }
}
