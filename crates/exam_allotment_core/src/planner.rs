//! crates/exam_allotment_core/src/planner.rs
//!
//! Greedy seat planner: rooms are filled largest first, each from the front of
//! the remaining queue, so roll-number order is kept within and across rooms.

use serde::Serialize;

use crate::domain::{AllocationEntry, Room, Student};

/// The result of one planning run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatPlan {
    pub allocation: Vec<AllocationEntry>,
    /// Students left over once every room was full.
    pub unplaced: Vec<Student>,
}

impl SeatPlan {
    pub fn seated(&self) -> usize {
        self.allocation.iter().map(|e| e.participants.len()).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }
}

/// Maps `participants` onto `rooms`.
///
/// Rooms are visited by descending capacity (ties keep input order) and rooms
/// without seats are skipped. Planning stops as soon as everyone is seated;
/// a shortfall is reported through [`SeatPlan::unplaced`], never as an error.
pub fn allocate(participants: Vec<Student>, rooms: &[Room]) -> SeatPlan {
    let mut ordered: Vec<&Room> = rooms.iter().collect();
    ordered.sort_by(|a, b| b.available_seats.cmp(&a.available_seats));

    let mut remaining = participants;
    let mut allocation = Vec::new();

    for room in ordered {
        if remaining.is_empty() {
            break;
        }
        if room.available_seats == 0 {
            continue;
        }

        let take = remaining.len().min(room.available_seats as usize);
        let seated: Vec<Student> = remaining.drain(..take).collect();
        allocation.push(AllocationEntry {
            room_no: room.room_no.clone(),
            allocated_seats: take as u32,
            participants: seated,
        });
    }

    SeatPlan {
        allocation,
        unplaced: remaining,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn students(n: usize) -> Vec<Student> {
        (0..n)
            .map(|i| Student::new(format!("{i:04}"), format!("S{i}"), "CSE", "5"))
            .collect()
    }

    #[test]
    fn fills_largest_room_first() {
        let rooms = vec![Room::new("R2", 30), Room::new("R1", 50)];
        let plan = allocate(students(60), &rooms);

        assert_eq!(plan.allocation.len(), 2);
        assert_eq!(plan.allocation[0].room_no, "R1");
        assert_eq!(plan.allocation[0].allocated_seats, 50);
        assert_eq!(plan.allocation[1].room_no, "R2");
        assert_eq!(plan.allocation[1].allocated_seats, 10);
        assert!(plan.is_complete());
    }

    #[test]
    fn equal_rooms_keep_input_order() {
        let rooms = vec![Room::new("B", 10), Room::new("A", 10), Room::new("C", 10)];
        let plan = allocate(students(25), &rooms);
        let order: Vec<_> = plan.allocation.iter().map(|e| e.room_no.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "C"]);
    }

    #[test]
    fn stops_once_everyone_is_seated() {
        let rooms = vec![Room::new("R1", 50), Room::new("R2", 30), Room::new("R3", 10)];
        let plan = allocate(students(40), &rooms);
        assert_eq!(plan.allocation.len(), 1);
    }

    #[test]
    fn empty_rooms_are_skipped_and_shortfall_reported() {
        let rooms = vec![Room::new("Z", 0), Room::new("R1", 3)];
        let plan = allocate(students(5), &rooms);

        assert_eq!(plan.allocation.len(), 1);
        assert_eq!(plan.allocation[0].room_no, "R1");
        let left: Vec<_> = plan.unplaced.iter().map(|s| s.roll_no.as_str()).collect();
        assert_eq!(left, vec!["0003", "0004"]);
    }

    #[test]
    fn nothing_to_seat_emits_nothing() {
        let plan = allocate(Vec::new(), &[Room::new("R1", 10)]);
        assert_eq!(plan, SeatPlan::default());
    }

    proptest! {
        #[test]
        fn plans_are_safe_conservative_and_ordered(
            seats in proptest::collection::vec(0u32..40, 0..8),
            n in 0usize..200,
        ) {
            let rooms: Vec<Room> = seats
                .iter()
                .enumerate()
                .map(|(i, s)| Room::new(format!("R{i}"), *s))
                .collect();
            let input = students(n);
            let plan = allocate(input.clone(), &rooms);

            for entry in &plan.allocation {
                let room = rooms.iter().find(|r| r.room_no == entry.room_no).unwrap();
                prop_assert!(entry.allocated_seats > 0);
                prop_assert!(entry.allocated_seats <= room.available_seats);
                prop_assert_eq!(entry.allocated_seats as usize, entry.participants.len());
            }

            let seated: usize = plan.allocation.iter().map(|e| e.allocated_seats as usize).sum();
            prop_assert_eq!(seated + plan.unplaced.len(), n);

            let replay: Vec<Student> = plan
                .allocation
                .iter()
                .flat_map(|e| e.participants.iter().cloned())
                .chain(plan.unplaced.iter().cloned())
                .collect();
            prop_assert_eq!(replay, input);
        }
    }
}
