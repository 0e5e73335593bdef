pub mod arrange;
pub mod conflict;
pub mod domain;
pub mod eligibility;
pub mod planner;
pub mod ports;
pub mod repository;
pub mod roster;
pub mod stats;

pub use arrange::{arrange, ArrangeError, ArrangeOutcome, ArrangeRequest, Warning};
pub use domain::{
    AllocationEntry, Allotment, AllotmentId, Exam, ExamGroupKey, ExamSelector, ExamTime, Room,
    SeatRow, Student,
};
pub use planner::{allocate, SeatPlan};
pub use ports::{AllotmentStore, InMemoryStore, PortError, PortResult, RosterSource};
pub use repository::{AllotmentRepository, DateGroup, RecentAllotments};
pub use roster::{Roster, RoomOrder};
pub use stats::Statistics;
