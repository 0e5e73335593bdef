//! services/api/src/web/protocol.rs
//!
//! Defines the HTTP payloads exchanged between the allotment UI and the API server.
//! Engine records (allotments, statistics) are returned in their stored shape;
//! the types here cover query strings, request bodies and view wrappers.

use exam_allotment_core::arrange::{ArrangeRequest, Warning};
use exam_allotment_core::domain::{Allotment, ExamSelector, ExamTime, Room, SeatRow};
use exam_allotment_core::roster::RoomOrder;
use exam_allotment_core::stats::Statistics;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

//=========================================================================================
// Query Strings
//=========================================================================================

/// Room list filters. `date` and `time` mark rooms already allotted in that slot.
#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RoomsQuery {
    pub search: Option<String>,
    /// `increasing` or `decreasing` (default).
    #[param(value_type = Option<String>)]
    pub sort: Option<RoomOrder>,
    pub date: Option<String>,
    #[param(value_type = Option<String>)]
    pub time: Option<ExamTime>,
}

#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExamsQuery {
    pub date: Option<String>,
    #[param(value_type = Option<String>)]
    pub time: Option<ExamTime>,
}

/// The current selection. Without all four exam fields no exam is selected.
#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatisticsQuery {
    pub semester: Option<String>,
    pub branch: Option<String>,
    pub slot: Option<String>,
    pub date: Option<String>,
    /// Comma-separated room numbers.
    pub rooms: Option<String>,
}

impl StatisticsQuery {
    pub fn selector(&self) -> Option<ExamSelector> {
        Some(ExamSelector {
            semester: self.semester.clone()?,
            branch: self.branch.clone()?,
            slot: self.slot.clone()?,
            date: self.date.clone()?,
        })
    }

    pub fn room_numbers(&self) -> Vec<String> {
        self.rooms
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|room| !room.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Deserialize, Debug, Default, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecentQuery {
    pub limit: Option<usize>,
}

//=========================================================================================
// Request Bodies
//=========================================================================================

/// The "arrange" action: an exam selection, the chosen rooms, and the user's
/// answers to warnings raised by an earlier attempt.
#[derive(Deserialize, Serialize, Debug, Clone, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArrangeBody {
    pub semester: String,
    pub branch: String,
    pub slot: String,
    pub date: String,
    pub rooms: Vec<String>,
    #[serde(default)]
    pub confirm_schedule_conflict: bool,
    #[serde(default)]
    pub confirm_capacity_shortfall: bool,
}

impl From<ArrangeBody> for ArrangeRequest {
    fn from(body: ArrangeBody) -> Self {
        ArrangeRequest {
            exam: ExamSelector {
                semester: body.semester,
                branch: body.branch,
                slot: body.slot,
                date: body.date,
            },
            rooms: body.rooms,
            confirm_schedule_conflict: body.confirm_schedule_conflict,
            confirm_capacity_shortfall: body.confirm_capacity_shortfall,
        }
    }
}

//=========================================================================================
// Responses
//=========================================================================================

#[derive(Serialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    pub room_no: String,
    pub block: String,
    pub floor_no: String,
    pub available_seats: u32,
    /// Already used by an allotment in the requested slot.
    pub allotted: bool,
}

impl RoomView {
    pub fn new(room: &Room, allotted: bool) -> Self {
        Self {
            room_no: room.room_no.clone(),
            block: room.block.clone(),
            floor_no: room.floor_no.clone(),
            available_seats: room.available_seats,
            allotted,
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ExamsResponse {
    pub dates: Vec<String>,
    pub times: Vec<String>,
    #[schema(value_type = Vec<Object>)]
    pub exams: Vec<exam_allotment_core::domain::Exam>,
}

/// One room of an allotment's seating chart.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RoomChart {
    pub room_no: String,
    pub allocated_seats: u32,
    pub seats: Vec<SeatRow>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AllotmentDetail {
    pub allotment: Allotment,
    pub rooms: Vec<RoomChart>,
}

impl From<Allotment> for AllotmentDetail {
    fn from(allotment: Allotment) -> Self {
        let rooms = allotment
            .allocation
            .iter()
            .map(|entry| RoomChart {
                room_no: entry.room_no.clone(),
                allocated_seats: entry.allocated_seats,
                seats: entry.seat_chart(),
            })
            .collect();
        Self { allotment, rooms }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct DeleteResponse {
    pub deleted: bool,
    /// Statistics for the deleted allotment's exam, when it is still on the roster.
    #[schema(value_type = Option<Object>)]
    pub statistics: Option<Statistics>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct RosterSummary {
    pub rooms: usize,
    pub exams: usize,
    pub students: usize,
}

/// Error payload. `warning` is set when the request can be retried with confirmation.
#[derive(Serialize, Debug, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[schema(value_type = Option<Object>)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<Warning>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rooms: Vec<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            warning: None,
            rooms: Vec::new(),
        }
    }
}
