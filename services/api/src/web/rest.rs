//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::protocol::{
    AllotmentDetail, ArrangeBody, DeleteResponse, ErrorBody, ExamsQuery, ExamsResponse,
    RecentQuery, RoomView, RoomsQuery, RosterSummary, StatisticsQuery,
};
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use exam_allotment_core::arrange::{arrange, ArrangeError, ArrangeRequest};
use exam_allotment_core::conflict::is_room_already_allotted;
use exam_allotment_core::domain::AllotmentId;
use exam_allotment_core::ports::PortError;
use exam_allotment_core::repository::{DateGroup, RecentAllotments};
use exam_allotment_core::stats::{compute, Statistics};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_rooms_handler,
        list_exams_handler,
        statistics_handler,
        create_allotment_handler,
        list_allotments_handler,
        grouped_allotments_handler,
        get_allotment_handler,
        delete_allotment_handler,
        reload_roster_handler,
    ),
    components(
        schemas(ArrangeBody, RoomView, ExamsResponse, DeleteResponse, RosterSummary, ErrorBody)
    ),
    tags(
        (name = "Exam Hall Allotment API", description = "Seat students for an exam across selected halls and manage the resulting allotments.")
    )
)]
pub struct ApiDoc;

/// The error half of every fallible handler.
pub type HandlerError = (StatusCode, Json<ErrorBody>);

fn port_failure(context: &str, e: PortError) -> HandlerError {
    match e {
        PortError::NotFound(message) => (StatusCode::NOT_FOUND, Json(ErrorBody::new(message))),
        PortError::Unexpected(detail) => {
            error!("{}: {}", context, detail);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::new(context)))
        }
    }
}

fn arrange_failure(e: ArrangeError) -> HandlerError {
    let message = e.to_string();
    match e {
        ArrangeError::ConfirmationRequired(warning) => {
            warn!(%warning, "Allotment needs confirmation");
            let body = ErrorBody {
                error: message,
                warning: Some(warning),
                rooms: Vec::new(),
            };
            (StatusCode::CONFLICT, Json(body))
        }
        ArrangeError::RoomsAlreadyAllotted(rooms) => {
            warn!(rooms = ?rooms, "Allotment blocked by booked rooms");
            let body = ErrorBody {
                error: message,
                warning: None,
                rooms,
            };
            (StatusCode::CONFLICT, Json(body))
        }
        ArrangeError::UnknownRooms(rooms) => {
            let body = ErrorBody {
                error: message,
                warning: None,
                rooms,
            };
            (StatusCode::UNPROCESSABLE_ENTITY, Json(body))
        }
        ArrangeError::NoExamSelected
        | ArrangeError::NoRoomSelected
        | ArrangeError::AllStudentsAllocated(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(ErrorBody::new(message)))
        }
        ArrangeError::Port(e) => port_failure("Failed to save the allotment", e),
    }
}

//=========================================================================================
// Roster Handlers
//=========================================================================================

/// List rooms, optionally filtered and sorted by seat count.
#[utoipa::path(
    get,
    path = "/rooms",
    params(RoomsQuery),
    responses(
        (status = 200, description = "Matching rooms", body = [RoomView])
    )
)]
pub async fn list_rooms_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<RoomsQuery>,
) -> Json<Vec<RoomView>> {
    let workspace = app_state.workspace.lock().await;
    let term = query.search.as_deref().unwrap_or("");
    let order = query.sort.unwrap_or_default();

    let rooms = workspace
        .roster
        .search_rooms(term, order)
        .into_iter()
        .map(|room| {
            let allotted = match (query.date.as_deref(), query.time.as_ref()) {
                (Some(date), Some(time)) => {
                    is_room_already_allotted(workspace.repository.all(), &room.room_no, date, time)
                }
                _ => false,
            };
            RoomView::new(room, allotted)
        })
        .collect();
    Json(rooms)
}

/// List exam dates, times, and the exams matching the optional filters.
#[utoipa::path(
    get,
    path = "/exams",
    params(ExamsQuery),
    responses(
        (status = 200, description = "Exam selection data", body = ExamsResponse)
    )
)]
pub async fn list_exams_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ExamsQuery>,
) -> Json<ExamsResponse> {
    let workspace = app_state.workspace.lock().await;
    let roster = &workspace.roster;
    Json(ExamsResponse {
        dates: roster.exam_dates(),
        times: roster.exam_times().iter().map(|t| t.to_string()).collect(),
        exams: roster
            .exams_for(query.date.as_deref(), query.time.as_ref())
            .into_iter()
            .cloned()
            .collect(),
    })
}

/// Summary counters for the current exam and room selection.
#[utoipa::path(
    get,
    path = "/statistics",
    params(StatisticsQuery),
    responses(
        (status = 200, description = "Statistics for the selection"),
        (status = 422, description = "Unknown room in the selection", body = ErrorBody)
    )
)]
pub async fn statistics_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<StatisticsQuery>,
) -> Result<Json<Statistics>, HandlerError> {
    let workspace = app_state.workspace.lock().await;
    let selected = workspace
        .roster
        .rooms_by_number(&query.room_numbers())
        .map_err(|unknown| arrange_failure(ArrangeError::UnknownRooms(unknown)))?;
    let exam = query
        .selector()
        .and_then(|selector| workspace.roster.find_exam(&selector));

    Ok(Json(compute(exam, &selected, &workspace.roster, &workspace.repository)))
}

/// Re-read the room, exam and student collections.
#[utoipa::path(
    post,
    path = "/roster/reload",
    responses(
        (status = 200, description = "Roster reloaded", body = RosterSummary),
        (status = 500, description = "Roster files could not be read", body = ErrorBody)
    )
)]
pub async fn reload_roster_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<RosterSummary>, HandlerError> {
    let roster = app_state
        .roster_source
        .load_roster()
        .map_err(|e| port_failure("Failed to reload the roster", e))?;

    let summary = RosterSummary {
        rooms: roster.rooms.len(),
        exams: roster.exams.len(),
        students: roster.students.len(),
    };
    app_state.workspace.lock().await.roster = roster;
    Ok(Json(summary))
}

//=========================================================================================
// Allotment Handlers
//=========================================================================================

/// Seat the unallocated students of an exam in the selected rooms.
///
/// Conflicts and capacity shortfalls answer 409; a warning can be accepted by
/// repeating the request with the matching `confirm*` flag set.
#[utoipa::path(
    post,
    path = "/allotments",
    request_body = ArrangeBody,
    responses(
        (status = 201, description = "Allotment committed"),
        (status = 200, description = "No seat was available; nothing committed"),
        (status = 409, description = "Booked room or confirmation required", body = ErrorBody),
        (status = 422, description = "Invalid selection", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn create_allotment_handler(
    State(app_state): State<Arc<AppState>>,
    Json(body): Json<ArrangeBody>,
) -> Result<impl IntoResponse, HandlerError> {
    let request = ArrangeRequest::from(body);
    let mut guard = app_state.workspace.lock().await;
    let workspace = &mut *guard;

    let outcome = arrange(&request, &workspace.roster, &mut workspace.repository)
        .map_err(arrange_failure)?;

    let status = if outcome.allotment.is_some() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome)))
}

/// The most recent allotments, newest first.
#[utoipa::path(
    get,
    path = "/allotments",
    params(RecentQuery),
    responses(
        (status = 200, description = "Recent allotments")
    )
)]
pub async fn list_allotments_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<RecentQuery>,
) -> Json<RecentAllotments> {
    let limit = query.limit.unwrap_or(app_state.config.recent_limit);
    let workspace = app_state.workspace.lock().await;
    Json(workspace.repository.list_recent(limit))
}

/// Every allotment, grouped by exam date.
#[utoipa::path(
    get,
    path = "/allotments/grouped",
    responses(
        (status = 200, description = "Allotments by date, newest date first")
    )
)]
pub async fn grouped_allotments_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<Vec<DateGroup>> {
    let workspace = app_state.workspace.lock().await;
    Json(workspace.repository.list_grouped())
}

/// One allotment with its per-room seating chart.
#[utoipa::path(
    get,
    path = "/allotments/{id}",
    params(
        ("id" = String, Path, description = "The allotment id.")
    ),
    responses(
        (status = 200, description = "The allotment"),
        (status = 404, description = "No allotment with that id", body = ErrorBody)
    )
)]
pub async fn get_allotment_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AllotmentDetail>, HandlerError> {
    let workspace = app_state.workspace.lock().await;
    let allotment = workspace
        .repository
        .require(&AllotmentId::from(id))
        .map_err(|e| port_failure("Failed to read the allotment", e))?;
    Ok(Json(AllotmentDetail::from(allotment.clone())))
}

/// Delete an allotment. Unknown ids are not an error.
#[utoipa::path(
    delete,
    path = "/allotments/{id}",
    params(
        ("id" = String, Path, description = "The allotment id.")
    ),
    responses(
        (status = 200, description = "Deletion result", body = DeleteResponse),
        (status = 500, description = "The collection could not be saved", body = ErrorBody)
    )
)]
pub async fn delete_allotment_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, HandlerError> {
    let id = AllotmentId::from(id);
    let mut guard = app_state.workspace.lock().await;
    let workspace = &mut *guard;

    let group = workspace.repository.get(&id).map(|a| a.group_key());
    let deleted = workspace
        .repository
        .delete(&id)
        .map_err(|e| port_failure("Failed to delete the allotment", e))?;

    let statistics = group.filter(|_| deleted).and_then(|key| {
        let exam = workspace.roster.exams.iter().find(|e| e.group_key() == key)?;
        Some(compute(Some(exam), &[], &workspace.roster, &workspace.repository))
    });
    if deleted {
        info!(id = %id, "Allotment removed via API");
    }

    Ok(Json(DeleteResponse { deleted, statistics }))
}
