pub mod protocol;
pub mod rest;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use rest::{
    create_allotment_handler, delete_allotment_handler, get_allotment_handler,
    grouped_allotments_handler, list_allotments_handler, list_exams_handler, list_rooms_handler,
    reload_roster_handler, statistics_handler,
};
pub use state::{AppState, Workspace};

/// The API routes, without documentation or transport layers.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/rooms", get(list_rooms_handler))
        .route("/exams", get(list_exams_handler))
        .route("/statistics", get(statistics_handler))
        .route("/roster/reload", post(reload_roster_handler))
        .route(
            "/allotments",
            get(list_allotments_handler).post(create_allotment_handler),
        )
        .route("/allotments/grouped", get(grouped_allotments_handler))
        .route(
            "/allotments/{id}",
            get(get_allotment_handler).delete(delete_allotment_handler),
        )
        .with_state(app_state)
}
