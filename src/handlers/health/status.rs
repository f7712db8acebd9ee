// GET /health/status - plain "UP" / "DOWN" for load balancers

use axum::{extract::State, http::StatusCode};

use crate::app::AppState;

pub async fn health_status(State(state): State<AppState>) -> (StatusCode, &'static str) {
    let report = super::current_report(&state).await;

    if report.status().is_up() {
        (StatusCode::OK, "UP")
    } else {
        (super::status_code_for(&report), "DOWN")
    }
}
