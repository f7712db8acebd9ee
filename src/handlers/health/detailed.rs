// GET /health/detailed - full report as JSON

use axum::{extract::State, http::StatusCode, Json};

use crate::app::AppState;
use crate::health::HealthReport;

pub async fn health_detailed(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let report = super::current_report(&state).await;
    (super::status_code_for(&report), Json(report))
}
