// handlers/health - schema health endpoints, mounted at /health and /api/v1/contracts/health

mod detailed;
mod status;

pub use detailed::health_detailed;
pub use status::health_status;

use axum::http::StatusCode;
use tracing::error;

use crate::app::AppState;
use crate::health::HealthReport;

/// Run the indicator on its own task so a panicking check still yields a report
pub(crate) async fn current_report(state: &AppState) -> HealthReport {
    let indicator = state.indicator.clone();

    match tokio::spawn(async move { indicator.health().await }).await {
        Ok(report) => report,
        Err(e) => {
            error!("Health check task failed: {}", e);
            HealthReport::down()
                .with_detail("error", "Health check service error")
                .with_detail("exception", e.to_string())
        }
    }
}

/// UP maps to 200, anything else to 503
pub(crate) fn status_code_for(report: &HealthReport) -> StatusCode {
    if report.status().is_up() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
