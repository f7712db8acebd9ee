use std::sync::Arc;

use axum::{http::HeaderValue, routing::get, Router};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::{DatabaseManager, PgCatalog};
use crate::handlers;
use crate::health::{HealthIndicator, SchemaHealthValidator};

/// Shared per-router state; cheap to clone into every request
#[derive(Clone)]
pub struct AppState {
    pub indicator: Arc<dyn HealthIndicator>,
    pub database: DatabaseManager,
}

impl AppState {
    pub fn new(indicator: Arc<dyn HealthIndicator>, database: DatabaseManager) -> Self {
        Self {
            indicator,
            database,
        }
    }

    /// Schema validator over the configured pool and requirements
    pub fn from_config(config: &AppConfig, database: DatabaseManager) -> Self {
        let catalog = PgCatalog::new(database.pool().clone());
        let validator = SchemaHealthValidator::new(catalog, config.health.clone());
        Self::new(Arc::new(validator), database)
    }
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut router = routes(state);

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

/// Routes without global middleware
pub fn routes(state: AppState) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(handlers::public::root))
        .route("/health", get(handlers::public::liveness));

    // Schema health, plus the contract context's public path
    HEALTH_PREFIXES
        .iter()
        .fold(router, |router, prefix| health_routes(router, prefix))
        .fallback(handlers::public::not_found)
        .with_state(state)
}

const HEALTH_PREFIXES: &[&str] = &["/health", "/api/v1/contracts/health"];

fn health_routes(router: Router<AppState>, prefix: &str) -> Router<AppState> {
    use handlers::health;

    router
        .route(&format!("{}/detailed", prefix), get(health::health_detailed))
        .route(&format!("{}/status", prefix), get(health::health_status))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Skipping invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    CorsLayer::new().allow_origin(AllowOrigin::list(origins))
}
