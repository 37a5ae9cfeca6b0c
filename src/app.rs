use axum::{
    extract::State,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, Method, StatusCode,
    },
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::admin;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(admin_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
        .with_state(state)
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/bootstrap", post(admin::bootstrap_post))
        .route("/admin/grants", get(admin::list_get))
        .route("/admin/grants/add", post(admin::add_post))
        .route("/admin/grants/remove", post(admin::remove_post))
}

/// Preflight and simple-request CORS: any origin, plus the headers the
/// hosted platform's browser clients send alongside the bearer token.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("apikey"),
            HeaderName::from_static("x-client-info"),
        ])
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Motorlot Admin API",
        "version": version,
        "description": "Admin authorization and bootstrap service for the Motorlot marketplace",
        "endpoints": {
            "bootstrap": "POST /admin/bootstrap (public, idempotent)",
            "list": "GET /admin/grants (public read)",
            "add": "POST /admin/grants/add (admin only)",
            "remove": "POST /admin/grants/remove (admin only)",
            "health": "GET /health",
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.grants.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "backend": "ok",
            })),
        ),
        Err(e) => {
            tracing::warn!("health probe failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "backend": "unreachable",
                })),
            )
        }
    }
}
