use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::state::AppState;

/// POST /admin/bootstrap - idempotently provision the designated root admin
///
/// Unauthenticated by design: first-run deployments have no administrator
/// who could present a token yet, and the operation is a no-op once the root
/// identity and grant exist.
pub async fn bootstrap_post(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let user_id = state.bootstrap.ensure_default_admin().await?;

    Ok(Json(json!({
        "message": "default admin is provisioned",
        "userId": user_id,
    })))
}
