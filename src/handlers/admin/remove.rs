use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};

use crate::auth::bearer_token;
use crate::error::ApiError;
use crate::provider::RemoveOutcome;
use crate::state::AppState;

use super::{parse_target, GrantTargetRequest};

/// POST /admin/grants/remove - revoke a user's administrator privilege
///
/// The store decides the outcome in one atomic operation, so the last-admin
/// guard holds even when removals race.
pub async fn remove_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Option<Json<GrantTargetRequest>>,
) -> Result<Json<Value>, ApiError> {
    let requester = state.gate.authorize(bearer_token(&headers)).await?;

    let payload = payload.map(|Json(p)| p);
    let target = parse_target(payload.as_ref())?;

    match state.grants.remove_guarded(target, requester.id).await? {
        RemoveOutcome::Removed => {
            tracing::info!(requester = %requester.id, target = %target, "admin grant removed");
            Ok(Json(json!({ "message": "admin removed" })))
        }
        RemoveOutcome::NotAdmin => Ok(Json(json!({ "message": "user was not an admin" }))),
        RemoveOutcome::LastAdmin => Err(ApiError::last_admin("cannot remove the last admin")),
    }
}
