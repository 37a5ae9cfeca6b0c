use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};

use crate::auth::bearer_token;
use crate::error::ApiError;
use crate::state::AppState;

use super::{parse_target, GrantTargetRequest};

/// POST /admin/grants/add - grant administrator privilege to a user
pub async fn add_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Option<Json<GrantTargetRequest>>,
) -> Result<Json<Value>, ApiError> {
    let requester = state.gate.authorize(bearer_token(&headers)).await?;

    let payload = payload.map(|Json(p)| p);
    let target = parse_target(payload.as_ref())?;

    // The grant must point at a real identity; verified through the elevated
    // directory handle before anything is written.
    let identity = state
        .directory
        .get(target)
        .await?
        .ok_or_else(|| ApiError::not_found("target user not found"))?;

    if state.grants.insert_if_absent(identity.id).await? {
        tracing::info!(requester = %requester.id, target = %identity.id, "admin grant added");
        Ok(Json(json!({ "message": "admin added" })))
    } else {
        Ok(Json(json!({ "message": "user is already an admin" })))
    }
}
