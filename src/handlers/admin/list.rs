use axum::{extract::State, http::HeaderMap, Json};

use crate::auth::bearer_token;
use crate::error::ApiError;
use crate::provider::AdminGrant;
use crate::state::AppState;

/// GET /admin/grants - list every admin grant
///
/// Deliberately ungated: callers that fail to resolve are logged and served
/// anyway. Parts of the site read this to render admin badges, so tightening
/// it would break them.
pub async fn list_get(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<AdminGrant>>, ApiError> {
    match state.gate.resolve_caller(bearer_token(&headers)).await {
        Ok(Some(caller)) => tracing::debug!(caller = %caller.id, "listing admin grants"),
        Ok(None) => tracing::warn!("listing admin grants for an unresolved caller"),
        Err(e) => tracing::warn!("caller resolution failed while listing admin grants: {}", e),
    }

    let grants = state.grants.list().await?;
    Ok(Json(grants))
}
