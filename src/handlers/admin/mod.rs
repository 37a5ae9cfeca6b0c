mod add;
mod bootstrap;
mod list;
mod remove;

pub use add::add_post;
pub use bootstrap::bootstrap_post;
pub use list::list_get;
pub use remove::remove_post;

use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// Request body shared by the add and remove handlers.
#[derive(Debug, Deserialize)]
pub struct GrantTargetRequest {
    pub user_id_input: Option<String>,
}

/// Validate the target field: present, non-empty, and a well-formed id.
pub(crate) fn parse_target(payload: Option<&GrantTargetRequest>) -> Result<Uuid, ApiError> {
    let raw = payload
        .and_then(|p| p.user_id_input.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request("user_id_input is required"))?;

    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("user_id_input must be a valid user id"))
}
