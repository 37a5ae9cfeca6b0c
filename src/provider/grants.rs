use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ProviderError;

/// One row in the admin grant relation. Rows are immutable once created and
/// `user_id` is unique across the relation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminGrant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub granted_at: DateTime<Utc>,
}

/// Result of a guarded removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// The target held no grant; removal is a no-op success.
    NotAdmin,
    /// The requester tried to remove their own grant while it was the only
    /// one left.
    LastAdmin,
}

/// Privileged access to the admin grant relation.
///
/// `insert_if_absent` and `remove_guarded` must each execute as a single
/// atomic operation at the store. Handlers never compose them from separate
/// read-then-write calls, since concurrent requests share no memory.
#[async_trait]
pub trait GrantStore: Send + Sync {
    async fn list(&self) -> Result<Vec<AdminGrant>, ProviderError>;

    async fn exists(&self, user_id: Uuid) -> Result<bool, ProviderError>;

    /// Returns `true` if a new grant was inserted, `false` if one already
    /// existed for `user_id`.
    async fn insert_if_absent(&self, user_id: Uuid) -> Result<bool, ProviderError>;

    /// Delete the grant for `target`, refusing a self-removal that would
    /// empty the relation. The count check and the delete happen in one
    /// transaction at the store.
    async fn remove_guarded(
        &self,
        target: Uuid,
        requester: Uuid,
    ) -> Result<RemoveOutcome, ProviderError>;

    /// Cheap reachability probe for the health endpoint.
    async fn ping(&self) -> Result<(), ProviderError>;
}
