use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ProviderError;

/// A user account owned by the hosted identity directory. The admin service
/// only reads these, apart from the one root identity bootstrap may create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub email_confirmed: bool,
}

/// Privileged directory operations. Implementations hold the elevated
/// service credential; nothing reachable from a caller token goes through
/// here.
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, ProviderError>;

    async fn get(&self, id: Uuid) -> Result<Option<Identity>, ProviderError>;

    /// Create an identity with its email pre-confirmed. A duplicate email
    /// must surface as [`ProviderError::DuplicateEmail`].
    async fn create(&self, email: &str, password: &str) -> Result<Identity, ProviderError>;
}

/// Caller-scoped token resolution. This is the only identity lookup the
/// authorization gate is allowed to use; it never carries the elevated key.
#[async_trait]
pub trait TokenResolver: Send + Sync {
    /// `None` means the token did not resolve to an identity.
    async fn resolve(&self, token: &str) -> Result<Option<Identity>, ProviderError>;
}
