use std::sync::Arc;

use uuid::Uuid;

use crate::provider::{GrantStore, IdentityDirectory, ProviderError};

/// Idempotently ensures the designated root administrator identity exists
/// and holds an admin grant.
pub struct BootstrapService {
    directory: Arc<dyn IdentityDirectory>,
    grants: Arc<dyn GrantStore>,
    root_email: String,
    root_password: String,
}

impl BootstrapService {
    pub fn new(
        directory: Arc<dyn IdentityDirectory>,
        grants: Arc<dyn GrantStore>,
        root_email: String,
        root_password: String,
    ) -> Self {
        Self { directory, grants, root_email, root_password }
    }

    /// Repeated and concurrent invocations converge on the same identity id
    /// with exactly one grant row behind it.
    pub async fn ensure_default_admin(&self) -> Result<Uuid, ProviderError> {
        let identity = match self.directory.find_by_email(&self.root_email).await? {
            Some(existing) => existing,
            None => match self.directory.create(&self.root_email, &self.root_password).await {
                Ok(created) => {
                    tracing::info!(user_id = %created.id, "created root administrator identity");
                    created
                }
                // A concurrent bootstrap won the creation race; fall back to
                // the lookup path.
                Err(ProviderError::DuplicateEmail) => self
                    .directory
                    .find_by_email(&self.root_email)
                    .await?
                    .ok_or_else(|| {
                        ProviderError::Inconsistent(
                            "root identity missing after duplicate-email conflict".into(),
                        )
                    })?,
                Err(e) => return Err(e),
            },
        };

        if self.grants.insert_if_absent(identity.id).await? {
            tracing::info!(user_id = %identity.id, "granted root administrator privilege");
        }
        Ok(identity.id)
    }
}
