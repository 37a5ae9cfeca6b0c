use std::sync::Arc;

use axum::http::{header, HeaderMap};
use thiserror::Error;

use crate::provider::{GrantStore, Identity, ProviderError, TokenResolver};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Unauthenticated(String),

    #[error("admin privileges required")]
    Forbidden,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Decides whether a presented token belongs to an administrator.
///
/// Token resolution always goes through the caller-scoped resolver; the
/// elevated grant-store handle is used only for the privilege lookup. The
/// root-email bypass lives here and nowhere else.
pub struct AuthGate {
    resolver: Arc<dyn TokenResolver>,
    grants: Arc<dyn GrantStore>,
    root_email: String,
}

impl AuthGate {
    pub fn new(resolver: Arc<dyn TokenResolver>, grants: Arc<dyn GrantStore>, root_email: String) -> Self {
        Self { resolver, grants, root_email }
    }

    /// Resolve the caller's identity without any privilege check.
    pub async fn resolve_caller(&self, token: Option<&str>) -> Result<Option<Identity>, ProviderError> {
        match token {
            None => Ok(None),
            Some(t) => self.resolver.resolve(t).await,
        }
    }

    /// Full authorization: resolve the caller, then require either the
    /// designated root email or an existing grant row.
    pub async fn authorize(&self, token: Option<&str>) -> Result<Identity, AuthError> {
        let token = token.ok_or_else(|| AuthError::Unauthenticated("missing bearer token".into()))?;
        let caller = self
            .resolver
            .resolve(token)
            .await?
            .ok_or_else(|| AuthError::Unauthenticated("invalid or expired token".into()))?;

        if caller.email == self.root_email {
            return Ok(caller);
        }
        if self.grants.exists(caller.id).await? {
            return Ok(caller);
        }
        Err(AuthError::Forbidden)
    }
}

/// Extract a bearer token from the Authorization header, if present. The
/// scheme is matched case-insensitively, as clients vary in how they spell
/// it.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
