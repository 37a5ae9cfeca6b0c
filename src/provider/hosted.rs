//! HTTP clients for the hosted data/auth platform.
//!
//! Two credential scopes exist and are kept in separate types on purpose:
//! [`HostedTokenResolver`] carries only the public (anon) key and is used for
//! caller token resolution, while [`HostedDirectory`] and
//! [`HostedGrantStore`] carry the elevated service key that bypasses
//! row-level rules. There is no constructor that crosses the two.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::config::BackendConfig;

use super::{AdminGrant, GrantStore, Identity, IdentityDirectory, ProviderError, RemoveOutcome, TokenResolver};

/// Wire shape of a directory user record.
#[derive(Debug, Deserialize)]
struct WireUser {
    id: Uuid,
    email: String,
    created_at: DateTime<Utc>,
    email_confirmed_at: Option<DateTime<Utc>>,
}

impl From<WireUser> for Identity {
    fn from(u: WireUser) -> Self {
        Identity {
            id: u.id,
            email: u.email,
            created_at: u.created_at,
            email_confirmed: u.email_confirmed_at.is_some(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireUserPage {
    users: Vec<WireUser>,
}

/// Directory listing page size; the search walks pages until a short page
/// signals the listing is exhausted.
const DIRECTORY_PAGE_SIZE: usize = 1000;

async fn unexpected(resp: reqwest::Response) -> ProviderError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    ProviderError::Unexpected { status, body }
}

fn join(base: &url::Url, path: &str) -> String {
    format!("{}{}", base.as_str().trim_end_matches('/'), path)
}

/// Identity directory client holding the elevated service credential.
pub struct HostedDirectory {
    client: reqwest::Client,
    base: url::Url,
    service_key: String,
}

impl HostedDirectory {
    pub fn new(client: reqwest::Client, backend: &BackendConfig) -> Self {
        Self {
            client,
            base: backend.base_url.clone(),
            service_key: backend.service_key.clone(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, join(&self.base, path))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

#[async_trait]
impl IdentityDirectory for HostedDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, ProviderError> {
        // The directory has no exact-match filter on this surface; list and
        // search, as the admin console does. The root identity can sit on
        // any page, so walk the whole listing before concluding absence.
        let mut page = 1usize;
        loop {
            let resp = self
                .request(Method::GET, "/auth/v1/admin/users")
                .query(&[
                    ("page", page.to_string()),
                    ("per_page", DIRECTORY_PAGE_SIZE.to_string()),
                ])
                .send()
                .await?;
            if !resp.status().is_success() {
                return Err(unexpected(resp).await);
            }
            let batch: WireUserPage = resp.json().await?;
            let fetched = batch.users.len();
            if let Some(found) = batch.users.into_iter().find(|u| u.email == email) {
                return Ok(Some(found.into()));
            }
            if fetched < DIRECTORY_PAGE_SIZE {
                return Ok(None);
            }
            page += 1;
        }
    }

    async fn get(&self, id: Uuid) -> Result<Option<Identity>, ProviderError> {
        let resp = self
            .request(Method::GET, &format!("/auth/v1/admin/users/{}", id))
            .send()
            .await?;
        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Ok(Some(resp.json::<WireUser>().await?.into())),
            _ => Err(unexpected(resp).await),
        }
    }

    async fn create(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        let resp = self
            .request(Method::POST, "/auth/v1/admin/users")
            .json(&json!({
                "email": email,
                "password": password,
                "email_confirm": true,
            }))
            .send()
            .await?;
        match resp.status() {
            s if s.is_success() => Ok(resp.json::<WireUser>().await?.into()),
            // The directory reports a taken email as an unprocessable or
            // conflicting registration.
            StatusCode::UNPROCESSABLE_ENTITY | StatusCode::CONFLICT => {
                Err(ProviderError::DuplicateEmail)
            }
            _ => Err(unexpected(resp).await),
        }
    }
}

/// Caller-scoped resolver holding the public (anon) key. Row-level rules
/// stay in force on this path.
pub struct HostedTokenResolver {
    client: reqwest::Client,
    base: url::Url,
    anon_key: String,
}

impl HostedTokenResolver {
    pub fn new(client: reqwest::Client, backend: &BackendConfig) -> Self {
        Self {
            client,
            base: backend.base_url.clone(),
            anon_key: backend.anon_key.clone(),
        }
    }
}

#[async_trait]
impl TokenResolver for HostedTokenResolver {
    async fn resolve(&self, token: &str) -> Result<Option<Identity>, ProviderError> {
        let resp = self
            .client
            .get(join(&self.base, "/auth/v1/user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;
        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            s if s.is_success() => Ok(Some(resp.json::<WireUser>().await?.into())),
            _ => Err(unexpected(resp).await),
        }
    }
}

/// Grant relation client holding the elevated service credential.
pub struct HostedGrantStore {
    client: reqwest::Client,
    base: url::Url,
    service_key: String,
}

impl HostedGrantStore {
    pub fn new(client: reqwest::Client, backend: &BackendConfig) -> Self {
        Self {
            client,
            base: backend.base_url.clone(),
            service_key: backend.service_key.clone(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, join(&self.base, path))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }
}

#[async_trait]
impl GrantStore for HostedGrantStore {
    async fn list(&self) -> Result<Vec<AdminGrant>, ProviderError> {
        let resp = self
            .request(Method::GET, "/rest/v1/admin_grants")
            .query(&[("select", "*"), ("order", "granted_at.asc")])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(unexpected(resp).await);
        }
        Ok(resp.json().await?)
    }

    async fn exists(&self, user_id: Uuid) -> Result<bool, ProviderError> {
        let resp = self
            .request(Method::GET, "/rest/v1/admin_grants")
            .query(&[
                ("select", "user_id".to_string()),
                ("user_id", format!("eq.{}", user_id)),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(unexpected(resp).await);
        }
        let rows: Vec<serde_json::Value> = resp.json().await?;
        Ok(!rows.is_empty())
    }

    async fn insert_if_absent(&self, user_id: Uuid) -> Result<bool, ProviderError> {
        // The store resolves the uniqueness conflict itself and returns the
        // rows it actually inserted, so a duplicate comes back as an empty
        // representation rather than an error.
        let resp = self
            .request(Method::POST, "/rest/v1/admin_grants")
            .query(&[("on_conflict", "user_id")])
            .header("Prefer", "resolution=ignore-duplicates,return=representation")
            .json(&json!([{ "user_id": user_id }]))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(unexpected(resp).await);
        }
        let inserted: Vec<AdminGrant> = resp.json().await?;
        Ok(!inserted.is_empty())
    }

    async fn remove_guarded(
        &self,
        target: Uuid,
        requester: Uuid,
    ) -> Result<RemoveOutcome, ProviderError> {
        // Single transactional function at the store; see db/admin_grants.sql.
        let resp = self
            .request(Method::POST, "/rest/v1/rpc/remove_admin_grant_guarded")
            .json(&json!({
                "target_user_id": target,
                "requester_user_id": requester,
            }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(unexpected(resp).await);
        }
        let outcome: String = resp.json().await?;
        match outcome.as_str() {
            "removed" => Ok(RemoveOutcome::Removed),
            "not_admin" => Ok(RemoveOutcome::NotAdmin),
            "last_admin" => Ok(RemoveOutcome::LastAdmin),
            other => Err(ProviderError::Inconsistent(format!(
                "unknown removal outcome {:?}",
                other
            ))),
        }
    }

    async fn ping(&self) -> Result<(), ProviderError> {
        let resp = self
            .request(Method::GET, "/rest/v1/admin_grants")
            .query(&[("select", "user_id"), ("limit", "1")])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(unexpected(resp).await);
        }
        Ok(())
    }
}
