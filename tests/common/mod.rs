use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use motorlot_admin_api::app;
use motorlot_admin_api::provider::{
    AdminGrant, GrantStore, Identity, IdentityDirectory, ProviderError, RemoveOutcome,
    TokenResolver,
};
use motorlot_admin_api::state::AppState;

pub const ROOT_EMAIL: &str = "root@motorlot.test";
pub const ROOT_PASSWORD: &str = "first-boot-password";

#[derive(Default)]
struct BackendInner {
    identities: Vec<Identity>,
    tokens: HashMap<String, Uuid>,
    grants: Vec<AdminGrant>,
    fail_directory: bool,
    fail_grants: bool,
}

/// In-memory stand-in for the hosted platform. A single mutex serializes
/// every operation, which is exactly the per-operation atomicity the store
/// contract asks for.
#[derive(Clone, Default)]
pub struct TestBackend {
    inner: Arc<Mutex<BackendInner>>,
}

impl TestBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an identity and return its id plus a bearer token resolving
    /// to it.
    pub fn seed_identity(&self, email: &str) -> (Uuid, String) {
        let mut inner = self.inner.lock().unwrap();
        let id = Uuid::new_v4();
        inner.identities.push(Identity {
            id,
            email: email.to_string(),
            created_at: Utc::now(),
            email_confirmed: true,
        });
        let token = format!("token-{}", id.simple());
        inner.tokens.insert(token.clone(), id);
        (id, token)
    }

    /// Mint a token for an identity that already exists (e.g. the root
    /// identity created by bootstrap).
    pub fn issue_token(&self, id: Uuid) -> String {
        let mut inner = self.inner.lock().unwrap();
        let token = format!("token-{}-{}", id.simple(), inner.tokens.len());
        inner.tokens.insert(token.clone(), id);
        token
    }

    pub fn grant_count(&self) -> usize {
        self.inner.lock().unwrap().grants.len()
    }

    pub fn has_grant(&self, user_id: Uuid) -> bool {
        self.inner.lock().unwrap().grants.iter().any(|g| g.user_id == user_id)
    }

    pub fn set_directory_failing(&self, fail: bool) {
        self.inner.lock().unwrap().fail_directory = fail;
    }

    pub fn set_grants_failing(&self, fail: bool) {
        self.inner.lock().unwrap().fail_grants = fail;
    }
}

fn injected(component: &str) -> ProviderError {
    ProviderError::Inconsistent(format!("injected {} failure", component))
}

#[async_trait]
impl IdentityDirectory for TestBackend {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, ProviderError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_directory {
            return Err(injected("directory"));
        }
        Ok(inner.identities.iter().find(|i| i.email == email).cloned())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Identity>, ProviderError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_directory {
            return Err(injected("directory"));
        }
        Ok(inner.identities.iter().find(|i| i.id == id).cloned())
    }

    async fn create(&self, email: &str, _password: &str) -> Result<Identity, ProviderError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_directory {
            return Err(injected("directory"));
        }
        if inner.identities.iter().any(|i| i.email == email) {
            return Err(ProviderError::DuplicateEmail);
        }
        let identity = Identity {
            id: Uuid::new_v4(),
            email: email.to_string(),
            created_at: Utc::now(),
            email_confirmed: true,
        };
        inner.identities.push(identity.clone());
        Ok(identity)
    }
}

#[async_trait]
impl TokenResolver for TestBackend {
    async fn resolve(&self, token: &str) -> Result<Option<Identity>, ProviderError> {
        let inner = self.inner.lock().unwrap();
        let id = match inner.tokens.get(token) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(inner.identities.iter().find(|i| i.id == id).cloned())
    }
}

#[async_trait]
impl GrantStore for TestBackend {
    async fn list(&self) -> Result<Vec<AdminGrant>, ProviderError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_grants {
            return Err(injected("grant store"));
        }
        Ok(inner.grants.clone())
    }

    async fn exists(&self, user_id: Uuid) -> Result<bool, ProviderError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_grants {
            return Err(injected("grant store"));
        }
        Ok(inner.grants.iter().any(|g| g.user_id == user_id))
    }

    async fn insert_if_absent(&self, user_id: Uuid) -> Result<bool, ProviderError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_grants {
            return Err(injected("grant store"));
        }
        if inner.grants.iter().any(|g| g.user_id == user_id) {
            return Ok(false);
        }
        inner.grants.push(AdminGrant {
            id: Uuid::new_v4(),
            user_id,
            granted_at: Utc::now(),
        });
        Ok(true)
    }

    async fn remove_guarded(
        &self,
        target: Uuid,
        requester: Uuid,
    ) -> Result<RemoveOutcome, ProviderError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_grants {
            return Err(injected("grant store"));
        }
        if target == requester && inner.grants.len() <= 1 {
            return Ok(RemoveOutcome::LastAdmin);
        }
        let before = inner.grants.len();
        inner.grants.retain(|g| g.user_id != target);
        if inner.grants.len() == before {
            return Ok(RemoveOutcome::NotAdmin);
        }
        Ok(RemoveOutcome::Removed)
    }

    async fn ping(&self) -> Result<(), ProviderError> {
        let inner = self.inner.lock().unwrap();
        if inner.fail_grants {
            return Err(injected("grant store"));
        }
        Ok(())
    }
}

pub struct TestApp {
    pub base_url: String,
    pub backend: TestBackend,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn bootstrap(&self) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}/admin/bootstrap", self.base_url))
            .send()
            .await?)
    }

    pub async fn list(&self) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(format!("{}/admin/grants", self.base_url))
            .send()
            .await?)
    }

    pub async fn add(&self, token: Option<&str>, target: &str) -> Result<reqwest::Response> {
        self.mutate("add", token, Some(json!({ "user_id_input": target }))).await
    }

    pub async fn remove(&self, token: Option<&str>, target: &str) -> Result<reqwest::Response> {
        self.mutate("remove", token, Some(json!({ "user_id_input": target }))).await
    }

    pub async fn mutate(
        &self,
        action: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let mut req = self
            .client
            .post(format!("{}/admin/grants/{}", self.base_url, action));
        if let Some(t) = token {
            req = req.bearer_auth(t);
        }
        if let Some(b) = body {
            req = req.json(&b);
        }
        Ok(req.send().await?)
    }

    /// Run bootstrap and return the root id plus a usable token for it.
    pub async fn bootstrap_root(&self) -> Result<(Uuid, String)> {
        let resp = self.bootstrap().await?;
        anyhow::ensure!(resp.status().is_success(), "bootstrap failed: {}", resp.status());
        let body = resp.json::<serde_json::Value>().await?;
        let id: Uuid = body["userId"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("bootstrap response missing userId: {}", body))?
            .parse()?;
        let token = self.backend.issue_token(id);
        Ok((id, token))
    }
}

pub async fn spawn_app() -> Result<TestApp> {
    spawn_app_with(TestBackend::new()).await
}

pub async fn spawn_app_with(backend: TestBackend) -> Result<TestApp> {
    let state = AppState::new(
        Arc::new(backend.clone()),
        Arc::new(backend.clone()),
        Arc::new(backend.clone()),
        ROOT_EMAIL.to_string(),
        ROOT_PASSWORD.to_string(),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.expect("test server");
    });

    Ok(TestApp {
        base_url: format!("http://{}", addr),
        backend,
        client: reqwest::Client::new(),
    })
}
