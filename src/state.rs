use std::sync::Arc;

use crate::auth::AuthGate;
use crate::config::AppConfig;
use crate::provider::{
    GrantStore, HostedDirectory, HostedGrantStore, HostedTokenResolver, IdentityDirectory,
    TokenResolver,
};
use crate::services::BootstrapService;

/// Shared handler state. Everything sits behind an Arc so the per-request
/// router clone stays cheap.
#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<AuthGate>,
    pub directory: Arc<dyn IdentityDirectory>,
    pub grants: Arc<dyn GrantStore>,
    pub bootstrap: Arc<BootstrapService>,
}

impl AppState {
    /// Wire the caller-scoped and elevated handles together with the root
    /// configuration. Tests hand in in-memory implementations here.
    pub fn new(
        resolver: Arc<dyn TokenResolver>,
        directory: Arc<dyn IdentityDirectory>,
        grants: Arc<dyn GrantStore>,
        root_email: String,
        root_password: String,
    ) -> Self {
        let gate = Arc::new(AuthGate::new(resolver, grants.clone(), root_email.clone()));
        let bootstrap = Arc::new(BootstrapService::new(
            directory.clone(),
            grants.clone(),
            root_email,
            root_password,
        ));
        Self { gate, directory, grants, bootstrap }
    }

    /// Production wiring against the hosted platform.
    pub fn hosted(config: &AppConfig) -> Self {
        let http = reqwest::Client::new();
        let resolver = Arc::new(HostedTokenResolver::new(http.clone(), &config.backend));
        let directory = Arc::new(HostedDirectory::new(http.clone(), &config.backend));
        let grants = Arc::new(HostedGrantStore::new(http, &config.backend));
        Self::new(
            resolver,
            directory,
            grants,
            config.bootstrap.root_email.clone(),
            config.bootstrap.root_password.clone(),
        )
    }
}
