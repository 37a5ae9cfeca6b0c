use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Process configuration, resolved once at startup and passed into state
/// construction. Nothing in here is read from ambient globals afterwards.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub bootstrap: BootstrapConfig,
    pub port: u16,
}

/// Connection details for the hosted data/auth platform. The two keys are
/// deliberately separate fields: the service key bypasses row-level rules,
/// the anon key does not, and they are never interchangeable.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: Url,
    pub service_key: String,
    pub anon_key: String,
}

/// Designated root administrator. The password is only ever used the first
/// time the bootstrap procedure has to create the identity.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub root_email: String,
    pub root_password: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolution against an injected lookup so tests never have to mutate
    /// the process environment.
    pub fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> Result<Self, ConfigError> {
        let require = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let base_url = require("BACKEND_URL")?;
        let base_url = Url::parse(&base_url).map_err(|e| ConfigError::Invalid {
            name: "BACKEND_URL",
            reason: e.to_string(),
        })?;

        let port = match lookup("ADMIN_API_PORT").or_else(|| lookup("PORT")) {
            Some(v) => v.parse::<u16>().map_err(|e| ConfigError::Invalid {
                name: "ADMIN_API_PORT",
                reason: e.to_string(),
            })?,
            None => 3000,
        };

        Ok(Self {
            backend: BackendConfig {
                base_url,
                service_key: require("BACKEND_SERVICE_KEY")?,
                anon_key: require("BACKEND_ANON_KEY")?,
            },
            bootstrap: BootstrapConfig {
                root_email: require("ROOT_ADMIN_EMAIL")?,
                root_password: require("ROOT_ADMIN_PASSWORD")?,
            },
            port,
        })
    }
}
