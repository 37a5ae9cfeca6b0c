pub mod grants;
pub mod hosted;
pub mod identity;

pub use grants::{AdminGrant, GrantStore, RemoveOutcome};
pub use hosted::{HostedDirectory, HostedGrantStore, HostedTokenResolver};
pub use identity::{Identity, IdentityDirectory, TokenResolver};

use thiserror::Error;

/// Failures talking to the hosted platform.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Unexpected {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The directory refused an identity creation because the email is
    /// already registered. Bootstrap treats this as the already-exists path.
    #[error("an identity with this email already exists")]
    DuplicateEmail,

    #[error("backend state inconsistent: {0}")]
    Inconsistent(String),
}
