use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod google;
pub mod session;

pub use google::GoogleIdentityProvider;
pub use session::{AdminSession, SessionStore, SESSION_COOKIE};

/// Identity returned by the provider after a successful code exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    pub email: String,
    pub email_verified: bool,
    pub name: Option<String>,
}

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Failed to exchange token: {0}")]
    TokenExchange(String),

    #[error("Failed to fetch user info: {0}")]
    UserInfoFetch(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// OAuth2 authorization-code provider used to identify the admin.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is sent to; `state` comes back on the callback.
    fn authorization_url(&self, state: &str) -> Result<String, OAuthError>;

    /// Trades an authorization code for the account's identity.
    async fn exchange_code(&self, code: &str) -> Result<VerifiedIdentity, OAuthError>;
}
