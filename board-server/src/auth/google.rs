use super::{IdentityProvider, OAuthError, VerifiedIdentity};
use crate::config::OAuthConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

#[derive(Clone)]
pub struct GoogleIdentityProvider {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    http_client: Client,
}

#[derive(Debug, Deserialize)]
struct GoogleTokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    email: String,
    #[serde(default)]
    email_verified: bool,
    name: Option<String>,
}

impl GoogleIdentityProvider {
    pub fn new(config: &OAuthConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_uri: config.redirect_uri.clone(),
            http_client: Client::new(),
        }
    }

    fn ensure_configured(&self) -> Result<(), OAuthError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(OAuthError::ConfigError(
                "OAUTH__CLIENT_ID and OAUTH__CLIENT_SECRET must be set".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn authorization_url(&self, state: &str) -> Result<String, OAuthError> {
        self.ensure_configured()?;

        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope=openid%20email%20profile&state={}",
            AUTHORIZE_URL,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(state)
        ))
    }

    async fn exchange_code(&self, code: &str) -> Result<VerifiedIdentity, OAuthError> {
        self.ensure_configured()?;

        let token_response = self
            .http_client
            .post(TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| OAuthError::TokenExchange(format!("HTTP error: {}", e)))?
            .json::<GoogleTokenResponse>()
            .await
            .map_err(|e| OAuthError::TokenExchange(format!("JSON parse error: {}", e)))?;

        let user_info = self
            .http_client
            .get(USERINFO_URL)
            .bearer_auth(&token_response.access_token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| OAuthError::UserInfoFetch(format!("HTTP error: {}", e)))?
            .json::<GoogleUserInfo>()
            .await
            .map_err(|e| OAuthError::UserInfoFetch(format!("JSON parse error: {}", e)))?;

        Ok(VerifiedIdentity {
            email: user_info.email,
            email_verified: user_info.email_verified,
            name: user_info.name,
        })
    }
}
