use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub access: AccessConfig,
    pub admin: AdminConfig,
    pub oauth: OAuthConfig,
    pub promotion: PromotionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

/// Shared Basic-Auth password in front of the whole board.
/// An empty password turns the gate off.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessConfig {
    #[serde(default)]
    pub password: String,
}

impl AccessConfig {
    pub fn enabled(&self) -> bool {
        !self.password.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    pub email: String,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u64,
    #[serde(default)]
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uri: String,
    #[serde(default = "default_post_login_redirect")]
    pub post_login_redirect: String,
}

/// Thresholds for moving a post into the recommended feed.
#[derive(Debug, Clone, Deserialize)]
pub struct PromotionConfig {
    #[serde(default = "default_promotion_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_promotion_window")]
    pub window_hours: i64,
    #[serde(default = "default_min_views")]
    pub min_views: i64,
    #[serde(default = "default_min_likes")]
    pub min_likes: i64,
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_promotion_interval(),
            window_hours: default_promotion_window(),
            min_views: default_min_views(),
            min_likes: default_min_likes(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "public".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_session_ttl_hours() -> u64 {
    24
}

fn default_post_login_redirect() -> String {
    "/admin".to_string()
}

fn default_promotion_interval() -> u64 {
    60
}

fn default_promotion_window() -> i64 {
    24
}

fn default_min_views() -> i64 {
    10
}

fn default_min_likes() -> i64 {
    2
}

impl Config {
    /// Loads configuration from `.env` and the process environment.
    ///
    /// Keys use `__` between section and field, e.g. `ACCESS__PASSWORD`,
    /// `PROMOTION__MIN_VIEWS`.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.static_dir", "public")?
            .set_default("database.url", "sqlite://board.db?mode=rwc")?
            .set_default("database.max_connections", 5)?
            .set_default("access.password", "")?
            .set_default("admin.email", "")?
            .set_default("admin.session_ttl_hours", 24)?
            .set_default("admin.cookie_secure", false)?
            .set_default("oauth.client_id", "")?
            .set_default("oauth.client_secret", "")?
            .set_default("oauth.redirect_uri", "http://localhost:3000/api/admin/auth/google/callback")?
            .set_default("oauth.post_login_redirect", "/admin")?
            .set_default("promotion.interval_secs", 60)?
            .set_default("promotion.window_hours", 24)?
            .set_default("promotion.min_views", 10)?
            .set_default("promotion.min_likes", 2)?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
