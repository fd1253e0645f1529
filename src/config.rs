use std::net::{IpAddr, SocketAddr};

use serde::Deserialize;
use tower_cookies::Key;

pub const ENV_PREFIX: &str = "YATUBE_";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Env(#[from] envy::Error),

    #[error("invalid host address: {0}")]
    InvalidHost(String),

    #[error("cookie secret must be at least 64 bytes")]
    CookieSecretTooShort,
}

/// Settings read from `YATUBE_*` environment variables (and `.env`).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Postgres URL; the in-memory store is used when unset.
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: usize,
    /// Key material for the encrypted session cookie, at least 64 bytes.
    #[serde(default)]
    pub cookie_secret: Option<String>,
    /// Posts per list page.
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    /// Characters of post text used as the detail page title.
    #[serde(default = "default_title_length")]
    pub title_length: usize,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
    #[serde(default = "default_login_url")]
    pub login_url: String,
}

fn default_host() -> String {
    String::from("127.0.0.1")
}

fn default_port() -> u16 {
    6060
}

fn default_database_max_connections() -> usize {
    5
}

fn default_page_size() -> i64 {
    10
}

fn default_title_length() -> usize {
    30
}

fn default_session_ttl_hours() -> i64 {
    48
}

fn default_login_url() -> String {
    String::from("/auth/login/")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: None,
            database_max_connections: default_database_max_connections(),
            cookie_secret: None,
            page_size: default_page_size(),
            title_length: default_title_length(),
            session_ttl_hours: default_session_ttl_hours(),
            login_url: default_login_url(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(envy::prefixed(ENV_PREFIX).from_env::<Config>()?)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.host.clone()))?;

        Ok(SocketAddr::new(ip, self.port))
    }

    /// Without a configured secret every restart invalidates existing sessions.
    pub fn cookie_key(&self) -> Result<Key, ConfigError> {
        match &self.cookie_secret {
            Some(secret) => {
                Key::try_from(secret.as_bytes()).map_err(|_| ConfigError::CookieSecretTooShort)
            }
            None => {
                tracing::warn!("no cookie secret configured, generating a random one");
                Ok(Key::generate())
            }
        }
    }
}
