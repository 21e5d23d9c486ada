/*
 * Responsibility
 * - 環境変数の読み込み (listen addr, upstream auth server, module options)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::module::{AuthModuleOptions, ServerBackend};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // External auth server everything is delegated to
    pub auth_upstream_url: Url,
    pub auth_trusted_origins: Vec<String>,

    pub request_timeout: Duration,

    pub module: AuthModuleOptions,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let auth_upstream_url = std::env::var("AUTH_UPSTREAM_URL")
            .map_err(|_| ConfigError::Missing("AUTH_UPSTREAM_URL"))?;
        let auth_upstream_url =
            Url::parse(&auth_upstream_url).map_err(|_| ConfigError::Invalid("AUTH_UPSTREAM_URL"))?;

        let auth_trusted_origins = std::env::var("AUTH_TRUSTED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_timeout = std::env::var("REQUEST_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        let backend = match std::env::var("AUTH_SERVER_BACKEND") {
            Ok(v) => Some(
                v.parse::<ServerBackend>()
                    .map_err(|_| ConfigError::Invalid("AUTH_SERVER_BACKEND"))?,
            ),
            Err(_) => None,
        };

        let module = AuthModuleOptions {
            disable_trusted_origins_cors: flag("AUTH_DISABLE_TRUSTED_ORIGINS_CORS")?,
            disable_body_parser: flag("AUTH_DISABLE_BODY_PARSER")?,
            disable_global_auth_guard: flag("AUTH_DISABLE_GLOBAL_AUTH_GUARD")?,
            disable_controllers: flag("AUTH_DISABLE_CONTROLLERS")?,
            base_path: std::env::var("AUTH_BASE_PATH").ok(),
            backend,
            multipart_registered: flag("AUTH_MULTIPART_REGISTERED")?,
            graphql_path: std::env::var("AUTH_GRAPHQL_PATH").ok(),
            guard: Default::default(),
        };

        Ok(Self {
            addr,
            app_env,
            auth_upstream_url,
            auth_trusted_origins,
            request_timeout,
            module,
        })
    }
}

// unset => false
fn flag(key: &'static str) -> Result<bool, ConfigError> {
    match std::env::var(key) {
        Ok(v) => parse_flag(&v).ok_or(ConfigError::Invalid(key)),
        Err(_) => Ok(false),
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
