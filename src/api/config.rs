//! Application configuration.
//!
//! Every setting comes from an environment variable and is read once at
//! startup into an immutable [`AppConfig`]. The database variable names
//! (`host_server`, `db_username`, ...) are lower-case to stay compatible with
//! existing deployments.

use std::fmt::Display;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

const DEV_JWT_SECRET: &str = "dev-secret-do-not-use-in-production-change-me-now";
const MIN_SECRET_LEN: usize = 32;
/// One year.
pub const MAX_TOKEN_MINUTES: i64 = 525_600;
const MAX_POOL_SIZE: u32 = 1_000;

/// Configuration errors raised while reading the environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: String, value: String },
    #[error("{0} environment variable is required in production")]
    Missing(String),
    #[error("{key} must be at least {min} characters in production")]
    TooShort { key: String, min: usize },
}

/// Which storage backend serves notes and users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Postgres,
    Memory,
}

impl FromStr for StorageKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StorageKind::Postgres),
            "memory" => Ok(StorageKind::Memory),
            _ => Err(()),
        }
    }
}

/// Which cache sits in front of single-note reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKind {
    None,
    Memory,
    Redis,
}

impl FromStr for CacheKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "off" | "" => Ok(CacheKind::None),
            "memory" => Ok(CacheKind::Memory),
            "redis" => Ok(CacheKind::Redis),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// PostgreSQL connection settings.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Full URL, takes precedence over the individual parts when set.
    pub url_override: Option<String>,
    pub host: String,
    pub port: String,
    pub database: String,
    pub username: String,
    pub password: String,
    pub ssl_mode: String,
    pub pool_size: u32,
}

impl DatabaseConfig {
    /// Connection URL. User, password, port and ssl mode are percent-encoded.
    pub fn url(&self) -> String {
        if let Some(url) = &self.url_override {
            return url.clone();
        }
        format!(
            "postgresql://{}:{}@{}:{}/{}?sslmode={}",
            urlencoding::encode(&self.username),
            urlencoding::encode(&self.password),
            self.host,
            urlencoding::encode(&self.port),
            self.database,
            urlencoding::encode(&self.ssl_mode),
        )
    }

    /// URL with the password masked, for logging.
    pub fn redacted_url(&self) -> String {
        if self.url_override.is_some() {
            return "<DATABASE_URL>".to_string();
        }
        format!(
            "postgresql://{}:***@{}:{}/{}?sslmode={}",
            urlencoding::encode(&self.username),
            self.host,
            self.port,
            self.database,
            self.ssl_mode,
        )
    }
}

/// Redis connection settings.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub use_tls: bool,
    pub ttl_seconds: u64,
}

impl RedisConfig {
    pub fn url(&self) -> String {
        let scheme = if self.use_tls { "rediss" } else { "redis" };
        let credentials = match (&self.username, &self.password) {
            (Some(user), Some(pass)) => format!(
                "{}:{}@",
                urlencoding::encode(user),
                urlencoding::encode(pass)
            ),
            (None, Some(pass)) => format!(":{}@", urlencoding::encode(pass)),
            (Some(user), None) => format!("{}@", urlencoding::encode(user)),
            (None, None) => String::new(),
        };
        format!("{}://{}{}:{}", scheme, credentials, self.host, self.port)
    }
}

/// JWT settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub secret_key: Option<String>,
    pub access_token_expire_minutes: i64,
}

/// Complete application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub app_env: String,
    pub storage: StorageKind,
    pub database: DatabaseConfig,
    pub cache: CacheKind,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub rate_limit_per_minute: Option<u32>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database = DatabaseConfig {
            url_override: lookup("DATABASE_URL").filter(|s| !s.is_empty()),
            host: get("host_server", "localhost"),
            port: get("db_server_port", "5432"),
            database: get("database_name", "fastapi"),
            username: get("db_username", "postgres"),
            password: get("db_password", "secret"),
            ssl_mode: get("ssl_mode", "prefer"),
            pool_size: parse_in_range(&lookup, "DB_POOL_SIZE", 3, 1..=MAX_POOL_SIZE)?,
        };

        let redis = RedisConfig {
            host: get("REDIS_HOST", "localhost"),
            port: parse(&lookup, "REDIS_PORT", 6379)?,
            username: lookup("REDIS_USERNAME").filter(|s| !s.is_empty()),
            password: lookup("REDIS_PASSWORD").filter(|s| !s.is_empty()),
            use_tls: parse_bool(&lookup, "REDIS_USE_TLS", false)?,
            ttl_seconds: parse(&lookup, "CACHE_TTL_SECONDS", 300)?,
        };

        let auth = AuthConfig {
            secret_key: lookup("secret_key").filter(|s| !s.is_empty()),
            access_token_expire_minutes: parse_in_range(
                &lookup,
                "access_token_expire_minute",
                30,
                1..=MAX_TOKEN_MINUTES,
            )?,
        };

        let log_format = match get("LOG_FORMAT", "text").to_lowercase().as_str() {
            "text" | "pretty" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => return Err(invalid("LOG_FORMAT", other)),
        };

        let rate_limit_per_minute = match lookup("RATE_LIMIT_PER_MINUTE").filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                raw.parse::<u32>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| invalid("RATE_LIMIT_PER_MINUTE", &raw))?,
            ),
            None => None,
        };

        Ok(Self {
            host: parse(&lookup, "HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED))?,
            port: parse(&lookup, "PORT", 8000)?,
            app_env: get("APP_ENV", "production"),
            storage: parse(&lookup, "STORAGE_BACKEND", StorageKind::Postgres)?,
            database,
            cache: parse(&lookup, "CACHE_BACKEND", CacheKind::None)?,
            redis,
            auth,
            rate_limit_per_minute,
            log_format,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn is_development(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("development")
    }

    /// JWT signing secret.
    ///
    /// Production requires `secret_key` of at least 32 characters. In
    /// development a fixed insecure secret is substituted with a warning.
    pub fn resolve_jwt_secret(&self) -> Result<String, ConfigError> {
        let secret = match &self.auth.secret_key {
            Some(s) => s.clone(),
            None if self.is_development() => {
                warn!("secret_key not set! Using default secret for development. DO NOT USE IN PRODUCTION!");
                DEV_JWT_SECRET.to_string()
            }
            None => return Err(ConfigError::Missing("secret_key".to_string())),
        };

        if secret.len() < MIN_SECRET_LEN {
            if self.is_development() {
                warn!("secret_key is less than {} characters. Consider using a longer secret.", MIN_SECRET_LEN);
            } else {
                return Err(ConfigError::TooShort {
                    key: "secret_key".to_string(),
                    min: MIN_SECRET_LEN,
                });
            }
        }

        Ok(secret)
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key).filter(|s| !s.trim().is_empty()) {
        Some(raw) => raw.trim().parse().map_err(|_| invalid(key, &raw)),
        None => Ok(default),
    }
}

fn parse_in_range<F, T>(
    lookup: &F,
    key: &str,
    default: T,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Display,
{
    let value = parse(lookup, key, default)?;
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(invalid(key, &value.to_string()))
    }
}

fn parse_bool<F>(lookup: &F, key: &str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "" => Ok(false),
            _ => Err(invalid(key, &raw)),
        },
        None => Ok(default),
    }
}
