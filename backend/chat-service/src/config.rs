use crate::error::AppError;
use dotenvy::dotenv;
use std::env;
use std::fmt;

/// Database connection pool configuration
#[derive(Clone)]
pub struct DbConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Connection acquisition timeout (get connection from pool)
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("database_url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .field("idle_timeout_secs", &self.idle_timeout_secs)
            .field("max_lifetime_secs", &self.max_lifetime_secs)
            .finish()
    }
}

/// Page size ceilings per listing.
#[derive(Debug, Clone, Copy)]
pub struct PaginationConfig {
    pub messages_limit: i64,
    pub conversations_limit: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            messages_limit: 100,
            conversations_limit: 1000,
        }
    }
}

#[derive(Clone)]
pub struct FcmConfig {
    pub server_key: String,
    pub endpoint: String,
}

impl fmt::Debug for FcmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FcmConfig")
            .field("server_key", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub db: DbConfig,
    /// HS256 secret shared with the token issuer.
    pub server_secret: String,
    pub fcm: FcmConfig,
    pub pagination: PaginationConfig,
    pub message_body_max_chars: usize,
    pub log_json: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("db", &self.db)
            .field("server_secret", &"[REDACTED]")
            .field("fcm", &self.fcm)
            .field("pagination", &self.pagination)
            .field("message_body_max_chars", &self.message_body_max_chars)
            .field("log_json", &self.log_json)
            .finish()
    }
}

fn required(key: &str) -> Result<String, AppError> {
    match env::var(key) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::Config(format!("{key} missing"))),
    }
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let db = DbConfig {
            database_url: required("DATABASE_URL")?,
            max_connections: parsed("DB_MAX_CONNECTIONS", 10),
            min_connections: parsed("DB_MIN_CONNECTIONS", 2),
            acquire_timeout_secs: parsed("DB_ACQUIRE_TIMEOUT_SECS", 10),
            idle_timeout_secs: parsed("DB_IDLE_TIMEOUT_SECS", 600),
            max_lifetime_secs: parsed("DB_MAX_LIFETIME_SECS", 1800),
        };
        if db.min_connections > db.max_connections {
            return Err(AppError::Config(
                "DB_MIN_CONNECTIONS must not exceed DB_MAX_CONNECTIONS".into(),
            ));
        }

        let fcm = FcmConfig {
            server_key: required("FCM_SERVER_KEY")?,
            endpoint: env::var("FCM_ENDPOINT")
                .unwrap_or_else(|_| "https://fcm.googleapis.com/fcm/send".into()),
        };

        let defaults = PaginationConfig::default();
        let pagination = PaginationConfig {
            messages_limit: parsed("MESSAGES_PAGE_LIMIT", defaults.messages_limit),
            conversations_limit: parsed("CONVERSATIONS_PAGE_LIMIT", defaults.conversations_limit),
        };
        if pagination.messages_limit <= 0 || pagination.conversations_limit <= 0 {
            return Err(AppError::Config("page limits must be positive".into()));
        }

        Ok(Self {
            port: parsed("PORT", 8080),
            db,
            server_secret: required("SERVER_SECRET")?,
            fcm,
            pagination,
            message_body_max_chars: parsed("MESSAGE_BODY_MAX_CHARS", 4000),
            log_json: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    #[cfg(test)]
    pub fn test_defaults() -> Self {
        Self {
            port: 0,
            db: DbConfig {
                database_url: "postgres://localhost/chat_test".into(),
                max_connections: 1,
                min_connections: 0,
                acquire_timeout_secs: 1,
                idle_timeout_secs: 60,
                max_lifetime_secs: 60,
            },
            server_secret: "test-secret".into(),
            fcm: FcmConfig {
                server_key: "test-key".into(),
                endpoint: "http://127.0.0.1:9/fcm/send".into(),
            },
            pagination: PaginationConfig::default(),
            message_body_max_chars: 4000,
            log_json: false,
        }
    }
}
