use anyhow::Context;
use tracing::warn;

/// Development fallback for the signing secret. Exactly as insecure as it
/// looks; production startup refuses to run without a real secret.
const DEV_JWT_SECRET: &str = "your_jwt_secret_key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_seconds: i64,
}

#[derive(Debug, Clone)]
pub struct SecuritySettings {
    pub enabled: bool,
    /// On internal gate errors, admit the request instead of blocking it.
    pub fail_open: bool,
    pub window_seconds: u64,
    pub max_requests: usize,
    /// User-Agent substrings (lowercase) exempt from bot denial.
    pub bot_allowlist: Vec<String>,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            fail_open: true,
            window_seconds: 10,
            max_requests: 3,
            bot_allowlist: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub env: Environment,
    pub jwt: JwtConfig,
    pub security: SecuritySettings,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let env = match std::env::var("APP_ENV").as_deref() {
            Ok("production") => Environment::Production,
            _ => Environment::Development,
        };

        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

        let secret = match std::env::var("JWT_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ if env == Environment::Production => {
                anyhow::bail!("JWT_SECRET must be set in production")
            }
            _ => {
                warn!("JWT_SECRET is not set, using the insecure development default");
                DEV_JWT_SECRET.to_string()
            }
        };

        let jwt = JwtConfig {
            secret,
            ttl_seconds: std::env::var("JWT_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(3600),
        };

        let security = SecuritySettings {
            enabled: std::env::var("SECURITY_ENABLED")
                .ok()
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            fail_open: std::env::var("SECURITY_FAIL_OPEN")
                .ok()
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
            window_seconds: std::env::var("RATE_LIMIT_WINDOW_SECONDS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(10),
            max_requests: std::env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(3),
            bot_allowlist: std::env::var("BOT_ALLOWLIST")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_lowercase())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        };

        Ok(Self {
            database_url,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("APP_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(3000),
            env,
            jwt,
            security,
        })
    }

    /// Session cookies carry `Secure` only when serving production traffic.
    pub fn secure_cookies(&self) -> bool {
        self.env == Environment::Production
    }
}
