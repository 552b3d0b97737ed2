//! Configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::Duration;

/// Placeholder signing secret used when `JWT_SECRET` is unset.
///
/// Any real deployment must override it.
pub const INSECURE_DEFAULT_SECRET: &str = "super-secret-key";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Authentication settings shared by the account services.
    pub auth: AuthSettings,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Per-request timeout in seconds (default: 30).
    pub request_timeout_secs: u64,

    /// SMTP host for email delivery. When None, notifications are only logged.
    pub smtp_host: Option<String>,

    /// SMTP port (default: 587).
    pub smtp_port: u16,

    /// SMTP username for authentication.
    pub smtp_username: Option<String>,

    /// SMTP password for authentication.
    pub smtp_password: Option<String>,

    /// SMTP encryption mode: "starttls" (default), "tls", or "none".
    pub smtp_encryption: String,

    /// From address for outgoing email.
    pub smtp_from_email: String,
}

/// Fixed parameters for credentials, verification codes and session tokens.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// HMAC secret used to sign session tokens.
    pub jwt_secret: String,

    /// Session token lifetime.
    pub token_ttl: Duration,

    /// Verification code lifetime.
    pub code_ttl: Duration,

    /// Argon2 memory cost in KiB.
    pub hash_memory_kib: u32,

    /// Argon2 iteration count.
    pub hash_iterations: u32,

    /// Argon2 degree of parallelism.
    pub hash_parallelism: u32,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: INSECURE_DEFAULT_SECRET.to_string(),
            token_ttl: Duration::hours(24),
            code_ttl: Duration::minutes(10),
            hash_memory_kib: 19 * 1024,
            hash_iterations: 2,
            hash_parallelism: 1,
        }
    }
}

impl AuthSettings {
    /// Whether the signing secret is still the built-in placeholder.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == INSECURE_DEFAULT_SECRET
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = parse_var("PORT", "3000")?;

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = parse_var("DATABASE_MAX_CONNECTIONS", "10")?;

        let defaults = AuthSettings::default();
        let auth = AuthSettings {
            jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            token_ttl: parse_ttl("TOKEN_TTL_HOURS", "24", Duration::try_hours)?,
            code_ttl: parse_ttl("CODE_TTL_MINUTES", "10", Duration::try_minutes)?,
            hash_memory_kib: parse_var("PASSWORD_HASH_MEMORY_KIB", "19456")?,
            hash_iterations: parse_var("PASSWORD_HASH_ITERATIONS", "2")?,
            hash_parallelism: parse_var("PASSWORD_HASH_PARALLELISM", "1")?,
        };

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let request_timeout_secs = parse_var("REQUEST_TIMEOUT_SECS", "30")?;

        let smtp_host = env::var("SMTP_HOST").ok();
        let smtp_port = parse_var("SMTP_PORT", "587")?;
        let smtp_username = env::var("SMTP_USERNAME").ok();
        let smtp_password = env::var("SMTP_PASSWORD").ok();

        let smtp_encryption = env::var("SMTP_ENCRYPTION")
            .unwrap_or_else(|_| "starttls".to_string())
            .to_lowercase();

        let smtp_from_email =
            env::var("SMTP_FROM_EMAIL").unwrap_or_else(|_| "noreply@localhost".to_string());

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            auth,
            cors_allowed_origins,
            request_timeout_secs,
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            smtp_encryption,
            smtp_from_email,
        })
    }
}

/// Read `name` from the environment, falling back to `default`, and parse it.
fn parse_var<T>(name: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .with_context(|| format!("{name} has an invalid value"))
}

/// Read a whole-unit lifetime such as `TOKEN_TTL_HOURS` and convert it with `unit`.
fn parse_ttl(name: &str, default: &str, unit: fn(i64) -> Option<Duration>) -> Result<Duration> {
    let amount: i64 = parse_var(name, default)?;
    ttl_from(name, amount, unit)
}

fn ttl_from(name: &str, amount: i64, unit: fn(i64) -> Option<Duration>) -> Result<Duration> {
    if amount <= 0 {
        anyhow::bail!("{name} must be positive");
    }
    unit(amount).with_context(|| format!("{name} is out of range"))
}
