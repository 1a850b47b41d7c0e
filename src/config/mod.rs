use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment validation failed:\n  - {}", .0.join("\n  - "))]
    Invalid(Vec<String>),
}

impl ConfigError {
    pub fn violations(&self) -> &[String] {
        match self {
            ConfigError::Invalid(list) => list,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub port: u16,
    pub log_level: LogLevel,
    pub security: SecurityConfig,
    pub identity: IdentityConfig,
    pub database: DatabaseConfig,
    pub payments: PaymentsConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origin: String,
    pub jwt_secret: String,
    pub jwt_expires_in: Duration,
    pub refresh_token_secret: String,
    pub refresh_token_expires_in: Duration,
}

/// Hosted identity provider credentials (Clerk, optionally fronted by Aurora Identity)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub publishable_key: String,
    pub secret_key: String,
    pub aurora_api_url: Option<Url>,
    pub aurora_api_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreKind {
    Placeholder,
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Url,
    pub store: StoreKind,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentsConfig {
    pub stripe_secret_key: Option<String>,
    pub stripe_publishable_key: Option<String>,
    pub stripe_webhook_secret: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub rate_limit_window: Duration,
    pub rate_limit_max_requests: u32,
    pub max_request_size_bytes: usize,
}

impl AppConfig {
    /// Validate the process environment. Loads `.env` first when present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Validate configuration from an arbitrary key lookup.
    /// Every violation is collected before failing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut errors = Vec::new();
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let environment = match get("APP_ENV").as_deref() {
            None | Some("development") => Environment::Development,
            Some("staging") => Environment::Staging,
            Some("production") => Environment::Production,
            Some("test") => Environment::Test,
            Some(other) => {
                errors.push(format!(
                    "APP_ENV: expected one of development, staging, production, test, got '{}'",
                    other
                ));
                Environment::Development
            }
        };

        let port = parse_number(&get, "PORT", 3001u16, &mut errors);

        let cors_origin = required(&get, "CORS_ORIGIN", "CORS origin is required", &mut errors);

        let publishable_key = required(&get, "CLERK_PUBLISHABLE_KEY", "Clerk publishable key is required", &mut errors);
        check_prefix(&publishable_key, "CLERK_PUBLISHABLE_KEY", "pk_", &mut errors);
        let secret_key = required(&get, "CLERK_SECRET_KEY", "Clerk secret key is required", &mut errors);
        check_prefix(&secret_key, "CLERK_SECRET_KEY", "sk_", &mut errors);

        let jwt_secret = secret(&get, "JWT_SECRET", "JWT secret", &mut errors);
        let jwt_expires_in = duration(&get, "JWT_EXPIRES_IN", "15m", &mut errors);
        let refresh_token_secret = secret(&get, "REFRESH_TOKEN_SECRET", "Refresh token secret", &mut errors);
        let refresh_token_expires_in = duration(&get, "REFRESH_TOKEN_EXPIRES_IN", "7d", &mut errors);

        let database_url = match get("DATABASE_URL") {
            None => {
                errors.push("DATABASE_URL: Required".to_string());
                None
            }
            Some(raw) => match Url::parse(&raw) {
                Ok(url) => Some(url),
                Err(_) => {
                    errors.push("DATABASE_URL: Database URL must be a valid URL".to_string());
                    None
                }
            },
        };

        let store = match get("USER_STORE").as_deref() {
            None | Some("placeholder") => StoreKind::Placeholder,
            Some("memory") => StoreKind::Memory,
            Some("postgres") => StoreKind::Postgres,
            Some(other) => {
                errors.push(format!(
                    "USER_STORE: expected one of placeholder, memory, postgres, got '{}'",
                    other
                ));
                StoreKind::Placeholder
            }
        };

        let payments = PaymentsConfig {
            stripe_secret_key: optional_prefixed(&get, "STRIPE_SECRET_KEY", "sk_", &mut errors),
            stripe_publishable_key: optional_prefixed(&get, "STRIPE_PUBLISHABLE_KEY", "pk_", &mut errors),
            stripe_webhook_secret: optional_prefixed(&get, "STRIPE_WEBHOOK_SECRET", "whsec_", &mut errors),
        };

        let aurora_api_url = get("AURORA_IDENTITY_API_URL").and_then(|raw| match Url::parse(&raw) {
            Ok(url) => Some(url),
            Err(_) => {
                errors.push("AURORA_IDENTITY_API_URL: Invalid url".to_string());
                None
            }
        });

        let log_level = match get("LOG_LEVEL").as_deref() {
            None | Some("info") => LogLevel::Info,
            Some("error") => LogLevel::Error,
            Some("warn") => LogLevel::Warn,
            Some("debug") => LogLevel::Debug,
            Some(other) => {
                errors.push(format!(
                    "LOG_LEVEL: expected one of error, warn, info, debug, got '{}'",
                    other
                ));
                LogLevel::Info
            }
        };

        let window_ms = parse_number(&get, "RATE_LIMIT_WINDOW_MS", 900_000u64, &mut errors);
        let rate_limit_max_requests = parse_number(&get, "RATE_LIMIT_MAX_REQUESTS", 100u32, &mut errors);

        if !errors.is_empty() {
            return Err(ConfigError::Invalid(errors));
        }

        // All required values are present once the error list is empty
        let Some(database_url) = database_url else {
            return Err(ConfigError::Invalid(vec!["DATABASE_URL: Required".to_string()]));
        };

        Ok(Self {
            environment,
            port,
            log_level,
            security: SecurityConfig {
                cors_origin,
                jwt_secret,
                jwt_expires_in,
                refresh_token_secret,
                refresh_token_expires_in,
            },
            identity: IdentityConfig {
                publishable_key,
                secret_key,
                aurora_api_url,
                aurora_api_key: get("AURORA_IDENTITY_API_KEY"),
            },
            database: DatabaseConfig {
                url: database_url,
                store,
            },
            payments,
            api: ApiConfig {
                rate_limit_window: Duration::from_millis(window_ms),
                rate_limit_max_requests,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

/// Validate the environment at startup, reporting every violation on stderr.
/// A production process exits immediately; elsewhere the error goes back to the caller.
pub fn load() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env().map_err(|err| {
        eprintln!("❌ Invalid environment variables:");
        for violation in err.violations() {
            eprintln!("  - {}", violation);
        }
        eprintln!("\nPlease check your .env file and ensure all required variables are set.");

        if env::var("APP_ENV").as_deref() == Ok("production") {
            std::process::exit(1);
        }
        err
    })
}

fn required<G>(get: &G, key: &str, message: &str, errors: &mut Vec<String>) -> String
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(v) => v,
        None => {
            errors.push(format!("{}: {}", key, message));
            String::new()
        }
    }
}

fn check_prefix(value: &str, key: &str, prefix: &str, errors: &mut Vec<String>) {
    if !value.is_empty() && !value.starts_with(prefix) {
        errors.push(format!("{}: must start with {}", key, prefix));
    }
}

fn secret<G>(get: &G, key: &str, label: &str, errors: &mut Vec<String>) -> String
where
    G: Fn(&str) -> Option<String>,
{
    let value = get(key).unwrap_or_default();
    if value.chars().count() < 32 {
        errors.push(format!("{}: {} must be at least 32 characters", key, label));
    }
    value
}

fn optional_prefixed<G>(get: &G, key: &str, prefix: &str, errors: &mut Vec<String>) -> Option<String>
where
    G: Fn(&str) -> Option<String>,
{
    let value = get(key)?;
    check_prefix(&value, key, prefix, errors);
    Some(value)
}

// Upper bound on token lifetimes; keeps `exp` well inside i64 seconds
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

fn duration<G>(get: &G, key: &str, default: &str, errors: &mut Vec<String>) -> Duration
where
    G: Fn(&str) -> Option<String>,
{
    let raw = get(key).unwrap_or_else(|| default.to_string());
    match parse_duration(&raw) {
        Some(d) if d > MAX_TOKEN_LIFETIME => {
            errors.push(format!("{}: duration '{}' exceeds the 10 year maximum", key, raw));
            Duration::ZERO
        }
        Some(d) => d,
        None => {
            errors.push(format!("{}: invalid duration '{}' (expected e.g. 30s, 15m, 12h, 7d)", key, raw));
            Duration::ZERO
        }
    }
}

fn parse_number<G, T>(get: &G, key: &str, default: T, errors: &mut Vec<String>) -> T
where
    G: Fn(&str) -> Option<String>,
    T: std::str::FromStr + Copy,
{
    match get(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            errors.push(format!("{}: expected a number, got '{}'", key, raw));
            default
        }),
    }
}

/// Parse `30s`, `15m`, `12h`, `7d`; a bare number is seconds.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let split = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let amount: u64 = digits.parse().ok()?;
    let multiplier = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => return None,
    };
    Some(Duration::from_secs(amount.checked_mul(multiplier)?))
}
