//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;

use chrono::{FixedOffset, Offset, Utc};

use super::constants::{
    DEFAULT_BCRYPT_COST, DEFAULT_BUSINESS_UTC_OFFSET_MINUTES, DEFAULT_CORS_ORIGINS,
    DEFAULT_DATABASE_URL, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    MIN_JWT_SECRET_LENGTH,
};
use crate::errors::{AppError, AppResult};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub business_utc_offset_minutes: i32,
    pub bcrypt_cost: u32,
    pub auto_migrate: bool,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("cors_origins", &self.cors_origins)
            .field("business_utc_offset_minutes", &self.business_utc_offset_minutes)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("auto_migrate", &self.auto_migrate)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Fails if JWT_SECRET is missing in release builds or is too short.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            }
            Err(_) => {
                return Err(AppError::internal(
                    "JWT_SECRET environment variable must be set in production",
                ))
            }
        };

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::internal(format!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret,
            jwt_expiration_hours: parse_var("JWT_EXPIRATION_HOURS", DEFAULT_JWT_EXPIRATION_HOURS),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT),
            cors_origins: parse_origins(
                &env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string()),
            ),
            business_utc_offset_minutes: parse_var(
                "BUSINESS_UTC_OFFSET_MINUTES",
                DEFAULT_BUSINESS_UTC_OFFSET_MINUTES,
            ),
            bcrypt_cost: parse_var("BCRYPT_COST", DEFAULT_BCRYPT_COST),
            auto_migrate: parse_var("AUTO_MIGRATE", false),
        })
    }

    /// Build a configuration for tests and tooling with an explicit secret.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            jwt_secret: jwt_secret.into(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            cors_origins: parse_origins(DEFAULT_CORS_ORIGINS),
            business_utc_offset_minutes: DEFAULT_BUSINESS_UTC_OFFSET_MINUTES,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            auto_migrate: false,
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Offset that defines the local business day.
    pub fn business_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.business_utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_trims_and_skips_empty() {
        let origins = parse_origins("http://localhost:5173, https://sigb.cl,,");
        assert_eq!(origins, vec!["http://localhost:5173", "https://sigb.cl"]);
    }

    #[test]
    fn test_business_offset_defaults_to_chile() {
        let config = Config::with_secret("test-secret-key-for-testing-only-32chars");
        assert_eq!(config.business_offset().local_minus_utc(), -180 * 60);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::with_secret("test-secret-key-for-testing-only-32chars");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("test-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
