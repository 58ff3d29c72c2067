use std::env;
use std::str::FromStr;

use thiserror::Error;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::apply_security_headers;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/tickets";
const DEV_JWT_SECRET: &str = "dev-only-secret-change-me";

/// Decisions the ticket service leaves to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketPolicy {
    /// Accept only `waiting -> confirmed | canceled`.
    pub strict_transitions: bool,
    /// Return a canceled ticket's quantity to its event.
    pub cancel_restores_capacity: bool,
}

impl Default for TicketPolicy {
    fn default() -> Self {
        Self {
            strict_transitions: true,
            cancel_restores_capacity: false,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET must be set in production")]
    MissingJwtSecret,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expired_hours: i64,
    pub cors_allowed_origins: Option<String>,
    pub production: bool,
    pub ticket_policy: TicketPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let production = env::var("RUST_ENV")
            .map(|v| v.to_lowercase() == "production")
            .unwrap_or(false);

        let jwt_secret = jwt_secret(env::var("JWT_SECRET").ok(), production)?;

        let defaults = TicketPolicy::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 3001),
            jwt_secret,
            jwt_expired_hours: parse_var("JWT_EXPIRED_HOURS", 24),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS").ok(),
            production,
            ticket_policy: TicketPolicy {
                strict_transitions: flag_var(
                    "TICKET_STRICT_TRANSITIONS",
                    defaults.strict_transitions,
                ),
                cancel_restores_capacity: flag_var(
                    "TICKET_CANCEL_RESTORES_CAPACITY",
                    defaults.cancel_restores_capacity,
                ),
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Production refuses to start without a real secret; elsewhere a
/// development secret stands in.
fn jwt_secret(raw: Option<String>, production: bool) -> Result<String, ConfigError> {
    match raw.filter(|secret| !secret.trim().is_empty()) {
        Some(secret) => Ok(secret),
        None if production => Err(ConfigError::MissingJwtSecret),
        None => {
            tracing::warn!("JWT_SECRET not set, using an insecure development secret");
            Ok(DEV_JWT_SECRET.to_string())
        }
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => parse_or(key, &raw, default),
        Err(_) => default,
    }
}

fn parse_or<T: FromStr>(key: &str, raw: &str, default: T) -> T {
    raw.trim().parse().unwrap_or_else(|_| {
        tracing::warn!(key, value = raw, "Ignoring unparsable setting, using default");
        default
    })
}

fn flag_var(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => parse_flag(&raw).unwrap_or_else(|| {
            tracing::warn!(key, value = %raw, "Ignoring unparsable flag, using default");
            default
        }),
        Err(_) => default,
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
