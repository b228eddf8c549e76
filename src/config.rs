use std::str::FromStr;

use arcade_server_api::HttpConfig;
use arcade_server_domain::credentials::HashConfig;
use chrono::Duration;
use thiserror::Error;

const MIN_BCRYPT_COST: u32 = 4;

const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db_path: String,
    pub jwt_secret: String,
    pub session_ttl: Duration,
    pub hash: HashConfig,
    pub http: HttpConfig,
    pub cookie_secure: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let session_ttl_minutes: i64 = parse_var(&lookup, "ARCADE_SESSION_TTL_MINUTES", "60")?;
        if session_ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                name: "ARCADE_SESSION_TTL_MINUTES",
                value: session_ttl_minutes.to_string(),
            });
        }

        let cost: u32 = parse_var(&lookup, "ARCADE_BCRYPT_COST", "12")?;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
            return Err(ConfigError::Invalid {
                name: "ARCADE_BCRYPT_COST",
                value: cost.to_string(),
            });
        }

        let cors_origins: Vec<String> = lookup("ARCADE_CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();
        // credentialed CORS requires explicit origins
        if let Some(wildcard) = cors_origins.iter().find(|origin| *origin == "*") {
            return Err(ConfigError::Invalid {
                name: "ARCADE_CORS_ORIGINS",
                value: wildcard.clone(),
            });
        }

        Ok(Self {
            db_path: required("ARCADE_DB")?,
            jwt_secret: required("ARCADE_JWT_SECRET")?,
            session_ttl: Duration::minutes(session_ttl_minutes),
            hash: HashConfig { cost },
            http: HttpConfig {
                host: lookup("ARCADE_HTTP_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
                port: parse_var(&lookup, "ARCADE_HTTP_PORT", "8000")?,
                cors_origins,
            },
            cookie_secure: parse_var(&lookup, "ARCADE_COOKIE_SECURE", "false")?,
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: &str,
) -> Result<T, ConfigError> {
    let value = lookup(name).unwrap_or_else(|| default.to_string());
    let parsed = value.trim().parse();
    parsed.map_err(|_| ConfigError::Invalid { name, value })
}
