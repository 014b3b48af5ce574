/*
 * Responsibility
 * - Load environment variables and settings (PORT, DATABASE_URL, CORS allowlist, JWT settings)
 * - Validate them up front (a missing signing secret fails startup)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::HeaderName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw
            .unwrap_or("development")
            .trim()
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

#[derive(Debug, PartialEq, Eq)]
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

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    // None => in-memory store (development only)
    pub database_url: Option<String>,
    pub cors_allowed_origins: Vec<String>,

    // HMAC secret shared by the issuer and the validator
    pub jwt_secret: String,
    pub jwt_ttl_seconds: u64,
    pub jwt_header_prefix: String,
    pub jwt_header_name: HeaderName,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print the signing secret or credentials embedded in the database url
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("database", &self.database_url.as_ref().map(|_| "postgres"))
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("jwt_ttl_seconds", &self.jwt_ttl_seconds)
            .field("jwt_header_prefix", &self.jwt_header_prefix)
            .field("jwt_header_name", &self.jwt_header_name)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// `from_env` delegates here; tests pass a map instead of touching the process environment.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 8080,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());

        let database_url = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty());
        if database_url.is_none() && app_env.is_production() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }

        let jwt_ttl_seconds = match lookup("JWT_TTL_SECONDS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ttl| *ttl > 0)
                .ok_or(ConfigError::Invalid("JWT_TTL_SECONDS"))?,
            None => 3600, // 1 hour
        };

        let jwt_header_prefix = lookup("JWT_HEADER_PREFIX").unwrap_or_else(|| "Bearer ".to_string());
        if jwt_header_prefix.is_empty() {
            return Err(ConfigError::Invalid("JWT_HEADER_PREFIX"));
        }

        let jwt_header_name = match lookup("JWT_HEADER_NAME") {
            Some(raw) => HeaderName::from_str(raw.trim().to_ascii_lowercase().as_str())
                .map_err(|_| ConfigError::Invalid("JWT_HEADER_NAME"))?,
            None => axum::http::header::AUTHORIZATION,
        };

        Ok(Self {
            addr,
            app_env,
            database_url,
            cors_allowed_origins,
            jwt_secret,
            jwt_ttl_seconds,
            jwt_header_prefix,
            jwt_header_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = config_from(&[("JWT_SECRET", "s3cret")]).expect("config");

        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.app_env, AppEnv::Development);
        assert!(config.database_url.is_none());
        assert_eq!(config.jwt_ttl_seconds, 3600);
        assert_eq!(config.jwt_header_prefix, "Bearer ");
        assert_eq!(config.jwt_header_name, axum::http::header::AUTHORIZATION);
    }

    #[test]
    fn missing_secret_is_fatal() {
        let err = config_from(&[]).err().expect("must fail");
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn empty_secret_is_fatal() {
        let err = config_from(&[("JWT_SECRET", "")]).err().expect("must fail");
        assert_eq!(err, ConfigError::Invalid("JWT_SECRET"));
    }

    #[test]
    fn zero_ttl_is_rejected() {
        let err = config_from(&[("JWT_SECRET", "k"), ("JWT_TTL_SECONDS", "0")])
            .err()
            .expect("must fail");
        assert_eq!(err, ConfigError::Invalid("JWT_TTL_SECONDS"));
    }

    #[test]
    fn production_requires_database_url() {
        let err = config_from(&[("JWT_SECRET", "k"), ("APP_ENV", "prod")])
            .err()
            .expect("must fail");
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let config = config_from(&[
            ("JWT_SECRET", "k"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, ,http://b.test "),
        ])
        .expect("config");

        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn debug_output_hides_secret() {
        let config = config_from(&[("JWT_SECRET", "very-secret-value")]).expect("config");
        let printed = format!("{config:?}");
        assert!(!printed.contains("very-secret-value"));
    }
}
