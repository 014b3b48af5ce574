/// Factory: build the token issuer/validator pair from application `Config`.
use std::sync::Arc;

use crate::config::{Config, ConfigError};
use crate::services::auth::clock::{Clock, SystemClock};
use crate::services::auth::jwt::SigningKeys;
use crate::services::auth::token_issuer::TokenIssuer;
use crate::services::auth::token_validator::TokenValidator;

/// Issuer and validator built from the same secret.
#[derive(Clone)]
pub struct TokenServices {
    pub issuer: Arc<TokenIssuer>,
    pub validator: Arc<TokenValidator>,
}

pub fn build_token_services(config: &Config) -> Result<TokenServices, ConfigError> {
    build_token_services_with_clock(config, Arc::new(SystemClock))
}

pub fn build_token_services_with_clock(
    config: &Config,
    clock: Arc<dyn Clock>,
) -> Result<TokenServices, ConfigError> {
    if config.jwt_ttl_seconds == 0 {
        return Err(ConfigError::Invalid("JWT_TTL_SECONDS"));
    }

    let keys = SigningKeys::from_secret(config.jwt_secret.as_bytes())?;

    let issuer = TokenIssuer::new(keys.clone(), config.jwt_ttl_seconds, clock.clone());
    let validator = TokenValidator::new(keys, config.jwt_header_prefix.clone(), clock);

    Ok(TokenServices {
        issuer: Arc::new(issuer),
        validator: Arc::new(validator),
    })
}
