//! Claims codec: the payload that gets signed into an access token.
//!
//! Wire shape (JSON object inside the JWS payload segment):
//! - `sub`: subject (username)
//! - `roles`: canonical role names, comma-joined (`"STUDENT,TEACHER"`)
//! - `iat` / `exp`: seconds since epoch
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::services::auth::principal::Principal;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenClaims {
    pub sub: String,
    pub roles: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims read back out of a verified payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedClaims {
    pub subject: String,
    pub roles_raw: String,
    pub issued_at: Option<i64>,
    pub expires_at: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("malformed payload: {0}")]
    MalformedPayload(&'static str),
}

pub fn encode_claims(principal: &Principal, issued_at: i64, expires_at: i64) -> TokenClaims {
    // BTreeSet iteration is sorted, so the joined list is deterministic.
    let roles = principal
        .roles
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",");

    TokenClaims {
        sub: principal.subject.clone(),
        roles,
        iat: issued_at,
        exp: expires_at,
    }
}

pub fn decode_claims(payload: &Value) -> Result<DecodedClaims, CodecError> {
    let object = payload
        .as_object()
        .ok_or(CodecError::MalformedPayload("payload is not an object"))?;

    let subject = match object.get("sub") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(_) => return Err(CodecError::MalformedPayload("sub")),
        None => return Err(CodecError::MalformedPayload("missing sub")),
    };

    // Tolerated: a token may carry no roles at all.
    let roles_raw = match object.get("roles") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(_) => return Err(CodecError::MalformedPayload("roles")),
    };

    let expires_at = match object.get("exp") {
        Some(v) => parse_timestamp(v).ok_or(CodecError::MalformedPayload("exp"))?,
        None => return Err(CodecError::MalformedPayload("missing exp")),
    };

    let issued_at = match object.get("iat") {
        Some(Value::Null) | None => None,
        Some(v) => Some(parse_timestamp(v).ok_or(CodecError::MalformedPayload("iat"))?),
    };

    Ok(DecodedClaims {
        subject,
        roles_raw,
        issued_at,
        expires_at,
    })
}

fn parse_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
