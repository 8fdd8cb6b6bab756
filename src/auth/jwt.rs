//! Access tokens: Ed25519-signed JWTs (EdDSA).
//!
//! Standard RFC 7519 layout:
//! - Header: `{"alg":"EdDSA","typ":"JWT"}`
//! - Payload: Claims (sub, role, iat, exp)
//! - Signature: Ed25519 over `base64url(header).base64url(payload)`

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT header (static for EdDSA)
const JWT_HEADER: &str = r#"{"alg":"EdDSA","typ":"JWT"}"#;

/// Clock skew tolerance for `iat` checks, in seconds.
const IAT_TOLERANCE_SECS: i64 = 60;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token format")]
    InvalidFormat,

    #[error("Invalid base64 encoding")]
    InvalidBase64,

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token expired")]
    Expired,

    #[error("Token not yet valid")]
    NotYetValid,
}

/// Token claims. `sub` is the user id, `role` the stored role string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(sub: impl Into<String>, role: impl Into<String>, ttl_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: sub.into(),
            role: role.into(),
            iat: now,
            exp: now + ttl_secs,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.exp < Utc::now().timestamp()
    }
}

/// Encode and sign claims into a JWT.
pub fn encode(claims: &Claims, signing_key: &SigningKey) -> String {
    let header_b64 = URL_SAFE_NO_PAD.encode(JWT_HEADER);
    let payload_json = serde_json::to_string(claims).unwrap_or_else(|e| {
        tracing::error!("JWT claims serialization failed: {}", e);
        "{}".to_owned()
    });
    let payload_b64 = URL_SAFE_NO_PAD.encode(&payload_json);

    let signing_input = format!("{header_b64}.{payload_b64}");
    let signature = signing_key.sign(signing_input.as_bytes());
    let signature_b64 = URL_SAFE_NO_PAD.encode(signature.to_bytes());

    format!("{signing_input}.{signature_b64}")
}

/// Decode and verify a JWT. Returns the claims if the signature checks out
/// and the token is inside its validity window.
pub fn decode(token: &str, verifying_key: &VerifyingKey) -> Result<Claims, JwtError> {
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(JwtError::InvalidFormat);
    }

    // Verify the signature before touching the payload.
    let signing_input = format!("{}.{}", parts[0], parts[1]);
    let signature_bytes = URL_SAFE_NO_PAD
        .decode(parts[2])
        .map_err(|_| JwtError::InvalidBase64)?;
    if signature_bytes.len() != 64 {
        return Err(JwtError::InvalidSignature);
    }
    let mut sig_array = [0u8; 64];
    sig_array.copy_from_slice(&signature_bytes);
    let signature = Signature::from_bytes(&sig_array);

    verifying_key
        .verify(signing_input.as_bytes(), &signature)
        .map_err(|_| JwtError::InvalidSignature)?;

    let payload_bytes = URL_SAFE_NO_PAD
        .decode(parts[1])
        .map_err(|_| JwtError::InvalidBase64)?;
    let claims: Claims = serde_json::from_slice(&payload_bytes)
        .map_err(|e| JwtError::InvalidJson(e.to_string()))?;

    if claims.is_expired() {
        return Err(JwtError::Expired);
    }
    if claims.iat > Utc::now().timestamp() + IAT_TOLERANCE_SECS {
        return Err(JwtError::NotYetValid);
    }

    Ok(claims)
}
