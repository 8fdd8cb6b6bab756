//! Authentication: signing key lifecycle, token issue/verify, passwords.

pub mod jwt;
pub mod password;

use anyhow::Result;
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand_core::OsRng;
use std::path::Path;

use crate::error::ApiError;
use crate::tasks::Principal;
use crate::users::{Role, User};
use self::jwt::{Claims, JwtError};

/// Load the Ed25519 token-signing key, generating one on first start.
///
/// The seed is stored hex-encoded at `{data_dir}/token_key` with user-only
/// read/write permissions (mode 0600 on Unix). The file must be kept
/// secret — anyone holding it can mint valid access tokens.
pub fn get_or_create_signing_key(data_dir: &Path) -> Result<SigningKey> {
    let path = data_dir.join("token_key");

    if path.exists() {
        let hex_seed = std::fs::read_to_string(&path)?.trim().to_string();
        if let Ok(bytes) = hex::decode(&hex_seed) {
            if bytes.len() == 32 {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes);
                return Ok(SigningKey::from_bytes(&seed));
            }
        }
        // Unreadable or truncated key file: regenerate below. Outstanding
        // tokens become invalid, which is the safe direction.
        tracing::warn!("token_key file is malformed; generating a new signing key");
    }

    let key = SigningKey::generate(&mut OsRng);

    std::fs::create_dir_all(data_dir)?;
    std::fs::write(&path, hex::encode(key.to_bytes()))?;

    // Restrict to owner read/write only on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(key)
}

/// Issues and verifies access tokens for one daemon instance.
pub struct TokenSigner {
    signing_key: SigningKey,
    verifying_key: VerifyingKey,
    ttl_secs: i64,
}

impl TokenSigner {
    pub fn new(signing_key: SigningKey, ttl_secs: i64) -> Self {
        let verifying_key = signing_key.verifying_key();
        Self {
            signing_key,
            verifying_key,
            ttl_secs,
        }
    }

    /// Mint an access token for a user.
    pub fn issue(&self, user: &User) -> String {
        let claims = Claims::new(user.id.as_str(), user.role.as_str(), self.ttl_secs);
        jwt::encode(&claims, &self.signing_key)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        jwt::decode(token, &self.verifying_key)
    }

    /// Verify a token and resolve it to a principal. Any token problem maps
    /// to `Unauthenticated` — callers never learn which check failed.
    pub fn principal_for(&self, token: &str) -> Result<Principal, ApiError> {
        let claims = self.verify(token).map_err(|_| ApiError::Unauthenticated)?;
        Ok(Principal {
            id: claims.sub,
            role: Role::parse(&claims.role),
        })
    }
}

/// Extract the token from a `Bearer <token>` authorization header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value.strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_user(role: &str) -> User {
        User {
            id: "u1".to_string(),
            email: "a@example.com".to_string(),
            password_hash: String::new(),
            is_active: true,
            role: role.to_string(),
            created_at: 0,
        }
    }

    #[test]
    fn key_persists_across_loads() {
        let dir = tempdir().unwrap();
        let k1 = get_or_create_signing_key(dir.path()).unwrap();
        let k2 = get_or_create_signing_key(dir.path()).unwrap();
        assert_eq!(k1.to_bytes(), k2.to_bytes());
    }

    #[test]
    fn malformed_key_file_regenerates() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("token_key"), "zz-not-hex").unwrap();
        let key = get_or_create_signing_key(dir.path()).unwrap();
        // The new key is persisted and stable.
        let again = get_or_create_signing_key(dir.path()).unwrap();
        assert_eq!(key.to_bytes(), again.to_bytes());
    }

    #[test]
    fn issue_and_resolve_principal() {
        let signer = TokenSigner::new(SigningKey::generate(&mut OsRng), 3600);
        let token = signer.issue(&test_user("admin"));
        let principal = signer.principal_for(&token).unwrap();
        assert_eq!(principal.id, "u1");
        assert_eq!(principal.role, Role::Admin);
    }

    #[test]
    fn bad_token_is_unauthenticated() {
        let signer = TokenSigner::new(SigningKey::generate(&mut OsRng), 3600);
        assert!(matches!(
            signer.principal_for("garbage"),
            Err(ApiError::Unauthenticated)
        ));
    }

    #[test]
    fn bearer_prefix_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token(""), None);
    }
}
