use crate::error::{AppError, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::{RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use uuid::Uuid;

/// Access-token claims. `jti` makes every mint distinct even for the same
/// user within the same second.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
    pub uid: Uuid,
}

impl Claims {
    pub fn new(user_id: Uuid, issued_at: OffsetDateTime, expires_at: OffsetDateTime) -> Self {
        Self { jti: Uuid::new_v4(), iat: issued_at.unix_timestamp(), exp: expires_at.unix_timestamp(), uid: user_id }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub value: String,
    pub expires_at: OffsetDateTime,
}

/// Transient value handed to the HTTP layer; only the refresh side is
/// persisted, and only as a hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub used_at: Option<OffsetDateTime>,
}

pub struct OpaqueToken;

impl OpaqueToken {
    /// 16 bytes of CSPRNG output, hex-encoded (32 chars).
    pub fn generate() -> String {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// SHA-256 hash for at-rest storage; the raw token never touches the DB.
    pub fn hash(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}

pub struct Password;

impl Password {
    /// SHA-256 pre-digest bounds the KDF input length, then argon2 with a
    /// fresh salt.
    pub fn hash(password: &str) -> Result<String> {
        let digest = Sha256::digest(password.as_bytes());
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(digest.as_slice(), &salt)
            .map_err(|_| AppError::Internal)?
            .to_string();
        Ok(hash)
    }

    /// Constant-time verification of a candidate against a stored hash.
    pub fn verify(password: &str, hash: &str) -> Result<bool> {
        let digest = Sha256::digest(password.as_bytes());
        let parsed = PasswordHash::new(hash).map_err(|_| AppError::Internal)?;
        Ok(Argon2::default().verify_password(digest.as_slice(), &parsed).is_ok())
    }
}
