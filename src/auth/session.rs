use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Identity;

const MIN_SECRET_LEN: usize = 32;

/// Claims carried by an owner-plane bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// A token issued at login.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Signing state for owner-plane bearer tokens. Built once at startup and
/// shared read-only.
pub struct SigningConfig {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SigningConfig {
    pub fn new(secret: &[u8], ttl: Duration) -> Result<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(Error::Config(format!(
                "signing secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        if ttl <= Duration::zero() {
            return Err(Error::Config("session ttl must be positive".to_string()));
        }
        if Utc::now().checked_add_signed(ttl).is_none() {
            return Err(Error::Config("session ttl is out of range".to_string()));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        })
    }

    pub fn issue(&self, identity: &Identity) -> Result<IssuedToken> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| Error::Config("session ttl is out of range".to_string()))?;
        let claims = Claims {
            sub: identity.id,
            username: identity.username.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("failed to sign token: {e}")))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verifies signature and expiry. Every failure is `Unauthorized`.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Rejected bearer token: {e}");
                Error::Unauthorized
            })
    }
}
