// Session token issue/verify (HS256)

use crate::core::errors::ServiceError;
use crate::core::models::{Identity, Role, User};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims embedded in a session token
///
/// Field names match the wire format clients see (`userId` is camel case).
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies signed session tokens
///
/// Tokens are never persisted; validity is signature plus expiry only.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: ttl_secs as i64,
        }
    }

    /// Sign a token for an authenticated user
    pub fn issue(&self, user: &User) -> Result<String, ServiceError> {
        let now = Utc::now();
        let claims = Claims {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::ConfigError(format!("Failed to sign token: {}", e)))
    }

    /// Verify signature and expiry, returning the decoded identity
    ///
    /// Every failure mode (bad signature, expired, garbage input) collapses
    /// to `Unauthenticated`; the caller decides the status code.
    pub fn verify(&self, token: &str) -> Result<Identity, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| ServiceError::Unauthenticated)?;

        Ok(Identity {
            user_id: data.claims.user_id,
            username: data.claims.username,
            role: data.claims.role,
        })
    }
}
