//! Signed session tokens: `base64url(json claims) "." base64url(hmac-sha256)`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::AuthError;

type HmacSha256 = Hmac<Sha256>;
const MAX_TOKEN_LEN: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub username: String,
    /// Expiry, unix seconds.
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    fn mac(&self, payload_part: &str) -> Result<HmacSha256, AuthError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| AuthError::InvalidRequest(e.to_string()))?;
        mac.update(payload_part.as_bytes());
        Ok(mac)
    }

    pub fn issue(&self, sub: &str, username: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = SessionClaims {
            sub: sub.to_string(),
            username: username.to_string(),
            exp: (now + self.ttl).timestamp(),
        };
        let payload = serde_json::to_vec(&claims).map_err(|e| AuthError::InvalidRequest(e.to_string()))?;
        let payload_part = URL_SAFE_NO_PAD.encode(payload);
        let sig_part = URL_SAFE_NO_PAD.encode(self.mac(&payload_part)?.finalize().into_bytes());
        Ok(format!("{}.{}", payload_part, sig_part))
    }

    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, AuthError> {
        if token.len() > MAX_TOKEN_LEN {
            return Err(AuthError::Unauthenticated("token too long".into()));
        }
        let (payload_part, sig_part) = token
            .split_once('.')
            .ok_or_else(|| AuthError::Unauthenticated("malformed token".into()))?;
        let sig = URL_SAFE_NO_PAD
            .decode(sig_part)
            .map_err(|_| AuthError::Unauthenticated("malformed signature".into()))?;
        self.mac(payload_part)?
            .verify_slice(&sig)
            .map_err(|_| AuthError::Unauthenticated("bad signature".into()))?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_part)
            .map_err(|_| AuthError::Unauthenticated("malformed payload".into()))?;
        let claims: SessionClaims = serde_json::from_slice(&payload)
            .map_err(|_| AuthError::Unauthenticated("malformed claims".into()))?;
        if claims.exp <= now.timestamp() {
            return Err(AuthError::Expired);
        }
        Ok(claims)
    }
}
