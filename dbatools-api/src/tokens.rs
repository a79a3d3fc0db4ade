use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;

/// Signing-side token configuration, fixed at process start.
pub struct TokenConfig {
    pub algorithm: Algorithm,
    pub access_ttl_minutes: i64,
}

/// Issues signed, time-bounded bearer tokens. Stateless: there is no
/// revocation list, the expiry claim is the only lifecycle.
pub struct TokenSigner {
    encoding_key: EncodingKey,
    header: Header,
    access_ttl: Duration,
}

pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct AccessClaims<'a> {
    sub: &'a str,
    exp: i64,
    iat: i64,
}

impl TokenSigner {
    pub fn new(secret: &[u8], config: TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            header: Header::new(config.algorithm),
            access_ttl: Duration::minutes(config.access_ttl_minutes),
        }
    }

    /// Sign a token for `subject` that expires `ttl` from now.
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + ttl;

        let claims = AccessClaims {
            sub: subject,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(&self.header, &claims, &self.encoding_key)
            .map_err(|err| anyhow!("Failed to sign access token: {err}"))?;

        Ok(IssuedToken {
            access_token,
            token_type: "bearer",
            expires_in: ttl.num_seconds(),
            expires_at,
        })
    }

    /// Sign an access token with the configured lifetime.
    pub fn issue_access(&self, subject: &str) -> Result<IssuedToken> {
        self.issue(subject, self.access_ttl)
    }
}
