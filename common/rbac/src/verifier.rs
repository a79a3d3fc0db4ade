use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, DecodingKey, Validation};
use tracing::debug;

use crate::claims::{Claims, ClaimsRepr};
use crate::config::VerifierConfig;
use crate::error::{AuthError, AuthResult};

/// Verifies bearer tokens signed with the process-wide symmetric key.
///
/// Signature comparison is constant-time inside jsonwebtoken; this layer
/// only classifies failures into the expired / mis-signed / malformed
/// taxonomy so callers never learn more than "the token was rejected".
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &[u8], config: VerifierConfig) -> Self {
        let mut validation = Validation::new(config.algorithm);
        validation.leeway = config.leeway_seconds.into();
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Verify the token and return its claims. The subject comes back
    /// exactly as it was issued.
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let data = decode::<ClaimsRepr>(token, &self.decoding_key, &self.validation)
            .map_err(classify_error)?;
        let claims = Claims::try_from(data.claims)?;
        debug!(subject = %claims.subject, "verified bearer token");
        Ok(claims)
    }
}

fn classify_error(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::InvalidSignature,
        _ => AuthError::Malformed(err.to_string()),
    }
}
