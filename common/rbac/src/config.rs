use jsonwebtoken::Algorithm;

/// Runtime configuration for token verification.
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Signing algorithm fixed at process start (HS256/HS384/HS512).
    pub algorithm: Algorithm,
    /// Allowable clock skew in seconds when validating exp. Zero unless
    /// explicitly configured.
    pub leeway_seconds: u32,
}

impl VerifierConfig {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            leeway_seconds: 0,
        }
    }

    pub fn with_leeway(mut self, seconds: u32) -> Self {
        self.leeway_seconds = seconds;
        self
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self::new(Algorithm::HS256)
    }
}
