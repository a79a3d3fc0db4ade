use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use common_rbac::{TokenVerifier, VerifierConfig};

use crate::config::Settings;
use crate::password::PasswordContext;
use crate::tokens::{TokenConfig, TokenSigner};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub signer: Arc<TokenSigner>,
    pub verifier: Arc<TokenVerifier>,
    pub passwords: Arc<PasswordContext>,
    pub settings: Arc<Settings>,
}

impl AppState {
    pub fn new(db: PgPool, settings: Settings) -> Self {
        let signer = TokenSigner::new(
            settings.secret_key.as_bytes(),
            TokenConfig {
                algorithm: settings.token_algorithm,
                access_ttl_minutes: settings.access_token_expire_minutes,
            },
        );
        let verifier = TokenVerifier::new(
            settings.secret_key.as_bytes(),
            VerifierConfig::new(settings.token_algorithm)
                .with_leeway(settings.token_leeway_seconds),
        );
        let passwords = PasswordContext::new(settings.password_scheme);

        Self {
            db,
            signer: Arc::new(signer),
            verifier: Arc::new(verifier),
            passwords: Arc::new(passwords),
            settings: Arc::new(settings),
        }
    }
}

impl FromRef<AppState> for Arc<TokenVerifier> {
    fn from_ref(state: &AppState) -> Self {
        state.verifier.clone()
    }
}

impl FromRef<AppState> for Arc<TokenSigner> {
    fn from_ref(state: &AppState) -> Self {
        state.signer.clone()
    }
}

impl FromRef<AppState> for Arc<Settings> {
    fn from_ref(state: &AppState) -> Self {
        state.settings.clone()
    }
}
