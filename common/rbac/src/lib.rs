pub mod claims;
pub mod config;
pub mod error;
pub mod extractors;
pub mod guards;
pub mod roles;
pub mod verifier;

pub use claims::Claims;
pub use config::VerifierConfig;
pub use error::{AuthError, AuthResult};
pub use extractors::AuthContext;
pub use guards::{ensure_admin, ensure_role, has_role, is_admin, GuardError};
pub use roles::{DEFAULT_ROLES, ROLE_ADMIN, ROLE_OPERATOR, ROLE_VIEWER};
pub use verifier::TokenVerifier;
