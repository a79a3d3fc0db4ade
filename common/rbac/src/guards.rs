use axum::http::StatusCode;

use crate::roles::ROLE_ADMIN;

/// Authorization failures raised by the guard predicates. Pure data; the
/// routing layer converts them to responses.
#[derive(Debug, Clone)]
pub enum GuardError {
    Forbidden { required: Vec<String> },
}

impl GuardError {
    pub fn into_response(self) -> (StatusCode, String) {
        match self {
            GuardError::Forbidden { required } => (
                StatusCode::FORBIDDEN,
                if required.is_empty() {
                    "Insufficient privileges".to_string()
                } else {
                    format!("Insufficient role. Required one of: {}", required.join(", "))
                },
            ),
        }
    }
}

impl From<GuardError> for (StatusCode, String) {
    fn from(value: GuardError) -> Self {
        value.into_response()
    }
}

/// True when the caller holds the named role.
pub fn has_role(roles: &[String], role: &str) -> bool {
    roles.iter().any(|value| value == role)
}

/// True when the caller is a superuser or holds the admin role. The
/// superuser flag bypasses role checks entirely.
pub fn is_admin(is_superuser: bool, roles: &[String]) -> bool {
    is_superuser || has_role(roles, ROLE_ADMIN)
}

pub fn ensure_role(roles: &[String], required: &str) -> Result<(), GuardError> {
    if has_role(roles, required) {
        Ok(())
    } else {
        Err(GuardError::Forbidden {
            required: vec![required.to_string()],
        })
    }
}

pub fn ensure_admin(is_superuser: bool, roles: &[String]) -> Result<(), GuardError> {
    if is_admin(is_superuser, roles) {
        Ok(())
    } else {
        Err(GuardError::Forbidden {
            required: vec![ROLE_ADMIN.to_string()],
        })
    }
}
