use axum::http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token has expired")]
    Expired,
    #[error("token signature does not match")]
    InvalidSignature,
    #[error("token is malformed: {0}")]
    Malformed(String),
    #[error("invalid claim '{0}' with value '{1}'")]
    InvalidClaim(&'static str, String),
    #[error("authorization header missing")]
    MissingAuthorization,
    #[error("authorization header malformed")]
    InvalidAuthorization,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let code = match &self {
            AuthError::Expired => "TOKEN_EXPIRED",
            AuthError::InvalidSignature | AuthError::Malformed(_) => "TOKEN_INVALID",
            AuthError::InvalidClaim(_, _) => "TOKEN_CLAIMS",
            AuthError::MissingAuthorization | AuthError::InvalidAuthorization => "AUTH_HEADER",
        };

        let body = ErrorBody {
            code,
            message: self.to_string(),
        };
        let mut response = (StatusCode::UNAUTHORIZED, Json(body)).into_response();
        response
            .headers_mut()
            .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: AuthError) -> serde_json::Value {
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(WWW_AUTHENTICATE),
            Some(&HeaderValue::from_static("Bearer"))
        );
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn expired_token_answers_401_with_challenge() {
        let body = body_json(AuthError::Expired).await;
        assert_eq!(body["code"], "TOKEN_EXPIRED");
        assert_eq!(body["message"], "token has expired");
    }

    #[tokio::test]
    async fn signature_and_parse_failures_share_one_code() {
        let body = body_json(AuthError::InvalidSignature).await;
        assert_eq!(body["code"], "TOKEN_INVALID");

        let body = body_json(AuthError::Malformed("bad segment count".to_string())).await;
        assert_eq!(body["code"], "TOKEN_INVALID");
    }
}
