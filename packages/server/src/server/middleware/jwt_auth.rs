use std::sync::Arc;

use axum::{middleware::Next, response::Response};
use tracing::debug;

use crate::common::UserId;
use crate::domains::auth::JwtService;

/// Authenticated user information from JWT
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
}

/// JWT authentication middleware
///
/// Extracts the token from the Authorization header, verifies it, and adds
/// `AuthUser` to request extensions. Requests without a valid token continue
/// anonymously; routes that need a user reject them themselves.
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Some(user) = extract_auth_user(&request, &jwt_service) {
        debug!(user_id = %user.user_id, "Authenticated request");
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}

fn extract_auth_user(
    request: &axum::http::Request<axum::body::Body>,
    jwt_service: &JwtService,
) -> Option<AuthUser> {
    let auth_str = request.headers().get("authorization")?.to_str().ok()?;

    // Accept both "Bearer <token>" and a raw token
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str);

    let claims = jwt_service.verify_token(token).ok()?;

    Some(AuthUser {
        user_id: claims.user_id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(header: Option<String>) -> axum::http::Request<axum::body::Body> {
        let mut builder = axum::http::Request::builder();
        if let Some(value) = header {
            builder = builder.header("authorization", value);
        }
        builder.body(axum::body::Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_token_with_and_without_bearer() {
        let jwt_service = JwtService::new("test_secret", "test_issuer".to_string());
        let token = jwt_service.create_token(UserId::new(5)).unwrap();

        let bearer = extract_auth_user(&request_with(Some(format!("Bearer {}", token))), &jwt_service);
        assert_eq!(bearer, Some(AuthUser { user_id: UserId::new(5) }));

        let raw = extract_auth_user(&request_with(Some(token)), &jwt_service);
        assert_eq!(raw, Some(AuthUser { user_id: UserId::new(5) }));
    }

    #[test]
    fn test_missing_or_invalid_token() {
        let jwt_service = JwtService::new("test_secret", "test_issuer".to_string());

        assert!(extract_auth_user(&request_with(None), &jwt_service).is_none());
        assert!(
            extract_auth_user(&request_with(Some("Bearer nope".to_string())), &jwt_service)
                .is_none()
        );
    }
}
