//! Authentication middleware for Axum

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::application::Actor;
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig, TokenClaims};

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
    InsufficientPermissions,
}

/// Authentication state containing the JWT config
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Employee identity taken from a verified token
#[derive(Clone, Debug)]
pub struct AuthenticatedEmployee {
    /// Primary key of the employee row
    pub id: i32,
    /// Staff number
    pub employee_id: String,
    pub role: String,
    pub is_admin: bool,
}

impl AuthenticatedEmployee {
    pub fn from_claims(claims: TokenClaims) -> Option<Self> {
        let id = claims.employee_pk()?;
        Some(Self {
            id,
            employee_id: claims.employee_id,
            role: claims.role,
            is_admin: claims.is_admin,
        })
    }

    pub fn actor(&self) -> Actor {
        Actor {
            id: self.id,
            is_admin: self.is_admin,
        }
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// JWT authentication middleware
///
/// Inserts [`AuthenticatedEmployee`] into the request extensions.
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(auth_header) = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return auth_error_response(AuthError::MissingToken);
    };

    let Some(token) = extract_token(auth_header) else {
        return auth_error_response(AuthError::InvalidToken);
    };

    match verify_token(token, &auth_state.jwt_config) {
        Ok(claims) => {
            if claims.is_expired() {
                return auth_error_response(AuthError::ExpiredToken);
            }
            let Some(employee) = AuthenticatedEmployee::from_claims(claims) else {
                return auth_error_response(AuthError::InvalidToken);
            };
            request.extensions_mut().insert(employee);
            next.run(request).await
        }
        Err(_) => auth_error_response(AuthError::InvalidToken),
    }
}

/// Rejects non-admin employees with 403. Layer it inside `auth_middleware`.
pub async fn admin_only_middleware(request: Request<Body>, next: Next) -> Response {
    match request.extensions().get::<AuthenticatedEmployee>() {
        Some(employee) if employee.is_admin => next.run(request).await,
        Some(_) => auth_error_response(AuthError::InsufficientPermissions),
        None => auth_error_response(AuthError::MissingToken),
    }
}

fn auth_error_response(error: AuthError) -> Response {
    let (status, message) = match error {
        AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid authentication token"),
        AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Token has expired"),
        AuthError::InsufficientPermissions => (StatusCode::FORBIDDEN, "Admin access required"),
    };

    let body = Json(json!({
        "success": false,
        "data": null,
        "error": message
    }));

    (status, body).into_response()
}
