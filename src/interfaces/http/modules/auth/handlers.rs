//! Authentication API handlers

use axum::{extract::State, Json};

use super::dto::{LoginRequest, LoginResponse};
use crate::interfaces::http::common::{domain_error, ApiError, ApiResponse, EmptyData, ValidatedJson};
use crate::interfaces::http::modules::employees::{EmployeeAppState, EmployeeDto};

#[utoipa::path(
    post,
    path = "/api/v1/employees/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<EmployeeAppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError<LoginResponse>> {
    let auth = state
        .employees
        .login(&request.username, &request.password)
        .await
        .map_err(domain_error)?;

    Ok(Json(ApiResponse::success(LoginResponse {
        token: auth.token,
        token_type: auth.token_type,
        expires_in: auth.expires_in,
        employee: EmployeeDto::from(auth.employee),
    })))
}

/// Tokens are stateless; the client discards its copy.
#[utoipa::path(
    post,
    path = "/api/v1/employees/auth/logout",
    tag = "Authentication",
    responses((status = 200, description = "Logged out", body = ApiResponse<EmptyData>))
)]
pub async fn logout() -> Json<ApiResponse<EmptyData>> {
    Json(ApiResponse::success(EmptyData {}))
}
