//! Employee API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    ChangePasswordRequest, CreateEmployeeRequest, DateRangeQuery, EmployeeDto,
    EmployeeSearchQuery, UpdateEmployeeRequest,
};
use crate::application::{EmployeeService, SummaryService};
use crate::domain::LedgerRow;
use crate::interfaces::http::common::{
    domain_error, ApiError, ApiResponse, EmptyData, PaginatedResponse, PaginationParams,
    ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedEmployee;
use crate::shared::{normalize_page, DomainError};

/// Employee handler state
#[derive(Clone)]
pub struct EmployeeAppState {
    pub employees: Arc<EmployeeService>,
    pub summary: Arc<SummaryService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/employees",
    tag = "Employees",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = ApiResponse<EmployeeDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin access required"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_employee(
    State(state): State<EmployeeAppState>,
    ValidatedJson(body): ValidatedJson<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EmployeeDto>>), ApiError<EmployeeDto>> {
    let employee = state
        .employees
        .create_employee(body.into())
        .await
        .map_err(domain_error)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(EmployeeDto::from(employee))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees",
    tag = "Employees",
    params(EmployeeSearchQuery),
    responses((status = 200, description = "Matching employees", body = ApiResponse<Vec<EmployeeDto>>)),
    security(("bearer_auth" = []))
)]
pub async fn search_employees(
    State(state): State<EmployeeAppState>,
    Query(query): Query<EmployeeSearchQuery>,
) -> Result<Json<ApiResponse<Vec<EmployeeDto>>>, ApiError<Vec<EmployeeDto>>> {
    let term = query.q.unwrap_or_default();
    let employees = state
        .employees
        .search_employees(term.trim())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        employees.into_iter().map(EmployeeDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees/get-all",
    tag = "Employees",
    params(PaginationParams),
    responses((status = 200, description = "Page of employees", body = ApiResponse<PaginatedResponse<EmployeeDto>>)),
    security(("bearer_auth" = []))
)]
pub async fn list_employees(
    State(state): State<EmployeeAppState>,
    Query(params): Query<PaginationParams>,
) -> Result<
    Json<ApiResponse<PaginatedResponse<EmployeeDto>>>,
    ApiError<PaginatedResponse<EmployeeDto>>,
> {
    let (page, limit) = normalize_page(Some(params.page), Some(params.limit));
    let result = state
        .employees
        .list_employees(page, limit)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(PaginatedResponse::from_result(
        result,
        EmployeeDto::from,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees/summary",
    tag = "Reports",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Ledger rows for stays within the range", body = ApiResponse<Vec<LedgerRow>>),
        (status = 400, description = "Missing or inverted range")
    ),
    security(("bearer_auth" = []))
)]
pub async fn employee_summary(
    State(state): State<EmployeeAppState>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<ApiResponse<Vec<LedgerRow>>>, ApiError<Vec<LedgerRow>>> {
    let (Some(start), Some(end)) = (range.start, range.end) else {
        return Err(domain_error(DomainError::Validation(
            "start and end are required".into(),
        )));
    };
    let rows = state
        .summary
        .ledger(start, end)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(rows)))
}

#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    tag = "Employees",
    params(("id" = i32, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee", body = ApiResponse<EmployeeDto>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_employee(
    State(state): State<EmployeeAppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<EmployeeDto>>, ApiError<EmployeeDto>> {
    let employee = state.employees.get_employee(id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(EmployeeDto::from(employee))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/employees/{id}",
    tag = "Employees",
    params(("id" = i32, Path, description = "Employee id")),
    request_body = UpdateEmployeeRequest,
    responses(
        (status = 200, description = "Employee updated", body = ApiResponse<EmployeeDto>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_employee(
    State(state): State<EmployeeAppState>,
    Path(id): Path<i32>,
    ValidatedJson(body): ValidatedJson<UpdateEmployeeRequest>,
) -> Result<Json<ApiResponse<EmployeeDto>>, ApiError<EmployeeDto>> {
    let employee = state
        .employees
        .update_employee(id, body.into())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(EmployeeDto::from(employee))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/employees/{id}",
    tag = "Employees",
    params(("id" = i32, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee deleted", body = ApiResponse<EmptyData>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_employee(
    State(state): State<EmployeeAppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError<EmptyData>> {
    state
        .employees
        .delete_employee(id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}

#[utoipa::path(
    patch,
    path = "/api/v1/employees/{id}/changePassword",
    tag = "Employees",
    params(("id" = i32, Path, description = "Employee id")),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<EmptyData>),
        (status = 400, description = "Passwords do not match or too short"),
        (status = 403, description = "Not your account")
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_password(
    State(state): State<EmployeeAppState>,
    Extension(current): Extension<AuthenticatedEmployee>,
    Path(id): Path<i32>,
    ValidatedJson(body): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError<EmptyData>> {
    state
        .employees
        .change_password(current.actor(), id, &body.password, &body.confirm_password)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}
