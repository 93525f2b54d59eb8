//! Customer API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{CreateCustomerRequest, CustomerDto, FindByNameQuery, UpdateCustomerRequest};
use crate::application::BookingService;
use crate::domain::booking::BookingFilter;
use crate::domain::{DomainError, RepositoryProvider};
use crate::interfaces::http::common::{
    domain_error, ApiError, ApiResponse, EmptyData, PaginatedResponse, PaginationParams,
    ValidatedJson,
};
use crate::interfaces::http::modules::bookings::BookingDto;
use crate::shared::normalize_page;

/// Customer handler state
#[derive(Clone)]
pub struct CustomerAppState {
    pub repos: Arc<dyn RepositoryProvider>,
    pub bookings: Arc<BookingService>,
}

#[utoipa::path(
    post,
    path = "/api/v1/customers",
    tag = "Customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = ApiResponse<CustomerDto>),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_customer(
    State(state): State<CustomerAppState>,
    ValidatedJson(body): ValidatedJson<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CustomerDto>>), ApiError<CustomerDto>> {
    let customer = state
        .repos
        .customers()
        .create(body.into())
        .await
        .map_err(domain_error)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CustomerDto::from(customer))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/customers",
    tag = "Customers",
    params(PaginationParams),
    responses((status = 200, description = "Page of customers", body = ApiResponse<PaginatedResponse<CustomerDto>>)),
    security(("bearer_auth" = []))
)]
pub async fn list_customers(
    State(state): State<CustomerAppState>,
    Query(params): Query<PaginationParams>,
) -> Result<
    Json<ApiResponse<PaginatedResponse<CustomerDto>>>,
    ApiError<PaginatedResponse<CustomerDto>>,
> {
    let (page, limit) = normalize_page(Some(params.page), Some(params.limit));
    let result = state
        .repos
        .customers()
        .find_all(page, limit)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(PaginatedResponse::from_result(
        result,
        CustomerDto::from,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/customers/search/findByName",
    tag = "Customers",
    params(FindByNameQuery),
    responses((status = 200, description = "Matching customers", body = ApiResponse<Vec<CustomerDto>>)),
    security(("bearer_auth" = []))
)]
pub async fn find_customers_by_name(
    State(state): State<CustomerAppState>,
    Query(query): Query<FindByNameQuery>,
) -> Result<Json<ApiResponse<Vec<CustomerDto>>>, ApiError<Vec<CustomerDto>>> {
    let term = query.name.unwrap_or_default();
    let customers = state
        .repos
        .customers()
        .search(term.trim())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        customers.into_iter().map(CustomerDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}",
    tag = "Customers",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer", body = ApiResponse<CustomerDto>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_customer(
    State(state): State<CustomerAppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<CustomerDto>>, ApiError<CustomerDto>> {
    match state.repos.customers().find_by_id(id).await {
        Ok(Some(customer)) => Ok(Json(ApiResponse::success(CustomerDto::from(customer)))),
        Ok(None) => Err(domain_error(DomainError::not_found("Customer", id))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/customers/{id}",
    tag = "Customers",
    params(("id" = i32, Path, description = "Customer id")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = ApiResponse<CustomerDto>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_customer(
    State(state): State<CustomerAppState>,
    Path(id): Path<i32>,
    ValidatedJson(body): ValidatedJson<UpdateCustomerRequest>,
) -> Result<Json<ApiResponse<CustomerDto>>, ApiError<CustomerDto>> {
    match state.repos.customers().update(id, body.into()).await {
        Ok(Some(customer)) => Ok(Json(ApiResponse::success(CustomerDto::from(customer)))),
        Ok(None) => Err(domain_error(DomainError::not_found("Customer", id))),
        Err(e) => Err(domain_error(e)),
    }
}

/// Bookings of the customer are kept and detached.
#[utoipa::path(
    delete,
    path = "/api/v1/customers/{id}",
    tag = "Customers",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer deleted", body = ApiResponse<EmptyData>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_customer(
    State(state): State<CustomerAppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError<EmptyData>> {
    match state.repos.customers().delete(id).await {
        Ok(true) => Ok(Json(ApiResponse::success(EmptyData {}))),
        Ok(false) => Err(domain_error(DomainError::not_found("Customer", id))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}/bookings",
    tag = "Customers",
    params(("id" = i32, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Bookings of the customer, newest first", body = ApiResponse<Vec<BookingDto>>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn customer_bookings(
    State(state): State<CustomerAppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<BookingDto>>>, ApiError<Vec<BookingDto>>> {
    if state
        .repos
        .customers()
        .find_by_id(id)
        .await
        .map_err(domain_error)?
        .is_none()
    {
        return Err(domain_error(DomainError::not_found("Customer", id)));
    }

    let filter = BookingFilter {
        customer_id: Some(id),
        ..Default::default()
    };
    let bookings = state
        .bookings
        .list_bookings(&filter)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        bookings.into_iter().map(BookingDto::from).collect(),
    )))
}
