//! Room API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{BookedDatesResponse, CreateRoomRequest, RoomDto, RoomSearchQuery, UpdateRoomRequest};
use crate::application::BookingService;
use crate::domain::room::RoomSearch;
use crate::domain::{DomainError, RepositoryProvider};
use crate::interfaces::http::common::{domain_error, ApiError, ApiResponse, ValidatedJson};

/// Room handler state
#[derive(Clone)]
pub struct RoomAppState {
    pub repos: Arc<dyn RepositoryProvider>,
    pub bookings: Arc<BookingService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/rooms",
    tag = "Rooms",
    params(RoomSearchQuery),
    responses(
        (status = 200, description = "Rooms matching the filter", body = ApiResponse<Vec<RoomDto>>),
        (status = 400, description = "Unknown filter")
    ),
    security(("bearer_auth" = []))
)]
pub async fn search_rooms(
    State(state): State<RoomAppState>,
    Query(query): Query<RoomSearchQuery>,
) -> Result<Json<ApiResponse<Vec<RoomDto>>>, ApiError<Vec<RoomDto>>> {
    let criteria = RoomSearch::from_query(query.filter.as_deref(), query.value.as_deref())
        .map_err(domain_error)?;
    let rooms = state
        .repos
        .rooms()
        .search(criteria)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        rooms.into_iter().map(RoomDto::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/rooms",
    tag = "Rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created", body = ApiResponse<RoomDto>),
        (status = 400, description = "Validation error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_room(
    State(state): State<RoomAppState>,
    ValidatedJson(body): ValidatedJson<CreateRoomRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RoomDto>>), ApiError<RoomDto>> {
    let new_room = body.into_new_room().map_err(domain_error)?;
    let room = state
        .repos
        .rooms()
        .create(new_room)
        .await
        .map_err(domain_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(RoomDto::from(room)))))
}

#[utoipa::path(
    get,
    path = "/api/v1/rooms/categories",
    tag = "Rooms",
    responses((status = 200, description = "Distinct room categories", body = ApiResponse<Vec<String>>)),
    security(("bearer_auth" = []))
)]
pub async fn room_categories(
    State(state): State<RoomAppState>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError<Vec<String>>> {
    let categories = state
        .repos
        .rooms()
        .categories()
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(categories)))
}

#[utoipa::path(
    get,
    path = "/api/v1/rooms/{id}",
    tag = "Rooms",
    params(("id" = i32, Path, description = "Room id")),
    responses(
        (status = 200, description = "Room", body = ApiResponse<RoomDto>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_room(
    State(state): State<RoomAppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<RoomDto>>, ApiError<RoomDto>> {
    match state.repos.rooms().find_by_id(id).await {
        Ok(Some(room)) => Ok(Json(ApiResponse::success(RoomDto::from(room)))),
        Ok(None) => Err(domain_error(DomainError::not_found("Room", id))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    patch,
    path = "/api/v1/rooms/{id}",
    tag = "Rooms",
    params(("id" = i32, Path, description = "Room id")),
    request_body = UpdateRoomRequest,
    responses(
        (status = 200, description = "Room updated", body = ApiResponse<RoomDto>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_room(
    State(state): State<RoomAppState>,
    Path(id): Path<i32>,
    ValidatedJson(body): ValidatedJson<UpdateRoomRequest>,
) -> Result<Json<ApiResponse<RoomDto>>, ApiError<RoomDto>> {
    let changes = body.into_update().map_err(domain_error)?;
    match state.repos.rooms().update(id, changes).await {
        Ok(Some(room)) => Ok(Json(ApiResponse::success(RoomDto::from(room)))),
        Ok(None) => Err(domain_error(DomainError::not_found("Room", id))),
        Err(e) => Err(domain_error(e)),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/rooms/{id}/bookedDates",
    tag = "Rooms",
    params(("id" = i32, Path, description = "Room id")),
    responses(
        (status = 200, description = "Nights held by reservations and checked-in stays", body = ApiResponse<BookedDatesResponse>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn booked_dates(
    State(state): State<RoomAppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<BookedDatesResponse>>, ApiError<BookedDatesResponse>> {
    let dates = state.bookings.booked_dates(id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(BookedDatesResponse {
        room_id: id,
        dates: dates.into_iter().collect(),
    })))
}
