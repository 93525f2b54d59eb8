//! Booking API handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    BookingDto, BookingListQuery, CreateBookingRequest, PayBookingRequest, RoomBookingDto,
    StayTransitionResponse, UpdateRoomBookingRequest,
};
use crate::application::{BookingService, BookingSummary, SummaryService};
use crate::domain::{PaymentMethod, Room, RoomBooking};
use crate::interfaces::http::common::{domain_error, ApiError, ApiResponse, EmptyData, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedEmployee;
use crate::interfaces::http::modules::employees::DateRangeQuery;
use crate::interfaces::http::modules::rooms::RoomDto;

/// Booking handler state
#[derive(Clone)]
pub struct BookingAppState {
    pub bookings: Arc<BookingService>,
    pub summary: Arc<SummaryService>,
}

fn transition_response((stay, room): (RoomBooking, Room)) -> StayTransitionResponse {
    StayTransitionResponse {
        room_booking: RoomBookingDto::from(stay),
        room: RoomDto::from(room),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = ApiResponse<BookingDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Customer or room not found"),
        (status = 409, description = "A requested night is already booked")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_booking(
    State(state): State<BookingAppState>,
    Extension(current): Extension<AuthenticatedEmployee>,
    ValidatedJson(body): ValidatedJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingDto>>), ApiError<BookingDto>> {
    let command = body.into_command(current.id).map_err(domain_error)?;
    let booking = state
        .bookings
        .create_booking(command)
        .await
        .map_err(domain_error)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(BookingDto::from(booking))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    tag = "Bookings",
    params(BookingListQuery),
    responses((status = 200, description = "Bookings, newest first", body = ApiResponse<Vec<BookingDto>>)),
    security(("bearer_auth" = []))
)]
pub async fn list_bookings(
    State(state): State<BookingAppState>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<ApiResponse<Vec<BookingDto>>>, ApiError<Vec<BookingDto>>> {
    let bookings = state
        .bookings
        .list_bookings(&query.into())
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(
        bookings.into_iter().map(BookingDto::from).collect(),
    )))
}

#[utoipa::path(
    patch,
    path = "/api/v1/bookings/pay",
    tag = "Bookings",
    request_body = PayBookingRequest,
    responses(
        (status = 200, description = "Booking marked paid", body = ApiResponse<BookingDto>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn pay_booking(
    State(state): State<BookingAppState>,
    ValidatedJson(body): ValidatedJson<PayBookingRequest>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError<BookingDto>> {
    let method: PaymentMethod = body.payment_method.parse().map_err(domain_error)?;
    let booking = state
        .bookings
        .pay(body.booking_id, method)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(BookingDto::from(booking))))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/search/getSummary",
    tag = "Reports",
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Totals for bookings created in the range", body = ApiResponse<BookingSummary>),
        (status = 400, description = "Inverted range")
    ),
    security(("bearer_auth" = []))
)]
pub async fn booking_summary(
    State(state): State<BookingAppState>,
    Query(range): Query<DateRangeQuery>,
) -> Result<Json<ApiResponse<BookingSummary>>, ApiError<BookingSummary>> {
    let summary = state
        .summary
        .summary(range.start, range.end)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(summary)))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    params(("id" = i32, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking with its stays", body = ApiResponse<BookingDto>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_booking(
    State(state): State<BookingAppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError<BookingDto>> {
    let booking = state.bookings.get_booking(id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(BookingDto::from(booking))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    params(("id" = i32, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking and its stays deleted", body = ApiResponse<EmptyData>),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_booking(
    State(state): State<BookingAppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<EmptyData>>, ApiError<EmptyData>> {
    state
        .bookings
        .delete_booking(id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}

#[utoipa::path(
    patch,
    path = "/api/v1/bookings/checkin/{id}",
    tag = "Bookings",
    params(("id" = i32, Path, description = "Room booking id")),
    responses(
        (status = 200, description = "Checked in", body = ApiResponse<StayTransitionResponse>),
        (status = 400, description = "Already checked in or out"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn check_in(
    State(state): State<BookingAppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<StayTransitionResponse>>, ApiError<StayTransitionResponse>> {
    let result = state.bookings.check_in(id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(transition_response(result))))
}

#[utoipa::path(
    patch,
    path = "/api/v1/bookings/checkout/{id}",
    tag = "Bookings",
    params(("id" = i32, Path, description = "Room booking id")),
    responses(
        (status = 200, description = "Checked out or reservation released", body = ApiResponse<StayTransitionResponse>),
        (status = 400, description = "Already checked out"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn check_out(
    State(state): State<BookingAppState>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<StayTransitionResponse>>, ApiError<StayTransitionResponse>> {
    let result = state.bookings.check_out(id).await.map_err(domain_error)?;
    Ok(Json(ApiResponse::success(transition_response(result))))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/booking/{booking_id}/roomBooking/{room_booking_id}",
    tag = "Bookings",
    params(
        ("booking_id" = i32, Path, description = "Booking id"),
        ("room_booking_id" = i32, Path, description = "Room booking id")
    ),
    responses(
        (status = 200, description = "Stay", body = ApiResponse<RoomBookingDto>),
        (status = 404, description = "Not found in this booking")
    ),
    security(("bearer_auth" = []))
)]
pub async fn view_room_booking(
    State(state): State<BookingAppState>,
    Path((booking_id, room_booking_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<RoomBookingDto>>, ApiError<RoomBookingDto>> {
    let stay = state
        .bookings
        .view_room_booking(booking_id, room_booking_id)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(RoomBookingDto::from(stay))))
}

/// Availability is not re-checked when a stay is re-dated.
#[utoipa::path(
    patch,
    path = "/api/v1/bookings/booking/{booking_id}/roomBooking/{room_booking_id}",
    tag = "Bookings",
    params(
        ("booking_id" = i32, Path, description = "Booking id"),
        ("room_booking_id" = i32, Path, description = "Room booking id")
    ),
    request_body = UpdateRoomBookingRequest,
    responses(
        (status = 200, description = "Booking with recomputed total", body = ApiResponse<BookingDto>),
        (status = 404, description = "Not found in this booking")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_room_booking(
    State(state): State<BookingAppState>,
    Path((booking_id, room_booking_id)): Path<(i32, i32)>,
    ValidatedJson(body): ValidatedJson<UpdateRoomBookingRequest>,
) -> Result<Json<ApiResponse<BookingDto>>, ApiError<BookingDto>> {
    let command = body.into_command().map_err(domain_error)?;
    let booking = state
        .bookings
        .update_booking_and_room_booking(booking_id, room_booking_id, command)
        .await
        .map_err(domain_error)?;
    Ok(Json(ApiResponse::success(BookingDto::from(booking))))
}
