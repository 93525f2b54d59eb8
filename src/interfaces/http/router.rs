//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::{BookingService, BookingSummary, EmployeeService, SummaryService};
use crate::domain::{LedgerRow, PaymentMethod, RepositoryProvider, StayStatus};
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::interfaces::http::common::{ApiResponse, EmptyData, PaginatedResponse, PaginationParams};
use crate::interfaces::http::middleware::{admin_only_middleware, auth_middleware, AuthState};
use crate::interfaces::http::modules::{
    auth, bookings, customers, employees, health, metrics, request_id, rooms,
};
use crate::interfaces::ws::{create_notification_state, ws_notifications_handler};
use crate::notifications::SharedEventBus;

/// Everything the HTTP layer needs, built once at startup
#[derive(Clone)]
pub struct ApiContext {
    pub db: DatabaseConnection,
    pub repos: Arc<dyn RepositoryProvider>,
    pub bookings: Arc<BookingService>,
    pub employees: Arc<EmployeeService>,
    pub summary: Arc<SummaryService>,
    pub event_bus: SharedEventBus,
    pub jwt_config: JwtConfig,
    /// `None` disables `/metrics`
    pub metrics_handle: Option<PrometheusHandle>,
    pub started_at: Arc<Instant>,
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token from /api/v1/employees/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Auth
        auth::login,
        auth::logout,
        // Employees
        employees::create_employee,
        employees::search_employees,
        employees::list_employees,
        employees::get_employee,
        employees::update_employee,
        employees::delete_employee,
        employees::change_password,
        // Rooms
        rooms::search_rooms,
        rooms::create_room,
        rooms::room_categories,
        rooms::get_room,
        rooms::update_room,
        rooms::booked_dates,
        // Customers
        customers::create_customer,
        customers::list_customers,
        customers::find_customers_by_name,
        customers::get_customer,
        customers::update_customer,
        customers::delete_customer,
        customers::customer_bookings,
        // Bookings
        bookings::create_booking,
        bookings::list_bookings,
        bookings::pay_booking,
        bookings::get_booking,
        bookings::delete_booking,
        bookings::check_in,
        bookings::check_out,
        bookings::view_room_booking,
        bookings::update_room_booking,
        // Reports
        bookings::booking_summary,
        employees::employee_summary,
        // Notifications
        crate::interfaces::ws::notifications::ws_notifications_handler,
    ),
    components(
        schemas(
            // Common
            ApiResponse<String>,
            EmptyData,
            PaginationParams,
            PaginatedResponse<employees::EmployeeDto>,
            PaginatedResponse<customers::CustomerDto>,
            PaymentMethod,
            StayStatus,
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            // Employees
            employees::EmployeeDto,
            employees::CreateEmployeeRequest,
            employees::UpdateEmployeeRequest,
            employees::ChangePasswordRequest,
            // Rooms
            rooms::RoomDto,
            rooms::CreateRoomRequest,
            rooms::UpdateRoomRequest,
            rooms::BookedDatesResponse,
            // Customers
            customers::CustomerDto,
            customers::CreateCustomerRequest,
            customers::UpdateCustomerRequest,
            // Bookings
            bookings::BookingDto,
            bookings::RoomBookingDto,
            bookings::StayRequestDto,
            bookings::CreateBookingRequest,
            bookings::UpdateRoomBookingRequest,
            bookings::PayBookingRequest,
            bookings::StayTransitionResponse,
            // Reports
            BookingSummary,
            LedgerRow,
            // Health
            health::HealthResponse,
            health::ComponentHealth,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Authentication", description = "Employee login (JWT) and logout"),
        (name = "Employees", description = "Staff accounts and password changes"),
        (name = "Rooms", description = "Room inventory, categories and booked nights"),
        (name = "Customers", description = "Guest records"),
        (name = "Bookings", description = "Bookings, stays, payment, check-in and check-out"),
        (name = "Reports", description = "Booking summary and front-desk ledger"),
        (name = "Notifications", description = "Real-time booking events via WebSocket"),
    ),
    info(
        title = "Timeless Hotel API",
        version = "1.0.0",
        description = "Front-desk REST API: rooms, guests, bookings and reports"
    )
)]
pub struct ApiDoc;

/// Create the API router with all routes
pub fn create_api_router(ctx: ApiContext) -> Router {
    let auth_state = AuthState {
        jwt_config: ctx.jwt_config.clone(),
    };

    // Innermost layer runs last: auth first, then the admin check.
    let authed = |router: Router| {
        router.layer(middleware::from_fn_with_state(
            auth_state.clone(),
            auth_middleware,
        ))
    };
    let admin = |router: Router| {
        router
            .layer(middleware::from_fn(admin_only_middleware))
            .layer(middleware::from_fn_with_state(
                auth_state.clone(),
                auth_middleware,
            ))
    };

    // ── Employees (+ auth, ledger) ──────────────────────────────
    let employee_state = employees::EmployeeAppState {
        employees: ctx.employees.clone(),
        summary: ctx.summary.clone(),
    };
    let employee_public = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .with_state(employee_state.clone());
    let employee_authed = authed(
        Router::new()
            .route("/", get(employees::search_employees))
            .route("/{id}/changePassword", patch(employees::change_password))
            .with_state(employee_state.clone()),
    );
    let employee_admin = admin(
        Router::new()
            .route("/", post(employees::create_employee))
            .route("/get-all", get(employees::list_employees))
            .route("/summary", get(employees::employee_summary))
            .route(
                "/{id}",
                get(employees::get_employee)
                    .patch(employees::update_employee)
                    .delete(employees::delete_employee),
            )
            .with_state(employee_state),
    );
    let employee_routes = employee_public.merge(employee_authed).merge(employee_admin);

    // ── Rooms ───────────────────────────────────────────────────
    let room_state = rooms::RoomAppState {
        repos: ctx.repos.clone(),
        bookings: ctx.bookings.clone(),
    };
    let room_authed = authed(
        Router::new()
            .route("/", get(rooms::search_rooms))
            .route("/categories", get(rooms::room_categories))
            .route("/{id}", get(rooms::get_room))
            .route("/{id}/bookedDates", get(rooms::booked_dates))
            .with_state(room_state.clone()),
    );
    let room_admin = admin(
        Router::new()
            .route("/", post(rooms::create_room))
            .route("/{id}", patch(rooms::update_room))
            .with_state(room_state),
    );
    let room_routes = room_authed.merge(room_admin);

    // ── Customers ───────────────────────────────────────────────
    let customer_state = customers::CustomerAppState {
        repos: ctx.repos.clone(),
        bookings: ctx.bookings.clone(),
    };
    let customer_authed = authed(
        Router::new()
            .route(
                "/",
                get(customers::list_customers).post(customers::create_customer),
            )
            .route("/search/findByName", get(customers::find_customers_by_name))
            .route(
                "/{id}",
                get(customers::get_customer).patch(customers::update_customer),
            )
            .route("/{id}/bookings", get(customers::customer_bookings))
            .with_state(customer_state.clone()),
    );
    let customer_admin = admin(
        Router::new()
            .route("/{id}", delete(customers::delete_customer))
            .with_state(customer_state),
    );
    let customer_routes = customer_authed.merge(customer_admin);

    // ── Bookings ────────────────────────────────────────────────
    let booking_state = bookings::BookingAppState {
        bookings: ctx.bookings.clone(),
        summary: ctx.summary.clone(),
    };
    let booking_authed = authed(
        Router::new()
            .route("/", post(bookings::create_booking))
            .route("/pay", patch(bookings::pay_booking))
            .route("/search/getSummary", get(bookings::booking_summary))
            .route("/{id}", get(bookings::get_booking))
            .route("/checkin/{id}", patch(bookings::check_in))
            .route("/checkout/{id}", patch(bookings::check_out))
            .route(
                "/booking/{booking_id}/roomBooking/{room_booking_id}",
                get(bookings::view_room_booking).patch(bookings::update_room_booking),
            )
            .with_state(booking_state.clone()),
    );
    let booking_admin = admin(
        Router::new()
            .route("/", get(bookings::list_bookings))
            .route("/{id}", delete(bookings::delete_booking))
            .with_state(booking_state),
    );
    let booking_routes = booking_authed.merge(booking_admin);

    // Notification WebSocket routes (no auth for WebSocket upgrade)
    let notification_routes = Router::new()
        .route("/ws", get(ws_notifications_handler))
        .with_state(create_notification_state(ctx.event_bus.clone()));

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health::HealthState {
            db: ctx.db.clone(),
            started_at: ctx.started_at.clone(),
        });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let mut router = Router::new()
        .merge(swagger_routes)
        .merge(health_routes)
        .nest("/api/v1/employees", employee_routes)
        .nest("/api/v1/rooms", room_routes)
        .nest("/api/v1/customers", customer_routes)
        .nest("/api/v1/bookings", booking_routes)
        .nest("/api/v1/notifications", notification_routes);

    if let Some(handle) = ctx.metrics_handle {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics::prometheus_metrics))
                .with_state(metrics::MetricsState { handle }),
        );
    }

    router
        .route_layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
