//! Response envelope, pagination and error mapping shared by all handlers

pub mod validated_json;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::shared::{DomainError, PaginatedResult};

pub use validated_json::{ValidatedJson, ValidatedJsonRejection};

/// Standard API response envelope
///
/// Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "data": null, "error": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Empty response for operations without return data
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmptyData {}

/// Page query for list endpoints
#[derive(Debug, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct PaginationParams {
    /// 1-based page number. Default: 1
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (1–100). Default: 50
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    50
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    /// Convert a repository page, mapping each item.
    pub fn from_result<U>(result: PaginatedResult<U>, f: impl FnMut(U) -> T) -> Self {
        Self {
            items: result.items.into_iter().map(f).collect(),
            total: result.total,
            page: result.page,
            limit: result.limit,
            total_pages: result.total_pages,
        }
    }
}

/// Error half of every handler result
pub type ApiError<T> = (StatusCode, Json<ApiResponse<T>>);

/// Map a domain failure onto its HTTP status and error envelope.
pub fn domain_error<T>(err: DomainError) -> ApiError<T> {
    let status = match &err {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::RoomUnavailable { .. } | DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let message = match err {
        DomainError::Persistence(detail) => {
            error!(%detail, "Storage failure");
            "Internal server error".to_string()
        }
        DomainError::Validation(msg)
        | DomainError::Unauthorized(msg)
        | DomainError::Forbidden(msg) => msg,
        other => other.to_string(),
    };

    (status, Json(ApiResponse::error(message)))
}
