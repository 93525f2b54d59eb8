//! JSON body extractor that also runs `validator` rules.
//!
//! Malformed bodies and rule violations are both reported as
//! `DomainError::Validation`, so clients see the same 400 envelope as for
//! rejected bookings.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::{domain_error, EmptyData};
use crate::shared::DomainError;

/// `axum::Json<T>` plus `T::validate()`.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct CreateRoom {
///     #[validate(length(min = 1, max = 50))]
///     name: String,
///     #[validate(range(min = 0))]
///     price: i64,
/// }
///
/// async fn handler(ValidatedJson(room): ValidatedJson<CreateRoom>) {}
/// ```
pub struct ValidatedJson<T>(pub T);

#[derive(Debug)]
pub struct ValidatedJsonRejection(pub DomainError);

impl From<JsonRejection> for ValidatedJsonRejection {
    fn from(rejection: JsonRejection) -> Self {
        Self(DomainError::Validation(format!(
            "Invalid JSON: {}",
            rejection.body_text()
        )))
    }
}

impl From<ValidationErrors> for ValidatedJsonRejection {
    fn from(errors: ValidationErrors) -> Self {
        Self(DomainError::Validation(describe(&errors)))
    }
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        domain_error::<EmptyData>(self.0).into_response()
    }
}

/// `field: message` pairs ordered by field name.
fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let parts: Vec<String> = fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => format!("{}: {}", field, msg),
                None => format!("{}: {}", field, e.code),
            })
        })
        .collect();

    if parts.is_empty() {
        "Validation failed".to_string()
    } else {
        parts.join("; ")
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: axum::extract::Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Debug, Deserialize, Validate)]
    struct TestBody {
        #[validate(length(min = 1, max = 10))]
        name: String,
        #[validate(range(min = 1, max = 365))]
        nights: u32,
    }

    async fn handler(ValidatedJson(_body): ValidatedJson<TestBody>) -> &'static str {
        "ok"
    }

    fn app() -> Router {
        Router::new().route("/test", post(handler))
    }

    async fn send(req: Request<Body>) -> axum::http::Response<Body> {
        use tower::Service;
        let mut svc = app().into_service();
        svc.call(req).await.unwrap()
    }

    #[tokio::test]
    async fn valid_body_returns_ok() {
        let body = serde_json::json!({"name": "101", "nights": 3});
        let req = Request::builder()
            .method("POST")
            .uri("/test")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();

        let resp = send(req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_or_incomplete_json_returns_400() {
        let req = Request::builder()
            .method("POST")
            .uri("/test")
            .header("content-type", "application/json")
            .body(Body::from("{\"name\": 101"))
            .unwrap();
        assert_eq!(send(req).await.status(), StatusCode::BAD_REQUEST);

        let req = Request::builder()
            .method("POST")
            .uri("/test")
            .header("content-type", "application/json")
            .body(Body::from("{\"name\": \"101\"}"))
            .unwrap();
        assert_eq!(send(req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn validation_failure_returns_400_with_field_names() {
        let body = serde_json::json!({"name": "", "nights": 0});
        let req = Request::builder()
            .method("POST")
            .uri("/test")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();

        let resp = send(req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let error = body["error"].as_str().unwrap();
        let name_at = error.find("name").unwrap();
        let nights_at = error.find("nights").unwrap();
        assert!(name_at < nights_at, "{error}");
        assert_eq!(body["success"], false);
    }
}
