//! Caller identity extractors.
//!
//! Authentication happens in front of this service; the gateway in front
//! forwards who is calling as headers.
//!
//! ```text
//! X-User-Id:   staff / admin user   → reports, direct sales
//! X-Client-Id: shopping client      → cart, checkout, payments, orders
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::{ApiError, ErrorCode};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// The staff user making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

/// The client whose cart, orders and payments are addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(pub String);

fn header_value(parts: &Parts, name: &str) -> Result<String, ApiError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
        .ok_or_else(|| ApiError::new(ErrorCode::Unauthorized, format!("Missing {name} header")))
}

impl<S: Send + Sync> FromRequestParts<S> for UserId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_value(parts, USER_ID_HEADER).map(UserId)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ClientId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        header_value(parts, CLIENT_ID_HEADER).map(ClientId)
    }
}
