//! Shop Admin
//!
//! Backend for a bilingual (English/Arabic) e-commerce admin dashboard.
//!
//! ## Features
//! - Product catalog with variant groups and SKU-addressed options
//! - Per-user shopping carts with price reconciliation
//! - Checkout into immutable orders, payment and fulfillment status
//! - Admin analytics and bulk price repair
//! - Document persistence (Postgres JSONB or in-memory)

pub mod auth;
pub mod config;
pub mod domain;
pub mod http;
pub mod pricing;
pub mod publisher;
pub mod services;
pub mod store;

use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum ShopError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShopError {
    pub fn not_found(what: impl Into<String>) -> Self { Self::NotFound(what.into()) }
    pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InvalidState(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn category(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::InvalidState(_) => "invalid_state",
            Self::Validation(_) => "validation_error",
            Self::Storage(_) | Self::Internal(_) => "internal_error",
        }
    }
}

impl From<sqlx::Error> for ShopError {
    fn from(e: sqlx::Error) -> Self { Self::Storage(e.to_string()) }
}

impl From<sqlx::migrate::MigrateError> for ShopError {
    fn from(e: sqlx::migrate::MigrateError) -> Self { Self::Storage(e.to_string()) }
}

impl From<serde_json::Error> for ShopError {
    fn from(e: serde_json::Error) -> Self { Self::Internal(e.to_string()) }
}

/// Malformed or mistyped request bodies are client errors with the uniform error body.
impl From<axum::extract::rejection::JsonRejection> for ShopError {
    fn from(e: axum::extract::rejection::JsonRejection) -> Self { Self::Validation(e.body_text()) }
}

impl From<validator::ValidationErrors> for ShopError {
    fn from(e: validator::ValidationErrors) -> Self { Self::Validation(e.to_string()) }
}

impl IntoResponse for ShopError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(serde_json::json!({ "error": self.category(), "message": self.to_string() }));
        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ShopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ShopError::not_found("Cart").status(), StatusCode::NOT_FOUND);
        assert_eq!(ShopError::InvalidState("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ShopError::validation("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ShopError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(ShopError::Storage("x".into()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_json_rejection_is_validation() {
        use axum::extract::FromRequest;
        let req = axum::http::Request::builder()
            .header(axum::http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(r#"{"n": "x"}"#))
            .unwrap();
        let rejection = Json::<std::collections::HashMap<String, u32>>::from_request(req, &()).await.unwrap_err();
        let err = ShopError::from(rejection);
        assert!(matches!(err, ShopError::Validation(_)));
        assert_eq!(err.category(), "validation_error");
    }

    #[test]
    fn test_not_found_message() {
        assert_eq!(ShopError::not_found("Order").to_string(), "Order not found");
    }
}
