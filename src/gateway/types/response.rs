//! API Response types and error codes
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `ApiError`: Error response carrying an HTTP status
//! - `error_codes`: Standard error code constants

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::wallet::ServiceError;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or null (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

impl ApiResponse<()> {
    /// Success without payload
    pub fn ok() -> Self {
        Self {
            code: error_codes::SUCCESS,
            msg: "ok".to_string(),
            data: None,
        }
    }
}

// ============================================================================
// Error Response
// ============================================================================

/// Error returned by handlers; rendered as `ApiResponse<()>`
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER, msg)
    }

    pub fn unprocessable(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            error_codes::UNPROCESSABLE_BODY,
            msg,
        )
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        let status =
            StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let code = match e {
            ServiceError::WalletNotFound => error_codes::WALLET_NOT_FOUND,
            ServiceError::InsufficientBalance => error_codes::INSUFFICIENT_BALANCE,
            ServiceError::InvalidAmount => error_codes::INVALID_AMOUNT,
            ServiceError::InvalidOperationType(_) => error_codes::INVALID_OPERATION,
            ServiceError::ConflictExhausted => error_codes::CONFLICT_EXHAUSTED,
            ServiceError::Cancelled => error_codes::REQUEST_CANCELLED,
            ServiceError::Internal => error_codes::INTERNAL_ERROR,
        };
        Self::new(status, code, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::error(self.code, self.msg))).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Wrap `data` in a success response
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

// ============================================================================
// Error Codes
// ============================================================================

/// Standard API error codes
pub mod error_codes {
    // Success
    pub const SUCCESS: i32 = 0;

    // Client errors (1xxx)
    pub const INVALID_PARAMETER: i32 = 1001;
    pub const INSUFFICIENT_BALANCE: i32 = 1002;
    pub const INVALID_AMOUNT: i32 = 1003;
    pub const INVALID_OPERATION: i32 = 1004;
    pub const UNPROCESSABLE_BODY: i32 = 1005;

    // Resource errors (4xxx)
    pub const WALLET_NOT_FOUND: i32 = 4001;

    // Server errors (5xxx)
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SERVICE_UNAVAILABLE: i32 = 5001;
    pub const CONFLICT_EXHAUSTED: i32 = 5002;
    pub const REQUEST_CANCELLED: i32 = 5004;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_serialization() {
        let json = serde_json::to_value(ApiResponse::success(5)).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["msg"], "ok");
        assert_eq!(json["data"], 5);
    }

    #[test]
    fn test_ok_without_data_omits_field() {
        let json = serde_json::to_value(ApiResponse::ok()).unwrap();
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_service_error_mapping() {
        let err = ApiError::from(ServiceError::WalletNotFound);
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.code, error_codes::WALLET_NOT_FOUND);

        let err = ApiError::from(ServiceError::InsufficientBalance);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = ApiError::from(ServiceError::ConflictExhausted);
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, error_codes::CONFLICT_EXHAUSTED);

        let err = ApiError::from(ServiceError::Cancelled);
        assert_eq!(err.status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.msg, "request cancelled: deadline exceeded");
    }
}
