//! Gateway types module
//!
//! ## Input Types
//! - [`ChangeBalanceRequest`]: Balance change body
//!
//! ## Output Types
//! - [`ApiResponse<T>`]: Unified API response wrapper
//! - [`ApiError`]: Error rendered through the same envelope

pub mod request;
pub mod response;

pub use request::ChangeBalanceRequest;
pub use response::{ApiError, ApiResponse, ApiResult, error_codes, ok};
