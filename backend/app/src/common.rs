pub mod error;
pub mod latency;
pub mod response;

pub use error::{ApiError, ApiResult, FieldError};
pub use response::ApiResponse;
