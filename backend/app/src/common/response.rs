use axum::response::IntoResponse;
use serde::Serialize;

use crate::common::error::FieldError;

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub message: String,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Vec<FieldError>>,
}

impl<T> ApiResponse<T> {
    pub fn ok<M: AsRef<str>>(message: M, data: Option<T>) -> Self {
        Self {
            code: 200,
            message: String::from(message.as_ref()),
            data,
            detail: None,
        }
    }

    pub fn err<M: AsRef<str>>(code: u16, message: M) -> Self {
        Self {
            code,
            message: String::from(message.as_ref()),
            data: None,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: Vec<FieldError>) -> Self {
        self.detail = Some(detail);
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        let body = axum::Json(self);

        (axum::http::StatusCode::OK, body).into_response()
    }
}
