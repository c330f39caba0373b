use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_valid::ValidationRejection;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use validator::ValidationErrors;

use crate::common::ApiResponse;

pub type ApiResult<T> = Result<T, ApiError>;

/// One field-scoped problem with a request, reported under `detail`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc: vec![field.into()],
            msg: msg.into(),
            kind: kind.into(),
        }
    }

    pub fn exists(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::new(field, msg, "exists")
    }

    pub fn not_found(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::new(field, msg, "not_found")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("Validation Error")]
    Validation(Vec<FieldError>),

    #[error("Database Error: {0}")]
    DataBase(#[from] DbErr),

    #[error("Internal Server Error: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bad Query Params: {0}")]
    Query(#[from] QueryRejection),

    #[error("Bad Path Params: {0}")]
    Path(#[from] PathRejection),

    #[error("Bad Json Body: {0}")]
    Json(#[from] JsonRejection),

    #[error("Method Not Allowed")]
    MethodNotAllowed,
}

impl From<axum_valid::ValidRejection<ApiError>> for ApiError {
    fn from(rejection: axum_valid::ValidRejection<ApiError>) -> Self {
        match rejection {
            ValidationRejection::Valid(errors) => ApiError::from(errors),
            ValidationRejection::Inner(error) => error,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |err| {
                    let msg = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    FieldError::new(field.clone(), msg, err.code.to_string())
                })
            })
            .collect();
        details.sort_by(|a, b| a.loc.cmp(&b.loc));

        ApiError::Validation(details)
    }
}

impl ApiError {
    pub fn field(field: impl Into<String>, msg: impl Into<String>, kind: impl Into<String>) -> Self {
        ApiError::Validation(vec![FieldError::new(field, msg, kind)])
    }

    /// Maps a unique-index violation onto a field-scoped exists error,
    /// leaving every other database error untouched.
    pub fn from_unique_violation(err: DbErr, field: &str, msg: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                ApiError::Validation(vec![FieldError::exists(field, msg)])
            }
            _ => ApiError::DataBase(err),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalServerError(_) | ApiError::DataBase(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Query(_) | ApiError::Path(_) => StatusCode::BAD_REQUEST,
            ApiError::Json(rejection) => rejection.status(),
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        if status_code.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = match self {
            ApiError::Validation(details) => {
                ApiResponse::<()>::err(status_code.as_u16(), "Validation Error").with_detail(details)
            }
            other => ApiResponse::<()>::err(status_code.as_u16(), other.to_string()),
        };

        (status_code, axum::Json(body)).into_response()
    }
}

impl From<ApiError> for Response {
    fn from(value: ApiError) -> Self {
        value.into_response()
    }
}
