use axum::Router;

use crate::{app::AppState, common::ApiError};

pub mod cases;
pub mod definitions;
pub mod projects;
pub mod tags;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .nest("/definitions", definitions::routes())
                .nest("/cases", cases::routes()),
        )
        .fallback(async || -> ApiError {
            tracing::info!("Not Found!");
            ApiError::NotFound("Not Found".to_string())
        })
        .method_not_allowed_fallback(async || -> ApiError {
            tracing::info!("Method Not Allowed!");
            ApiError::MethodNotAllowed
        })
}
