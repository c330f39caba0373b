use axum::{Router, extract::State, routing::get};
use sea_orm::EntityTrait;
use serde::Deserialize;
use validator::Validate;

pub mod schema;
pub mod service;

use crate::{
    app::AppState,
    common::{ApiError, ApiResponse, ApiResult},
    entity::case,
    params::{CommonParams, Json, Path, Query, Valid},
    search::search_filter_sort_paginate,
};
use schema::{CaseCreate, CasePagination, CaseRead, CaseUpdate};

const NOT_FOUND: &str = "The case with this id does not exist.";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_cases).post(create_case))
        .route(
            "/{case_id}",
            get(get_case).put(update_case).delete(delete_case),
        )
}

#[derive(Debug, Deserialize, Validate)]
pub struct CasePath {
    #[validate(range(min = 1, max = 2147483646))]
    pub case_id: i32,
}

async fn get_cases(
    State(AppState { db }): State<AppState>,
    Valid(Query(common)): Valid<Query<CommonParams>>,
) -> ApiResult<ApiResponse<CasePagination>> {
    let mut page = search_filter_sort_paginate(&db, case::Entity::find(), &common).await?;
    let items = service::read_many(&db, std::mem::take(&mut page.items)).await?;

    Ok(ApiResponse::ok("cases", Some(page.with_items(items))))
}

async fn get_case(
    State(AppState { db }): State<AppState>,
    Valid(Path(path)): Valid<Path<CasePath>>,
) -> ApiResult<ApiResponse<CaseRead>> {
    let case = service::get(&db, path.case_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;

    Ok(ApiResponse::ok("case", Some(service::read(&db, case).await?)))
}

async fn create_case(
    State(AppState { db }): State<AppState>,
    Valid(Json(case_in)): Valid<Json<CaseCreate>>,
) -> ApiResult<ApiResponse<CaseRead>> {
    let case = service::create(&db, case_in).await?;

    Ok(ApiResponse::ok("case created", Some(service::read(&db, case).await?)))
}

async fn update_case(
    State(AppState { db }): State<AppState>,
    Valid(Path(path)): Valid<Path<CasePath>>,
    Valid(Json(case_in)): Valid<Json<CaseUpdate>>,
) -> ApiResult<ApiResponse<CaseRead>> {
    let case = service::get(&db, path.case_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;

    let case = service::update(&db, case, case_in).await?;

    Ok(ApiResponse::ok("case updated", Some(service::read(&db, case).await?)))
}

async fn delete_case(
    State(AppState { db }): State<AppState>,
    Valid(Path(path)): Valid<Path<CasePath>>,
) -> ApiResult<ApiResponse<()>> {
    if service::get(&db, path.case_id).await?.is_none() {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }

    service::delete(&db, path.case_id).await?;

    Ok(ApiResponse::ok("case deleted", None))
}
