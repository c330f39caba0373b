use axum::{Router, extract::State, routing::get};
use sea_orm::EntityTrait;
use serde::Deserialize;
use validator::Validate;

pub mod schema;
pub mod service;

use crate::{
    app::AppState,
    common::{ApiError, ApiResponse, ApiResult, FieldError},
    entity::definition,
    params::{CommonParams, Json, Path, Query, Valid},
    search::search_filter_sort_paginate,
};
use schema::{DefinitionCreate, DefinitionPagination, DefinitionRead, DefinitionUpdate};

const NOT_FOUND: &str = "The definition with this id does not exist.";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_definitions).post(create_definition))
        .route(
            "/{definition_id}",
            get(get_definition)
                .put(update_definition)
                .delete(delete_definition),
        )
}

#[derive(Debug, Deserialize, Validate)]
pub struct DefinitionPath {
    #[validate(range(min = 1, max = 2147483646))]
    pub definition_id: i32,
}

async fn get_definitions(
    State(AppState { db }): State<AppState>,
    Valid(Query(common)): Valid<Query<CommonParams>>,
) -> ApiResult<ApiResponse<DefinitionPagination>> {
    let mut page = search_filter_sort_paginate(&db, definition::Entity::find(), &common).await?;
    let items = service::read_many(&db, std::mem::take(&mut page.items)).await?;

    Ok(ApiResponse::ok("definitions", Some(page.with_items(items))))
}

async fn get_definition(
    State(AppState { db }): State<AppState>,
    Valid(Path(path)): Valid<Path<DefinitionPath>>,
) -> ApiResult<ApiResponse<DefinitionRead>> {
    let definition = service::get(&db, path.definition_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;

    Ok(ApiResponse::ok("definition", Some(service::read(&db, definition).await?)))
}

async fn create_definition(
    State(AppState { db }): State<AppState>,
    Valid(Json(definition_in)): Valid<Json<DefinitionCreate>>,
) -> ApiResult<ApiResponse<DefinitionRead>> {
    if service::get_by_text(&db, &definition_in.text).await?.is_some() {
        return Err(ApiError::Validation(vec![FieldError::exists(
            "text",
            service::TEXT_EXISTS,
        )]));
    }

    let definition = service::create(&db, definition_in).await?;

    Ok(ApiResponse::ok(
        "definition created",
        Some(service::read(&db, definition).await?),
    ))
}

async fn update_definition(
    State(AppState { db }): State<AppState>,
    Valid(Path(path)): Valid<Path<DefinitionPath>>,
    Valid(Json(definition_in)): Valid<Json<DefinitionUpdate>>,
) -> ApiResult<ApiResponse<DefinitionRead>> {
    let definition = service::get(&db, path.definition_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))?;

    let definition = service::update(&db, definition, definition_in).await?;

    Ok(ApiResponse::ok(
        "definition updated",
        Some(service::read(&db, definition).await?),
    ))
}

async fn delete_definition(
    State(AppState { db }): State<AppState>,
    Valid(Path(path)): Valid<Path<DefinitionPath>>,
) -> ApiResult<ApiResponse<()>> {
    if service::get(&db, path.definition_id).await?.is_none() {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }

    service::delete(&db, path.definition_id).await?;

    Ok(ApiResponse::ok("definition deleted", None))
}
