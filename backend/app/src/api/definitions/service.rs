use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter, Set,
};

use super::schema::{DEFAULT_SOURCE, DefinitionCreate, DefinitionRead, DefinitionUpdate};
use crate::{
    api::projects,
    common::{ApiError, ApiResult},
    entity::definition,
};

pub const TEXT_EXISTS: &str = "A definition with this text already exists.";

pub async fn get<C: ConnectionTrait>(db: &C, definition_id: i32) -> ApiResult<Option<definition::Model>> {
    Ok(definition::Entity::find_by_id(definition_id).one(db).await?)
}

pub async fn get_by_text<C: ConnectionTrait>(db: &C, text: &str) -> ApiResult<Option<definition::Model>> {
    Ok(definition::Entity::find()
        .filter(definition::Column::Text.eq(text))
        .one(db)
        .await?)
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    definition_in: DefinitionCreate,
) -> ApiResult<definition::Model> {
    let project_id = match &definition_in.project {
        Some(project_in) => Some(projects::resolve(db, project_in).await?.id),
        None => None,
    };

    let now = Utc::now();
    let model = definition::ActiveModel {
        text: Set(definition_in.text),
        source: Set(definition_in
            .source
            .unwrap_or_else(|| DEFAULT_SOURCE.to_string())),
        project_id: Set(project_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let definition = model
        .insert(db)
        .await
        .map_err(|err| ApiError::from_unique_violation(err, "text", TEXT_EXISTS))?;

    tracing::info!(definition_id = definition.id, "definition created");

    Ok(definition)
}

pub async fn update<C: ConnectionTrait>(
    db: &C,
    definition: definition::Model,
    definition_in: DefinitionUpdate,
) -> ApiResult<definition::Model> {
    let mut model = definition.into_active_model();
    model.text = Set(definition_in.text);
    if let Some(source) = definition_in.source {
        model.source = Set(source);
    }
    model.updated_at = Set(Utc::now());

    let definition = model
        .update(db)
        .await
        .map_err(|err| ApiError::from_unique_violation(err, "text", TEXT_EXISTS))?;

    tracing::debug!(definition_id = definition.id, "definition updated");

    Ok(definition)
}

pub async fn delete<C: ConnectionTrait>(db: &C, definition_id: i32) -> ApiResult<()> {
    definition::Entity::delete_by_id(definition_id).exec(db).await?;

    tracing::info!(definition_id, "definition deleted");

    Ok(())
}

/// Read shapes for a batch of definitions, loading their projects in one query.
pub async fn read_many<C: ConnectionTrait>(
    db: &C,
    definitions: Vec<definition::Model>,
) -> ApiResult<Vec<DefinitionRead>> {
    let projects =
        projects::get_many(db, definitions.iter().filter_map(|definition| definition.project_id))
            .await?;

    definitions
        .into_iter()
        .map(|definition| {
            let project = definition
                .project_id
                .map(|project_id| projects::embed(&projects, project_id))
                .transpose()?;
            Ok(DefinitionRead::new(definition, project))
        })
        .collect()
}

pub async fn read<C: ConnectionTrait>(db: &C, definition: definition::Model) -> ApiResult<DefinitionRead> {
    let project = match definition.project_id {
        Some(project_id) => {
            projects::embed(&projects::get_many(db, [project_id]).await?, project_id).map(Some)?
        }
        None => None,
    };

    Ok(DefinitionRead::new(definition, project))
}
