//! Project references embedded in case and definition payloads.

use std::collections::{BTreeSet, HashMap};

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};

use crate::{
    common::{ApiError, ApiResult, FieldError},
    entity::project,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRead {
    #[serde(default)]
    pub id: Option<i32>,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl From<project::Model> for ProjectRead {
    fn from(model: project::Model) -> Self {
        Self {
            id: Some(model.id),
            name: model.name,
            color: model.color,
        }
    }
}

/// Finds the referenced project by id, falling back to its name.
pub async fn resolve<C: ConnectionTrait>(db: &C, project_in: &ProjectRead) -> ApiResult<project::Model> {
    let found = match project_in.id {
        Some(id) => project::Entity::find_by_id(id).one(db).await?,
        None => None,
    };

    let found = match found {
        Some(project) => Some(project),
        None => {
            project::Entity::find()
                .filter(project::Column::Name.eq(project_in.name.as_str()))
                .one(db)
                .await?
        }
    };

    found.ok_or_else(|| {
        ApiError::Validation(vec![FieldError::not_found(
            "project",
            format!("Project not found: {}", project_in.name),
        )])
    })
}

/// Projects keyed by id, for embedding into read shapes.
pub async fn get_many<C: ConnectionTrait>(
    db: &C,
    project_ids: impl IntoIterator<Item = i32>,
) -> ApiResult<HashMap<i32, ProjectRead>> {
    let ids: BTreeSet<i32> = project_ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    Ok(project::Entity::find()
        .filter(project::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|project| (project.id, ProjectRead::from(project)))
        .collect())
}

/// Looks up a project loaded by [`get_many`]; a miss means a dangling foreign key.
pub fn embed(projects: &HashMap<i32, ProjectRead>, project_id: i32) -> ApiResult<ProjectRead> {
    projects
        .get(&project_id)
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("project {project_id} is referenced but missing").into())
}
