use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{api::projects::ProjectRead, entity::definition, params::Page};

pub const DEFAULT_SOURCE: &str = "dispatch";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DefinitionCreate {
    #[validate(length(min = 1, message = "must not be empty string"))]
    pub text: String,
    pub source: Option<String>,
    pub project: Option<ProjectRead>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DefinitionUpdate {
    #[validate(length(min = 1, message = "must not be empty string"))]
    pub text: String,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionRead {
    pub id: i32,
    pub text: String,
    pub source: String,
    pub project: Option<ProjectRead>,
}

impl DefinitionRead {
    pub fn new(model: definition::Model, project: Option<ProjectRead>) -> Self {
        Self {
            id: model.id,
            text: model.text,
            source: model.source,
            project,
        }
    }
}

pub type DefinitionPagination = Page<DefinitionRead>;
