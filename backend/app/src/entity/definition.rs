use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Glossary entry referenced from elsewhere in the system.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "definitions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique, column_type = "Text")]
    pub text: String,
    #[sea_orm(default_value = "dispatch")]
    pub source: String,
    pub project_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id"
    )]
    Project,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl crate::search::Searchable for Entity {
    fn search_columns() -> &'static [(Column, i32)] {
        &[(Column::Text, 1)]
    }
}
