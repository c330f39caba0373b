use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use super::enums::{CaseStatus, Visibility};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: Option<String>,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub resolution: Option<String>,
    pub status: CaseStatus,
    pub visibility: Visibility,
    pub reported_at: DateTime<Utc>,
    pub stable_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Set when this case has been marked as a duplicate of another case.
    pub duplicate_id: Option<i32>,
    pub project_id: i32,
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
    #[sea_orm(
        belongs_to = "Entity",
        from = "Column::DuplicateId",
        to = "Column::Id",
        on_delete = "SetNull"
    )]
    DuplicateOf,
    #[sea_orm(has_one = "super::ticket::Entity")]
    Ticket,
    #[sea_orm(has_many = "super::event::Entity")]
    Event,
    #[sea_orm(has_many = "super::case_tag::Entity")]
    CaseTag,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ticket.def()
    }
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl Related<super::case_tag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CaseTag.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::case_tag::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::case_tag::Relation::Case.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Weighted like a full-text vector: name over title over description.
impl crate::search::Searchable for Entity {
    fn search_columns() -> &'static [(Column, i32)] {
        &[
            (Column::Name, 3),
            (Column::Title, 2),
            (Column::Description, 1),
        ]
    }
}
