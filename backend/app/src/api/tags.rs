//! Tag references and the exclusive tag-type rule.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use validator::ValidationError;

use crate::{
    common::{ApiError, ApiResult, FieldError},
    entity::{case_tag, tag, tag_type},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagTypeRead {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub exclusive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRead {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub tag_type: TagTypeRead,
}

impl TagRead {
    fn from_models(tag: tag::Model, tag_type: tag_type::Model) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            description: tag.description,
            tag_type: TagTypeRead {
                id: tag_type.id,
                name: tag_type.name,
                exclusive: tag_type.exclusive,
            },
        }
    }
}

/// Names of every tag sharing an exclusive tag type with another tag, in input order per type.
pub fn exclusive_conflicts(tags: &[TagRead]) -> Vec<&str> {
    let mut by_type: BTreeMap<i32, Vec<&str>> = BTreeMap::new();

    for tag in tags.iter().filter(|tag| tag.tag_type.exclusive) {
        by_type
            .entry(tag.tag_type.id)
            .or_default()
            .push(tag.name.as_str());
    }

    by_type
        .into_values()
        .filter(|names| names.len() > 1)
        .flatten()
        .collect()
}

fn exclusive_message(conflicts: &[&str]) -> String {
    format!(
        "Found multiple exclusive tags. Please ensure that only one tag of a given type is applied. Tags: {}",
        conflicts.join(",")
    )
}

pub fn validate_exclusive_tags(tags: &[TagRead]) -> Result<(), ValidationError> {
    let conflicts = exclusive_conflicts(tags);
    if conflicts.is_empty() {
        return Ok(());
    }

    Err(ValidationError::new("exclusive").with_message(exclusive_message(&conflicts).into()))
}

/// Loads the referenced tags with their stored tag types and re-checks exclusivity against them.
pub async fn resolve<C: ConnectionTrait>(db: &C, tags_in: &[TagRead]) -> ApiResult<Vec<TagRead>> {
    let ids: BTreeSet<i32> = tags_in.iter().map(|tag| tag.id).collect();
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let stored = load(db, ids.iter().copied().collect()).await?;

    let missing: Vec<String> = ids
        .iter()
        .filter(|id| !stored.iter().any(|tag| tag.id == **id))
        .map(|id| id.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ApiError::Validation(vec![FieldError::not_found(
            "tags",
            format!("Tags not found: {}", missing.join(",")),
        )]));
    }

    let conflicts = exclusive_conflicts(&stored);
    if !conflicts.is_empty() {
        return Err(ApiError::field("tags", exclusive_message(&conflicts), "exclusive"));
    }

    Ok(stored)
}

/// Tags of every given case, keyed by case id and ordered by tag id.
pub async fn for_cases<C: ConnectionTrait>(
    db: &C,
    case_ids: &[i32],
) -> ApiResult<HashMap<i32, Vec<TagRead>>> {
    if case_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let links = case_tag::Entity::find()
        .filter(case_tag::Column::CaseId.is_in(case_ids.iter().copied()))
        .order_by_asc(case_tag::Column::TagId)
        .all(db)
        .await?;

    let tag_ids: BTreeSet<i32> = links.iter().map(|link| link.tag_id).collect();
    let stored: HashMap<i32, TagRead> = load(db, tag_ids.into_iter().collect())
        .await?
        .into_iter()
        .map(|tag| (tag.id, tag))
        .collect();

    let mut by_case: HashMap<i32, Vec<TagRead>> = HashMap::new();
    for link in links {
        if let Some(tag) = stored.get(&link.tag_id) {
            by_case.entry(link.case_id).or_default().push(tag.clone());
        }
    }

    Ok(by_case)
}

/// Replaces the tag set of a case.
pub async fn replace<C: ConnectionTrait>(db: &C, case_id: i32, tags: &[TagRead]) -> ApiResult<()> {
    case_tag::Entity::delete_many()
        .filter(case_tag::Column::CaseId.eq(case_id))
        .exec(db)
        .await?;

    if tags.is_empty() {
        return Ok(());
    }

    let rows = tags.iter().map(|tag| case_tag::ActiveModel {
        case_id: Set(case_id),
        tag_id: Set(tag.id),
    });
    case_tag::Entity::insert_many(rows).exec(db).await?;

    Ok(())
}

async fn load<C: ConnectionTrait>(db: &C, ids: Vec<i32>) -> ApiResult<Vec<TagRead>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    tag::Entity::find()
        .filter(tag::Column::Id.is_in(ids))
        .find_also_related(tag_type::Entity)
        .order_by_asc(tag::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|(tag, tag_type)| -> ApiResult<TagRead> {
            let tag_type = tag_type
                .ok_or_else(|| anyhow::anyhow!("tag {} has no tag type", tag.id))?;
            Ok(TagRead::from_models(tag, tag_type))
        })
        .collect()
}
