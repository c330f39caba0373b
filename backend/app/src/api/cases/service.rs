use std::collections::{BTreeSet, HashMap};

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, TransactionTrait,
    sea_query::Expr,
};

use super::schema::{
    CaseCreate, CaseRead, CaseReadNested, CaseReference, CaseUpdate, EventRead, TicketRead,
};
use crate::{
    api::{projects, tags},
    common::{ApiError, ApiResult},
    entity::{case, case_tag, enums::CaseStatus, event, ticket},
};

pub async fn get<C: ConnectionTrait>(db: &C, case_id: i32) -> ApiResult<Option<case::Model>> {
    Ok(case::Entity::find_by_id(case_id).one(db).await?)
}

pub async fn create(db: &DatabaseConnection, case_in: CaseCreate) -> ApiResult<case::Model> {
    let txn = db.begin().await?;

    let project = projects::resolve(&txn, &case_in.project).await?;
    let tags = tags::resolve(&txn, &case_in.tags).await?;

    let now = Utc::now();
    let case = case::ActiveModel {
        name: Set(None),
        title: Set(case_in.title),
        description: Set(case_in.description),
        resolution: Set(case_in.resolution),
        status: Set(case_in.status.unwrap_or_default()),
        visibility: Set(case_in.visibility.unwrap_or_default()),
        reported_at: Set(now),
        stable_at: Set(None),
        closed_at: Set(None),
        duplicate_id: Set(None),
        project_id: Set(project.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    tags::replace(&txn, case.id, &tags).await?;

    txn.commit().await?;

    tracing::info!(case_id = case.id, project_id = project.id, "case created");

    Ok(case)
}

pub async fn update(
    db: &DatabaseConnection,
    case: case::Model,
    case_in: CaseUpdate,
) -> ApiResult<case::Model> {
    let txn = db.begin().await?;

    let tags = match &case_in.tags {
        Some(tags_in) => Some(tags::resolve(&txn, tags_in).await?),
        None => None,
    };
    let duplicates = match &case_in.duplicates {
        Some(duplicates_in) => Some(resolve_duplicates(&txn, case.id, duplicates_in).await?),
        None => None,
    };

    let now = Utc::now();
    let stable_at = case.stable_at;
    let closed_at = case.closed_at;
    let case_id = case.id;

    let mut model = case.into_active_model();
    model.title = Set(case_in.title);
    model.description = Set(case_in.description);
    if let Some(resolution) = case_in.resolution {
        model.resolution = Set(Some(resolution));
    }
    if let Some(visibility) = case_in.visibility {
        model.visibility = Set(visibility);
    }
    if let Some(reported_at) = case_in.reported_at {
        model.reported_at = Set(reported_at);
    }
    if let Some(stable_at) = case_in.stable_at {
        model.stable_at = Set(Some(stable_at));
    }
    if let Some(status) = case_in.status {
        model.status = Set(status);
        match status {
            CaseStatus::Stable if stable_at.is_none() && case_in.stable_at.is_none() => {
                model.stable_at = Set(Some(now));
            }
            CaseStatus::Closed if closed_at.is_none() => {
                model.closed_at = Set(Some(now));
            }
            _ => {}
        }
    }
    model.updated_at = Set(now);

    let case = model.update(&txn).await?;

    if let Some(tags) = tags {
        tags::replace(&txn, case_id, &tags).await?;
    }

    if let Some(duplicates) = duplicates {
        detach_duplicates(&txn, case_id).await?;
        if !duplicates.is_empty() {
            case::Entity::update_many()
                .col_expr(case::Column::DuplicateId, Expr::value(case_id))
                .filter(case::Column::Id.is_in(duplicates))
                .exec(&txn)
                .await?;
        }
    }

    txn.commit().await?;

    tracing::debug!(case_id, "case updated");

    Ok(case)
}

/// Removes the case together with its ticket, events and tag links.
pub async fn delete(db: &DatabaseConnection, case_id: i32) -> ApiResult<()> {
    let txn = db.begin().await?;

    ticket::Entity::delete_many()
        .filter(ticket::Column::CaseId.eq(case_id))
        .exec(&txn)
        .await?;
    event::Entity::delete_many()
        .filter(event::Column::CaseId.eq(case_id))
        .exec(&txn)
        .await?;
    case_tag::Entity::delete_many()
        .filter(case_tag::Column::CaseId.eq(case_id))
        .exec(&txn)
        .await?;
    detach_duplicates(&txn, case_id).await?;
    case::Entity::delete_by_id(case_id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!(case_id, "case deleted");

    Ok(())
}

/// Read shapes for a batch of cases. Related rows are loaded once per relation, not per case.
pub async fn read_many<C: ConnectionTrait>(
    db: &C,
    cases: Vec<case::Model>,
) -> ApiResult<Vec<CaseRead>> {
    if cases.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i32> = cases.iter().map(|case| case.id).collect();

    let duplicates = case::Entity::find()
        .filter(case::Column::DuplicateId.is_in(ids.iter().copied()))
        .order_by_asc(case::Column::Id)
        .all(db)
        .await?;

    let projects = projects::get_many(
        db,
        cases.iter().chain(&duplicates).map(|case| case.project_id),
    )
    .await?;

    let mut duplicates_by_case: HashMap<i32, Vec<CaseReadNested>> = HashMap::new();
    for duplicate in duplicates {
        let Some(original_id) = duplicate.duplicate_id else {
            continue;
        };
        let project = projects::embed(&projects, duplicate.project_id)?;
        duplicates_by_case
            .entry(original_id)
            .or_default()
            .push(CaseReadNested::new(duplicate, project));
    }

    let mut events_by_case: HashMap<i32, Vec<EventRead>> = HashMap::new();
    for event in event::Entity::find()
        .filter(event::Column::CaseId.is_in(ids.iter().copied()))
        .order_by_asc(event::Column::StartedAt)
        .order_by_asc(event::Column::Id)
        .all(db)
        .await?
    {
        events_by_case
            .entry(event.case_id)
            .or_default()
            .push(EventRead::from(event));
    }

    let mut tickets_by_case: HashMap<i32, TicketRead> = ticket::Entity::find()
        .filter(ticket::Column::CaseId.is_in(ids.iter().copied()))
        .all(db)
        .await?
        .into_iter()
        .map(|ticket| (ticket.case_id, TicketRead::from(ticket)))
        .collect();

    let mut tags_by_case = tags::for_cases(db, &ids).await?;

    cases
        .into_iter()
        .map(|case| {
            let id = case.id;
            let project = projects::embed(&projects, case.project_id)?;

            Ok(CaseRead {
                case: CaseReadNested::new(case, project),
                duplicates: duplicates_by_case.remove(&id).unwrap_or_default(),
                events: events_by_case.remove(&id).unwrap_or_default(),
                tags: tags_by_case.remove(&id).unwrap_or_default(),
                ticket: tickets_by_case.remove(&id),
            })
        })
        .collect()
}

pub async fn read<C: ConnectionTrait>(db: &C, case: case::Model) -> ApiResult<CaseRead> {
    read_many(db, vec![case])
        .await?
        .pop()
        .ok_or_else(|| anyhow::anyhow!("case read produced no row").into())
}

async fn detach_duplicates<C: ConnectionTrait>(db: &C, case_id: i32) -> ApiResult<()> {
    case::Entity::update_many()
        .col_expr(case::Column::DuplicateId, Expr::value(Option::<i32>::None))
        .filter(case::Column::DuplicateId.eq(case_id))
        .exec(db)
        .await?;

    Ok(())
}

async fn resolve_duplicates<C: ConnectionTrait>(
    db: &C,
    case_id: i32,
    duplicates_in: &[CaseReference],
) -> ApiResult<Vec<i32>> {
    let ids: BTreeSet<i32> = duplicates_in.iter().map(|duplicate| duplicate.id).collect();

    if ids.contains(&case_id) {
        return Err(ApiError::field(
            "duplicates",
            "A case cannot be a duplicate of itself.",
            "value_error",
        ));
    }
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let found: BTreeSet<i32> = case::Entity::find()
        .filter(case::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?
        .into_iter()
        .map(|duplicate| duplicate.id)
        .collect();

    let missing: Vec<String> = ids.difference(&found).map(|id| id.to_string()).collect();
    if !missing.is_empty() {
        return Err(ApiError::field(
            "duplicates",
            format!("Cases not found: {}", missing.join(",")),
            "not_found",
        ));
    }

    Ok(ids.into_iter().collect())
}
