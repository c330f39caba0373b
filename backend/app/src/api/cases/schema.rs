use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    api::{
        projects::ProjectRead,
        tags::{TagRead, validate_exclusive_tags},
    },
    entity::{
        case, event,
        enums::{CaseStatus, Visibility},
        ticket,
    },
    params::Page,
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CaseCreate {
    #[validate(length(min = 1, message = "must not be empty string"))]
    pub title: String,
    #[validate(length(min = 1, message = "must not be empty string"))]
    pub description: String,
    pub resolution: Option<String>,
    pub status: Option<CaseStatus>,
    pub visibility: Option<Visibility>,
    pub project: ProjectRead,
    #[serde(default)]
    #[validate(custom(function = "validate_exclusive_tags"))]
    pub tags: Vec<TagRead>,
}

/// Reference to another case; any extra fields of a nested read are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CaseReference {
    pub id: i32,
}

/// Absent optional fields leave the stored values untouched.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CaseUpdate {
    #[validate(length(min = 1, message = "must not be empty string"))]
    pub title: String,
    #[validate(length(min = 1, message = "must not be empty string"))]
    pub description: String,
    pub resolution: Option<String>,
    pub status: Option<CaseStatus>,
    pub visibility: Option<Visibility>,
    pub duplicates: Option<Vec<CaseReference>>,
    pub reported_at: Option<DateTime<Utc>>,
    pub stable_at: Option<DateTime<Utc>>,
    #[validate(custom(function = "validate_exclusive_tags"))]
    pub tags: Option<Vec<TagRead>>,
}

/// Case embedded in another response; never expands duplicates, events, tags or ticket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseReadNested {
    pub id: i32,
    pub name: Option<String>,
    pub title: String,
    pub description: String,
    pub resolution: Option<String>,
    pub status: CaseStatus,
    pub visibility: Visibility,
    pub project: ProjectRead,
    pub reported_at: DateTime<Utc>,
    pub stable_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl CaseReadNested {
    pub fn new(model: case::Model, project: ProjectRead) -> Self {
        Self {
            id: model.id,
            name: model.name,
            title: model.title,
            description: model.description,
            resolution: model.resolution,
            status: model.status,
            visibility: model.visibility,
            project,
            reported_at: model.reported_at,
            stable_at: model.stable_at,
            closed_at: model.closed_at,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRead {
    pub id: i32,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub source: String,
    pub description: String,
}

impl From<event::Model> for EventRead {
    fn from(model: event::Model) -> Self {
        Self {
            id: model.id,
            started_at: model.started_at,
            ended_at: model.ended_at,
            source: model.source,
            description: model.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketRead {
    pub id: i32,
    pub resource_id: Option<String>,
    pub resource_type: Option<String>,
    pub weblink: Option<String>,
}

impl From<ticket::Model> for TicketRead {
    fn from(model: ticket::Model) -> Self {
        Self {
            id: model.id,
            resource_id: model.resource_id,
            resource_type: model.resource_type,
            weblink: model.weblink,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseRead {
    #[serde(flatten)]
    pub case: CaseReadNested,
    pub duplicates: Vec<CaseReadNested>,
    pub events: Vec<EventRead>,
    pub tags: Vec<TagRead>,
    pub ticket: Option<TicketRead>,
}

pub type CasePagination = Page<CaseRead>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn tag(id: i32, name: &str, type_id: i32, exclusive: bool) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "tag_type": {"id": type_id, "name": "severity", "exclusive": exclusive}
        })
    }

    #[test]
    fn create_defaults_and_required_fields() {
        let create: CaseCreate = serde_json::from_value(json!({
            "title": "Phish",
            "description": "desc",
            "project": {"id": 1, "name": "P"}
        }))
        .unwrap();

        assert!(create.validate().is_ok());
        assert!(create.tags.is_empty());
        assert!(create.status.is_none());
        assert_eq!(create.project.id, Some(1));

        let missing_project = serde_json::from_value::<CaseCreate>(json!({
            "title": "Phish",
            "description": "desc"
        }));
        assert!(missing_project.is_err());
    }

    #[test]
    fn empty_title_or_description_is_rejected() {
        for (title, description, field) in [("", "desc", "title"), ("Phish", "", "description")] {
            let create: CaseCreate = serde_json::from_value(json!({
                "title": title,
                "description": description,
                "project": {"name": "P"}
            }))
            .unwrap();
            let errors = create.validate().unwrap_err();
            let field_errors = errors.field_errors();
            let reported = field_errors.get(field).expect("field error");
            assert_eq!(
                reported[0].message.as_deref(),
                Some("must not be empty string")
            );

            let update: CaseUpdate = serde_json::from_value(json!({
                "title": title,
                "description": description
            }))
            .unwrap();
            assert!(update.validate().unwrap_err().field_errors().contains_key(field));
        }
    }

    #[test]
    fn update_rejects_two_tags_of_an_exclusive_type() {
        let update: CaseUpdate = serde_json::from_value(json!({
            "title": "Phish",
            "description": "desc",
            "tags": [tag(1, "sev-high", 7, true), tag(2, "sev-low", 7, true)]
        }))
        .unwrap();

        let errors = update.validate().unwrap_err();
        let field_errors = errors.field_errors();
        let message = field_errors.get("tags").expect("tags error")[0]
            .message
            .as_deref()
            .unwrap_or_default()
            .to_string();
        assert!(message.contains("sev-high"), "{message}");
        assert!(message.contains("sev-low"), "{message}");
    }

    #[test]
    fn update_allows_non_exclusive_repeats_and_absent_tags() {
        let update: CaseUpdate = serde_json::from_value(json!({
            "title": "Phish",
            "description": "desc",
            "tags": [tag(1, "phishing", 3, false), tag(2, "malware", 3, false)]
        }))
        .unwrap();
        assert!(update.validate().is_ok());

        let update: CaseUpdate = serde_json::from_value(json!({
            "title": "Phish",
            "description": "desc"
        }))
        .unwrap();
        assert!(update.validate().is_ok());
        assert!(update.tags.is_none());
        assert!(update.duplicates.is_none());
    }

    #[test]
    fn duplicates_accept_nested_reads() {
        let update: CaseUpdate = serde_json::from_value(json!({
            "title": "Phish",
            "description": "desc",
            "duplicates": [{"id": 4, "title": "Other", "status": "active"}]
        }))
        .unwrap();
        assert_eq!(update.duplicates, Some(vec![CaseReference { id: 4 }]));
    }

    #[test]
    fn statuses_use_lowercase_names() {
        let update: CaseUpdate = serde_json::from_value(json!({
            "title": "Phish",
            "description": "desc",
            "status": "closed",
            "visibility": "restricted"
        }))
        .unwrap();
        assert_eq!(update.status, Some(CaseStatus::Closed));
        assert_eq!(update.visibility, Some(Visibility::Restricted));
    }
}
