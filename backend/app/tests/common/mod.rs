#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use casefile::{
    AppState, api,
    config::DatabaseConfig,
    database,
    entity::{project, tag, tag_type, ticket},
};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::{Value, json};
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
}

/// Router over a fresh in-memory SQLite database. A single pooled connection keeps the schema alive.
pub async fn setup() -> TestApp {
    let config: DatabaseConfig = serde_json::from_value(json!({
        "url": "sqlite::memory:",
        "min_connections": 1,
        "max_connections": 1,
    }))
    .unwrap();

    let db = database::connect(&config).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let router = api::create_router().with_state(AppState::new(db.clone()));

    TestApp { router, db }
}

impl TestApp {
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(body) => Body::from(serde_json::to_vec(&body).unwrap()),
                None => Body::empty(),
            })
            .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    pub async fn project(&self, name: &str) -> project::Model {
        project::ActiveModel {
            name: Set(name.to_string()),
            color: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap()
    }

    pub async fn tag_type(&self, project_id: i32, name: &str, exclusive: bool) -> tag_type::Model {
        tag_type::ActiveModel {
            name: Set(name.to_string()),
            description: Set(None),
            exclusive: Set(exclusive),
            project_id: Set(project_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap()
    }

    pub async fn tag(&self, tag_type: &tag_type::Model, name: &str) -> tag::Model {
        tag::ActiveModel {
            name: Set(name.to_string()),
            description: Set(None),
            tag_type_id: Set(tag_type.id),
            project_id: Set(tag_type.project_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap()
    }

    pub async fn ticket(&self, case_id: i32, resource_id: &str) -> ticket::Model {
        ticket::ActiveModel {
            resource_id: Set(Some(resource_id.to_string())),
            resource_type: Set(Some("jira".to_string())),
            weblink: Set(None),
            case_id: Set(case_id),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .unwrap()
    }
}

/// Tag payload as a client would send it.
pub fn tag_json(tag: &tag::Model, tag_type: &tag_type::Model) -> Value {
    json!({
        "id": tag.id,
        "name": tag.name,
        "tag_type": {
            "id": tag_type.id,
            "name": tag_type.name,
            "exclusive": tag_type.exclusive,
        },
    })
}

pub fn first_detail(body: &Value) -> (&Value, &str) {
    let detail = &body["detail"][0];
    (&detail["loc"], detail["msg"].as_str().unwrap_or_default())
}

/// Percent-encodes everything but ASCII alphanumerics.
pub fn encode_query(raw: &str) -> String {
    raw.bytes()
        .map(|byte| {
            if byte.is_ascii_alphanumeric() {
                (byte as char).to_string()
            } else {
                format!("%{byte:02X}")
            }
        })
        .collect()
}
