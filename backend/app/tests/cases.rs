mod common;

use axum::http::StatusCode;
use casefile::entity::ticket;
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{Value, json};

use common::{TestApp, encode_query, first_detail, setup, tag_json};

async fn create_case(app: &TestApp, title: &str, description: &str) -> Value {
    let (status, body) = app
        .post(
            "/api/cases",
            json!({
                "title": title,
                "description": description,
                "project": { "name": "P" },
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["data"].clone()
}

#[tokio::test]
async fn case_defaults_and_exclusive_tags() {
    let app = setup().await;
    let project = app.project("P").await;
    let severity = app.tag_type(project.id, "severity", true).await;
    let high = app.tag(&severity, "sev-high").await;
    let low = app.tag(&severity, "sev-low").await;

    let (status, body) = app
        .post(
            "/api/cases",
            json!({
                "title": "Phish",
                "description": "desc",
                "project": { "id": project.id, "name": "P" },
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let case = &body["data"];
    assert_eq!(case["status"], "active");
    assert_eq!(case["visibility"], "open");
    assert_eq!(case["project"]["name"], "P");
    assert_eq!(case["tags"], json!([]));
    assert_eq!(case["duplicates"], json!([]));
    assert_eq!(case["ticket"], Value::Null);
    assert!(case["reported_at"].is_string());
    let id = case["id"].as_i64().unwrap();

    let (status, body) = app
        .put(
            &format!("/api/cases/{id}"),
            json!({
                "title": "Phish",
                "description": "desc",
                "tags": [tag_json(&high, &severity), tag_json(&low, &severity)],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (loc, msg) = first_detail(&body);
    assert_eq!(loc, &json!(["tags"]));
    assert!(msg.starts_with("Found multiple exclusive tags."), "{msg}");
    assert!(msg.ends_with("Tags: sev-high,sev-low"), "{msg}");

    let (status, body) = app
        .put(
            &format!("/api/cases/{id}"),
            json!({
                "title": "Phish",
                "description": "desc",
                "tags": [tag_json(&high, &severity)],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["tags"][0]["name"], "sev-high");
    assert_eq!(body["data"]["tags"][0]["tag_type"]["exclusive"], true);
}

#[tokio::test]
async fn stored_tag_types_decide_exclusivity() {
    let app = setup().await;
    let project = app.project("P").await;
    let region = app.tag_type(project.id, "region", true).await;
    let eu = app.tag(&region, "eu").await;
    let us = app.tag(&region, "us").await;

    let mut eu_json = tag_json(&eu, &region);
    eu_json["tag_type"]["exclusive"] = json!(false);
    let mut us_json = tag_json(&us, &region);
    us_json["tag_type"]["exclusive"] = json!(false);

    let (status, body) = app
        .post(
            "/api/cases",
            json!({
                "title": "Leak",
                "description": "desc",
                "project": { "name": "P" },
                "tags": [eu_json, us_json],
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(first_detail(&body).1.ends_with("Tags: eu,us"));

    let (_, body) = app.get("/api/cases").await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn empty_title_or_description_is_rejected() {
    let app = setup().await;
    app.project("P").await;

    let (status, body) = app
        .post(
            "/api/cases",
            json!({ "title": "", "description": "desc", "project": { "name": "P" } }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let (loc, msg) = first_detail(&body);
    assert_eq!(loc, &json!(["title"]));
    assert_eq!(msg, "must not be empty string");

    let id = create_case(&app, "Phish", "desc").await["id"].as_i64().unwrap();
    let (status, body) = app
        .put(
            &format!("/api/cases/{id}"),
            json!({ "title": "Phish", "description": "" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(first_detail(&body).0, &json!(["description"]));
}

#[tokio::test]
async fn unknown_project_is_rejected() {
    let app = setup().await;

    let (status, body) = app
        .post(
            "/api/cases",
            json!({ "title": "Phish", "description": "desc", "project": { "name": "ghost" } }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(first_detail(&body).0, &json!(["project"]));
}

#[tokio::test]
async fn closing_a_case_stamps_closed_at() {
    let app = setup().await;
    app.project("P").await;
    let id = create_case(&app, "Phish", "desc").await["id"].as_i64().unwrap();

    let (status, body) = app
        .put(
            &format!("/api/cases/{id}"),
            json!({
                "title": "Phish",
                "description": "desc",
                "resolution": "blocked sender",
                "status": "closed",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "closed");
    assert_eq!(body["data"]["resolution"], "blocked sender");
    assert!(body["data"]["closed_at"].is_string());
    assert_eq!(body["data"]["visibility"], "open");
}

#[tokio::test]
async fn explicit_stable_at_wins_over_the_automatic_stamp() {
    let app = setup().await;
    app.project("P").await;
    let id = create_case(&app, "Phish", "desc").await["id"].as_i64().unwrap();

    let (status, body) = app
        .put(
            &format!("/api/cases/{id}"),
            json!({
                "title": "Phish",
                "description": "desc",
                "status": "stable",
                "stable_at": "2024-01-02T03:04:05Z",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "stable");
    let stable_at = DateTime::parse_from_rfc3339(body["data"]["stable_at"].as_str().unwrap())
        .unwrap()
        .with_timezone(&Utc);
    assert_eq!(stable_at, Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
    assert_eq!(body["data"]["closed_at"], Value::Null);
}

#[tokio::test]
async fn list_attaches_related_rows_to_the_right_case() {
    let app = setup().await;
    let project = app.project("P").await;
    let kind = app.tag_type(project.id, "kind", false).await;
    let phishing = app.tag(&kind, "phishing").await;
    let malware = app.tag(&kind, "malware").await;

    let first = create_case(&app, "First", "desc").await["id"].as_i64().unwrap();
    let second = create_case(&app, "Second", "desc").await["id"].as_i64().unwrap();
    let third = create_case(&app, "Third", "desc").await["id"].as_i64().unwrap();

    app.put(
        &format!("/api/cases/{first}"),
        json!({
            "title": "First",
            "description": "desc",
            "tags": [tag_json(&phishing, &kind), tag_json(&malware, &kind)],
            "duplicates": [{ "id": third }],
        }),
    )
    .await;
    app.ticket(second as i32, "SEC-2").await;

    let (status, body) = app.get("/api/cases?itemsPerPage=-1&sortBy=id").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);

    let tag_names: Vec<&str> = items[0]["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tag| tag["name"].as_str().unwrap())
        .collect();
    assert_eq!(tag_names, vec!["phishing", "malware"]);
    assert_eq!(items[0]["duplicates"][0]["id"], third);
    assert_eq!(items[0]["duplicates"][0]["project"]["name"], "P");
    assert_eq!(items[0]["ticket"], Value::Null);

    assert_eq!(items[1]["ticket"]["resource_id"], "SEC-2");
    assert_eq!(items[1]["tags"], json!([]));
    assert_eq!(items[1]["duplicates"], json!([]));

    assert_eq!(items[2]["tags"], json!([]));
    assert_eq!(items[2]["ticket"], Value::Null);
}

#[tokio::test]
async fn duplicates_are_linked_and_detached_on_delete() {
    let app = setup().await;
    app.project("P").await;
    let original = create_case(&app, "Phish", "desc").await["id"].as_i64().unwrap();
    let copy = create_case(&app, "Phish again", "desc").await["id"].as_i64().unwrap();

    let (status, body) = app
        .put(
            &format!("/api/cases/{original}"),
            json!({ "title": "Phish", "description": "desc", "duplicates": [{ "id": original }] }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(first_detail(&body).0, &json!(["duplicates"]));

    let (status, body) = app
        .put(
            &format!("/api/cases/{original}"),
            json!({ "title": "Phish", "description": "desc", "duplicates": [{ "id": copy }] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["duplicates"][0]["id"], copy);
    assert_eq!(body["data"]["duplicates"][0]["title"], "Phish again");

    let (status, _) = app.delete(&format!("/api/cases/{original}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get(&format!("/api/cases/{copy}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Phish again");
}

#[tokio::test]
async fn deleting_a_case_removes_its_ticket() {
    let app = setup().await;
    app.project("P").await;
    let id = create_case(&app, "Phish", "desc").await["id"].as_i64().unwrap();
    app.ticket(id as i32, "SEC-1").await;

    let (_, body) = app.get(&format!("/api/cases/{id}")).await;
    assert_eq!(body["data"]["ticket"]["resource_id"], "SEC-1");

    let (status, body) = app.delete(&format!("/api/cases/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "case deleted");

    assert_eq!(ticket::Entity::find().count(&app.db).await.unwrap(), 0);

    let (status, body) = app.get(&format!("/api/cases/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "The case with this id does not exist.");

    let (status, _) = app.delete(&format!("/api/cases/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_ranks_title_matches_above_description_matches() {
    let app = setup().await;
    app.project("P").await;
    create_case(&app, "Printer jam", "phishing email reported").await;
    create_case(&app, "Phishing campaign", "details").await;
    create_case(&app, "Outage", "database down").await;

    let (status, body) = app.get("/api/cases?q=phish").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    let titles: Vec<&str> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Phishing campaign", "Printer jam"]);
}

#[tokio::test]
async fn list_filters_by_status() {
    let app = setup().await;
    app.project("P").await;
    create_case(&app, "One", "desc").await;
    let second = create_case(&app, "Two", "desc").await["id"].as_i64().unwrap();
    app.put(
        &format!("/api/cases/{second}"),
        json!({ "title": "Two", "description": "desc", "status": "stable" }),
    )
    .await;

    let filter = r#"{"and":[{"field":"status","op":"==","value":"stable"}]}"#;
    let uri = format!("/api/cases?filter={}", encode_query(filter));
    let (status, body) = app.get(&uri).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["title"], "Two");
    assert!(body["data"]["items"][0]["stable_at"].is_string());
}
