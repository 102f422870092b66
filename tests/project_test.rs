mod common;

use chrono::Datelike;
use serde_json::Value;

#[tokio::test]
async fn numbers_are_sequential_within_year() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let year = chrono::Utc::now().year();
    let (_, first) = common::create_test_project(&app, "active").await;
    let (_, second) = common::create_test_project(&app, "active").await;
    let (_, third) = common::create_test_project(&app, "closed").await;

    assert_eq!(first, format!("{}-001", year));
    assert_eq!(second, format!("{}-002", year));
    assert_eq!(third, format!("{}-003", year));
}

#[tokio::test]
async fn concurrent_creates_get_distinct_numbers() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let mut handles = Vec::new();
    for i in 0..5 {
        let client = app.client.clone();
        let url = app.url("/projects");
        handles.push(tokio::spawn(async move {
            let resp = client
                .post(&url)
                .json(&serde_json::json!({
                    "name": format!("Concurrent Project {}", i),
                    "stage": "active"
                }))
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), 200);
            let body: Value = resp.json().await.unwrap();
            body["data"]["project_number"]
                .as_str()
                .unwrap()
                .to_string()
        }));
    }

    let mut numbers = Vec::new();
    for handle in handles {
        numbers.push(handle.await.unwrap());
    }
    numbers.sort();
    numbers.dedup();
    assert_eq!(numbers.len(), 5, "numbers must be distinct: {:?}", numbers);
}

#[tokio::test]
async fn duplicate_name_is_conflict() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let resp = app
        .client
        .post(app.url("/projects"))
        .json(&serde_json::json!({ "name": "Solar Tracker", "stage": "active" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .post(app.url("/projects"))
        .json(&serde_json::json!({ "name": "Solar Tracker", "stage": "closed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
async fn unknown_stage_rejected() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let resp = app
        .client
        .post(app.url("/projects"))
        .json(&serde_json::json!({ "name": "Bad Stage", "stage": "archived" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn active_list_excludes_non_active_and_deleted() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let (active_id, _) = common::create_test_project(&app, "active").await;
    common::create_test_project(&app, "in-progress").await;
    common::create_test_project(&app, "closed").await;
    let (deleted_id, _) = common::create_test_project(&app, "active").await;

    let resp = app
        .client
        .delete(app.url(&format!("/projects/{}/soft", deleted_id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url("/projects/active"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"].as_i64().unwrap() as i32, active_id);
}

#[tokio::test]
async fn soft_delete_hides_but_keeps_row() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let (id, number) = common::create_test_project(&app, "active").await;

    let resp = app
        .client
        .delete(app.url(&format!("/projects/{}/soft", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Gone from the default listing
    let resp = app
        .client
        .get(app.url("/projects"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["data"].as_array().unwrap().is_empty());

    // Still present when deleted rows are requested
    let resp = app
        .client
        .get(app.url("/projects?include_deleted=true"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["project_number"], number.as_str());
    assert_eq!(items[0]["is_deleted"], true);

    // The number stays taken
    let year = chrono::Utc::now().year();
    let (_, next_number) = common::create_test_project(&app, "active").await;
    assert_eq!(next_number, format!("{}-002", year));
}

#[tokio::test]
async fn soft_deleted_project_is_not_updatable() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let (id, _) = common::create_test_project(&app, "active").await;
    app.client
        .delete(app.url(&format!("/projects/{}/soft", id)))
        .send()
        .await
        .unwrap();

    let resp = app
        .client
        .put(app.url(&format!("/projects/{}", id)))
        .json(&serde_json::json!({ "name": "Renamed", "stage": "closed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    // Second soft delete is also a miss
    let resp = app
        .client
        .delete(app.url(&format!("/projects/{}/soft", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn update_changes_fields_but_not_number() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let (id, number) = common::create_test_project(&app, "active").await;

    let resp = app
        .client
        .put(app.url(&format!("/projects/{}", id)))
        .json(&serde_json::json!({
            "name": "Renamed Project",
            "stage": "in-progress",
            "teacher_id": 7,
            "requested_credit": 4.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["name"], "Renamed Project");
    assert_eq!(body["data"]["stage"], "in-progress");
    assert_eq!(body["data"]["teacher_id"].as_i64().unwrap(), 7);
    assert_eq!(body["data"]["project_number"], number.as_str());
}

#[tokio::test]
async fn update_unknown_project_is_404() {
    let Some(app) = common::spawn_app().await else {
        return;
    };

    let resp = app
        .client
        .put(app.url("/projects/99999"))
        .json(&serde_json::json!({ "name": "Ghost", "stage": "active" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}
