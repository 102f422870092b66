#![allow(dead_code)]

use reqwest::Client;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc, Once, OnceLock,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

static INIT: Once = Once::new();
static MIGRATIONS_RAN: AtomicBool = AtomicBool::new(false);
static NAME_COUNTER: AtomicUsize = AtomicUsize::new(0);

// Tests share one database and truncate it on startup; the gate keeps a
// parallel test in the same binary from wiping rows mid-assertion.
static DB_GATE: OnceLock<Arc<Mutex<()>>> = OnceLock::new();

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        // Keep the governor out of the way for rapid-fire test requests
        std::env::set_var("RATE_LIMIT_ENABLED", "false");
    });
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
    _gate: OwnedMutexGuard<()>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.addr, path)
    }
}

/// Spawn the app on an ephemeral port, or None when no test database is
/// configured (the integration suite is skipped in that case).
pub async fn spawn_app() -> Option<TestApp> {
    init_env();

    let database_url = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()?;

    let gate = DB_GATE
        .get_or_init(|| Arc::new(Mutex::new(())))
        .clone()
        .lock_owned()
        .await;

    let db = sea_orm::Database::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    // Run migrations only once globally (using atomic bool for thread safety)
    if !MIGRATIONS_RAN.swap(true, Ordering::SeqCst) {
        credo::migration::Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
    }

    // Clean data tables (reverse dependency order)
    cleanup_tables(&db).await;

    let app = axum::Router::new()
        .route("/", axum::routing::get(|| async { "ok" }))
        .merge(credo::routes::create_routes())
        .layer(axum::extract::Extension(db.clone()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    let addr_str = format!("http://{}", addr);
    let client = Client::new();

    Some(TestApp {
        addr: addr_str,
        db,
        client,
        _gate: gate,
    })
}

async fn cleanup_tables(db: &DatabaseConnection) {
    let tables = ["notifications", "projects", "outcomes", "subjects"];

    for table in tables {
        let sql = format!("TRUNCATE TABLE {} CASCADE", table);
        let _ = db
            .execute(Statement::from_string(
                sea_orm::DatabaseBackend::Postgres,
                sql,
            ))
            .await;
    }
}

fn next_unique(prefix: &str) -> String {
    let counter = NAME_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{} {}", prefix, counter)
}

/// Create a subject and return its id.
pub async fn create_test_subject(app: &TestApp) -> i32 {
    let resp = app
        .client
        .post(app.url("/subjects"))
        .json(&serde_json::json!({
            "name": next_unique("Test Subject"),
            "credits": 5.0,
            "compulsory": false
        }))
        .send()
        .await
        .expect("Failed to create subject");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("Failed to parse response");
    if !body["success"].as_bool().unwrap_or(false) {
        panic!("Failed to create subject: status={}, body={}", status, body);
    }

    body["data"]["id"].as_i64().expect("Response missing id") as i32
}

/// Create an outcome under a subject and return its id.
pub async fn create_test_outcome(app: &TestApp, subject_id: i32) -> i32 {
    let resp = app
        .client
        .post(app.url("/outcomes"))
        .json(&serde_json::json!({
            "subject_id": subject_id,
            "topic": next_unique("Test Outcome"),
            "credits": 2.0
        }))
        .send()
        .await
        .expect("Failed to create outcome");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("Failed to parse response");
    if !body["success"].as_bool().unwrap_or(false) {
        panic!("Failed to create outcome: status={}, body={}", status, body);
    }

    body["data"]["id"].as_i64().expect("Response missing id") as i32
}

/// Create a catalog project and return (id, project_number).
pub async fn create_test_project(app: &TestApp, stage: &str) -> (i32, String) {
    create_test_project_linked(app, stage, None).await
}

/// Create a catalog project, optionally linked to an
/// (outcome_id, student_id, subject_id) tuple for mirror tests.
pub async fn create_test_project_linked(
    app: &TestApp,
    stage: &str,
    link: Option<(i32, i32, i32)>,
) -> (i32, String) {
    let mut payload = serde_json::json!({
        "name": next_unique("Test Project"),
        "stage": stage
    });
    if let Some((outcome_id, student_id, subject_id)) = link {
        payload["outcome_id"] = outcome_id.into();
        payload["student_id"] = student_id.into();
        payload["subject_id"] = subject_id.into();
    }

    let resp = app
        .client
        .post(app.url("/projects"))
        .json(&payload)
        .send()
        .await
        .expect("Failed to create project");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("Failed to parse response");
    if !body["success"].as_bool().unwrap_or(false) {
        panic!("Failed to create project: status={}, body={}", status, body);
    }

    let id = body["data"]["id"].as_i64().expect("Response missing id") as i32;
    let number = body["data"]["project_number"]
        .as_str()
        .expect("Response missing project_number")
        .to_string();
    (id, number)
}

/// Submit a student notification and return its id.
pub async fn submit_test_notification(
    app: &TestApp,
    student_id: i32,
    subject_id: i32,
    outcome_id: i32,
) -> i32 {
    let resp = app
        .client
        .post(app.url("/notifications"))
        .json(&serde_json::json!({
            "student_id": student_id,
            "subject_id": subject_id,
            "outcome_id": outcome_id,
            "project_name": next_unique("Submitted Project"),
            "requested_credit": 2.5
        }))
        .send()
        .await
        .expect("Failed to submit notification");

    let status = resp.status();
    let body: serde_json::Value = resp.json().await.expect("Failed to parse response");
    if !body["success"].as_bool().unwrap_or(false) {
        panic!(
            "Failed to submit notification: status={}, body={}",
            status, body
        );
    }

    body["data"]["id"].as_i64().expect("Response missing id") as i32
}
