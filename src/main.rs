mod config;
mod error;
mod handlers;
mod migration;
mod models;
mod response;
mod routes;
mod services;

use axum::{extract::Extension, response::IntoResponse, routing::get, Json, Router};
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use std::env;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        // Notification routes
        crate::handlers::notification::submit_notification,
        crate::handlers::notification::list_notifications,
        crate::handlers::notification::unread_count,
        crate::handlers::notification::process_notification,
        crate::handlers::notification::mark_read,
        crate::handlers::notification::mark_all_read,
        crate::handlers::notification::delete_notification,
        crate::handlers::notification::delete_all_notifications,
        // Project routes
        crate::handlers::project::list_projects,
        crate::handlers::project::list_active_projects,
        crate::handlers::project::create_project,
        crate::handlers::project::update_project,
        crate::handlers::project::soft_delete_project,
        // Subject routes
        crate::handlers::subject::list_subjects,
        crate::handlers::subject::create_subject,
        crate::handlers::subject::update_subject,
        crate::handlers::subject::delete_subject,
        // Outcome routes
        crate::handlers::outcome::list_outcomes,
        crate::handlers::outcome::create_outcome,
        crate::handlers::outcome::update_outcome,
        crate::handlers::outcome::delete_outcome,
    ),
    components(
        schemas(
            crate::response::ApiResponse<serde_json::Value>,
            crate::response::PaginatedResponse<serde_json::Value>,
            crate::response::PaginationQuery,
            crate::error::AppError,
            // Notifications
            crate::handlers::notification::SubmitNotificationRequest,
            crate::handlers::notification::AssessNotificationRequest,
            crate::handlers::notification::NotificationListQuery,
            crate::handlers::notification::NotificationResponse,
            crate::handlers::notification::UnreadCountResponse,
            // Projects
            crate::handlers::project::CreateProjectRequest,
            crate::handlers::project::UpdateProjectRequest,
            crate::handlers::project::ProjectResponse,
            // Subjects
            crate::handlers::subject::CreateSubjectRequest,
            crate::handlers::subject::UpdateSubjectRequest,
            crate::handlers::subject::SubjectResponse,
            // Outcomes
            crate::handlers::outcome::CreateOutcomeRequest,
            crate::handlers::outcome::UpdateOutcomeRequest,
            crate::handlers::outcome::OutcomeResponse,
        )
    ),
    tags(
        (name = "notifications", description = "Submission and assessment workflow"),
        (name = "projects", description = "Project catalog operations"),
        (name = "subjects", description = "Subject catalog operations"),
        (name = "outcomes", description = "Learning outcome operations"),
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credo=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration before doing anything else
    validate_config()?;

    tracing::info!("Starting Credit Approval API v{}...", env!("CARGO_PKG_VERSION"));

    let db = config::database::get_database().await?;
    tracing::info!("Database connected successfully");

    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    let app = create_app().layer(Extension(db));

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Validate all required configuration at startup (fail-fast).
fn validate_config() -> anyhow::Result<()> {
    // DATABASE_URL — checked here for early error; actual connection happens later
    if env::var("DATABASE_URL").is_err() {
        return Err(anyhow::anyhow!(
            "DATABASE_URL environment variable must be set"
        ));
    }

    Ok(())
}

fn build_cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins_str == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

fn create_app() -> Router {
    Router::new()
        .route("/", get(health_check))
        .merge(routes::create_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Health check successful", body = serde_json::Value)
    )
)]
async fn health_check(
    Extension(db): Extension<DatabaseConnection>,
) -> impl IntoResponse {
    let db_ok = db
        .query_one(Statement::from_string(
            sea_orm::DatabaseBackend::Postgres,
            "SELECT 1".to_string(),
        ))
        .await
        .is_ok();

    let status = if db_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "service": "Credit Approval API",
        "version": env!("CARGO_PKG_VERSION"),
        "database": db_ok,
    }))
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, gracefully shutting down...");
}
