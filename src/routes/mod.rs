use crate::config::rate_limit::{RateLimitConfig, RateLimitRule};
use crate::handlers;
use axum::{routing, Router};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

pub fn create_routes() -> Router {
    Router::new().nest("/api/v1", api_routes())
}

fn api_routes() -> Router {
    let rate_limit_config = RateLimitConfig::from_env();

    let read = read_routes(&rate_limit_config);
    let submit = submission_routes(&rate_limit_config);
    let review = review_routes(&rate_limit_config);

    read.merge(submit).merge(review)
}

/// Read routes: feed, catalogs, submission choices.
fn read_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        // Notifications
        .route(
            "/notifications",
            routing::get(handlers::notification::list_notifications),
        )
        .route(
            "/notifications/unread-count",
            routing::get(handlers::notification::unread_count),
        )
        // Projects
        .route("/projects", routing::get(handlers::project::list_projects))
        .route(
            "/projects/active",
            routing::get(handlers::project::list_active_projects),
        )
        // Subjects
        .route("/subjects", routing::get(handlers::subject::list_subjects))
        // Outcomes
        .route("/outcomes", routing::get(handlers::outcome::list_outcomes));

    with_optional_rate_limit(router, config.enabled, config.read)
}

/// Submission routes: the student-facing write.
fn submission_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new().route(
        "/notifications",
        routing::post(handlers::notification::submit_notification),
    );

    with_optional_rate_limit(router, config.enabled, config.submit)
}

/// Review routes: teacher-facing assessment and catalog maintenance.
fn review_routes(config: &RateLimitConfig) -> Router {
    let router = Router::new()
        // Assessment workflow
        .route(
            "/notifications/{id}/process",
            routing::put(handlers::notification::process_notification),
        )
        .route(
            "/notifications/{id}/read",
            routing::put(handlers::notification::mark_read),
        )
        .route(
            "/notifications/mark-all-read",
            routing::put(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/{id}",
            routing::delete(handlers::notification::delete_notification),
        )
        .route(
            "/notifications/delete-all",
            routing::delete(handlers::notification::delete_all_notifications),
        )
        // Project catalog
        .route("/projects", routing::post(handlers::project::create_project))
        .route(
            "/projects/{id}",
            routing::put(handlers::project::update_project),
        )
        .route(
            "/projects/{id}/soft",
            routing::delete(handlers::project::soft_delete_project),
        )
        // Subject catalog
        .route(
            "/subjects",
            routing::post(handlers::subject::create_subject),
        )
        .route(
            "/subjects/{id}",
            routing::put(handlers::subject::update_subject)
                .delete(handlers::subject::delete_subject),
        )
        // Outcome catalog
        .route(
            "/outcomes",
            routing::post(handlers::outcome::create_outcome),
        )
        .route(
            "/outcomes/{id}",
            routing::put(handlers::outcome::update_outcome)
                .delete(handlers::outcome::delete_outcome),
        );

    with_optional_rate_limit(router, config.enabled, config.review)
}

fn with_optional_rate_limit(router: Router, enabled: bool, rule: RateLimitRule) -> Router {
    if !enabled {
        return router;
    }

    let governor_conf = GovernorConfigBuilder::default()
        .per_second(rule.per_second)
        .burst_size(rule.burst_size)
        .finish()
        .expect("Invalid rate limit configuration");

    router.layer(GovernorLayer::new(governor_conf))
}
