use crate::error::{AppError, AppResult};
use crate::models::NotificationModel;
use crate::response::{ApiResponse, PaginatedResponse};
use crate::services::assessment::{Assessment, AssessmentService, ProjectMirror};
use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitNotificationRequest {
    /// Submitting student
    #[validate(range(min = 1))]
    pub student_id: i32,
    /// Subject the outcome belongs to
    #[validate(range(min = 1))]
    pub subject_id: i32,
    /// Learning outcome being submitted against
    #[validate(range(min = 1))]
    pub outcome_id: i32,
    /// Project name (1-200 characters)
    #[validate(length(min = 1, max = 200))]
    pub project_name: String,
    /// Credits the student is asking for
    pub requested_credit: f64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AssessNotificationRequest {
    /// "approved" or "rejected"
    pub status: String,
    /// Awarded credits, required when approving (0.1-10)
    pub approved_credits: Option<f64>,
    /// Free-form feedback for the student
    pub teacher_comment: Option<String>,
    /// Display name of the assessing teacher
    #[validate(length(min = 1, max = 200))]
    pub teacher_name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NotificationListQuery {
    /// all | pending | approved | rejected
    pub status: Option<String>,
    /// Case-insensitive substring match on message/project/comment
    pub search: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NotificationResponse {
    pub id: i32,
    pub message: String,
    pub student_id: i32,
    pub subject_id: i32,
    pub outcome_id: i32,
    pub project_name: String,
    pub credit_requested: f64,
    pub status: String,
    pub approved_credits: Option<f64>,
    pub teacher_comment: Option<String>,
    pub assessed_by: Option<String>,
    pub assessed_date: Option<String>,
    pub is_processed: bool,
    pub is_read: bool,
    pub created_at: String,
}

impl From<NotificationModel> for NotificationResponse {
    fn from(n: NotificationModel) -> Self {
        Self {
            id: n.id,
            message: n.message,
            student_id: n.student_id,
            subject_id: n.subject_id,
            outcome_id: n.outcome_id,
            project_name: n.project_name,
            credit_requested: n.credit_requested,
            status: n.status,
            approved_credits: n.approved_credits,
            teacher_comment: n.teacher_comment,
            assessed_by: n.assessed_by,
            assessed_date: n.assessed_date.map(|d| d.to_string()),
            is_processed: n.is_processed,
            is_read: n.is_read,
            created_at: n.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UnreadCountResponse {
    pub count: u64,
}

#[utoipa::path(
    post,
    path = "/api/v1/notifications",
    request_body = SubmitNotificationRequest,
    responses(
        (status = 200, description = "Submission created", body = NotificationResponse),
        (status = 400, description = "Validation error", body = AppError),
    ),
    tag = "notifications"
)]
pub async fn submit_notification(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<SubmitNotificationRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = AssessmentService::new(db);
    let notification = service
        .submit(
            payload.student_id,
            payload.subject_id,
            payload.outcome_id,
            &payload.project_name,
            payload.requested_credit,
        )
        .await?;

    Ok(ApiResponse::ok(NotificationResponse::from(notification)))
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(
        ("status" = Option<String>, Query, description = "Filter: all/pending/approved/rejected"),
        ("search" = Option<String>, Query, description = "Substring search"),
        ("page" = Option<u64>, Query, description = "Page number"),
        ("per_page" = Option<u64>, Query, description = "Items per page"),
    ),
    responses(
        (status = 200, description = "Notifications, newest first", body = PaginatedResponse<NotificationResponse>),
        (status = 400, description = "Unknown status filter", body = AppError),
    ),
    tag = "notifications"
)]
pub async fn list_notifications(
    Extension(db): Extension<DatabaseConnection>,
    Query(params): Query<NotificationListQuery>,
) -> AppResult<impl IntoResponse> {
    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20).min(100);

    let service = AssessmentService::new(db);
    let (notifications, total) = service
        .list(
            params.status.as_deref(),
            params.search.as_deref(),
            page,
            per_page,
        )
        .await?;

    let items = notifications
        .into_iter()
        .map(NotificationResponse::from)
        .collect();

    Ok(ApiResponse::ok(PaginatedResponse::new(
        items, total, page, per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/notifications/unread-count",
    responses(
        (status = 200, description = "Unread notification count", body = UnreadCountResponse),
    ),
    tag = "notifications"
)]
pub async fn unread_count(
    Extension(db): Extension<DatabaseConnection>,
) -> AppResult<impl IntoResponse> {
    let service = AssessmentService::new(db);
    let count = service.unread_count().await?;
    Ok(ApiResponse::ok(UnreadCountResponse { count }))
}

#[utoipa::path(
    put,
    path = "/api/v1/notifications/{id}/process",
    params(("id" = i32, Path, description = "Notification ID")),
    request_body = AssessNotificationRequest,
    responses(
        (status = 200, description = "Assessment recorded", body = NotificationResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 404, description = "Unknown notification", body = AppError),
        (status = 409, description = "Already assessed", body = AppError),
    ),
    tag = "notifications"
)]
pub async fn process_notification(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<AssessNotificationRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mirror = ProjectMirror::new(db.clone());
    let service = AssessmentService::new(db).with_mirror(mirror);

    let (notification, _mirror_outcome) = service
        .assess(
            id,
            Assessment {
                status: payload.status,
                approved_credits: payload.approved_credits,
                teacher_comment: payload.teacher_comment,
                assessed_by: payload.teacher_name,
            },
        )
        .await?;

    Ok(ApiResponse::ok(NotificationResponse::from(notification)))
}

#[utoipa::path(
    put,
    path = "/api/v1/notifications/{id}/read",
    params(("id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification marked as read", body = String),
        (status = 404, description = "Unknown notification", body = AppError),
    ),
    tag = "notifications"
)]
pub async fn mark_read(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = AssessmentService::new(db);
    service.mark_read(id).await?;
    Ok(ApiResponse::ok("Notification marked as read"))
}

#[utoipa::path(
    put,
    path = "/api/v1/notifications/mark-all-read",
    responses(
        (status = 200, description = "All notifications marked as read", body = serde_json::Value),
    ),
    tag = "notifications"
)]
pub async fn mark_all_read(
    Extension(db): Extension<DatabaseConnection>,
) -> AppResult<impl IntoResponse> {
    let service = AssessmentService::new(db);
    let count = service.mark_all_read().await?;
    Ok(ApiResponse::ok(serde_json::json!({ "marked_read": count })))
}

#[utoipa::path(
    delete,
    path = "/api/v1/notifications/{id}",
    params(("id" = i32, Path, description = "Notification ID")),
    responses(
        (status = 200, description = "Notification deleted", body = String),
        (status = 404, description = "Unknown notification", body = AppError),
    ),
    tag = "notifications"
)]
pub async fn delete_notification(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = AssessmentService::new(db);
    service.delete(id).await?;
    Ok(ApiResponse::ok("Notification deleted"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/notifications/delete-all",
    responses(
        (status = 200, description = "All notifications deleted", body = serde_json::Value),
    ),
    tag = "notifications"
)]
pub async fn delete_all_notifications(
    Extension(db): Extension<DatabaseConnection>,
) -> AppResult<impl IntoResponse> {
    let service = AssessmentService::new(db);
    let count = service.delete_all().await?;
    Ok(ApiResponse::ok(serde_json::json!({ "deleted": count })))
}
