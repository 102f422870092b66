use crate::error::{AppError, AppResult};
use crate::models::ProjectModel;
use crate::response::ApiResponse;
use crate::services::project::{NewProject, ProjectService, ProjectUpdate, STAGE_ACTIVE};
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
pub struct CreateProjectRequest {
    /// Project name, unique across the catalog (1-200 characters)
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// active | in-progress | closed
    pub stage: String,
    /// Owning teacher
    pub teacher_id: Option<i32>,
    /// Link tuple for the assessment mirror
    pub student_id: Option<i32>,
    pub subject_id: Option<i32>,
    pub outcome_id: Option<i32>,
    pub requested_credit: Option<f64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub stage: String,
    pub teacher_id: Option<i32>,
    pub student_id: Option<i32>,
    pub subject_id: Option<i32>,
    pub outcome_id: Option<i32>,
    pub requested_credit: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProjectListQuery {
    /// Include soft-deleted rows (default false)
    pub include_deleted: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectResponse {
    pub id: i32,
    pub name: String,
    pub project_number: String,
    pub stage: String,
    pub teacher_id: Option<i32>,
    pub student_id: Option<i32>,
    pub subject_id: Option<i32>,
    pub outcome_id: Option<i32>,
    pub requested_credit: Option<f64>,
    pub approved_credits: Option<f64>,
    pub status: Option<String>,
    pub assessed_by: Option<String>,
    pub assessed_date: Option<String>,
    pub teacher_comment: Option<String>,
    pub is_deleted: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProjectModel> for ProjectResponse {
    fn from(p: ProjectModel) -> Self {
        Self {
            id: p.id,
            name: p.name,
            project_number: p.project_number,
            stage: p.stage,
            teacher_id: p.teacher_id,
            student_id: p.student_id,
            subject_id: p.subject_id,
            outcome_id: p.outcome_id,
            requested_credit: p.requested_credit,
            approved_credits: p.approved_credits,
            status: p.status,
            assessed_by: p.assessed_by,
            assessed_date: p.assessed_date.map(|d| d.to_string()),
            teacher_comment: p.teacher_comment,
            is_deleted: p.is_deleted,
            created_at: p.created_at.to_string(),
            updated_at: p.updated_at.to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/projects",
    params(
        ("include_deleted" = Option<bool>, Query, description = "Include soft-deleted projects"),
    ),
    responses(
        (status = 200, description = "Catalog projects", body = Vec<ProjectResponse>),
    ),
    tag = "projects"
)]
pub async fn list_projects(
    Extension(db): Extension<DatabaseConnection>,
    Query(params): Query<ProjectListQuery>,
) -> AppResult<impl IntoResponse> {
    let service = ProjectService::new(db);
    let projects = service
        .list(params.include_deleted.unwrap_or(false))
        .await?;
    let response: Vec<ProjectResponse> = projects.into_iter().map(ProjectResponse::from).collect();
    Ok(ApiResponse::ok(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/projects/active",
    responses(
        (status = 200, description = "Projects open for submission", body = Vec<ProjectResponse>),
    ),
    tag = "projects"
)]
pub async fn list_active_projects(
    Extension(db): Extension<DatabaseConnection>,
) -> AppResult<impl IntoResponse> {
    let service = ProjectService::new(db);
    let projects = service.list_active().await?;

    // Second pass over the service's own filter; guards submission choices
    // against a stale or mismatched catalog read.
    let response: Vec<ProjectResponse> = projects
        .into_iter()
        .filter(|p| !p.is_deleted && p.stage == STAGE_ACTIVE)
        .map(ProjectResponse::from)
        .collect();

    Ok(ApiResponse::ok(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 200, description = "Project created with assigned number", body = ProjectResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 409, description = "Duplicate name", body = AppError),
    ),
    tag = "projects"
)]
pub async fn create_project(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<CreateProjectRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = ProjectService::new(db);
    let project = service
        .create(NewProject {
            name: payload.name,
            stage: payload.stage,
            teacher_id: payload.teacher_id,
            student_id: payload.student_id,
            subject_id: payload.subject_id,
            outcome_id: payload.outcome_id,
            requested_credit: payload.requested_credit,
        })
        .await?;

    Ok(ApiResponse::ok(ProjectResponse::from(project)))
}

#[utoipa::path(
    put,
    path = "/api/v1/projects/{id}",
    params(("id" = i32, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Project updated", body = ProjectResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 404, description = "Unknown project", body = AppError),
        (status = 409, description = "Duplicate name", body = AppError),
    ),
    tag = "projects"
)]
pub async fn update_project(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProjectRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = ProjectService::new(db);
    let project = service
        .update(
            id,
            ProjectUpdate {
                name: payload.name,
                stage: payload.stage,
                teacher_id: payload.teacher_id,
                student_id: payload.student_id,
                subject_id: payload.subject_id,
                outcome_id: payload.outcome_id,
                requested_credit: payload.requested_credit,
            },
        )
        .await?;

    Ok(ApiResponse::ok(ProjectResponse::from(project)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/projects/{id}/soft",
    params(("id" = i32, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project soft-deleted", body = String),
        (status = 404, description = "Unknown project", body = AppError),
    ),
    tag = "projects"
)]
pub async fn soft_delete_project(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = ProjectService::new(db);
    service.soft_delete(id).await?;
    Ok(ApiResponse::ok("Project deleted"))
}
