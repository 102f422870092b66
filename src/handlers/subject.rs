use crate::error::{AppError, AppResult};
use crate::models::SubjectModel;
use crate::response::ApiResponse;
use crate::services::subject::SubjectService;
use axum::{extract::Path, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSubjectRequest {
    /// Subject name (1-200 characters)
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Total credits for the subject
    pub credits: f64,
    /// Whether the subject is compulsory
    pub compulsory: Option<bool>,
    /// Free-form requirement descriptions
    pub requirements: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateSubjectRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub credits: f64,
    pub compulsory: Option<bool>,
    pub requirements: Option<Vec<String>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubjectResponse {
    pub id: i32,
    pub name: String,
    pub credits: f64,
    pub compulsory: bool,
    pub requirements: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<SubjectModel> for SubjectResponse {
    fn from(s: SubjectModel) -> Self {
        Self {
            id: s.id,
            name: s.name,
            credits: s.credits,
            compulsory: s.compulsory,
            requirements: s.requirements,
            created_at: s.created_at.to_string(),
            updated_at: s.updated_at.to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/subjects",
    responses(
        (status = 200, description = "All subjects", body = Vec<SubjectResponse>),
    ),
    tag = "subjects"
)]
pub async fn list_subjects(
    Extension(db): Extension<DatabaseConnection>,
) -> AppResult<impl IntoResponse> {
    let service = SubjectService::new(db);
    let subjects = service.list().await?;
    let response: Vec<SubjectResponse> = subjects.into_iter().map(SubjectResponse::from).collect();
    Ok(ApiResponse::ok(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/subjects",
    request_body = CreateSubjectRequest,
    responses(
        (status = 200, description = "Subject created", body = SubjectResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 409, description = "Duplicate name", body = AppError),
    ),
    tag = "subjects"
)]
pub async fn create_subject(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<CreateSubjectRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = SubjectService::new(db);
    let subject = service
        .create(
            &payload.name,
            payload.credits,
            payload.compulsory.unwrap_or(false),
            payload.requirements.unwrap_or_default(),
        )
        .await?;

    Ok(ApiResponse::ok(SubjectResponse::from(subject)))
}

#[utoipa::path(
    put,
    path = "/api/v1/subjects/{id}",
    params(("id" = i32, Path, description = "Subject ID")),
    request_body = UpdateSubjectRequest,
    responses(
        (status = 200, description = "Subject updated", body = SubjectResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 404, description = "Unknown subject", body = AppError),
    ),
    tag = "subjects"
)]
pub async fn update_subject(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateSubjectRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = SubjectService::new(db);
    let subject = service
        .update(
            id,
            &payload.name,
            payload.credits,
            payload.compulsory.unwrap_or(false),
            payload.requirements.unwrap_or_default(),
        )
        .await?;

    Ok(ApiResponse::ok(SubjectResponse::from(subject)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/subjects/{id}",
    params(("id" = i32, Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Subject deleted", body = String),
        (status = 404, description = "Unknown subject", body = AppError),
    ),
    tag = "subjects"
)]
pub async fn delete_subject(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = SubjectService::new(db);
    service.delete(id).await?;
    Ok(ApiResponse::ok("Subject deleted"))
}
