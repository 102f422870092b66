use crate::error::{AppError, AppResult};
use crate::models::OutcomeModel;
use crate::response::ApiResponse;
use crate::services::outcome::OutcomeService;
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
pub struct CreateOutcomeRequest {
    /// Subject the outcome belongs to
    #[validate(range(min = 1))]
    pub subject_id: i32,
    /// Outcome topic (1-200 characters)
    #[validate(length(min = 1, max = 200))]
    pub topic: String,
    /// Credits available for the outcome
    pub credits: f64,
    pub compulsory: Option<bool>,
    pub requirements: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOutcomeRequest {
    #[validate(length(min = 1, max = 200))]
    pub topic: String,
    pub credits: f64,
    pub compulsory: Option<bool>,
    pub requirements: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OutcomeListQuery {
    /// Restrict to one subject
    pub subject_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OutcomeResponse {
    pub id: i32,
    pub subject_id: i32,
    pub topic: String,
    pub credits: f64,
    pub compulsory: bool,
    pub requirements: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OutcomeModel> for OutcomeResponse {
    fn from(o: OutcomeModel) -> Self {
        Self {
            id: o.id,
            subject_id: o.subject_id,
            topic: o.topic,
            credits: o.credits,
            compulsory: o.compulsory,
            requirements: o.requirements,
            created_at: o.created_at.to_string(),
            updated_at: o.updated_at.to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/outcomes",
    params(
        ("subject_id" = Option<i32>, Query, description = "Filter by subject"),
    ),
    responses(
        (status = 200, description = "Learning outcomes", body = Vec<OutcomeResponse>),
    ),
    tag = "outcomes"
)]
pub async fn list_outcomes(
    Extension(db): Extension<DatabaseConnection>,
    Query(params): Query<OutcomeListQuery>,
) -> AppResult<impl IntoResponse> {
    let service = OutcomeService::new(db);
    let outcomes = service.list(params.subject_id).await?;
    let response: Vec<OutcomeResponse> = outcomes.into_iter().map(OutcomeResponse::from).collect();
    Ok(ApiResponse::ok(response))
}

#[utoipa::path(
    post,
    path = "/api/v1/outcomes",
    request_body = CreateOutcomeRequest,
    responses(
        (status = 200, description = "Outcome created", body = OutcomeResponse),
        (status = 400, description = "Validation error", body = AppError),
    ),
    tag = "outcomes"
)]
pub async fn create_outcome(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<CreateOutcomeRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = OutcomeService::new(db);
    let outcome = service
        .create(
            payload.subject_id,
            &payload.topic,
            payload.credits,
            payload.compulsory.unwrap_or(false),
            payload.requirements.unwrap_or_default(),
        )
        .await?;

    Ok(ApiResponse::ok(OutcomeResponse::from(outcome)))
}

#[utoipa::path(
    put,
    path = "/api/v1/outcomes/{id}",
    params(("id" = i32, Path, description = "Outcome ID")),
    request_body = UpdateOutcomeRequest,
    responses(
        (status = 200, description = "Outcome updated", body = OutcomeResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 404, description = "Unknown outcome", body = AppError),
    ),
    tag = "outcomes"
)]
pub async fn update_outcome(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateOutcomeRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = OutcomeService::new(db);
    let outcome = service
        .update(
            id,
            &payload.topic,
            payload.credits,
            payload.compulsory.unwrap_or(false),
            payload.requirements.unwrap_or_default(),
        )
        .await?;

    Ok(ApiResponse::ok(OutcomeResponse::from(outcome)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/outcomes/{id}",
    params(("id" = i32, Path, description = "Outcome ID")),
    responses(
        (status = 200, description = "Outcome deleted", body = String),
        (status = 404, description = "Unknown outcome", body = AppError),
    ),
    tag = "outcomes"
)]
pub async fn delete_outcome(
    Extension(db): Extension<DatabaseConnection>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let service = OutcomeService::new(db);
    service.delete(id).await?;
    Ok(ApiResponse::ok("Outcome deleted"))
}
