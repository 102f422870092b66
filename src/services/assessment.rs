use crate::{
    error::{AppError, AppResult},
    models::{notification, project, Notification, NotificationModel, Project},
};
use sea_orm::{
    sea_query::{extension::postgres::PgExpr, Expr},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

const MIN_APPROVED_CREDITS: f64 = 0.1;
const MAX_APPROVED_CREDITS: f64 = 10.0;

/// A teacher's decision on a pending submission.
#[derive(Debug, Clone)]
pub struct Assessment {
    pub status: String,
    pub approved_credits: Option<f64>,
    pub teacher_comment: Option<String>,
    pub assessed_by: String,
}

/// Result of the best-effort project mirror step. Never surfaced to the HTTP
/// caller; returned alongside the primary result so callers and tests can
/// observe it.
#[derive(Debug, Clone, PartialEq)]
pub enum MirrorOutcome {
    Applied,
    NoMatch,
    Skipped,
    Failed(String),
}

/// Copies assessment fields onto the catalog project matching the
/// (outcome, student, subject) link tuple of a notification.
pub struct ProjectMirror {
    db: DatabaseConnection,
}

impl ProjectMirror {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Ok(true) if a matching project was updated, Ok(false) if none matched.
    async fn apply(&self, n: &NotificationModel) -> Result<bool, sea_orm::DbErr> {
        let existing = Project::find()
            .filter(project::Column::OutcomeId.eq(n.outcome_id))
            .filter(project::Column::StudentId.eq(n.student_id))
            .filter(project::Column::SubjectId.eq(n.subject_id))
            .filter(project::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?;

        let Some(existing) = existing else {
            return Ok(false);
        };

        let mut active: project::ActiveModel = existing.into();
        active.status = sea_orm::ActiveValue::Set(Some(n.status.clone()));
        active.approved_credits = sea_orm::ActiveValue::Set(n.approved_credits);
        active.assessed_by = sea_orm::ActiveValue::Set(n.assessed_by.clone());
        active.assessed_date = sea_orm::ActiveValue::Set(n.assessed_date);
        active.teacher_comment = sea_orm::ActiveValue::Set(n.teacher_comment.clone());
        active.updated_at = sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc());
        active.update(&self.db).await?;
        Ok(true)
    }
}

pub struct AssessmentService {
    db: DatabaseConnection,
    mirror: Option<ProjectMirror>,
}

impl AssessmentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, mirror: None }
    }

    pub fn with_mirror(mut self, mirror: ProjectMirror) -> Self {
        self.mirror = Some(mirror);
        self
    }

    /// Create a pending submission notification.
    pub async fn submit(
        &self,
        student_id: i32,
        subject_id: i32,
        outcome_id: i32,
        project_name: &str,
        requested_credit: f64,
    ) -> AppResult<NotificationModel> {
        validate_submission(student_id, subject_id, outcome_id, project_name, requested_credit)?;

        let now = chrono::Utc::now().naive_utc();
        let model = notification::ActiveModel {
            message: sea_orm::ActiveValue::Set(submission_message(
                student_id,
                project_name,
                requested_credit,
            )),
            student_id: sea_orm::ActiveValue::Set(student_id),
            subject_id: sea_orm::ActiveValue::Set(subject_id),
            outcome_id: sea_orm::ActiveValue::Set(outcome_id),
            project_name: sea_orm::ActiveValue::Set(project_name.trim().to_string()),
            credit_requested: sea_orm::ActiveValue::Set(requested_credit),
            status: sea_orm::ActiveValue::Set(STATUS_PENDING.to_string()),
            is_processed: sea_orm::ActiveValue::Set(false),
            is_read: sea_orm::ActiveValue::Set(false),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let saved = model.insert(&self.db).await?;
        Ok(saved)
    }

    /// The central state transition: pending -> approved | rejected.
    ///
    /// The transition itself is a conditional update filtered on
    /// status = pending, so concurrent assessments of the same notification
    /// cannot both win; the loser gets a Conflict. The project mirror step
    /// runs after the primary write and its failure is logged, never raised.
    pub async fn assess(
        &self,
        id: i32,
        assessment: Assessment,
    ) -> AppResult<(NotificationModel, MirrorOutcome)> {
        validate_assessment(&assessment)?;

        Notification::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let now = chrono::Utc::now().naive_utc();
        let credits = if assessment.status == STATUS_APPROVED {
            assessment.approved_credits
        } else {
            // Rejection awards nothing
            None
        };

        let result = Notification::update_many()
            .col_expr(
                notification::Column::Status,
                Expr::value(assessment.status.clone()),
            )
            .col_expr(notification::Column::ApprovedCredits, Expr::value(credits))
            .col_expr(
                notification::Column::TeacherComment,
                Expr::value(assessment.teacher_comment.clone()),
            )
            .col_expr(
                notification::Column::AssessedBy,
                Expr::value(Some(assessment.assessed_by.trim().to_string())),
            )
            .col_expr(notification::Column::AssessedDate, Expr::value(Some(now)))
            .col_expr(notification::Column::IsProcessed, Expr::value(true))
            .filter(notification::Column::Id.eq(id))
            .filter(notification::Column::Status.eq(STATUS_PENDING))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            // Row exists but already left pending, or vanished underneath us.
            return match Notification::find_by_id(id).one(&self.db).await? {
                Some(_) => Err(AppError::Conflict(
                    "Notification has already been assessed".to_string(),
                )),
                None => Err(AppError::NotFound),
            };
        }

        let updated = Notification::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mirror_outcome = self.mirror_assessment(&updated).await;
        match &mirror_outcome {
            MirrorOutcome::Failed(reason) => {
                tracing::warn!(
                    notification_id = id,
                    "project mirror update failed: {}",
                    reason
                );
            }
            MirrorOutcome::NoMatch => {
                tracing::debug!(notification_id = id, "no matching project to mirror onto");
            }
            MirrorOutcome::Applied | MirrorOutcome::Skipped => {}
        }

        Ok((updated, mirror_outcome))
    }

    async fn mirror_assessment(&self, n: &NotificationModel) -> MirrorOutcome {
        let Some(mirror) = &self.mirror else {
            return MirrorOutcome::Skipped;
        };
        match mirror.apply(n).await {
            Ok(true) => MirrorOutcome::Applied,
            Ok(false) => MirrorOutcome::NoMatch,
            Err(e) => MirrorOutcome::Failed(e.to_string()),
        }
    }

    pub async fn list(
        &self,
        status: Option<&str>,
        search: Option<&str>,
        page: u64,
        per_page: u64,
    ) -> AppResult<(Vec<NotificationModel>, u64)> {
        let mut query = Notification::find();

        if let Some(s) = status {
            match s {
                "all" => {}
                STATUS_PENDING | STATUS_APPROVED | STATUS_REJECTED => {
                    query = query.filter(notification::Column::Status.eq(s));
                }
                other => {
                    return Err(AppError::Validation(format!(
                        "status filter must be all, pending, approved or rejected, got '{}'",
                        other
                    )));
                }
            }
        }

        if let Some(term) = search {
            let term = term.trim();
            if !term.is_empty() {
                let pattern = format!("%{}%", escape_like_pattern(term));
                query = query.filter(
                    Condition::any()
                        .add(
                            Expr::col((notification::Entity, notification::Column::Message))
                                .ilike(pattern.clone()),
                        )
                        .add(
                            Expr::col((notification::Entity, notification::Column::ProjectName))
                                .ilike(pattern.clone()),
                        )
                        .add(
                            Expr::col((
                                notification::Entity,
                                notification::Column::TeacherComment,
                            ))
                            .ilike(pattern),
                        ),
                );
            }
        }

        let paginator = query
            .order_by_desc(notification::Column::CreatedAt)
            .paginate(&self.db, per_page);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    pub async fn unread_count(&self) -> AppResult<u64> {
        let count = Notification::find()
            .filter(notification::Column::IsRead.eq(false))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    /// Idempotent; marking an already-read notification again is fine.
    pub async fn mark_read(&self, id: i32) -> AppResult<()> {
        let existing = Notification::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: notification::ActiveModel = existing.into();
        active.is_read = sea_orm::ActiveValue::Set(true);
        active.update(&self.db).await?;
        Ok(())
    }

    pub async fn mark_all_read(&self) -> AppResult<u64> {
        let result = Notification::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::IsRead.eq(false))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = Notification::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    pub async fn delete_all(&self) -> AppResult<u64> {
        let result = Notification::delete_many().exec(&self.db).await?;
        Ok(result.rows_affected)
    }
}

fn submission_message(student_id: i32, project_name: &str, requested_credit: f64) -> String {
    format!(
        "Student {} requested {} credits for project '{}'",
        student_id,
        requested_credit,
        project_name.trim()
    )
}

fn validate_submission(
    student_id: i32,
    subject_id: i32,
    outcome_id: i32,
    project_name: &str,
    requested_credit: f64,
) -> AppResult<()> {
    if student_id < 1 || subject_id < 1 || outcome_id < 1 {
        return Err(AppError::Validation(
            "student, subject and outcome ids must be positive".to_string(),
        ));
    }
    let name = project_name.trim();
    if name.is_empty() {
        return Err(AppError::Validation(
            "project name must not be empty".to_string(),
        ));
    }
    if name.len() > 200 {
        return Err(AppError::Validation(
            "project name must be at most 200 characters".to_string(),
        ));
    }
    if !requested_credit.is_finite() || requested_credit <= 0.0 {
        return Err(AppError::Validation(
            "requested credit must be a positive number".to_string(),
        ));
    }
    Ok(())
}

fn validate_assessment(assessment: &Assessment) -> AppResult<()> {
    match assessment.status.as_str() {
        STATUS_APPROVED => {
            let credits = assessment.approved_credits.ok_or_else(|| {
                AppError::Validation("approved credits are required when approving".to_string())
            })?;
            if !credits_in_range(credits) {
                return Err(AppError::Validation(format!(
                    "approved credits must be between {} and {}",
                    MIN_APPROVED_CREDITS, MAX_APPROVED_CREDITS
                )));
            }
        }
        STATUS_REJECTED => {}
        other => {
            return Err(AppError::Validation(format!(
                "status must be approved or rejected, got '{}'",
                other
            )));
        }
    }

    if assessment.assessed_by.trim().is_empty() {
        return Err(AppError::Validation(
            "assessed_by must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn credits_in_range(credits: f64) -> bool {
    credits.is_finite() && (MIN_APPROVED_CREDITS..=MAX_APPROVED_CREDITS).contains(&credits)
}

/// Escape LIKE metacharacters so search terms are matched literally.
fn escape_like_pattern(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessment(status: &str, credits: Option<f64>) -> Assessment {
        Assessment {
            status: status.to_string(),
            approved_credits: credits,
            teacher_comment: None,
            assessed_by: "J. Doe".to_string(),
        }
    }

    #[test]
    fn approve_within_range() {
        assert!(validate_assessment(&assessment(STATUS_APPROVED, Some(5.0))).is_ok());
    }

    #[test]
    fn approve_boundary_values() {
        assert!(validate_assessment(&assessment(STATUS_APPROVED, Some(0.1))).is_ok());
        assert!(validate_assessment(&assessment(STATUS_APPROVED, Some(10.0))).is_ok());
    }

    #[test]
    fn approve_out_of_range() {
        assert!(validate_assessment(&assessment(STATUS_APPROVED, Some(0.05))).is_err());
        assert!(validate_assessment(&assessment(STATUS_APPROVED, Some(10.5))).is_err());
        assert!(validate_assessment(&assessment(STATUS_APPROVED, Some(-1.0))).is_err());
    }

    #[test]
    fn approve_requires_credits() {
        assert!(validate_assessment(&assessment(STATUS_APPROVED, None)).is_err());
    }

    #[test]
    fn reject_ignores_credits() {
        assert!(validate_assessment(&assessment(STATUS_REJECTED, None)).is_ok());
        assert!(validate_assessment(&assessment(STATUS_REJECTED, Some(99.0))).is_ok());
    }

    #[test]
    fn unknown_status_rejected() {
        assert!(validate_assessment(&assessment("pending", Some(5.0))).is_err());
        assert!(validate_assessment(&assessment("Approved", Some(5.0))).is_err());
        assert!(validate_assessment(&assessment("", Some(5.0))).is_err());
    }

    #[test]
    fn assessor_must_be_named() {
        let mut a = assessment(STATUS_REJECTED, None);
        a.assessed_by = "   ".to_string();
        assert!(validate_assessment(&a).is_err());
    }

    #[test]
    fn submission_requires_positive_credit() {
        assert!(validate_submission(1, 1, 1, "Robot arm", -1.0).is_err());
        assert!(validate_submission(1, 1, 1, "Robot arm", 0.0).is_err());
        assert!(validate_submission(1, 1, 1, "Robot arm", f64::NAN).is_err());
        assert!(validate_submission(1, 1, 1, "Robot arm", 2.5).is_ok());
    }

    #[test]
    fn submission_requires_positive_ids() {
        assert!(validate_submission(0, 1, 1, "Robot arm", 1.0).is_err());
        assert!(validate_submission(1, -3, 1, "Robot arm", 1.0).is_err());
        assert!(validate_submission(1, 1, 0, "Robot arm", 1.0).is_err());
    }

    #[test]
    fn submission_requires_name() {
        assert!(validate_submission(1, 1, 1, "  ", 1.0).is_err());
        assert!(validate_submission(1, 1, 1, &"x".repeat(201), 1.0).is_err());
    }

    #[test]
    fn like_pattern_escaped() {
        assert_eq!(escape_like_pattern("50%_done"), "50\\%\\_done");
        assert_eq!(escape_like_pattern("a\\b"), "a\\\\b");
        assert_eq!(escape_like_pattern("plain"), "plain");
    }

    #[test]
    fn message_mentions_student_and_project() {
        let msg = submission_message(7, " Solar tracker ", 2.5);
        assert_eq!(
            msg,
            "Student 7 requested 2.5 credits for project 'Solar tracker'"
        );
    }
}
