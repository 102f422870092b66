use crate::{
    error::{AppError, AppResult},
    models::{project, Project, ProjectModel},
};
use chrono::Datelike;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, SqlErr,
};

pub const STAGE_ACTIVE: &str = "active";
pub const STAGE_IN_PROGRESS: &str = "in-progress";
pub const STAGE_CLOSED: &str = "closed";

const VALID_STAGES: [&str; 3] = [STAGE_ACTIVE, STAGE_IN_PROGRESS, STAGE_CLOSED];

// Bounded retries for losing the project-number race to a concurrent insert.
const NUMBER_ALLOCATION_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone)]
pub struct NewProject {
    pub name: String,
    pub stage: String,
    pub teacher_id: Option<i32>,
    pub student_id: Option<i32>,
    pub subject_id: Option<i32>,
    pub outcome_id: Option<i32>,
    pub requested_credit: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ProjectUpdate {
    pub name: String,
    pub stage: String,
    pub teacher_id: Option<i32>,
    pub student_id: Option<i32>,
    pub subject_id: Option<i32>,
    pub outcome_id: Option<i32>,
    pub requested_credit: Option<f64>,
}

pub struct ProjectService {
    db: DatabaseConnection,
}

impl ProjectService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, include_deleted: bool) -> AppResult<Vec<ProjectModel>> {
        let mut query = Project::find();
        if !include_deleted {
            query = query.filter(project::Column::IsDeleted.eq(false));
        }
        let projects = query
            .order_by_desc(project::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(projects)
    }

    /// Offerable projects only: not soft-deleted and in the active stage.
    pub async fn list_active(&self) -> AppResult<Vec<ProjectModel>> {
        let projects = Project::find()
            .filter(project::Column::IsDeleted.eq(false))
            .filter(project::Column::Stage.eq(STAGE_ACTIVE))
            .order_by_asc(project::Column::ProjectNumber)
            .all(&self.db)
            .await?;
        Ok(projects)
    }

    pub async fn get(&self, id: i32) -> AppResult<ProjectModel> {
        Project::find_by_id(id)
            .filter(project::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Create a catalog project, assigning the next free `YYYY-NNN` number.
    ///
    /// Numbering is read-max-then-insert guarded by the unique index on
    /// project_number: losing the race to a concurrent insert surfaces as a
    /// unique violation and we re-read and retry with the next number.
    pub async fn create(&self, new: NewProject) -> AppResult<ProjectModel> {
        validate_stage(&new.stage)?;
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation(
                "project name must not be empty".to_string(),
            ));
        }

        let year = chrono::Utc::now().year();
        for _ in 0..NUMBER_ALLOCATION_ATTEMPTS {
            let number = self.next_project_number(year).await?;
            let now = chrono::Utc::now().naive_utc();
            let model = project::ActiveModel {
                name: sea_orm::ActiveValue::Set(name.clone()),
                project_number: sea_orm::ActiveValue::Set(number),
                stage: sea_orm::ActiveValue::Set(new.stage.clone()),
                teacher_id: sea_orm::ActiveValue::Set(new.teacher_id),
                student_id: sea_orm::ActiveValue::Set(new.student_id),
                subject_id: sea_orm::ActiveValue::Set(new.subject_id),
                outcome_id: sea_orm::ActiveValue::Set(new.outcome_id),
                requested_credit: sea_orm::ActiveValue::Set(new.requested_credit),
                is_deleted: sea_orm::ActiveValue::Set(false),
                created_at: sea_orm::ActiveValue::Set(now),
                updated_at: sea_orm::ActiveValue::Set(now),
                ..Default::default()
            };

            match model.insert(&self.db).await {
                Ok(saved) => return Ok(saved),
                Err(e) => match e.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(msg))
                        if msg.contains("project_number") =>
                    {
                        continue;
                    }
                    Some(SqlErr::UniqueConstraintViolation(_)) => {
                        return Err(AppError::Conflict(
                            "A project with this name already exists".to_string(),
                        ));
                    }
                    _ => return Err(e.into()),
                },
            }
        }

        Err(AppError::Conflict(
            "Could not allocate a unique project number".to_string(),
        ))
    }

    pub async fn update(&self, id: i32, update: ProjectUpdate) -> AppResult<ProjectModel> {
        validate_stage(&update.stage)?;
        let existing = self.get(id).await?;

        let now = chrono::Utc::now().naive_utc();
        let mut active: project::ActiveModel = existing.into();
        active.name = sea_orm::ActiveValue::Set(update.name.trim().to_string());
        active.stage = sea_orm::ActiveValue::Set(update.stage);
        active.teacher_id = sea_orm::ActiveValue::Set(update.teacher_id);
        active.student_id = sea_orm::ActiveValue::Set(update.student_id);
        active.subject_id = sea_orm::ActiveValue::Set(update.subject_id);
        active.outcome_id = sea_orm::ActiveValue::Set(update.outcome_id);
        active.requested_credit = sea_orm::ActiveValue::Set(update.requested_credit);
        active.updated_at = sea_orm::ActiveValue::Set(now);

        match active.update(&self.db).await {
            Ok(updated) => Ok(updated),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(AppError::Conflict(
                    "A project with this name already exists".to_string(),
                )),
                _ => Err(e.into()),
            },
        }
    }

    /// Soft delete keeps the row so existing notifications stay resolvable.
    pub async fn soft_delete(&self, id: i32) -> AppResult<()> {
        let existing = self.get(id).await?;
        let mut active: project::ActiveModel = existing.into();
        active.is_deleted = sea_orm::ActiveValue::Set(true);
        active.updated_at = sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc());
        active.update(&self.db).await?;
        Ok(())
    }

    async fn next_project_number(&self, year: i32) -> AppResult<String> {
        // Suffixes beyond 999 widen past three digits and no longer sort
        // lexicographically, so take the max by parsed value.
        let numbers: Vec<String> = Project::find()
            .filter(project::Column::ProjectNumber.starts_with(format!("{}-", year)))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|p| p.project_number)
            .collect();

        let max_suffix = numbers
            .iter()
            .filter_map(|n| parse_number_suffix(n, year))
            .max()
            .unwrap_or(0);

        Ok(format_project_number(year, max_suffix + 1))
    }
}

fn validate_stage(stage: &str) -> AppResult<()> {
    if !VALID_STAGES.contains(&stage) {
        return Err(AppError::Validation(format!(
            "stage must be one of: {}",
            VALID_STAGES.join(", ")
        )));
    }
    Ok(())
}

fn format_project_number(year: i32, suffix: u32) -> String {
    format!("{}-{:03}", year, suffix)
}

fn parse_number_suffix(number: &str, year: i32) -> Option<u32> {
    let rest = number.strip_prefix(&format!("{}-", year))?;
    rest.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_is_zero_padded() {
        assert_eq!(format_project_number(2025, 1), "2025-001");
        assert_eq!(format_project_number(2025, 42), "2025-042");
        assert_eq!(format_project_number(2025, 999), "2025-999");
    }

    #[test]
    fn number_widens_past_three_digits() {
        assert_eq!(format_project_number(2025, 1000), "2025-1000");
    }

    #[test]
    fn suffix_round_trips() {
        for suffix in [1u32, 9, 10, 99, 100, 999, 1000] {
            let number = format_project_number(2026, suffix);
            assert_eq!(parse_number_suffix(&number, 2026), Some(suffix));
        }
    }

    #[test]
    fn suffix_ignores_other_years() {
        assert_eq!(parse_number_suffix("2024-007", 2025), None);
    }

    #[test]
    fn suffix_rejects_garbage() {
        assert_eq!(parse_number_suffix("2025-abc", 2025), None);
        assert_eq!(parse_number_suffix("no-dash", 2025), None);
        assert_eq!(parse_number_suffix("", 2025), None);
    }

    #[test]
    fn max_suffix_is_numeric_not_lexicographic() {
        let numbers = ["2025-999", "2025-1000", "2025-002"];
        let max = numbers
            .iter()
            .filter_map(|n| parse_number_suffix(n, 2025))
            .max();
        assert_eq!(max, Some(1000));
    }

    #[test]
    fn stage_literals() {
        assert!(validate_stage("active").is_ok());
        assert!(validate_stage("in-progress").is_ok());
        assert!(validate_stage("closed").is_ok());
        assert!(validate_stage("archived").is_err());
        assert!(validate_stage("Active").is_err());
    }
}
