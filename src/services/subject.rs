use crate::{
    error::{AppError, AppResult},
    models::{subject, Subject, SubjectModel},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, SqlErr,
};

pub struct SubjectService {
    db: DatabaseConnection,
}

impl SubjectService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> AppResult<Vec<SubjectModel>> {
        let subjects = Subject::find()
            .order_by_asc(subject::Column::Name)
            .all(&self.db)
            .await?;
        Ok(subjects)
    }

    pub async fn get(&self, id: i32) -> AppResult<SubjectModel> {
        Subject::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(
        &self,
        name: &str,
        credits: f64,
        compulsory: bool,
        requirements: Vec<String>,
    ) -> AppResult<SubjectModel> {
        validate_credits(credits)?;

        let now = chrono::Utc::now().naive_utc();
        let model = subject::ActiveModel {
            name: sea_orm::ActiveValue::Set(name.trim().to_string()),
            credits: sea_orm::ActiveValue::Set(credits),
            compulsory: sea_orm::ActiveValue::Set(compulsory),
            requirements: sea_orm::ActiveValue::Set(requirements),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        match model.insert(&self.db).await {
            Ok(saved) => Ok(saved),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(AppError::Conflict(
                    "A subject with this name already exists".to_string(),
                )),
                _ => Err(e.into()),
            },
        }
    }

    pub async fn update(
        &self,
        id: i32,
        name: &str,
        credits: f64,
        compulsory: bool,
        requirements: Vec<String>,
    ) -> AppResult<SubjectModel> {
        validate_credits(credits)?;
        let existing = self.get(id).await?;

        let mut active: subject::ActiveModel = existing.into();
        active.name = sea_orm::ActiveValue::Set(name.trim().to_string());
        active.credits = sea_orm::ActiveValue::Set(credits);
        active.compulsory = sea_orm::ActiveValue::Set(compulsory);
        active.requirements = sea_orm::ActiveValue::Set(requirements);
        active.updated_at = sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc());

        match active.update(&self.db).await {
            Ok(updated) => Ok(updated),
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(AppError::Conflict(
                    "A subject with this name already exists".to_string(),
                )),
                _ => Err(e.into()),
            },
        }
    }

    /// Cascades to the subject's outcomes via the FK.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let existing = self.get(id).await?;
        Subject::delete_by_id(existing.id).exec(&self.db).await?;
        Ok(())
    }
}

pub(crate) fn validate_credits(credits: f64) -> AppResult<()> {
    if !credits.is_finite() || credits <= 0.0 {
        return Err(AppError::Validation(
            "credits must be a positive number".to_string(),
        ));
    }
    Ok(())
}
