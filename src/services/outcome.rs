use crate::{
    error::{AppError, AppResult},
    models::{outcome, Outcome, OutcomeModel, Subject},
    services::subject::validate_credits,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

pub struct OutcomeService {
    db: DatabaseConnection,
}

impl OutcomeService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, subject_id: Option<i32>) -> AppResult<Vec<OutcomeModel>> {
        let mut query = Outcome::find();
        if let Some(subject_id) = subject_id {
            query = query.filter(outcome::Column::SubjectId.eq(subject_id));
        }
        let outcomes = query
            .order_by_asc(outcome::Column::Topic)
            .all(&self.db)
            .await?;
        Ok(outcomes)
    }

    pub async fn get(&self, id: i32) -> AppResult<OutcomeModel> {
        Outcome::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(
        &self,
        subject_id: i32,
        topic: &str,
        credits: f64,
        compulsory: bool,
        requirements: Vec<String>,
    ) -> AppResult<OutcomeModel> {
        validate_credits(credits)?;

        // Outcomes hang off a real subject, unlike the loose notification refs.
        Subject::find_by_id(subject_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::Validation("Subject not found".to_string()))?;

        let now = chrono::Utc::now().naive_utc();
        let model = outcome::ActiveModel {
            subject_id: sea_orm::ActiveValue::Set(subject_id),
            topic: sea_orm::ActiveValue::Set(topic.trim().to_string()),
            credits: sea_orm::ActiveValue::Set(credits),
            compulsory: sea_orm::ActiveValue::Set(compulsory),
            requirements: sea_orm::ActiveValue::Set(requirements),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let saved = model.insert(&self.db).await?;
        Ok(saved)
    }

    pub async fn update(
        &self,
        id: i32,
        topic: &str,
        credits: f64,
        compulsory: bool,
        requirements: Vec<String>,
    ) -> AppResult<OutcomeModel> {
        validate_credits(credits)?;
        let existing = self.get(id).await?;

        let mut active: outcome::ActiveModel = existing.into();
        active.topic = sea_orm::ActiveValue::Set(topic.trim().to_string());
        active.credits = sea_orm::ActiveValue::Set(credits);
        active.compulsory = sea_orm::ActiveValue::Set(compulsory);
        active.requirements = sea_orm::ActiveValue::Set(requirements);
        active.updated_at = sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let existing = self.get(id).await?;
        Outcome::delete_by_id(existing.id).exec(&self.db).await?;
        Ok(())
    }
}
