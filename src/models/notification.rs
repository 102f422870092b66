use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A student's submission of a project against a learning outcome, plus the
/// teacher's eventual assessment of it. The notification is the source of
/// truth for the assessment; the matching project row is a best-effort mirror.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    // Loose references by design: format-validated, not FK-enforced.
    pub student_id: i32,
    pub subject_id: i32,
    pub outcome_id: i32,
    #[sea_orm(column_type = "String(StringLen::N(200))")]
    pub project_name: String,
    #[sea_orm(column_type = "Double")]
    pub credit_requested: f64,
    #[sea_orm(column_type = "String(StringLen::N(20))")]
    pub status: String,
    #[sea_orm(column_type = "Double", nullable)]
    pub approved_credits: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub teacher_comment: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(200))", nullable)]
    pub assessed_by: Option<String>,
    pub assessed_date: Option<DateTime>,
    pub is_processed: bool,
    pub is_read: bool,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
