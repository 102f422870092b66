use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// An offerable project template. Carries an optional link tuple
/// (outcome/student/subject) and assessment mirror fields once a student
/// submission has been assessed. Soft-deleted rather than removed so that
/// existing notifications keep a valid reference.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(200))", unique)]
    pub name: String,
    /// Sequential per year: "2025-001", "2025-002", ...
    #[sea_orm(column_type = "String(StringLen::N(16))", unique)]
    pub project_number: String,
    #[sea_orm(column_type = "String(StringLen::N(20))")]
    pub stage: String,
    pub teacher_id: Option<i32>,
    pub student_id: Option<i32>,
    pub subject_id: Option<i32>,
    pub outcome_id: Option<i32>,
    #[sea_orm(column_type = "Double", nullable)]
    pub requested_credit: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub approved_credits: Option<f64>,
    #[sea_orm(column_type = "String(StringLen::N(20))", nullable)]
    pub status: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(200))", nullable)]
    pub assessed_by: Option<String>,
    pub assessed_date: Option<DateTime>,
    #[sea_orm(column_type = "Text", nullable)]
    pub teacher_comment: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
