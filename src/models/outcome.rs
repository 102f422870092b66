use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A learning outcome within a subject that students submit projects against.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "outcomes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub subject_id: i32,
    #[sea_orm(column_type = "String(StringLen::N(200))")]
    pub topic: String,
    #[sea_orm(column_type = "Double")]
    pub credits: f64,
    pub compulsory: bool,
    pub requirements: Vec<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::subject::Entity",
        from = "Column::SubjectId",
        to = "super::subject::Column::Id"
    )]
    Subject,
}

impl Related<super::subject::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subject.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
