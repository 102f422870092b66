use sea_orm_migration::prelude::*;

mod m20250101_000001_create_subjects_table;
mod m20250101_000002_create_outcomes_table;
mod m20250101_000003_create_projects_table;
mod m20250101_000004_create_notifications_table;
mod m20250101_000005_add_workflow_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_subjects_table::Migration),
            Box::new(m20250101_000002_create_outcomes_table::Migration),
            Box::new(m20250101_000003_create_projects_table::Migration),
            Box::new(m20250101_000004_create_notifications_table::Migration),
            Box::new(m20250101_000005_add_workflow_indexes::Migration),
        ]
    }
}
