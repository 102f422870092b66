use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    Name,
    ProjectNumber,
    Stage,
    TeacherId,
    StudentId,
    SubjectId,
    OutcomeId,
    RequestedCredit,
    ApprovedCredits,
    Status,
    AssessedBy,
    AssessedDate,
    TeacherComment,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Projects::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Projects::Name)
                            .string_len(200)
                            .not_null()
                            .unique_key(),
                    )
                    // Unique index backs the generate-and-retry numbering loop.
                    .col(
                        ColumnDef::new(Projects::ProjectNumber)
                            .string_len(16)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Projects::Stage).string_len(20).not_null())
                    .col(ColumnDef::new(Projects::TeacherId).integer())
                    .col(ColumnDef::new(Projects::StudentId).integer())
                    .col(ColumnDef::new(Projects::SubjectId).integer())
                    .col(ColumnDef::new(Projects::OutcomeId).integer())
                    .col(ColumnDef::new(Projects::RequestedCredit).double())
                    .col(ColumnDef::new(Projects::ApprovedCredits).double())
                    .col(ColumnDef::new(Projects::Status).string_len(20))
                    .col(ColumnDef::new(Projects::AssessedBy).string_len(200))
                    .col(ColumnDef::new(Projects::AssessedDate).timestamp())
                    .col(ColumnDef::new(Projects::TeacherComment).text())
                    .col(
                        ColumnDef::new(Projects::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Projects::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Projects::UpdatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Mirror lookup tuple
        manager
            .create_index(
                Index::create()
                    .name("idx_projects_link_tuple")
                    .table(Projects::Table)
                    .col(Projects::OutcomeId)
                    .col(Projects::StudentId)
                    .col(Projects::SubjectId)
                    .to_owned(),
            )
            .await?;

        // Partial index for the active-catalog listing
        let db = manager.get_connection();
        db.execute_unprepared(
            "CREATE INDEX idx_projects_active ON projects (stage) WHERE is_deleted = FALSE",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await
    }
}
