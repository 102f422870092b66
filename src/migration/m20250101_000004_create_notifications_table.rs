use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    Message,
    StudentId,
    SubjectId,
    OutcomeId,
    ProjectName,
    CreditRequested,
    Status,
    ApprovedCredits,
    TeacherComment,
    AssessedBy,
    AssessedDate,
    IsProcessed,
    IsRead,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Notifications::Message).text().not_null())
                    // Loose references by design; no FK to auth principals or
                    // catalog tables (see notification model).
                    .col(
                        ColumnDef::new(Notifications::StudentId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notifications::SubjectId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notifications::OutcomeId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notifications::ProjectName)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notifications::CreditRequested)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notifications::Status)
                            .string_len(20)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Notifications::ApprovedCredits).double())
                    .col(ColumnDef::new(Notifications::TeacherComment).text())
                    .col(ColumnDef::new(Notifications::AssessedBy).string_len(200))
                    .col(ColumnDef::new(Notifications::AssessedDate).timestamp())
                    .col(
                        ColumnDef::new(Notifications::IsProcessed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Notifications::IsRead)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .timestamp()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await
    }
}
