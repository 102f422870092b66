use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Status,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_status")
                    .table(Notifications::Table)
                    .col(Notifications::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_created_at")
                    .table(Notifications::Table)
                    .col((Notifications::CreatedAt, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        // Partial index for the unread-count badge
        let db = manager.get_connection();
        db.execute_unprepared(
            "CREATE INDEX idx_notifications_unread ON notifications (is_read) WHERE is_read = FALSE",
        )
        .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_notifications_status")
                    .table(Notifications::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_notifications_created_at")
                    .table(Notifications::Table)
                    .to_owned(),
            )
            .await?;

        let db = manager.get_connection();
        db.execute_unprepared("DROP INDEX IF EXISTS idx_notifications_unread")
            .await?;

        Ok(())
    }
}
