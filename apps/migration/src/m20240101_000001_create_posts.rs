use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Posts::Table)
                    .if_not_exists()
                    .col(pk_auto(Posts::Id))
                    .col(string_len(Posts::Title, 200))
                    .col(text(Posts::Content))
                    .col(string_len(Posts::Platform, 50))
                    .col(timestamp_with_time_zone(Posts::ScheduledTime))
                    .col(string_len(Posts::Status, 20).default("scheduled"))
                    .col(string_null(Posts::ImageFilename))
                    .to_owned(),
            )
            .await?;

        // Reconciliation reads every scheduled post.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_posts_status")
                    .table(Posts::Table)
                    .col(Posts::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Posts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Posts {
    Table,
    Id,
    Title,
    Content,
    Platform,
    ScheduledTime,
    Status,
    ImageFilename,
}
