use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ScheduledTasks::Table)
                    .if_not_exists()
                    .col(string(ScheduledTasks::Id).primary_key())
                    .col(string(ScheduledTasks::Callback))
                    .col(json(ScheduledTasks::Payload))
                    .col(timestamp_with_time_zone(ScheduledTasks::FireAt))
                    .col(timestamp_with_time_zone(ScheduledTasks::CreatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ScheduledTasks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ScheduledTasks {
    Table,
    Id,
    Callback,
    Payload,
    FireAt,
    CreatedAt,
}
