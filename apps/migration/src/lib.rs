//! Schema migrations for posts and persisted scheduler tasks.

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_posts;
mod m20240101_000002_create_scheduled_tasks;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_posts::Migration),
            Box::new(m20240101_000002_create_scheduled_tasks::Migration),
        ]
    }
}
