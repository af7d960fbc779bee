//! SeaORM entities.

pub mod post;
pub mod scheduled_task;
