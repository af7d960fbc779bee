//! Post and task persistence.

mod connections;
mod memory;

#[cfg(feature = "database")]
mod base;
#[cfg(feature = "database")]
pub mod entity;
#[cfg(feature = "database")]
mod post_repo;
#[cfg(feature = "database")]
mod task_store;

pub use connections::DatabaseConfig;
pub use memory::InMemoryPostRepository;

#[cfg(feature = "database")]
pub use base::SeaOrmRepository;
#[cfg(feature = "database")]
pub use connections::connect;
#[cfg(feature = "database")]
pub use post_repo::SeaOrmPostRepository;
#[cfg(feature = "database")]
pub use task_store::SeaOrmTaskStore;
