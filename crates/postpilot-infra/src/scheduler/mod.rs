//! One-shot delayed task scheduling.

mod delayed;
mod memory;

#[cfg(test)]
mod tests;

pub use delayed::{DelayedSchedulerConfig, DelayedTaskScheduler};
pub use memory::InMemoryTaskStore;
