//! Background jobs.

mod scheduler;

pub use scheduler::CronScheduler;
