//! Observability module - error alerting.

mod alert;

pub use alert::AlertLayer;
