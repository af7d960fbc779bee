//! # Postpilot Core
//!
//! The domain layer of Postpilot.
//! Scheduled posts, the tasks that publish them, and the services that keep
//! the two consistent. Storage, timers and sockets live behind the ports.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
