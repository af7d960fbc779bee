//! Status-change notifiers.

mod broadcast;

pub use broadcast::BroadcastNotifier;
