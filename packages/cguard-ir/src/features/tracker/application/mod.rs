mod calls;
mod conditions;
mod lifetime_tracker;

pub use conditions::{null_test, NullTest};
pub use lifetime_tracker::LifetimeTracker;
