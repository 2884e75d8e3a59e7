//! Scheduler module turns accrued minutes into goal claims and durable checkpoints.
pub mod goals;
pub mod plugin;
pub mod systems;

pub use plugin::SchedulerPlugin;
