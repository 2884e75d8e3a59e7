//! Streak module handles daily reward claims and claim reminders.
pub mod events;
pub mod plugin;
pub mod state;
pub mod systems;

pub use plugin::StreakPlugin;
