//! Playtime module tracks live sessions and converts activity into accrued minutes.
pub mod components;
pub mod errors;
pub mod events;
pub mod plugin;
pub mod systems;
pub mod tracker;

pub use plugin::PlaytimePlugin;
