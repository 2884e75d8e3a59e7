//! Core module exposes the tick clock and shared system ordering.
pub mod plugin;

pub use plugin::{CorePlugin, RewarderSet, TickClock};
