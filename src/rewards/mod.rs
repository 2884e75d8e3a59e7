//! Rewards module owns the reward catalog, its configuration and delivery contract.
pub mod catalog;
pub mod config;
pub mod delivery;
pub mod errors;
pub mod plugin;
pub mod types;

pub use catalog::RewardCatalog;
pub use config::{RewardConfigSource, RewarderConfig};
pub use delivery::{ActiveRewardSink, LoggingRewardSink, RewardSink};
pub use errors::ConfigurationError;
pub use plugin::{ReloadRequested, RewardsPlugin};
