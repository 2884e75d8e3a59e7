//! Durable per-subject records and the store contract behind them.
pub mod json;
pub mod memory;

pub use json::JsonFileStore;
pub use memory::InMemoryStore;

use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::playtime::components::SubjectId;

/// Durable state kept for every subject that ever connected.
#[derive(Component, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardUser {
    pub subject: SubjectId,
    pub name: String,
    /// Position in the daily reward streak, starting at 1.
    pub day_num: u32,
    /// Epoch day of the last daily claim.
    #[serde(default)]
    pub last_collected_day: Option<i64>,
    #[serde(default)]
    pub minutes_played: u32,
}

impl RewardUser {
    pub fn new(subject: SubjectId, name: impl Into<String>) -> Self {
        Self {
            subject,
            name: name.into(),
            day_num: 1,
            last_collected_day: None,
            minutes_played: 0,
        }
    }

    pub fn has_collected_on(&self, day: i64) -> bool {
        self.last_collected_day == Some(day)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Io { subject: SubjectId, message: String },
    Corrupt { subject: SubjectId, message: String },
    Unavailable { message: String },
}

impl StoreError {
    pub fn io(subject: SubjectId, message: impl Into<String>) -> Self {
        Self::Io {
            subject,
            message: message.into(),
        }
    }

    pub fn corrupt(subject: SubjectId, message: impl Into<String>) -> Self {
        Self::Corrupt {
            subject,
            message: message.into(),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { subject, message } => write!(f, "storage I/O for {}: {}", subject, message),
            Self::Corrupt { subject, message } => {
                write!(f, "corrupt record for {}: {}", subject, message)
            }
            Self::Unavailable { message } => write!(f, "store unavailable: {}", message),
        }
    }
}

impl std::error::Error for StoreError {}

/// Durable load/save of reward users.
pub trait RewardUserStore: Send + Sync + 'static {
    /// `Ok(None)` for a subject that has never been saved.
    fn load(&self, subject: SubjectId) -> Result<Option<RewardUser>, StoreError>;

    fn save(&self, user: &RewardUser) -> Result<(), StoreError>;
}

/// Resource wrapping the store used by session and scheduler systems.
#[derive(Resource)]
pub struct ActiveRewardUserStore {
    store: Box<dyn RewardUserStore>,
}

impl ActiveRewardUserStore {
    pub fn new(store: Box<dyn RewardUserStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn RewardUserStore {
        self.store.as_ref()
    }

    /// Loads an existing record or starts a fresh one, refreshing the name.
    pub fn load_or_new(&self, subject: SubjectId, name: &str) -> Result<RewardUser, StoreError> {
        let mut user = self
            .store
            .load(subject)?
            .unwrap_or_else(|| RewardUser::new(subject, name));
        user.name = name.to_string();
        Ok(user)
    }
}

impl Default for ActiveRewardUserStore {
    fn default() -> Self {
        Self::new(Box::new(InMemoryStore::default()))
    }
}
