//! Process-local store, used for tests and as the fallback when no data dir is set.
use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use crate::playtime::components::SubjectId;

use super::{RewardUser, RewardUserStore, StoreError};

/// Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    users: Arc<RwLock<HashMap<SubjectId, RewardUser>>>,
}

impl InMemoryStore {
    pub fn get(&self, subject: SubjectId) -> Option<RewardUser> {
        self.users
            .read()
            .ok()
            .and_then(|users| users.get(&subject).cloned())
    }
}

impl RewardUserStore for InMemoryStore {
    fn load(&self, subject: SubjectId) -> Result<Option<RewardUser>, StoreError> {
        let users = self.users.read().map_err(|_| StoreError::Unavailable {
            message: "user map lock poisoned".to_string(),
        })?;
        Ok(users.get(&subject).cloned())
    }

    fn save(&self, user: &RewardUser) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(|_| StoreError::Unavailable {
            message: "user map lock poisoned".to_string(),
        })?;
        users.insert(user.subject, user.clone());
        Ok(())
    }
}
