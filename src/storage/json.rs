//! One JSON file per subject under a data directory.
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use bevy::prelude::*;

use crate::playtime::components::SubjectId;

use super::{RewardUser, RewardUserStore, StoreError};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|err| StoreError::Unavailable {
            message: format!("unable to create {}: {err}", dir.display()),
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, subject: SubjectId) -> PathBuf {
        self.dir.join(format!("{}.json", subject.get()))
    }
}

impl RewardUserStore for JsonFileStore {
    fn load(&self, subject: SubjectId) -> Result<Option<RewardUser>, StoreError> {
        let path = self.path_for(subject);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::io(subject, err.to_string())),
        };
        let user = serde_json::from_str::<RewardUser>(&data)
            .map_err(|err| StoreError::corrupt(subject, err.to_string()))?;
        Ok(Some(user))
    }

    fn save(&self, user: &RewardUser) -> Result<(), StoreError> {
        let path = self.path_for(user.subject);
        let data = serde_json::to_string_pretty(user)
            .map_err(|err| StoreError::corrupt(user.subject, err.to_string()))?;

        // Write beside the target and rename so readers never see a partial file.
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, data).map_err(|err| StoreError::io(user.subject, err.to_string()))?;
        fs::rename(&staging, &path).map_err(|err| StoreError::io(user.subject, err.to_string()))?;
        debug!(target: "storage", "Saved {} to {}", user.subject, path.display());
        Ok(())
    }
}
