//! Per-subject components and the session lookup resource.
use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::errors::PlaytimeError;

/// Stable identifier the host assigns to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubjectId(u64);

impl SubjectId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SUBJ-{:06}", self.0)
    }
}

/// Identity of a connected subject.
#[derive(Component, Debug, Clone)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
}

impl Subject {
    pub fn new(id: SubjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Client variant of a subject, as reported by the host's platform detection.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ClientPlatform {
    #[default]
    Java,
    Bedrock,
}

impl fmt::Display for ClientPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Java => "java",
            Self::Bedrock => "bedrock",
        };
        write!(f, "{}", label)
    }
}

/// Block position snapshot. Only equality matters for activity detection.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubjectPosition {
    pub world: u32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl SubjectPosition {
    pub const fn new(world: u32, x: i32, y: i32, z: i32) -> Self {
        Self { world, x, y, z }
    }
}

/// Permission nodes currently granted to a subject.
#[derive(Component, Debug, Clone, Default)]
pub struct HeldPermissions {
    nodes: HashSet<String>,
}

impl HeldPermissions {
    pub fn new(nodes: impl IntoIterator<Item = String>) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
        }
    }

    pub fn has(&self, node: &str) -> bool {
        self.nodes.contains(node)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }
}

/// Maps live subjects to their entities.
#[derive(Resource, Debug, Default)]
pub struct SessionIndex {
    entries: HashMap<SubjectId, Entity>,
}

impl SessionIndex {
    pub fn insert(&mut self, subject: SubjectId, entity: Entity) -> Option<Entity> {
        self.entries.insert(subject, entity)
    }

    pub fn remove(&mut self, subject: SubjectId) -> Option<Entity> {
        self.entries.remove(&subject)
    }

    pub fn get(&self, subject: SubjectId) -> Option<Entity> {
        self.entries.get(&subject).copied()
    }

    pub fn require(&self, subject: SubjectId) -> Result<Entity, PlaytimeError> {
        self.get(subject)
            .ok_or(PlaytimeError::NoActiveSession { subject })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Subjects whose session end arrived this frame with no live session to close.
#[derive(Resource, Debug, Default)]
pub struct UnmatchedSessionEnds {
    subjects: HashSet<SubjectId>,
}

impl UnmatchedSessionEnds {
    pub fn clear(&mut self) {
        self.subjects.clear();
    }

    pub fn record(&mut self, subject: SubjectId) {
        self.subjects.insert(subject);
    }

    /// True once per recorded subject.
    pub fn take(&mut self, subject: SubjectId) -> bool {
        self.subjects.remove(&subject)
    }
}
