//! Session and accrual messages exchanged with the host and the scheduler.
use bevy::prelude::Message;

use super::components::{ClientPlatform, SubjectId, SubjectPosition};

/// Host notification that a subject connected.
#[derive(Message, Debug, Clone)]
pub struct SessionStarted {
    pub subject: SubjectId,
    pub name: String,
    pub position: SubjectPosition,
    pub platform: ClientPlatform,
    pub permissions: Vec<String>,
}

/// Host notification that a subject disconnected.
#[derive(Message, Debug, Clone, Copy)]
pub struct SessionEnded {
    pub subject: SubjectId,
}

/// Latest position snapshot for a subject.
#[derive(Message, Debug, Clone, Copy)]
pub struct PositionReported {
    pub subject: SubjectId,
    pub position: SubjectPosition,
}

/// Replaces the permission nodes held by a subject.
#[derive(Message, Debug, Clone)]
pub struct PermissionsChanged {
    pub subject: SubjectId,
    pub permissions: Vec<String>,
}

/// Written once for every 60 seconds of accrued active time.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteElapsed {
    pub subject: SubjectId,
    pub global_minutes: u32,
}
