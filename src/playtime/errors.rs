//! Errors raised by session-scoped playtime operations.
use std::fmt;

use super::components::SubjectId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaytimeError {
    /// An operation targeted a subject with no live session.
    NoActiveSession { subject: SubjectId },
}

impl fmt::Display for PlaytimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActiveSession { subject } => {
                write!(f, "{} has no active session", subject)
            }
        }
    }
}

impl std::error::Error for PlaytimeError {}
