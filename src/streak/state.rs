//! Daily streak bookkeeping, reminder settings and the reward calendar.
use std::{
    fmt,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use bevy::prelude::*;

use crate::{
    playtime::components::SubjectId, rewards::config::MessageSettings,
    rewards::errors::ConfigurationError, storage::RewardUser,
};

const SECONDS_PER_DAY: u64 = 86_400;
const DEFAULT_REMINDER_PERIOD: Duration = Duration::from_secs(1800);

/// Streak rules from the config root.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakSettings {
    /// Restart the streak at day 1 when a full day is skipped.
    pub days_reset: bool,
}

/// How often unclaimed subjects are reminded, and what they are told.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct ReminderSettings {
    /// Zero disables reminders.
    pub period: Duration,
    pub message: String,
}

impl ReminderSettings {
    pub fn is_enabled(&self) -> bool {
        !self.period.is_zero()
    }
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            period: DEFAULT_REMINDER_PERIOD,
            message: MessageSettings::default().reminder,
        }
    }
}

/// Source of the current day, counted in whole days since the Unix epoch (UTC).
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct RewardCalendar {
    fixed_day: Option<i64>,
}

impl RewardCalendar {
    /// Calendar pinned to a specific epoch day.
    pub const fn fixed(day: i64) -> Self {
        Self {
            fixed_day: Some(day),
        }
    }

    pub fn set_today(&mut self, day: i64) {
        self.fixed_day = Some(day);
    }

    pub fn today(&self) -> i64 {
        self.fixed_day.unwrap_or_else(system_epoch_day)
    }
}

fn system_epoch_day() -> i64 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default();
    i64::try_from(secs / SECONDS_PER_DAY).unwrap_or(i64::MAX)
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreakError {
    AlreadyCollected { subject: SubjectId, day: i64 },
    NoReward { subject: SubjectId, source: ConfigurationError },
}

impl fmt::Display for StreakError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyCollected { subject, day } => {
                write!(f, "{} already collected the reward for day {}", subject, day)
            }
            Self::NoReward { subject, source } => {
                write!(f, "no reward available for {}: {}", subject, source)
            }
        }
    }
}

impl std::error::Error for StreakError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NoReward { source, .. } => Some(source),
            Self::AlreadyCollected { .. } => None,
        }
    }
}

/// Streak day the subject may claim today.
pub fn claimable_day(
    user: &RewardUser,
    today: i64,
    settings: &StreakSettings,
) -> Result<u32, StreakError> {
    if user.has_collected_on(today) {
        return Err(StreakError::AlreadyCollected {
            subject: user.subject,
            day: today,
        });
    }

    let missed_a_day = user
        .last_collected_day
        .is_some_and(|last| last < today - 1);
    if settings.days_reset && missed_a_day {
        return Ok(1);
    }
    Ok(user.day_num.max(1))
}

/// Records a claim of `claimed_day` on `today` and advances the streak.
pub fn complete_claim(user: &mut RewardUser, claimed_day: u32, today: i64) {
    user.day_num = claimed_day.saturating_add(1);
    user.last_collected_day = Some(today);
}
