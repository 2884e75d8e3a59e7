//! Per-subject playtime accrual state machine.
use bevy::prelude::*;

use super::components::SubjectPosition;

/// Idle ticks tolerated before a subject counts as AFK.
pub const IDLE_TICKS_TO_AFK: u32 = 300;
pub const SECONDS_PER_MINUTE: u32 = 60;

/// Accrual tunables taken from the `[playtime]` config section.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaytimeSettings {
    pub ignore_afk: bool,
}

/// Where a subject currently sits in the ACTIVE / IDLE / AFK cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityState {
    Active,
    Idle,
    Afk,
}

impl ActivityState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Idle => "idle",
            Self::Afk => "afk",
        }
    }
}

/// Result of a single accrual tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Set when this tick completed another minute of active time.
    pub minute_elapsed: Option<u32>,
    pub became_afk: bool,
    pub left_afk: bool,
}

#[derive(Component, Debug, Clone)]
pub struct PlaytimeTracker {
    last_position: SubjectPosition,
    state: ActivityState,
    session_seconds: u32,
    idle_seconds: u32,
    global_minutes: u32,
}

impl PlaytimeTracker {
    /// Starts a session at `position` with the durable lifetime minutes.
    pub fn new(position: SubjectPosition, global_minutes: u32) -> Self {
        Self {
            last_position: position,
            state: ActivityState::Active,
            session_seconds: 0,
            idle_seconds: 0,
            global_minutes,
        }
    }

    /// Advances the tracker by one second.
    pub fn tick(&mut self, position: SubjectPosition, ignore_afk: bool) -> TickOutcome {
        if ignore_afk {
            return self.while_active();
        }

        if position != self.last_position {
            self.last_position = position;
            self.while_active()
        } else {
            self.while_inactive()
        }
    }

    fn while_active(&mut self) -> TickOutcome {
        let mut outcome = TickOutcome {
            minute_elapsed: self.accrue_second(),
            ..Default::default()
        };

        if self.state == ActivityState::Afk {
            self.idle_seconds = 0;
            outcome.left_afk = true;
        }
        self.state = ActivityState::Active;
        outcome
    }

    fn while_inactive(&mut self) -> TickOutcome {
        self.idle_seconds = self.idle_seconds.saturating_add(1);

        let mut outcome = TickOutcome::default();
        if self.state == ActivityState::Afk {
            return outcome;
        }

        if self.idle_seconds > IDLE_TICKS_TO_AFK {
            self.state = ActivityState::Afk;
            outcome.became_afk = true;
        } else {
            // Grace period: idle time still counts until the AFK threshold.
            self.state = ActivityState::Idle;
            outcome.minute_elapsed = self.accrue_second();
        }
        outcome
    }

    fn accrue_second(&mut self) -> Option<u32> {
        self.session_seconds = self.session_seconds.saturating_add(1);
        if self.session_seconds % SECONDS_PER_MINUTE == 0 {
            self.global_minutes = self.global_minutes.saturating_add(1);
            Some(self.global_minutes)
        } else {
            None
        }
    }

    pub fn state(&self) -> ActivityState {
        self.state
    }

    pub fn is_afk(&self) -> bool {
        self.state == ActivityState::Afk
    }

    pub fn session_seconds(&self) -> u32 {
        self.session_seconds
    }

    pub fn idle_seconds(&self) -> u32 {
        self.idle_seconds
    }

    /// Whole minutes of active time this session.
    pub fn session_minutes(&self) -> u32 {
        self.session_seconds / SECONDS_PER_MINUTE
    }

    /// Whole minutes this session, idle time included.
    pub fn total_session_minutes(&self) -> u32 {
        (self.session_seconds + self.idle_seconds) / SECONDS_PER_MINUTE
    }

    pub fn global_minutes(&self) -> u32 {
        self.global_minutes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: SubjectPosition = SubjectPosition::new(0, 0, 64, 0);

    fn moved(step: i32) -> SubjectPosition {
        SubjectPosition::new(0, step, 64, 0)
    }

    #[test]
    fn movement_accrues_active_time() {
        let mut tracker = PlaytimeTracker::new(HOME, 0);
        for step in 1..=90 {
            tracker.tick(moved(step), false);
        }
        assert_eq!(tracker.state(), ActivityState::Active);
        assert_eq!(tracker.session_seconds(), 90);
        assert_eq!(tracker.session_minutes(), 1);
        assert_eq!(tracker.idle_seconds(), 0);
    }

    #[test]
    fn standing_still_turns_afk_after_threshold() {
        let mut tracker = PlaytimeTracker::new(HOME, 0);
        let mut became_afk_at = None;
        for tick in 1..=301 {
            let outcome = tracker.tick(HOME, false);
            if outcome.became_afk {
                became_afk_at = Some(tick);
            }
        }

        assert_eq!(became_afk_at, Some(301));
        assert!(tracker.is_afk());
        assert_eq!(tracker.session_seconds(), 300);

        for _ in 0..120 {
            let outcome = tracker.tick(HOME, false);
            assert_eq!(outcome.minute_elapsed, None);
        }
        assert_eq!(tracker.session_seconds(), 300);
        assert_eq!(tracker.idle_seconds(), 421);
        assert_eq!(tracker.total_session_minutes(), 12);
    }

    #[test]
    fn movement_cancels_afk_immediately() {
        let mut tracker = PlaytimeTracker::new(HOME, 0);
        for _ in 0..400 {
            tracker.tick(HOME, false);
        }
        assert!(tracker.is_afk());

        let outcome = tracker.tick(moved(1), false);
        assert!(outcome.left_afk);
        assert_eq!(tracker.state(), ActivityState::Active);
        assert_eq!(tracker.idle_seconds(), 0);
        assert_eq!(tracker.session_seconds(), 301);
    }

    #[test]
    fn idle_within_grace_period_still_counts() {
        let mut tracker = PlaytimeTracker::new(HOME, 0);
        for _ in 0..120 {
            tracker.tick(HOME, false);
        }
        assert_eq!(tracker.state(), ActivityState::Idle);
        assert_eq!(tracker.session_minutes(), 2);
    }

    #[test]
    fn ignore_afk_always_accrues() {
        let mut tracker = PlaytimeTracker::new(HOME, 0);
        for _ in 0..1000 {
            tracker.tick(HOME, true);
        }
        assert_eq!(tracker.state(), ActivityState::Active);
        assert_eq!(tracker.session_seconds(), 1000);
        assert_eq!(tracker.idle_seconds(), 0);
    }

    #[test]
    fn one_minute_event_per_sixty_active_seconds() {
        let mut tracker = PlaytimeTracker::new(HOME, 100);
        let mut minutes = Vec::new();
        for step in 1..=180 {
            if let Some(minute) = tracker.tick(moved(step), false).minute_elapsed {
                minutes.push((step, minute));
            }
        }
        assert_eq!(minutes, vec![(60, 101), (120, 102), (180, 103)]);
        assert_eq!(tracker.global_minutes(), 103);
    }
}
