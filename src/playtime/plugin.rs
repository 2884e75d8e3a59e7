//! Playtime plugin wiring sessions, host reports, and per-tick accrual.
use bevy::prelude::*;

use crate::{
    core::plugin::RewarderSet,
    playtime::{
        components::{SessionIndex, UnmatchedSessionEnds},
        events::{MinuteElapsed, PermissionsChanged, PositionReported, SessionEnded, SessionStarted},
        systems::{
            apply_permission_changes, apply_position_reports, end_sessions, start_sessions,
            tick_playtime_trackers,
        },
        tracker::PlaytimeSettings,
    },
    storage::ActiveRewardUserStore,
};

pub struct PlaytimePlugin;

impl Plugin for PlaytimePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<SessionStarted>()
            .add_message::<SessionEnded>()
            .add_message::<PositionReported>()
            .add_message::<PermissionsChanged>()
            .add_message::<MinuteElapsed>()
            .init_resource::<SessionIndex>()
            .init_resource::<UnmatchedSessionEnds>()
            .init_resource::<PlaytimeSettings>()
            .init_resource::<ActiveRewardUserStore>()
            .add_systems(
                Update,
                (
                    end_sessions,
                    start_sessions,
                    apply_position_reports,
                    apply_permission_changes,
                )
                    .chain()
                    .in_set(RewarderSet::Intake),
            )
            .add_systems(Update, tick_playtime_trackers.in_set(RewarderSet::Accrual));
    }
}
