//! Streak plugin wiring daily claims and reminders.
use bevy::prelude::*;

use crate::{
    core::plugin::RewarderSet,
    scheduler::systems::evaluate_minute_milestones,
    streak::{
        events::{ClaimDailyReward, DailyRewardClaimed},
        state::{ReminderSettings, RewardCalendar, StreakSettings},
        systems::{claim_daily_rewards, send_reminders, ReminderSchedule},
    },
};

pub struct StreakPlugin;

impl Plugin for StreakPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ClaimDailyReward>()
            .add_message::<DailyRewardClaimed>()
            .init_resource::<StreakSettings>()
            .init_resource::<ReminderSettings>()
            .init_resource::<RewardCalendar>()
            .init_resource::<ReminderSchedule>()
            .add_systems(
                Update,
                (claim_daily_rewards, send_reminders)
                    .chain()
                    .after(evaluate_minute_milestones)
                    .in_set(RewarderSet::Rewards),
            );
    }
}
