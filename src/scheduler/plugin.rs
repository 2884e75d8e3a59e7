//! Scheduler plugin wiring minute milestones to goal claims and checkpoints.
use bevy::prelude::*;

use crate::{
    core::plugin::RewarderSet,
    scheduler::{goals::GoalClaimers, systems::evaluate_minute_milestones},
};

pub struct SchedulerPlugin;

impl Plugin for SchedulerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GoalClaimers>()
            .add_systems(Update, evaluate_minute_milestones.in_set(RewarderSet::Rewards));
    }
}
