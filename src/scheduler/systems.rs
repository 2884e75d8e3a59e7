//! Converts minute milestones into goal claims and periodic checkpoints.
use bevy::prelude::*;

use crate::{
    playtime::{
        components::{ClientPlatform, SessionIndex, Subject},
        events::MinuteElapsed,
    },
    rewards::delivery::{ActiveRewardSink, Recipient},
    scheduler::goals::GoalClaimers,
    storage::{ActiveRewardUserStore, RewardUser},
};

/// Accrued minutes are written to the store on multiples of this.
pub const CHECKPOINT_INTERVAL_MINUTES: u32 = 15;

/// Runs the daily goal, global goal and checkpoint checks, independently and in that order.
pub fn evaluate_minute_milestones(
    mut minutes: MessageReader<MinuteElapsed>,
    index: Res<SessionIndex>,
    goals: Res<GoalClaimers>,
    sink: Res<ActiveRewardSink>,
    store: Res<ActiveRewardUserStore>,
    mut sessions: Query<(&Subject, &ClientPlatform, &mut RewardUser)>,
) {
    for milestone in minutes.read() {
        let entity = match index.require(milestone.subject) {
            Ok(entity) => entity,
            Err(err) => {
                warn!(target: "scheduler", "Skipping minute milestone: {}", err);
                continue;
            }
        };
        let Ok((subject, platform, mut user)) = sessions.get_mut(entity) else {
            continue;
        };

        let minute = milestone.global_minutes;
        let recipient = Recipient::new(subject.id, &subject.name, *platform);

        for claimer in [goals.daily(), goals.global()]
            .into_iter()
            .flatten()
        {
            if claimer.is_due(minute) {
                claimer.claim(&recipient, sink.sink());
            }
        }

        if minute % CHECKPOINT_INTERVAL_MINUTES == 0 {
            user.minutes_played = minute;
            match store.store().save(&user) {
                Ok(()) => debug!(
                    target: "scheduler",
                    "Checkpointed {} at {} minutes",
                    subject.id, minute
                ),
                Err(err) => error!(target: "scheduler", "Checkpoint failed: {}", err),
            }
        }
    }
}
