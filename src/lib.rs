//! Playtime and login-streak rewards for a game server, as a set of Bevy plugins.
//!
//! The host feeds sessions, positions and permissions in as messages and receives
//! rewards through an [`rewards::RewardSink`]. Durable per-subject records go through
//! a [`storage::RewardUserStore`]. Insert [`rewards::ActiveRewardSink`] and
//! [`storage::ActiveRewardUserStore`] resources to replace the logging/in-memory defaults.
use bevy::prelude::*;

pub mod core;
pub mod playtime;
pub mod rewards;
pub mod scheduler;
pub mod storage;
pub mod streak;

use crate::{
    core::CorePlugin, playtime::PlaytimePlugin, rewards::RewardConfigSource,
    rewards::RewardsPlugin, scheduler::SchedulerPlugin, streak::StreakPlugin,
};

/// Bundles every rewarder plugin in dependency order.
#[derive(Default)]
pub struct ActivityRewarderPlugin {
    pub config: RewardConfigSource,
    pub time_scale: Option<f32>,
}

impl ActivityRewarderPlugin {
    pub fn new(config: RewardConfigSource) -> Self {
        Self {
            config,
            time_scale: None,
        }
    }

    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = Some(time_scale);
        self
    }
}

impl Plugin for ActivityRewarderPlugin {
    fn build(&self, app: &mut App) {
        let core = self
            .time_scale
            .map(CorePlugin::with_time_scale)
            .unwrap_or_default();

        app.add_plugins((
            core,
            RewardsPlugin::with_source(self.config.clone()),
            PlaytimePlugin,
            SchedulerPlugin,
            StreakPlugin,
        ));
    }
}

#[cfg(test)]
mod tests {
    use std::{env, fs, process};

    use super::*;
    use crate::{
        core::TickClock,
        playtime::{
            components::{ClientPlatform, SubjectId, SubjectPosition},
            events::{SessionEnded, SessionStarted},
        },
        rewards::{
            delivery::{CommandSender, RecordingSink, SinkCall},
            ActiveRewardSink,
        },
        storage::{ActiveRewardUserStore, InMemoryStore},
        streak::{events::ClaimDailyReward, state::RewardCalendar},
    };

    #[test]
    fn full_plugin_runs_a_session_end_to_end() {
        let dir = env::temp_dir().join(format!("activity-rewarder-e2e-{}", process::id()));
        fs::create_dir_all(&dir).expect("scratch dir");
        let path = dir.join("rewards.toml");
        fs::write(
            &path,
            r#"
            [playtime]
            ignore-afk = true

            [reward-days.default]
            commands = ["say welcome back %user%"]

            [playtime-daily-goals]
            refresh-time = 30
            commands = ["eco give %user% 10"]
            "#,
        )
        .expect("write config");

        let store = InMemoryStore::default();
        let sink = RecordingSink::default();
        let mut app = App::new();
        app.insert_resource(ActiveRewardSink::new(Box::new(sink.clone())))
            .insert_resource(ActiveRewardUserStore::new(Box::new(store.clone())))
            .insert_resource(RewardCalendar::fixed(20_000))
            .add_plugins(ActivityRewarderPlugin::new(RewardConfigSource { path: path.clone() }));
        app.init_resource::<Time>();

        let subject = SubjectId::new(1);
        app.world_mut().write_message(SessionStarted {
            subject,
            name: "Alex".to_string(),
            position: SubjectPosition::default(),
            platform: ClientPlatform::Bedrock,
            permissions: Vec::new(),
        });
        app.update();

        app.world_mut().write_message(ClaimDailyReward { subject });
        for _ in 0..31 {
            app.world_mut().resource_mut::<TickClock>().push_ticks(60);
            app.update();
        }
        app.world_mut().write_message(SessionEnded { subject });
        app.update();

        let calls = sink.calls();
        assert!(calls.contains(&SinkCall::Command {
            subject,
            sender: CommandSender::Console,
            command: "say welcome back Alex".to_string(),
        }));
        assert!(calls.contains(&SinkCall::Command {
            subject,
            sender: CommandSender::Console,
            command: "eco give Alex 10".to_string(),
        }));

        let saved = store.get(subject).expect("record saved");
        assert_eq!(saved.minutes_played, 31);
        assert_eq!(saved.day_num, 2);
        let _ = fs::remove_dir_all(&dir);
    }
}
