//! Rewards plugin wiring the catalog, delivery sink and config reloads.
use bevy::prelude::*;

use crate::{
    core::plugin::RewarderSet,
    playtime::{
        components::{ClientPlatform, SessionIndex, Subject, SubjectId},
        tracker::PlaytimeSettings,
    },
    scheduler::goals::GoalClaimers,
};

use super::{
    catalog::RewardCatalog,
    config::{RewardConfigSource, RewarderConfig},
    delivery::{ActiveRewardSink, Recipient},
};

/// Asks for the rewards config to be re-read; the requester, if any, is told the outcome.
#[derive(Message, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReloadRequested {
    pub requested_by: Option<SubjectId>,
}

#[derive(Default)]
pub struct RewardsPlugin {
    source: RewardConfigSource,
}

impl RewardsPlugin {
    pub fn with_source(source: RewardConfigSource) -> Self {
        Self { source }
    }
}

impl Plugin for RewardsPlugin {
    fn build(&self, app: &mut App) {
        let config = RewarderConfig::load_or_default(&self.source.path);
        install_config(app.world_mut(), config);

        app.insert_resource(self.source.clone())
            .init_resource::<ActiveRewardSink>()
            .add_message::<ReloadRequested>()
            .add_systems(Startup, log_catalog_summary)
            .add_systems(Update, reload_reward_config.in_set(RewarderSet::Intake));
    }
}

/// Swaps every config-derived resource in one go. Goal claimers injected in code are kept.
pub fn install_config(world: &mut World, config: RewarderConfig) {
    let RewarderConfig {
        catalog,
        playtime,
        streak,
        reminders,
        display,
        messages,
        goals,
    } = config;

    world.insert_resource(catalog);
    world.insert_resource::<PlaytimeSettings>(playtime);
    world.insert_resource(streak);
    world.insert_resource(reminders);
    world.insert_resource(display);
    world.insert_resource(messages);
    match world.get_resource_mut::<GoalClaimers>() {
        Some(mut claimers) => claimers.apply_config(goals.daily, goals.global),
        None => world.insert_resource(GoalClaimers::from_bundles(goals.daily, goals.global)),
    }
}

/// Rebuilds the config off to the side; a failed rebuild keeps the current one.
pub fn reload_reward_config(
    mut commands: Commands,
    mut requests: MessageReader<ReloadRequested>,
    source: Res<RewardConfigSource>,
    index: Res<SessionIndex>,
    sink: Res<ActiveRewardSink>,
    subjects: Query<(&Subject, &ClientPlatform)>,
) {
    let requesters: Vec<Option<SubjectId>> =
        requests.read().map(|request| request.requested_by).collect();
    if requesters.is_empty() {
        return;
    }

    let config = match RewarderConfig::load(&source.path) {
        Ok(config) => config,
        Err(err) => {
            error!(
                target: "rewards",
                "Reload of {} failed, keeping the current catalog: {}",
                source.path.display(),
                err
            );
            return;
        }
    };

    let reload_message = config.messages.reload.clone();
    info!(
        target: "rewards",
        "Reloaded {} ({} reward days)",
        source.path.display(),
        config.catalog.table().len()
    );
    commands.queue(move |world: &mut World| install_config(world, config));

    for subject_id in requesters.into_iter().flatten() {
        let Some((subject, platform)) = index
            .get(subject_id)
            .and_then(|entity| subjects.get(entity).ok())
        else {
            continue;
        };
        let recipient = Recipient::new(subject.id, &subject.name, *platform);
        sink.sink().notify(&recipient, &reload_message);
    }
}

fn log_catalog_summary(catalog: Res<RewardCatalog>) {
    info!(
        "RewardsPlugin initialised with {} reward days (default bundle: {})",
        catalog.table().len(),
        catalog.table().default_bundle().is_some()
    );
}

#[cfg(test)]
mod tests {
    use std::{env, fs, path::PathBuf, process};

    use super::*;
    use crate::{
        rewards::delivery::{RecordingSink, RewardSink, SinkCall},
        scheduler::goals::{GoalClaimer, GoalKind},
        streak::state::StreakSettings,
    };

    struct FixedRefreshClaimer(u64);

    impl GoalClaimer for FixedRefreshClaimer {
        fn refresh_minutes(&self) -> u64 {
            self.0
        }

        fn claim(&self, _recipient: &Recipient<'_>, _sink: &dyn RewardSink) {}
    }

    fn scratch_config(name: &str, contents: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("activity-rewarder-{}-{}", name, process::id()));
        fs::create_dir_all(&dir).expect("scratch dir");
        let path = dir.join("rewards.toml");
        fs::write(&path, contents).expect("write config");
        path
    }

    fn build_app(path: PathBuf, sink: RecordingSink) -> App {
        let mut app = App::new();
        app.init_resource::<SessionIndex>()
            .add_plugins(RewardsPlugin::with_source(RewardConfigSource { path }))
            .insert_resource(ActiveRewardSink::new(Box::new(sink)));
        app
    }

    #[test]
    fn plugin_installs_config_resources() {
        let path = scratch_config(
            "plugin-install",
            "days-reset = true\n[reward-days.1]\ncommands = [\"say hi\"]\n",
        );
        let app = build_app(path.clone(), RecordingSink::default());

        assert_eq!(app.world().resource::<RewardCatalog>().table().len(), 1);
        assert!(app.world().resource::<StreakSettings>().days_reset);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn reload_swaps_catalog_and_notifies_requester() {
        let path = scratch_config("reload-ok", "[reward-days.1]\ncommands = [\"say hi\"]\n");
        let sink = RecordingSink::default();
        let mut app = build_app(path.clone(), sink.clone());

        let subject = SubjectId::new(8);
        let entity = app
            .world_mut()
            .spawn((Subject::new(subject, "Admin"), ClientPlatform::Java))
            .id();
        app.world_mut()
            .resource_mut::<SessionIndex>()
            .insert(subject, entity);

        fs::write(
            &path,
            "[messages]\nreload = \"Reloaded!\"\n[reward-days.1]\n[reward-days.2]\n[reward-days.3]\n",
        )
        .unwrap();
        app.world_mut().write_message(ReloadRequested {
            requested_by: Some(subject),
        });
        app.update();

        assert_eq!(app.world().resource::<RewardCatalog>().table().len(), 3);
        assert_eq!(
            sink.calls(),
            vec![SinkCall::Notify {
                subject,
                message: "Reloaded!".to_string(),
            }]
        );
        let _ = fs::remove_file(path);
    }

    #[test]
    fn reload_keeps_goal_claimers_installed_in_code() {
        let path = scratch_config("reload-goals", "[reward-days.1]\ncommands = [\"say hi\"]\n");
        let mut app = build_app(path.clone(), RecordingSink::default());
        app.world_mut()
            .resource_mut::<GoalClaimers>()
            .inject(GoalKind::Daily, Box::new(FixedRefreshClaimer(7)));

        fs::write(
            &path,
            "[reward-days.1]\n[playtime-daily-goals]\nrefresh-time = 30\ncommands = [\"say daily\"]\n\
             [playtime-global-goals]\nrefresh-time = 120\ncommands = [\"say global\"]\n",
        )
        .unwrap();
        app.world_mut().write_message(ReloadRequested::default());
        app.update();

        let goals = app.world().resource::<GoalClaimers>();
        assert_eq!(goals.daily().map(|goal| goal.refresh_minutes()), Some(7));
        assert_eq!(goals.global().map(|goal| goal.refresh_minutes()), Some(120));
        assert!(goals.is_injected(GoalKind::Daily));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn failed_reload_keeps_previous_catalog() {
        let path = scratch_config("reload-bad", "[reward-days.1]\ncommands = [\"say hi\"]\n");
        let sink = RecordingSink::default();
        let mut app = build_app(path.clone(), sink.clone());
        let before = app.world().resource::<RewardCatalog>().clone();

        fs::write(&path, "[reward-days.1]\nsize = \"enormous\"\n").unwrap();
        app.world_mut().write_message(ReloadRequested::default());
        app.update();

        assert_eq!(app.world().resource::<RewardCatalog>(), &before);
        assert!(sink.calls().is_empty());
        let _ = fs::remove_file(path);
    }
}
