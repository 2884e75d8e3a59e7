use std::{env, path::Path, path::PathBuf, time::Duration};

use bevy::{app::ScheduleRunnerPlugin, log::LogPlugin, prelude::*};

use activity_rewarder::{
    rewards::{ActiveRewardSink, LoggingRewardSink, RewardConfigSource},
    storage::{ActiveRewardUserStore, InMemoryStore, JsonFileStore},
    ActivityRewarderPlugin,
};

const ENV_FILE: &str = "rewarder.env";
const CONFIG_PATH_VAR: &str = "REWARDER_CONFIG_PATH";
const DATA_DIR_VAR: &str = "REWARDER_DATA_DIR";
const TIME_SCALE_VAR: &str = "REWARDER_TIME_SCALE";
const DEFAULT_DATA_DIR: &str = "data/users";
const FRAME_INTERVAL: Duration = Duration::from_millis(50);

fn main() {
    load_rewarder_env();

    let config = env::var(CONFIG_PATH_VAR)
        .map(|path| RewardConfigSource {
            path: PathBuf::from(path),
        })
        .unwrap_or_default();
    let data_dir = env::var(DATA_DIR_VAR).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());

    let mut rewarder = ActivityRewarderPlugin::new(config);
    if let Some(scale) = read_time_scale() {
        rewarder = rewarder.with_time_scale(scale);
    }

    App::new()
        .add_plugins((
            MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(FRAME_INTERVAL)),
            LogPlugin::default(),
        ))
        .insert_resource(ActiveRewardSink::new(Box::new(LoggingRewardSink)))
        .insert_resource(open_user_store(&data_dir))
        .add_plugins(rewarder)
        .run();
}

fn load_rewarder_env() {
    let path = Path::new(ENV_FILE);
    if !path.exists() {
        return;
    }

    if let Err(err) = dotenvy::from_filename(path) {
        eprintln!("Failed to load {}: {}", ENV_FILE, err);
    }
}

fn read_time_scale() -> Option<f32> {
    let raw = env::var(TIME_SCALE_VAR).ok()?;
    match raw.trim().parse::<f32>() {
        Ok(scale) if scale.is_finite() && scale > 0.0 => Some(scale),
        _ => {
            eprintln!("Ignoring {}={}: expected a positive number", TIME_SCALE_VAR, raw);
            None
        }
    }
}

fn open_user_store(data_dir: &str) -> ActiveRewardUserStore {
    match JsonFileStore::open(data_dir) {
        Ok(store) => ActiveRewardUserStore::new(Box::new(store)),
        Err(err) => {
            eprintln!("{}; playtime will not survive a restart", err);
            ActiveRewardUserStore::new(Box::new(InMemoryStore::default()))
        }
    }
}
