//! Rewards configuration loaded from `config/rewards.toml`.
use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use bevy::prelude::*;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::{
    playtime::tracker::PlaytimeSettings,
    scheduler::goals::{BundleGoalClaimer, GoalKind},
    streak::state::{ReminderSettings, StreakSettings},
};

use super::{
    catalog::{HourlyBonusTable, HourlyBonusTier, LoopLength, RewardCatalog, RewardTable},
    errors::ConfigurationError,
    types::{
        CommandReward, ItemGrant, Material, PlatformCommand, PlayerCommandReward, Reward,
        RewardBundle, SizeTag,
    },
};
use crate::playtime::components::ClientPlatform;

pub const DEFAULT_CONFIG_PATH: &str = "config/rewards.toml";
const DEFAULT_KEY: &str = "default";
const DAY_PLACEHOLDER: &str = "%day%";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawRewarderConfig {
    gui: RawGuiSection,
    loop_length: i64,
    reminder_period: u64,
    days_reset: bool,
    reward_days: Option<BTreeMap<String, RawBundleSection>>,
    rewards: Option<BTreeMap<String, RawBundleSection>>,
    hourly_bonus: Option<IndexMap<String, RawTierSection>>,
    playtime: RawPlaytimeSection,
    playtime_daily_goals: Option<RawGoalSection>,
    playtime_global_goals: Option<RawGoalSection>,
    messages: RawMessages,
    sizes: BTreeMap<String, String>,
    collected_item: String,
}

impl Default for RawRewarderConfig {
    fn default() -> Self {
        Self {
            gui: RawGuiSection::default(),
            loop_length: -1,
            reminder_period: 1800,
            days_reset: false,
            reward_days: None,
            rewards: None,
            hourly_bonus: None,
            playtime: RawPlaytimeSection::default(),
            playtime_daily_goals: None,
            playtime_global_goals: None,
            messages: RawMessages::default(),
            sizes: BTreeMap::new(),
            collected_item: "redstone_block".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawGuiSection {
    border_item: String,
    title: String,
    redeemable_name: String,
    collected_name: String,
}

impl Default for RawGuiSection {
    fn default() -> Self {
        Self {
            border_item: "gray_stained_glass_pane".to_string(),
            title: "&8&lDaily Rewards".to_string(),
            redeemable_name: "&6Day %day%".to_string(),
            collected_name: "&6Day %day% - Collected".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
struct RawMessages {
    reload: String,
    reminder: String,
}

impl Default for RawMessages {
    fn default() -> Self {
        Self {
            reload: "&aConfig reloaded".to_string(),
            reminder: "&e&lRewards &8» &7It looks like you haven't collected today's reward from &e/rewards".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "kebab-case")]
struct RawPlaytimeSection {
    ignore_afk: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawBundleSection {
    size: Option<String>,
    items: IndexMap<String, RawItemAmount>,
    commands: Vec<String>,
    rewards: Vec<RawReward>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawItemAmount {
    amount: u32,
}

impl Default for RawItemAmount {
    fn default() -> Self {
        Self { amount: 1 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum RawReward {
    Item {
        material: String,
        #[serde(default = "default_amount")]
        amount: u32,
    },
    Command {
        command: String,
    },
    PlayerCommand {
        #[serde(default)]
        command: Option<String>,
        #[serde(default)]
        java: Option<String>,
        #[serde(default)]
        bedrock: Option<String>,
    },
}

fn default_amount() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
struct RawTierSection {
    #[serde(default = "default_multiplier")]
    multiplier: f64,
    #[serde(flatten)]
    bundle: RawBundleSection,
}

fn default_multiplier() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawGoalSection {
    #[serde(default = "default_enabled")]
    enabled: bool,
    #[serde(default)]
    refresh_time: u64,
    #[serde(flatten)]
    bundle: RawBundleSection,
}

fn default_enabled() -> bool {
    true
}

/// Item and text settings consumed by the host's reward menu.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    pub border_item: Material,
    pub title: String,
    redeemable_name: String,
    collected_name: String,
    size_items: HashMap<SizeTag, Material>,
    pub collected_item: Material,
}

impl DisplaySettings {
    pub fn redeemable_name(&self, day: u32) -> String {
        self.redeemable_name.replace(DAY_PLACEHOLDER, &day.to_string())
    }

    pub fn collected_name(&self, day: u32) -> String {
        self.collected_name.replace(DAY_PLACEHOLDER, &day.to_string())
    }

    /// Display material for a bundle size; stone when unconfigured.
    pub fn size_item(&self, size: SizeTag) -> Material {
        self.size_items
            .get(&size)
            .cloned()
            .unwrap_or_else(|| Material::from_static("stone"))
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        let gui = RawGuiSection::default();
        Self {
            border_item: Material::from_static("gray_stained_glass_pane"),
            title: gui.title,
            redeemable_name: gui.redeemable_name,
            collected_name: gui.collected_name,
            size_items: HashMap::new(),
            collected_item: Material::from_static("redstone_block"),
        }
    }
}

/// Player-facing message templates.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct MessageSettings {
    pub reload: String,
    pub reminder: String,
}

impl Default for MessageSettings {
    fn default() -> Self {
        let messages = RawMessages::default();
        Self {
            reload: messages.reload,
            reminder: messages.reminder,
        }
    }
}

/// Goal claimers described by the config; either may be absent or disabled.
#[derive(Debug, Clone, Default)]
pub struct GoalClaimerConfig {
    pub daily: Option<BundleGoalClaimer>,
    pub global: Option<BundleGoalClaimer>,
}

/// Fully validated configuration. Built completely before anything is swapped in.
#[derive(Debug, Clone)]
pub struct RewarderConfig {
    pub catalog: RewardCatalog,
    pub playtime: PlaytimeSettings,
    pub streak: StreakSettings,
    pub reminders: ReminderSettings,
    pub display: DisplaySettings,
    pub messages: MessageSettings,
    pub goals: GoalClaimerConfig,
}

impl RewarderConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .map_err(|err| ConfigurationError::read(path.display().to_string(), err.to_string()))?;
        Self::from_toml_str(&data)
    }

    pub fn from_toml_str(data: &str) -> Result<Self, ConfigurationError> {
        let raw = toml::from_str::<RawRewarderConfig>(data)
            .map_err(|err| ConfigurationError::parse(err.to_string()))?;
        Self::from_raw(raw)
    }

    /// Startup variant: a broken or missing file leaves an empty catalog behind.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(
                    "Failed to load {} ({}). Falling back to defaults.",
                    path.display(),
                    err
                );
                Self::fallback()
            }
        }
    }

    pub fn fallback() -> Self {
        let raw = RawRewarderConfig {
            reward_days: Some(BTreeMap::new()),
            ..RawRewarderConfig::default()
        };
        Self::from_raw(raw).unwrap_or_else(|err| {
            error!("Built-in rewards defaults rejected: {}", err);
            Self {
                catalog: RewardCatalog::default(),
                playtime: PlaytimeSettings::default(),
                streak: StreakSettings::default(),
                reminders: ReminderSettings::default(),
                display: DisplaySettings::default(),
                messages: MessageSettings::default(),
                goals: GoalClaimerConfig::default(),
            }
        })
    }

    fn from_raw(raw: RawRewarderConfig) -> Result<Self, ConfigurationError> {
        let sections = raw
            .reward_days
            .or(raw.rewards)
            .ok_or(ConfigurationError::MissingRewardsSection)?;

        let mut days = BTreeMap::new();
        let mut default_bundle = None;
        for (key, section) in sections {
            if key.trim().eq_ignore_ascii_case(DEFAULT_KEY) {
                default_bundle = Some(build_bundle(&section, "default rewards")?);
                continue;
            }
            let day = key
                .trim()
                .parse::<u32>()
                .map_err(|_| ConfigurationError::invalid_day_key(key.as_str()))?;
            days.insert(day, build_bundle(&section, &format!("day {day}"))?);
        }

        let hourly_bonus = raw
            .hourly_bonus
            .map(|tiers| {
                tiers
                    .into_iter()
                    .map(|(key, tier)| build_tier(key, tier))
                    .collect::<Result<Vec<_>, _>>()
                    .map(HourlyBonusTable::new)
            })
            .transpose()?;

        let catalog = RewardCatalog::new(
            RewardTable::new(days, default_bundle),
            LoopLength::from_config(raw.loop_length),
            hourly_bonus,
        );

        let mut size_items = HashMap::new();
        for (size, material) in &raw.sizes {
            size_items.insert(size.parse::<SizeTag>()?, material.parse::<Material>()?);
        }

        let display = DisplaySettings {
            border_item: raw.gui.border_item.parse()?,
            title: raw.gui.title,
            redeemable_name: raw.gui.redeemable_name,
            collected_name: raw.gui.collected_name,
            size_items,
            collected_item: raw.collected_item.parse()?,
        };

        let goals = GoalClaimerConfig {
            daily: build_goal(GoalKind::Daily, raw.playtime_daily_goals)?,
            global: build_goal(GoalKind::Global, raw.playtime_global_goals)?,
        };

        Ok(Self {
            catalog,
            playtime: PlaytimeSettings {
                ignore_afk: raw.playtime.ignore_afk,
            },
            streak: StreakSettings {
                days_reset: raw.days_reset,
            },
            reminders: ReminderSettings {
                period: Duration::from_secs(raw.reminder_period),
                message: raw.messages.reminder.clone(),
            },
            display,
            messages: MessageSettings {
                reload: raw.messages.reload,
                reminder: raw.messages.reminder,
            },
            goals,
        })
    }
}

fn build_bundle(section: &RawBundleSection, context: &str) -> Result<RewardBundle, ConfigurationError> {
    let size = match section.size.as_deref() {
        Some(size) => size.parse::<SizeTag>()?,
        None => SizeTag::Small,
    };

    let mut rewards = Vec::new();
    for (material, amount) in &section.items {
        rewards.push(Reward::Item(ItemGrant::new(material.parse()?, amount.amount)));
    }
    for command in &section.commands {
        rewards.push(console_command(command, context)?);
    }
    for reward in &section.rewards {
        rewards.push(build_reward(reward, context)?);
    }

    Ok(RewardBundle::new(size, rewards))
}

fn build_reward(raw: &RawReward, context: &str) -> Result<Reward, ConfigurationError> {
    match raw {
        RawReward::Item { material, amount } => {
            Ok(Reward::Item(ItemGrant::new(material.parse()?, *amount)))
        }
        RawReward::Command { command } => console_command(command, context),
        RawReward::PlayerCommand {
            command,
            java,
            bedrock,
        } => {
            let mut entries = match command {
                Some(command) => PlayerCommandReward::parse(command)?.entries,
                None => Vec::new(),
            };
            for (platform, command) in [
                (ClientPlatform::Java, java),
                (ClientPlatform::Bedrock, bedrock),
            ] {
                let Some(command) = command else {
                    continue;
                };
                let command = command.trim();
                if command.is_empty() {
                    return Err(ConfigurationError::empty_command(format!(
                        "{} {} command",
                        context, platform
                    )));
                }
                entries.push(PlatformCommand {
                    platform: Some(platform),
                    command: command.to_string(),
                });
            }
            if entries.is_empty() {
                return Err(ConfigurationError::empty_command(format!(
                    "{} player command",
                    context
                )));
            }
            Ok(Reward::PlayerCommand(PlayerCommandReward { entries }))
        }
    }
}

fn console_command(command: &str, context: &str) -> Result<Reward, ConfigurationError> {
    let command = command.trim();
    if command.is_empty() {
        return Err(ConfigurationError::empty_command(context));
    }
    Ok(Reward::Command(CommandReward {
        command: command.to_string(),
    }))
}

fn build_tier(key: String, tier: RawTierSection) -> Result<HourlyBonusTier, ConfigurationError> {
    let valid_key = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.'));
    if !valid_key {
        return Err(ConfigurationError::invalid_permission_key(key));
    }
    if !tier.multiplier.is_finite() || tier.multiplier < 0.0 {
        return Err(ConfigurationError::InvalidMultiplier {
            tier: key,
            value: tier.multiplier,
        });
    }

    let bundle = build_bundle(&tier.bundle, &format!("hourly-bonus tier {key}"))?;
    Ok(HourlyBonusTier {
        key,
        multiplier: tier.multiplier,
        bundle,
    })
}

fn build_goal(
    kind: GoalKind,
    section: Option<RawGoalSection>,
) -> Result<Option<BundleGoalClaimer>, ConfigurationError> {
    let Some(section) = section else {
        return Ok(None);
    };
    if !section.enabled {
        return Ok(None);
    }
    let bundle = build_bundle(&section.bundle, kind.label())?;
    Ok(Some(BundleGoalClaimer::new(kind, section.refresh_time, bundle)))
}

/// Where reloads read the configuration from.
#[derive(Resource, Debug, Clone)]
pub struct RewardConfigSource {
    pub path: PathBuf,
}

impl Default for RewardConfigSource {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }
}
