//! Reward values: sizes, materials, individual rewards and bundles.
use std::{fmt, str::FromStr};

use crate::playtime::components::ClientPlatform;

use super::{
    delivery::{CommandSender, Recipient, RewardSink},
    errors::ConfigurationError,
};

const USER_PLACEHOLDER: &str = "%user%";

/// Size classifier attached to every bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SizeTag {
    Small,
    Medium,
    Large,
}

impl SizeTag {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl FromStr for SizeTag {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            _ => Err(ConfigurationError::invalid_size(value)),
        }
    }
}

impl fmt::Display for SizeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Namespaced item identifier, normalised to lower case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Material(String);

impl Material {
    /// Built-in identifiers that are known to be well formed.
    pub(crate) fn from_static(id: &'static str) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Material {
    type Err = ConfigurationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_ascii_lowercase();
        let (namespace, path) = match normalised.split_once(':') {
            Some((namespace, path)) => (Some(namespace), path),
            None => (None, normalised.as_str()),
        };

        let valid_namespace = namespace.map_or(true, |namespace| {
            !namespace.is_empty()
                && namespace
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.'))
        });
        let valid_path = !path.is_empty()
            && path
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '-' | '.' | '/'));

        if valid_namespace && valid_path {
            Ok(Self(normalised))
        } else {
            Err(ConfigurationError::invalid_material(value))
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stack of items handed to the recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemGrant {
    pub material: Material,
    pub amount: u32,
}

impl ItemGrant {
    pub fn new(material: Material, amount: u32) -> Self {
        Self {
            material,
            amount: amount.max(1),
        }
    }

    /// Applies a bonus multiplier to the stack size, never dropping below one item.
    pub fn scaled(&self, multiplier: f64) -> Self {
        let scaled = (f64::from(self.amount) * multiplier).floor();
        let amount = if scaled.is_finite() {
            scaled.clamp(1.0, f64::from(u32::MAX)) as u32
        } else {
            self.amount
        };
        Self {
            material: self.material.clone(),
            amount,
        }
    }
}

/// Console command run on behalf of the recipient.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandReward {
    pub command: String,
}

/// One command line of a player command, optionally restricted to a client platform.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformCommand {
    pub platform: Option<ClientPlatform>,
    pub command: String,
}

impl PlatformCommand {
    fn applies_to(&self, platform: ClientPlatform) -> bool {
        self.platform.map_or(true, |required| required == platform)
    }
}

/// Commands executed as the player, with per-platform variants.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerCommandReward {
    pub entries: Vec<PlatformCommand>,
}

impl PlayerCommandReward {
    /// Parses `java:cmd|bedrock:cmd|cmd` into platform-tagged entries.
    pub fn parse(raw: &str) -> Result<Self, ConfigurationError> {
        let mut entries = Vec::new();
        for part in raw.split('|') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let (platform, command) = if let Some(rest) = part.strip_prefix("java:") {
                (Some(ClientPlatform::Java), rest)
            } else if let Some(rest) = part.strip_prefix("bedrock:") {
                (Some(ClientPlatform::Bedrock), rest)
            } else {
                (None, part)
            };
            let command = command.trim();
            if command.is_empty() {
                return Err(ConfigurationError::empty_command(format!(
                    "player command '{}'",
                    raw
                )));
            }
            entries.push(PlatformCommand {
                platform,
                command: command.to_string(),
            });
        }

        if entries.is_empty() {
            return Err(ConfigurationError::empty_command("player command"));
        }
        Ok(Self { entries })
    }

    pub fn commands_for(&self, platform: ClientPlatform) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |entry| entry.applies_to(platform))
            .map(|entry| entry.command.as_str())
    }
}

/// Closed set of reward kinds, all delivered through [`Reward::deliver`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reward {
    Item(ItemGrant),
    Command(CommandReward),
    PlayerCommand(PlayerCommandReward),
}

impl Reward {
    pub fn deliver(&self, recipient: &Recipient<'_>, sink: &dyn RewardSink) {
        match self {
            Self::Item(item) => sink.give_item(recipient, item),
            Self::Command(reward) => {
                let command = expand_placeholders(&reward.command, recipient);
                sink.run_command(recipient, CommandSender::Console, &command);
            }
            Self::PlayerCommand(reward) => {
                for command in reward.commands_for(recipient.platform) {
                    let command = expand_placeholders(command, recipient);
                    sink.run_command(recipient, CommandSender::Player, &command);
                }
            }
        }
    }

    fn scaled(&self, multiplier: f64) -> Self {
        match self {
            Self::Item(item) => Self::Item(item.scaled(multiplier)),
            other => other.clone(),
        }
    }
}

fn expand_placeholders(command: &str, recipient: &Recipient<'_>) -> String {
    command.replace(USER_PLACEHOLDER, recipient.name)
}

/// Ordered rewards plus their size classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardBundle {
    size: SizeTag,
    rewards: Vec<Reward>,
}

impl RewardBundle {
    pub fn new(size: SizeTag, rewards: Vec<Reward>) -> Self {
        Self { size, rewards }
    }

    pub fn size(&self) -> SizeTag {
        self.size
    }

    pub fn rewards(&self) -> &[Reward] {
        &self.rewards
    }

    pub fn is_empty(&self) -> bool {
        self.rewards.is_empty()
    }

    /// Copy of the bundle with item quantities multiplied.
    pub fn scaled(&self, multiplier: f64) -> Self {
        Self {
            size: self.size,
            rewards: self
                .rewards
                .iter()
                .map(|reward| reward.scaled(multiplier))
                .collect(),
        }
    }

    pub fn deliver(&self, recipient: &Recipient<'_>, sink: &dyn RewardSink) {
        for reward in &self.rewards {
            reward.deliver(recipient, sink);
        }
    }
}
