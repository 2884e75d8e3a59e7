//! Error types surfaced while building or querying the reward catalog.
use std::fmt;

/// Everything that can be wrong with a rewards configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    Read { path: String, message: String },
    Parse { message: String },
    MissingRewardsSection,
    InvalidDayKey { key: String },
    InvalidSize { value: String },
    InvalidMaterial { value: String },
    InvalidPermissionKey { key: String },
    InvalidMultiplier { tier: String, value: f64 },
    EmptyCommand { context: String },
    NoDefaultBundle { day: u32 },
}

impl ConfigurationError {
    pub fn read(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Read {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn invalid_day_key(key: impl Into<String>) -> Self {
        Self::InvalidDayKey { key: key.into() }
    }

    pub fn invalid_size(value: impl Into<String>) -> Self {
        Self::InvalidSize {
            value: value.into(),
        }
    }

    pub fn invalid_material(value: impl Into<String>) -> Self {
        Self::InvalidMaterial {
            value: value.into(),
        }
    }

    pub fn invalid_permission_key(key: impl Into<String>) -> Self {
        Self::InvalidPermissionKey { key: key.into() }
    }

    pub fn empty_command(context: impl Into<String>) -> Self {
        Self::EmptyCommand {
            context: context.into(),
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => write!(f, "unable to read {}: {}", path, message),
            Self::Parse { message } => write!(f, "invalid rewards config: {}", message),
            Self::MissingRewardsSection => {
                write!(f, "config defines neither 'reward-days' nor 'rewards'")
            }
            Self::InvalidDayKey { key } => write!(f, "'{}' is not a valid day number", key),
            Self::InvalidSize { value } => write!(f, "unknown reward size '{}'", value),
            Self::InvalidMaterial { value } => write!(f, "invalid item material '{}'", value),
            Self::InvalidPermissionKey { key } => {
                write!(f, "invalid hourly-bonus permission key '{}'", key)
            }
            Self::InvalidMultiplier { tier, value } => {
                write!(f, "hourly-bonus tier '{}' has invalid multiplier {}", tier, value)
            }
            Self::EmptyCommand { context } => write!(f, "empty command in {}", context),
            Self::NoDefaultBundle { day } => write!(
                f,
                "no reward bundle matches day {} and no 'default' bundle is configured",
                day
            ),
        }
    }
}

impl std::error::Error for ConfigurationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_value() {
        let err = ConfigurationError::invalid_size("huge");
        assert!(err.to_string().contains("huge"));

        let err = ConfigurationError::InvalidMultiplier {
            tier: "vip".into(),
            value: -2.0,
        };
        assert!(err.to_string().contains("vip"));

        let err = ConfigurationError::NoDefaultBundle { day: 9 };
        assert!(err.to_string().contains("day 9"));
    }
}
