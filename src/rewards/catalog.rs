//! Reward lookup tables: day-indexed bundles and permission-tier bonuses.
use std::collections::{BTreeMap, HashSet};

use bevy::prelude::*;

use super::{
    errors::ConfigurationError,
    types::{RewardBundle, SizeTag},
};

/// Permission prefix a subject needs to hold an hourly-bonus tier.
pub const BONUS_PERMISSION_PREFIX: &str = "activityrewarder.bonus.";

/// Cycle length used to wrap day numbers past the explicit table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopLength {
    #[default]
    NoLoop,
    Days(u32),
}

impl LoopLength {
    /// Non-positive values mean "no looping".
    pub fn from_config(value: i64) -> Self {
        if value > 0 {
            Self::Days(u32::try_from(value).unwrap_or(u32::MAX))
        } else {
            Self::NoLoop
        }
    }

    pub fn wrap(self, day: u32) -> Option<u32> {
        match self {
            Self::NoLoop => None,
            Self::Days(length) => Some(day % length),
        }
    }
}

/// Day number to bundle mapping with an optional fallback bundle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewardTable {
    days: BTreeMap<u32, RewardBundle>,
    default_bundle: Option<RewardBundle>,
}

impl RewardTable {
    pub fn new(days: BTreeMap<u32, RewardBundle>, default_bundle: Option<RewardBundle>) -> Self {
        Self {
            days,
            default_bundle,
        }
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn default_bundle(&self) -> Option<&RewardBundle> {
        self.default_bundle.as_ref()
    }
}

/// One configured permission tier.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyBonusTier {
    pub key: String,
    pub multiplier: f64,
    pub bundle: RewardBundle,
}

impl HourlyBonusTier {
    pub fn permission(&self) -> String {
        format!("{}{}", BONUS_PERMISSION_PREFIX, self.key)
    }
}

/// Tiers in configuration order; order only matters for multiplier ties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlyBonusTable {
    tiers: Vec<HourlyBonusTier>,
}

impl HourlyBonusTable {
    pub fn new(tiers: Vec<HourlyBonusTier>) -> Self {
        Self { tiers }
    }

    pub fn tiers(&self) -> &[HourlyBonusTier] {
        &self.tiers
    }
}

/// Winning tier bundle together with the multiplier the caller should apply.
#[derive(Debug, Clone, Copy)]
pub struct TierBonus<'a> {
    pub tier: &'a str,
    pub multiplier: f64,
    pub bundle: &'a RewardBundle,
}

impl TierBonus<'_> {
    pub fn scaled_bundle(&self) -> RewardBundle {
        self.bundle.scaled(self.multiplier)
    }
}

/// Read-only catalog rebuilt as a whole on every configuration reload.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct RewardCatalog {
    table: RewardTable,
    loop_length: LoopLength,
    hourly_bonus: Option<HourlyBonusTable>,
}

impl RewardCatalog {
    pub fn new(
        table: RewardTable,
        loop_length: LoopLength,
        hourly_bonus: Option<HourlyBonusTable>,
    ) -> Self {
        Self {
            table,
            loop_length,
            hourly_bonus,
        }
    }

    pub fn table(&self) -> &RewardTable {
        &self.table
    }

    pub fn loop_length(&self) -> LoopLength {
        self.loop_length
    }

    pub fn hourly_bonus(&self) -> Option<&HourlyBonusTable> {
        self.hourly_bonus.as_ref()
    }

    /// Exact day, then the looped day, then the default bundle.
    pub fn resolve_by_day(&self, day: u32) -> Result<&RewardBundle, ConfigurationError> {
        if let Some(bundle) = self.table.days.get(&day) {
            return Ok(bundle);
        }

        if let Some(bundle) = self
            .loop_length
            .wrap(day)
            .and_then(|looped| self.table.days.get(&looped))
        {
            return Ok(bundle);
        }

        self.table
            .default_bundle
            .as_ref()
            .ok_or(ConfigurationError::NoDefaultBundle { day })
    }

    /// Highest strict multiplier among the held tiers; the first tier wins a tie.
    pub fn resolve_by_permission_tier(&self, held_tiers: &HashSet<String>) -> Option<TierBonus<'_>> {
        let table = self.hourly_bonus.as_ref()?;
        let mut best: Option<&HourlyBonusTier> = None;
        for tier in &table.tiers {
            if !held_tiers.contains(&tier.key) {
                continue;
            }
            if best.map_or(true, |current| tier.multiplier > current.multiplier) {
                best = Some(tier);
            }
        }

        best.map(|tier| TierBonus {
            tier: &tier.key,
            multiplier: tier.multiplier,
            bundle: &tier.bundle,
        })
    }

    /// Tier keys unlocked by a subject's raw permission nodes.
    pub fn held_tiers<'a>(&self, permissions: impl IntoIterator<Item = &'a str>) -> HashSet<String> {
        permissions
            .into_iter()
            .filter_map(|permission| permission.strip_prefix(BONUS_PERMISSION_PREFIX))
            .map(str::to_string)
            .collect()
    }

    /// First configured day after `from_day` whose bundle has the given size.
    pub fn find_next_day_with_size(&self, from_day: u32, size: SizeTag) -> Option<u32> {
        let first = from_day.checked_add(1)?;
        // BTreeMap keys iterate in ascending order.
        self.table
            .days
            .range(first..)
            .map(|(day, _)| *day)
            .find(|day| {
                self.resolve_by_day(*day)
                    .map_or(false, |bundle| bundle.size() == size)
            })
    }
}
