//! Playtime goal claimers consulted on every minute milestone.
use std::fmt;

use bevy::prelude::*;

use crate::rewards::{
    delivery::{Recipient, RewardSink},
    types::RewardBundle,
};

/// Which goal module a claimer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoalKind {
    Daily,
    Global,
}

impl GoalKind {
    pub const fn label(&self) -> &'static str {
        match self {
            GoalKind::Daily => "playtime-daily-goals",
            GoalKind::Global => "playtime-global-goals",
        }
    }
}

impl fmt::Display for GoalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A goal module that fires every `refresh_minutes` of accrued playtime.
pub trait GoalClaimer: Send + Sync + 'static {
    /// Zero disables the claimer.
    fn refresh_minutes(&self) -> u64;

    fn claim(&self, recipient: &Recipient<'_>, sink: &dyn RewardSink);

    /// True when `global_minutes` lands on a refresh boundary.
    fn is_due(&self, global_minutes: u32) -> bool {
        let refresh = self.refresh_minutes();
        refresh > 0 && u64::from(global_minutes) % refresh == 0
    }
}

/// Goal claimer built from a config section; delivers a fixed bundle.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleGoalClaimer {
    kind: GoalKind,
    refresh_minutes: u64,
    bundle: RewardBundle,
}

impl BundleGoalClaimer {
    pub fn new(kind: GoalKind, refresh_minutes: u64, bundle: RewardBundle) -> Self {
        Self {
            kind,
            refresh_minutes,
            bundle,
        }
    }

    pub fn kind(&self) -> GoalKind {
        self.kind
    }

    pub fn bundle(&self) -> &RewardBundle {
        &self.bundle
    }
}

impl GoalClaimer for BundleGoalClaimer {
    fn refresh_minutes(&self) -> u64 {
        self.refresh_minutes
    }

    fn claim(&self, recipient: &Recipient<'_>, sink: &dyn RewardSink) {
        info!(
            target: "scheduler",
            "{} goal reached by {} ({})",
            self.kind, recipient.name, recipient.id
        );
        self.bundle.deliver(recipient, sink);
    }
}

/// One goal module slot. Injected claimers survive config reloads.
#[derive(Default)]
struct GoalSlot {
    claimer: Option<Box<dyn GoalClaimer>>,
    injected: bool,
}

impl GoalSlot {
    fn injected(claimer: Option<Box<dyn GoalClaimer>>) -> Self {
        Self {
            injected: claimer.is_some(),
            claimer,
        }
    }

    fn from_config(claimer: Option<BundleGoalClaimer>) -> Self {
        Self {
            claimer: claimer.map(|claimer| Box::new(claimer) as Box<dyn GoalClaimer>),
            injected: false,
        }
    }

    fn refresh_from_config(&mut self, claimer: Option<BundleGoalClaimer>) {
        if !self.injected {
            *self = Self::from_config(claimer);
        }
    }
}

/// Optional daily and global goal modules; an empty slot means the module is not installed.
#[derive(Resource, Default)]
pub struct GoalClaimers {
    daily: GoalSlot,
    global: GoalSlot,
}

impl GoalClaimers {
    /// Claimers supplied in code; a `Some` slot is kept across config reloads.
    pub fn new(
        daily: Option<Box<dyn GoalClaimer>>,
        global: Option<Box<dyn GoalClaimer>>,
    ) -> Self {
        Self {
            daily: GoalSlot::injected(daily),
            global: GoalSlot::injected(global),
        }
    }

    /// Installs the claimers described by the config.
    pub fn from_bundles(daily: Option<BundleGoalClaimer>, global: Option<BundleGoalClaimer>) -> Self {
        Self {
            daily: GoalSlot::from_config(daily),
            global: GoalSlot::from_config(global),
        }
    }

    /// Replaces config-built claimers, leaving injected ones in place.
    pub fn apply_config(&mut self, daily: Option<BundleGoalClaimer>, global: Option<BundleGoalClaimer>) {
        self.daily.refresh_from_config(daily);
        self.global.refresh_from_config(global);
    }

    pub fn inject(&mut self, kind: GoalKind, claimer: Box<dyn GoalClaimer>) {
        let slot = match kind {
            GoalKind::Daily => &mut self.daily,
            GoalKind::Global => &mut self.global,
        };
        *slot = GoalSlot::injected(Some(claimer));
    }

    pub fn daily(&self) -> Option<&dyn GoalClaimer> {
        self.daily.claimer.as_deref()
    }

    pub fn global(&self) -> Option<&dyn GoalClaimer> {
        self.global.claimer.as_deref()
    }

    pub fn is_injected(&self, kind: GoalKind) -> bool {
        match kind {
            GoalKind::Daily => self.daily.injected,
            GoalKind::Global => self.global.injected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        playtime::components::{ClientPlatform, SubjectId},
        rewards::{
            delivery::{CommandSender, RecordingSink, SinkCall},
            types::{CommandReward, Reward, SizeTag},
        },
    };

    fn claimer(refresh: u64) -> BundleGoalClaimer {
        BundleGoalClaimer::new(
            GoalKind::Daily,
            refresh,
            RewardBundle::new(
                SizeTag::Small,
                vec![Reward::Command(CommandReward {
                    command: "eco give %user% 5".to_string(),
                })],
            ),
        )
    }

    #[test]
    fn due_only_on_refresh_boundaries() {
        let goal = claimer(60);
        assert!(goal.is_due(60));
        assert!(goal.is_due(180));
        assert!(!goal.is_due(90));
        assert!(!claimer(0).is_due(60));
    }

    #[test]
    fn config_refresh_keeps_injected_slots() {
        let mut goals = GoalClaimers::from_bundles(Some(claimer(30)), None);
        goals.inject(GoalKind::Global, Box::new(claimer(7)));

        goals.apply_config(Some(claimer(45)), Some(claimer(90)));

        assert_eq!(goals.daily().map(|goal| goal.refresh_minutes()), Some(45));
        assert_eq!(goals.global().map(|goal| goal.refresh_minutes()), Some(7));
        assert!(goals.is_injected(GoalKind::Global));
        assert!(!goals.is_injected(GoalKind::Daily));

        goals.apply_config(None, None);
        assert!(goals.daily().is_none());
        assert!(goals.global().is_some());
    }

    #[test]
    fn claim_delivers_bundle() {
        let sink = RecordingSink::default();
        let recipient = Recipient::new(SubjectId::new(4), "Alex", ClientPlatform::Java);

        claimer(30).claim(&recipient, &sink);

        assert_eq!(
            sink.calls(),
            vec![SinkCall::Command {
                subject: SubjectId::new(4),
                sender: CommandSender::Console,
                command: "eco give Alex 5".to_string(),
            }]
        );
    }
}
