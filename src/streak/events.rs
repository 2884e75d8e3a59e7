//! Daily claim requests and their outcomes.
use bevy::prelude::Message;

use crate::playtime::components::SubjectId;

/// Host request to collect today's streak reward (e.g. from the reward menu).
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimDailyReward {
    pub subject: SubjectId,
}

/// Written after a daily reward was delivered and the record saved.
#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct DailyRewardClaimed {
    pub subject: SubjectId,
    pub day: u32,
    pub bonus_tier: Option<String>,
}
