//! Events emitted by the engines for the presentation layer.
//!
//! Delivered as return values from the operations that produce them, in
//! order, so the caller can drive a sequential celebration queue. There is
//! no broadcast bus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::AchievementType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EngineEvent {
    /// A streak milestone threshold was crossed exactly.
    MilestoneReached {
        days: u32,
        achievement_type: AchievementType,
        xp_reward: u32,
        at: DateTime<Utc>,
    },
    /// A badge unlocked, either inline (time-of-day) or in the sweep.
    AchievementUnlocked {
        achievement_type: AchievementType,
        xp_reward: u32,
        at: DateTime<Utc>,
    },
}
