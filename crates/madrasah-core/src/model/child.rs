//! Child learner profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A learner profile.
///
/// The three engine components are the only writers of the counters here.
/// `total_xp` is monotonically non-decreasing and `longest_streak >=
/// current_streak` holds after every update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Consecutive-day completion streak. Reset to 1 on a gapped completion,
    /// to 0 only by the foreground expiry check.
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_xp: u32,
    /// Distinct lessons completed at least once.
    pub total_lessons_completed: u32,
    /// Timestamp of the most recent completion that counted for the streak.
    pub last_lesson_completed_date: Option<DateTime<Utc>>,
}

impl Child {
    /// Create a fresh profile with zeroed counters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
            current_streak: 0,
            longest_streak: 0,
            total_xp: 0,
            total_lessons_completed: 0,
            last_lesson_completed_date: None,
        }
    }
}
