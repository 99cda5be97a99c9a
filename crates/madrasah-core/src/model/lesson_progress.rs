//! Per-child, per-lesson progress records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Progress through a single lesson for a single child.
///
/// Created lazily the first time a phase is saved. Invariant: a completed
/// record never carries a resume marker (`is_completed == true` implies
/// `last_completed_phase == None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonProgress {
    pub lesson_id: Uuid,
    pub child_id: Uuid,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    /// Best score across all attempts, 0-100.
    pub score: u32,
    /// Best XP across all attempts.
    pub xp_earned: u32,
    /// Number of finalized attempts.
    pub attempts: u32,
    /// Resume marker: name of the last phase the child finished mid-lesson.
    pub last_completed_phase: Option<String>,
    /// Append-only map of phase name to the time it was last reached.
    pub phase_progress: BTreeMap<String, DateTime<Utc>>,
    pub last_accessed_at: DateTime<Utc>,
}

impl LessonProgress {
    /// Fresh record for a first phase save.
    pub fn new(lesson_id: Uuid, child_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            lesson_id,
            child_id,
            is_completed: false,
            completed_at: None,
            score: 0,
            xp_earned: 0,
            attempts: 0,
            last_completed_phase: None,
            phase_progress: BTreeMap::new(),
            last_accessed_at: now,
        }
    }
}
