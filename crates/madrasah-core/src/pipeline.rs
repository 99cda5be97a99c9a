//! Lesson-completion pipeline.
//!
//! One completion event runs, in order: progress finalization, child
//! counters, streak update (with milestones), time-of-day badges, and the
//! full achievement sweep. Each step observes the previous step's writes --
//! the sweep sees the already-updated streak and XP. The ordering lives here,
//! explicitly, instead of being implied by three services mutating a shared
//! aggregate.
//!
//! Callers must not process two completion events for the same child
//! concurrently. The store's single connection makes this the natural mode.

use chrono::{DateTime, Local};
use uuid::Uuid;

use crate::achievement::AchievementEngine;
use crate::error::{CoreError, Result};
use crate::events::EngineEvent;
use crate::model::{Achievement, Child, LessonProgress};
use crate::progress::ProgressTracker;
use crate::storage::ProgressStore;
use crate::streak::StreakEngine;

/// Everything a completion event produced: the updated aggregate, the
/// finalized progress row, and an ordered celebration queue.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub child: Child,
    pub progress: LessonProgress,
    /// Milestones first, then time-of-day badges, then the sweep, in unlock
    /// order.
    pub events: Vec<EngineEvent>,
}

/// Run the full completion pipeline for one lesson attempt.
///
/// # Errors
/// `ChildNotFound` when the profile does not exist, `LessonNotFound` when
/// completion arrives before any phase was saved, and `SaveFailed` when a
/// write is rejected. A failed write leaves the in-memory child mutated; the
/// store catches up on the next successful save.
pub fn apply_lesson_completion(
    store: &ProgressStore,
    child_id: Uuid,
    lesson_id: Uuid,
    score: u32,
    xp_earned: u32,
) -> Result<CompletionOutcome> {
    apply_lesson_completion_at(store, child_id, lesson_id, score, xp_earned, Local::now())
}

pub fn apply_lesson_completion_at(
    store: &ProgressStore,
    child_id: Uuid,
    lesson_id: Uuid,
    score: u32,
    xp_earned: u32,
    now: DateTime<Local>,
) -> Result<CompletionOutcome> {
    let mut child = store
        .child(child_id)?
        .ok_or(CoreError::ChildNotFound(child_id))?;

    let tracker = ProgressTracker::new(store);
    let streaks = StreakEngine::new(store);
    let achievements = AchievementEngine::new(store);

    // 1. Finalize the attempt.
    let record = tracker.mark_lesson_complete_at(
        lesson_id,
        child_id,
        score,
        xp_earned,
        now.with_timezone(&chrono::Utc),
    )?;

    // 2. Child counters. XP is earned per attempt; the lesson count only
    //    moves on a first completion.
    child.total_xp += xp_earned;
    if record.first_completion {
        child.total_lessons_completed += 1;
    }
    store.save_child(&child)?;

    // 3. Streak, then milestones.
    let mut events = streaks.update_streak_for_completion_at(&mut child, now)?;

    // 4. Opportunistic time-of-day badges, inline.
    let time_of_day = achievements.check_time_of_day_at(&mut child, now)?;
    events.extend(unlock_events(&time_of_day));

    // 5. General sweep over all families.
    let swept = achievements.check_and_unlock_at(&mut child, now)?;
    events.extend(unlock_events(&swept));

    Ok(CompletionOutcome {
        progress: record.progress,
        child,
        events,
    })
}

fn unlock_events(records: &[Achievement]) -> Vec<EngineEvent> {
    records
        .iter()
        .map(|a| EngineEvent::AchievementUnlocked {
            achievement_type: a.achievement_type,
            xp_reward: a.achievement_type.meta().xp_reward,
            at: a.unlocked_at,
        })
        .collect()
}
