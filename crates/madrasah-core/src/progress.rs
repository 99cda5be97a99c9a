//! Lesson progress tracking: phase-level saves, resume lookup, finalization.
//!
//! The tracker knows *where the child stopped*, never *what comes next* --
//! computing the next phase to resume into is the caller's job.
//!
//! Scores and XP are retained best-of-all-attempts, so repeating a lesson can
//! never lower a child's result.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{CoreError, Result};
use crate::model::LessonProgress;
use crate::storage::ProgressStore;

/// Outcome of finalizing a lesson attempt.
#[derive(Debug, Clone)]
pub struct CompletionRecord {
    pub progress: LessonProgress,
    /// True when this attempt completed the lesson for the first time.
    /// Drives the child's `total_lessons_completed` counter.
    pub first_completion: bool,
}

/// Records incremental progress within a lesson and supports safe resumption.
///
/// Explicitly constructed per session; borrows the store it persists through.
pub struct ProgressTracker<'a> {
    store: &'a ProgressStore,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(store: &'a ProgressStore) -> Self {
        Self { store }
    }

    /// Record that `phase` was just finished within the lesson.
    ///
    /// Finds or creates the progress row, sets the resume marker, and upserts
    /// `phase -> now` into the phase history. Re-saving the same phase updates
    /// its timestamp without duplicating the key.
    ///
    /// # Errors
    /// `SaveFailed` if the store rejects the write; never retried here.
    pub fn save_phase_progress(
        &self,
        lesson_id: Uuid,
        child_id: Uuid,
        phase: &str,
    ) -> Result<LessonProgress> {
        self.save_phase_progress_at(lesson_id, child_id, phase, Utc::now())
    }

    pub fn save_phase_progress_at(
        &self,
        lesson_id: Uuid,
        child_id: Uuid,
        phase: &str,
        now: DateTime<Utc>,
    ) -> Result<LessonProgress> {
        let mut progress = self
            .store
            .progress(child_id, lesson_id)?
            .unwrap_or_else(|| LessonProgress::new(lesson_id, child_id, now));

        progress.last_completed_phase = Some(phase.to_string());
        progress.phase_progress.insert(phase.to_string(), now);
        progress.last_accessed_at = now;

        self.store.save_progress(&progress)?;
        Ok(progress)
    }

    /// Where the child stopped, if anywhere.
    ///
    /// Returns `None` when no row exists, when the lesson is already
    /// completed, or when no phase marker is set.
    pub fn load_partial_progress(&self, lesson_id: Uuid, child_id: Uuid) -> Result<Option<String>> {
        let progress = self.store.progress(child_id, lesson_id)?;
        Ok(progress.and_then(|p| {
            if p.is_completed {
                None
            } else {
                p.last_completed_phase
            }
        }))
    }

    /// Finalize a lesson attempt.
    ///
    /// Requires an existing progress row: completion without any prior phase
    /// save is a caller bug surfaced as `LessonNotFound`. Retains the best
    /// score and XP across attempts, bumps the attempt count, and clears the
    /// resume marker (a completed lesson never carries one). The phase
    /// history is preserved.
    pub fn mark_lesson_complete(
        &self,
        lesson_id: Uuid,
        child_id: Uuid,
        score: u32,
        xp_earned: u32,
    ) -> Result<CompletionRecord> {
        self.mark_lesson_complete_at(lesson_id, child_id, score, xp_earned, Utc::now())
    }

    pub fn mark_lesson_complete_at(
        &self,
        lesson_id: Uuid,
        child_id: Uuid,
        score: u32,
        xp_earned: u32,
        now: DateTime<Utc>,
    ) -> Result<CompletionRecord> {
        let mut progress = self
            .store
            .progress(child_id, lesson_id)?
            .ok_or(CoreError::LessonNotFound {
                lesson_id,
                child_id,
            })?;

        let first_completion = !progress.is_completed;
        progress.is_completed = true;
        progress.completed_at = Some(now);
        progress.score = progress.score.max(score.min(100));
        progress.xp_earned = progress.xp_earned.max(xp_earned);
        progress.attempts += 1;
        progress.last_completed_phase = None;
        progress.last_accessed_at = now;

        self.store.save_progress(&progress)?;
        Ok(CompletionRecord {
            progress,
            first_completion,
        })
    }

    /// Explicit "restart lesson": drop the resume marker and phase history.
    /// No-op when no row exists.
    pub fn clear_partial_progress(&self, lesson_id: Uuid, child_id: Uuid) -> Result<()> {
        let Some(mut progress) = self.store.progress(child_id, lesson_id)? else {
            return Ok(());
        };
        progress.last_completed_phase = None;
        progress.phase_progress.clear();
        progress.last_accessed_at = Utc::now();
        self.store.save_progress(&progress)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Child;
    use chrono::Duration;

    fn setup() -> (ProgressStore, Uuid, Uuid) {
        let store = ProgressStore::open_memory().unwrap();
        let child = Child::new("Amina");
        store.save_child(&child).unwrap();
        (store, child.id, Uuid::new_v4())
    }

    #[test]
    fn first_phase_save_creates_row() {
        let (store, child_id, lesson_id) = setup();
        let tracker = ProgressTracker::new(&store);

        let progress = tracker
            .save_phase_progress(lesson_id, child_id, "hook")
            .unwrap();
        assert_eq!(progress.last_completed_phase.as_deref(), Some("hook"));
        assert_eq!(progress.phase_progress.len(), 1);
        assert!(!progress.is_completed);
    }

    #[test]
    fn resaving_a_phase_updates_timestamp_without_duplicating() {
        let (store, child_id, lesson_id) = setup();
        let tracker = ProgressTracker::new(&store);
        let t0 = Utc::now();
        let t1 = t0 + Duration::minutes(5);

        tracker
            .save_phase_progress_at(lesson_id, child_id, "teach", t0)
            .unwrap();
        let progress = tracker
            .save_phase_progress_at(lesson_id, child_id, "teach", t1)
            .unwrap();

        assert_eq!(progress.phase_progress.len(), 1);
        assert_eq!(progress.phase_progress["teach"], t1);
    }

    #[test]
    fn load_partial_progress_returns_resume_point() {
        let (store, child_id, lesson_id) = setup();
        let tracker = ProgressTracker::new(&store);

        assert!(tracker
            .load_partial_progress(lesson_id, child_id)
            .unwrap()
            .is_none());

        tracker
            .save_phase_progress(lesson_id, child_id, "practice")
            .unwrap();
        assert_eq!(
            tracker
                .load_partial_progress(lesson_id, child_id)
                .unwrap()
                .as_deref(),
            Some("practice")
        );
    }

    #[test]
    fn completed_lesson_has_no_resume_point() {
        let (store, child_id, lesson_id) = setup();
        let tracker = ProgressTracker::new(&store);

        tracker
            .save_phase_progress(lesson_id, child_id, "reward")
            .unwrap();
        tracker
            .mark_lesson_complete(lesson_id, child_id, 80, 50)
            .unwrap();
        assert!(tracker
            .load_partial_progress(lesson_id, child_id)
            .unwrap()
            .is_none());
    }

    #[test]
    fn complete_without_phase_save_is_an_error() {
        let (store, child_id, lesson_id) = setup();
        let tracker = ProgressTracker::new(&store);

        let err = tracker
            .mark_lesson_complete(lesson_id, child_id, 80, 50)
            .unwrap_err();
        assert!(matches!(err, CoreError::LessonNotFound { .. }));
    }

    #[test]
    fn completion_clears_marker_and_preserves_history() {
        let (store, child_id, lesson_id) = setup();
        let tracker = ProgressTracker::new(&store);

        tracker
            .save_phase_progress(lesson_id, child_id, "hook")
            .unwrap();
        tracker
            .save_phase_progress(lesson_id, child_id, "teach")
            .unwrap();
        let record = tracker
            .mark_lesson_complete(lesson_id, child_id, 90, 60)
            .unwrap();

        assert!(record.progress.is_completed);
        assert!(record.progress.last_completed_phase.is_none());
        assert_eq!(record.progress.phase_progress.len(), 2);
        assert!(record.first_completion);
    }

    #[test]
    fn best_of_retention_in_both_orders() {
        let (store, child_id, lesson_id) = setup();
        let tracker = ProgressTracker::new(&store);

        tracker
            .save_phase_progress(lesson_id, child_id, "hook")
            .unwrap();
        tracker
            .mark_lesson_complete(lesson_id, child_id, 60, 30)
            .unwrap();
        let record = tracker
            .mark_lesson_complete(lesson_id, child_id, 90, 55)
            .unwrap();
        assert_eq!(record.progress.score, 90);
        assert_eq!(record.progress.xp_earned, 55);
        assert!(!record.first_completion);

        // Lower follow-up attempt never punishes the learner.
        let record = tracker
            .mark_lesson_complete(lesson_id, child_id, 40, 10)
            .unwrap();
        assert_eq!(record.progress.score, 90);
        assert_eq!(record.progress.xp_earned, 55);
        assert_eq!(record.progress.attempts, 3);
    }

    #[test]
    fn score_is_clamped_to_100() {
        let (store, child_id, lesson_id) = setup();
        let tracker = ProgressTracker::new(&store);

        tracker
            .save_phase_progress(lesson_id, child_id, "hook")
            .unwrap();
        let record = tracker
            .mark_lesson_complete(lesson_id, child_id, 250, 30)
            .unwrap();
        assert_eq!(record.progress.score, 100);
    }

    #[test]
    fn clear_partial_progress_resets_markers() {
        let (store, child_id, lesson_id) = setup();
        let tracker = ProgressTracker::new(&store);

        tracker
            .save_phase_progress(lesson_id, child_id, "hook")
            .unwrap();
        tracker.clear_partial_progress(lesson_id, child_id).unwrap();

        let progress = store.progress(child_id, lesson_id).unwrap().unwrap();
        assert!(progress.last_completed_phase.is_none());
        assert!(progress.phase_progress.is_empty());
    }

    #[test]
    fn clear_partial_progress_is_noop_without_row() {
        let (store, child_id, lesson_id) = setup();
        let tracker = ProgressTracker::new(&store);
        tracker.clear_partial_progress(lesson_id, child_id).unwrap();
        assert!(store.progress(child_id, lesson_id).unwrap().is_none());
    }
}
