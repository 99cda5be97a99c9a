//! Daily streak engine.
//!
//! A state machine over `(current_streak, last_lesson_completed_date)` driven
//! by two external triggers: lesson completion and the app-foreground check.
//! Day arithmetic is calendar-day arithmetic in local time; only the first
//! completion of a day counts.
//!
//! Milestones are awarded on exact-equality threshold crossings, strictly
//! after the new streak value has been persisted.

use chrono::{DateTime, Local, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::events::EngineEvent;
use crate::model::{Achievement, AchievementType, Child};
use crate::storage::ProgressStore;

/// A streak-length threshold with its badge and XP reward. Static rule table,
/// not persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakMilestone {
    pub days: u32,
    pub achievement_type: AchievementType,
    pub xp_reward: u32,
}

/// Milestone table, ascending by day count.
pub const MILESTONES: [StreakMilestone; 4] = [
    StreakMilestone {
        days: 3,
        achievement_type: AchievementType::Streak3,
        xp_reward: 30,
    },
    StreakMilestone {
        days: 7,
        achievement_type: AchievementType::Streak7,
        xp_reward: 100,
    },
    StreakMilestone {
        days: 30,
        achievement_type: AchievementType::Streak30,
        xp_reward: 500,
    },
    StreakMilestone {
        days: 100,
        achievement_type: AchievementType::Streak100,
        xp_reward: 2000,
    },
];

/// First milestone beyond the given streak, if any remain.
pub fn next_milestone(current_streak: u32) -> Option<&'static StreakMilestone> {
    MILESTONES.iter().find(|m| m.days > current_streak)
}

/// Whole hours left before the local day rolls over. Pure; clamped to >= 0.
pub fn hours_remaining_today(now: DateTime<Local>) -> u32 {
    let Some(next_midnight) = now
        .date_naive()
        .succ_opt()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return 0;
    };
    let seconds = (next_midnight - now.naive_local()).num_seconds();
    (seconds.max(0) / 3600) as u32
}

fn local_date(utc: DateTime<Utc>) -> NaiveDate {
    utc.with_timezone(&Local).date_naive()
}

/// Streak continuation, reset, and milestone awarding for one child.
pub struct StreakEngine<'a> {
    store: &'a ProgressStore,
}

impl<'a> StreakEngine<'a> {
    pub fn new(store: &'a ProgressStore) -> Self {
        Self { store }
    }

    /// Update the streak for a lesson completion happening at `now`.
    ///
    /// Same-local-day completions after the first are a no-op. A completion
    /// on the day after the last one continues the streak; any longer gap
    /// (or a first-ever completion) starts a fresh streak of 1. The streak
    /// value is persisted before milestones are evaluated.
    pub fn update_streak_for_completion(&self, child: &mut Child) -> Result<Vec<EngineEvent>> {
        self.update_streak_for_completion_at(child, Local::now())
    }

    pub fn update_streak_for_completion_at(
        &self,
        child: &mut Child,
        now: DateTime<Local>,
    ) -> Result<Vec<EngineEvent>> {
        let today = now.date_naive();

        match child.last_lesson_completed_date {
            Some(last) if local_date(last) == today => return Ok(Vec::new()),
            Some(last) => {
                let days_since = (today - local_date(last)).num_days();
                if days_since == 1 {
                    child.current_streak += 1;
                } else {
                    child.current_streak = 1;
                }
            }
            None => child.current_streak = 1,
        }

        child.longest_streak = child.longest_streak.max(child.current_streak);
        child.last_lesson_completed_date = Some(now.with_timezone(&Utc));
        self.store.save_child(child)?;

        self.check_and_award_milestones_at(child, now)
    }

    /// App-foreground check: zero the streak when a full day was missed.
    ///
    /// The only path that resets to 0 (completion gaps reset to 1). Returns
    /// whether a reset happened.
    pub fn check_and_reset_expired_streak(&self, child: &mut Child) -> Result<bool> {
        self.check_and_reset_expired_streak_at(child, Local::now())
    }

    pub fn check_and_reset_expired_streak_at(
        &self,
        child: &mut Child,
        now: DateTime<Local>,
    ) -> Result<bool> {
        let Some(last) = child.last_lesson_completed_date else {
            return Ok(false);
        };
        let days_since = (now.date_naive() - local_date(last)).num_days();
        if days_since > 1 && child.current_streak != 0 {
            child.current_streak = 0;
            self.store.save_child(child)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Award milestones whose day count the streak just reached exactly.
    ///
    /// Exact equality, never `>=`: the check runs right after an increment
    /// and must fire once per crossing. A streak that somehow skips a
    /// threshold silently does not award it.
    pub fn check_and_award_milestones_at(
        &self,
        child: &mut Child,
        now: DateTime<Local>,
    ) -> Result<Vec<EngineEvent>> {
        let unlocked = self.unlocked_types(child.id);
        let mut events = Vec::new();

        for milestone in MILESTONES
            .iter()
            .filter(|m| m.days == child.current_streak)
            .filter(|m| !unlocked.contains(&m.achievement_type))
        {
            let at = now.with_timezone(&Utc);
            self.store.save_achievement(&Achievement::unlock(
                child.id,
                milestone.achievement_type,
                at,
            ))?;
            child.total_xp += milestone.xp_reward;
            self.store.save_child(child)?;
            events.push(EngineEvent::MilestoneReached {
                days: milestone.days,
                achievement_type: milestone.achievement_type,
                xp_reward: milestone.xp_reward,
                at,
            });
        }
        Ok(events)
    }

    /// Fail-open read of the child's unlocked badge types. A transient read
    /// failure skips awarding for this pass; the unique constraint in the
    /// store still guarantees exactly-once.
    fn unlocked_types(&self, child_id: Uuid) -> Vec<AchievementType> {
        match self.store.achievements_for_child(child_id) {
            Ok(rows) => rows.into_iter().map(|a| a.achievement_type).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "achievement fetch failed; treating as none");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local(y: i32, m: u32, d: u32, h: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn setup() -> (ProgressStore, Child) {
        let store = ProgressStore::open_memory().unwrap();
        let child = Child::new("Amina");
        store.save_child(&child).unwrap();
        (store, child)
    }

    #[test]
    fn first_completion_starts_streak_of_one() {
        let (store, mut child) = setup();
        let engine = StreakEngine::new(&store);

        engine
            .update_streak_for_completion_at(&mut child, local(2026, 3, 2, 10))
            .unwrap();
        assert_eq!(child.current_streak, 1);
        assert_eq!(child.longest_streak, 1);
        assert!(child.last_lesson_completed_date.is_some());
    }

    #[test]
    fn consecutive_days_continue_the_streak() {
        let (store, mut child) = setup();
        let engine = StreakEngine::new(&store);

        engine
            .update_streak_for_completion_at(&mut child, local(2026, 3, 2, 10))
            .unwrap();
        engine
            .update_streak_for_completion_at(&mut child, local(2026, 3, 3, 9))
            .unwrap();
        assert_eq!(child.current_streak, 2);
        assert_eq!(child.longest_streak, 2);
    }

    #[test]
    fn second_completion_same_day_is_a_noop() {
        let (store, mut child) = setup();
        let engine = StreakEngine::new(&store);

        engine
            .update_streak_for_completion_at(&mut child, local(2026, 3, 2, 8))
            .unwrap();
        let before = child.clone();
        let events = engine
            .update_streak_for_completion_at(&mut child, local(2026, 3, 2, 20))
            .unwrap();
        assert_eq!(child, before);
        assert!(events.is_empty());
    }

    #[test]
    fn gap_resets_streak_to_one_not_zero() {
        let (store, mut child) = setup();
        let engine = StreakEngine::new(&store);

        engine
            .update_streak_for_completion_at(&mut child, local(2026, 3, 2, 10))
            .unwrap();
        engine
            .update_streak_for_completion_at(&mut child, local(2026, 3, 3, 10))
            .unwrap();
        // Skip March 4 entirely.
        engine
            .update_streak_for_completion_at(&mut child, local(2026, 3, 5, 10))
            .unwrap();
        assert_eq!(child.current_streak, 1);
        assert_eq!(child.longest_streak, 2);
    }

    #[test]
    fn foreground_check_zeroes_expired_streak() {
        let (store, mut child) = setup();
        let engine = StreakEngine::new(&store);

        engine
            .update_streak_for_completion_at(&mut child, local(2026, 3, 2, 10))
            .unwrap();
        let reset = engine
            .check_and_reset_expired_streak_at(&mut child, local(2026, 3, 4, 9))
            .unwrap();
        assert!(reset);
        assert_eq!(child.current_streak, 0);

        let stored = store.child(child.id).unwrap().unwrap();
        assert_eq!(stored.current_streak, 0);
    }

    #[test]
    fn foreground_check_tolerates_yesterday() {
        let (store, mut child) = setup();
        let engine = StreakEngine::new(&store);

        engine
            .update_streak_for_completion_at(&mut child, local(2026, 3, 2, 10))
            .unwrap();
        let reset = engine
            .check_and_reset_expired_streak_at(&mut child, local(2026, 3, 3, 23))
            .unwrap();
        assert!(!reset);
        assert_eq!(child.current_streak, 1);
    }

    #[test]
    fn foreground_check_without_history_is_a_noop() {
        let (store, mut child) = setup();
        let engine = StreakEngine::new(&store);
        assert!(!engine
            .check_and_reset_expired_streak_at(&mut child, local(2026, 3, 4, 9))
            .unwrap());
    }

    #[test]
    fn milestone_fires_exactly_at_threshold() {
        let (store, mut child) = setup();
        let engine = StreakEngine::new(&store);

        let mut all_events = Vec::new();
        for day in 2..=4 {
            all_events.extend(
                engine
                    .update_streak_for_completion_at(&mut child, local(2026, 3, day, 10))
                    .unwrap(),
            );
        }
        assert_eq!(child.current_streak, 3);
        assert_eq!(all_events.len(), 1);
        assert!(matches!(
            all_events[0],
            EngineEvent::MilestoneReached {
                days: 3,
                xp_reward: 30,
                ..
            }
        ));
        assert_eq!(child.total_xp, 30);
    }

    #[test]
    fn milestone_awards_only_once() {
        let (store, mut child) = setup();
        let engine = StreakEngine::new(&store);

        // Reach 3, lapse, reach 3 again.
        for day in 2..=4 {
            engine
                .update_streak_for_completion_at(&mut child, local(2026, 3, day, 10))
                .unwrap();
        }
        engine
            .update_streak_for_completion_at(&mut child, local(2026, 3, 10, 10))
            .unwrap();
        let mut events = Vec::new();
        for day in 11..=12 {
            events.extend(
                engine
                    .update_streak_for_completion_at(&mut child, local(2026, 3, day, 10))
                    .unwrap(),
            );
        }
        assert_eq!(child.current_streak, 3);
        assert!(events.is_empty());
        assert_eq!(child.total_xp, 30);
    }

    #[test]
    fn skipped_threshold_does_not_award() {
        let (store, mut child) = setup();
        let engine = StreakEngine::new(&store);

        // A streak value already past a threshold awards nothing.
        child.current_streak = 5;
        let events = engine
            .check_and_award_milestones_at(&mut child, local(2026, 3, 2, 10))
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn next_milestone_walks_the_table() {
        assert_eq!(next_milestone(0).unwrap().days, 3);
        assert_eq!(next_milestone(3).unwrap().days, 7);
        assert_eq!(next_milestone(29).unwrap().days, 30);
        assert_eq!(next_milestone(99).unwrap().days, 100);
        assert!(next_milestone(100).is_none());
    }

    #[test]
    fn hours_remaining_clamps_and_floors() {
        let now = local(2026, 3, 2, 21);
        assert_eq!(hours_remaining_today(now), 3);

        let almost_midnight = Local.with_ymd_and_hms(2026, 3, 2, 23, 30, 0).unwrap();
        assert_eq!(hours_remaining_today(almost_midnight), 0);
    }
}
