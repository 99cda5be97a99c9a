//! Achievement engine: unlock predicates, batch unlocking, progress fractions.
//!
//! Predicates are independent and idempotent against the already-unlocked
//! set; within one sweep every newly satisfied badge unlocks together so the
//! caller can present them as a sequential celebration queue.
//!
//! The streak predicates here stop at 30 days. The 100-day badge is awarded
//! only by the streak engine's milestone path.
//!
//! All store reads in this engine are fail-open: a failed fetch is treated as
//! an empty result and the sweep simply awards nothing extra this pass. The
//! engine is re-invoked on every completion, so a transient read failure is
//! naturally retried. Writes propagate as typed errors.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, Local, Timelike, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::model::{
    Achievement, AchievementProgress, AchievementType, Child, Lesson, LessonCategory,
    LessonProgress, Requirement,
};
use crate::storage::ProgressStore;

/// Categories with a dedicated mastery badge.
const MASTERY_BADGES: [(LessonCategory, AchievementType); 5] = [
    (LessonCategory::Wudu, AchievementType::WuduMaster),
    (LessonCategory::Salah, AchievementType::SalahMaster),
    (LessonCategory::Quran, AchievementType::QuranMaster),
    (LessonCategory::Duaa, AchievementType::DuaaMaster),
    (LessonCategory::Stories, AchievementType::StoriesMaster),
];

/// Title substrings coupling calendar badges to seeded content.
const CALENDAR_BADGES: [(AchievementType, &[&str]); 4] = [
    (AchievementType::RamadanReady, &["ramadan", "fasting"]),
    (AchievementType::EidCelebration, &["eid"]),
    (AchievementType::HijriNewYear, &["hijri", "islamic new year"]),
    (AchievementType::LaylatAlQadr, &["laylat", "night of power"]),
];

/// Evaluates unlock predicates and maintains the unlock set for a child.
pub struct AchievementEngine<'a> {
    store: &'a ProgressStore,
}

impl<'a> AchievementEngine<'a> {
    pub fn new(store: &'a ProgressStore) -> Self {
        Self { store }
    }

    /// Sweep all predicate families and unlock everything newly satisfied.
    ///
    /// Returns the newly unlocked records in evaluation order. Each unlock
    /// adds the badge's XP reward to the child and persists both.
    pub fn check_and_unlock(&self, child: &mut Child) -> Result<Vec<Achievement>> {
        self.check_and_unlock_at(child, Local::now())
    }

    pub fn check_and_unlock_at(
        &self,
        child: &mut Child,
        now: DateTime<Local>,
    ) -> Result<Vec<Achievement>> {
        let unlocked = self.unlocked_types(child.id);
        let lessons = self.all_lessons();
        let rows = self.progress_rows(child.id);
        let activity_count = self.activity_count(child.id);

        let mut satisfied = Vec::new();
        satisfied.extend(progress_family(child, &rows, now));
        satisfied.extend(mastery_family(&lessons, &rows));
        satisfied.extend(special_family(&lessons, &rows));
        satisfied.extend(social_family(&lessons, &rows, activity_count));

        let mut newly_unlocked = Vec::new();
        for achievement_type in satisfied {
            if unlocked.contains(&achievement_type) {
                continue;
            }
            newly_unlocked.push(self.unlock(child, achievement_type, now)?);
        }
        Ok(newly_unlocked)
    }

    /// Opportunistic time-of-day badges, evaluated only at the moment of a
    /// lesson completion and unlocked inline rather than via the sweep.
    pub fn check_time_of_day_at(
        &self,
        child: &mut Child,
        now: DateTime<Local>,
    ) -> Result<Vec<Achievement>> {
        let unlocked = self.unlocked_types(child.id);
        let hour = now.hour();

        let candidate = if hour < 9 {
            Some(AchievementType::EarlyBird)
        } else if hour >= 19 {
            Some(AchievementType::NightOwl)
        } else {
            None
        };

        match candidate {
            Some(achievement_type) if !unlocked.contains(&achievement_type) => {
                Ok(vec![self.unlock(child, achievement_type, now)?])
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Live progress toward a locked, quantifiable badge.
    ///
    /// `None` for already-unlocked badges (nothing to show) and for binary
    /// rules, which render as plainly locked or unlocked.
    pub fn progress_toward(
        &self,
        achievement_type: AchievementType,
        child: &Child,
    ) -> Option<AchievementProgress> {
        if self.unlocked_types(child.id).contains(&achievement_type) {
            return None;
        }

        let (current, required) = match achievement_type.meta().requirement {
            Requirement::Binary => return None,
            Requirement::Streak(n) => (child.current_streak, n),
            Requirement::TotalXp(n) => (child.total_xp, n),
            Requirement::LessonsCompleted(n) => (child.total_lessons_completed, n),
            Requirement::PerfectScores(n) => {
                let count = self
                    .progress_rows(child.id)
                    .iter()
                    .filter(|p| p.is_completed && p.score == 100)
                    .count() as u32;
                (count, n)
            }
            Requirement::CategoryMastery(category) => {
                let lessons = self.all_lessons();
                let in_category: Vec<&Lesson> =
                    lessons.iter().filter(|l| l.category == category).collect();
                if in_category.is_empty() {
                    return None;
                }
                let completed = completed_lesson_ids(&self.progress_rows(child.id));
                let done = in_category
                    .iter()
                    .filter(|l| completed.contains(&l.id))
                    .count() as u32;
                (done, in_category.len() as u32)
            }
            Requirement::CategoriesTried => {
                let lessons = self.all_lessons();
                let tried = categories_completed(&lessons, &self.progress_rows(child.id));
                (tried.len() as u32, LessonCategory::ALL.len() as u32)
            }
            Requirement::FamilyActivities(n) => (self.activity_count(child.id), n),
        };

        Some(AchievementProgress {
            current: current.min(required),
            required,
        })
    }

    /// Clear the celebration flag on a viewed badge.
    pub fn mark_as_seen(&self, achievement: &mut Achievement) -> Result<()> {
        achievement.is_new = false;
        self.store
            .mark_achievement_seen(achievement.child_id, achievement.achievement_type)
    }

    fn unlock(
        &self,
        child: &mut Child,
        achievement_type: AchievementType,
        now: DateTime<Local>,
    ) -> Result<Achievement> {
        let record = Achievement::unlock(child.id, achievement_type, now.with_timezone(&Utc));
        self.store.save_achievement(&record)?;
        child.total_xp += achievement_type.meta().xp_reward;
        self.store.save_child(child)?;
        Ok(record)
    }

    // === Fail-open reads ===

    fn unlocked_types(&self, child_id: Uuid) -> HashSet<AchievementType> {
        match self.store.achievements_for_child(child_id) {
            Ok(rows) => rows.into_iter().map(|a| a.achievement_type).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "achievement fetch failed; treating as none");
                HashSet::new()
            }
        }
    }

    fn all_lessons(&self) -> Vec<Lesson> {
        match self.store.lessons() {
            Ok(lessons) => lessons,
            Err(e) => {
                tracing::warn!(error = %e, "lesson fetch failed; treating as none");
                Vec::new()
            }
        }
    }

    fn progress_rows(&self, child_id: Uuid) -> Vec<LessonProgress> {
        match self.store.progress_for_child(child_id) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = %e, "progress fetch failed; treating as none");
                Vec::new()
            }
        }
    }

    fn activity_count(&self, child_id: Uuid) -> u32 {
        match self.store.completed_family_activity_count(child_id) {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(error = %e, "family activity fetch failed; treating as zero");
                0
            }
        }
    }
}

// === Predicate families ===
// Pure functions over fetched state, one per family.

fn completed_lesson_ids(rows: &[LessonProgress]) -> HashSet<Uuid> {
    rows.iter()
        .filter(|p| p.is_completed)
        .map(|p| p.lesson_id)
        .collect()
}

fn categories_completed(lessons: &[Lesson], rows: &[LessonProgress]) -> HashSet<LessonCategory> {
    let completed = completed_lesson_ids(rows);
    lessons
        .iter()
        .filter(|l| completed.contains(&l.id))
        .map(|l| l.category)
        .collect()
}

fn progress_family(
    child: &Child,
    rows: &[LessonProgress],
    now: DateTime<Local>,
) -> Vec<AchievementType> {
    let mut satisfied = Vec::new();

    if child.total_lessons_completed >= 1 {
        satisfied.push(AchievementType::FirstLesson);
    }
    for (days, badge) in [
        (3, AchievementType::Streak3),
        (7, AchievementType::Streak7),
        (30, AchievementType::Streak30),
    ] {
        if child.current_streak >= days {
            satisfied.push(badge);
        }
    }
    if distinct_completion_days_this_week(rows, now) >= 7 {
        satisfied.push(AchievementType::PerfectWeek);
    }
    for (xp, badge) in [
        (500, AchievementType::Xp500),
        (1000, AchievementType::Xp1000),
        (2500, AchievementType::Xp2500),
    ] {
        if child.total_xp >= xp {
            satisfied.push(badge);
        }
    }
    for (count, badge) in [
        (10, AchievementType::Lessons10),
        (25, AchievementType::Lessons25),
        (50, AchievementType::Lessons50),
    ] {
        if child.total_lessons_completed >= count {
            satisfied.push(badge);
        }
    }
    satisfied
}

/// Distinct local calendar days with a completion inside the current ISO week.
fn distinct_completion_days_this_week(rows: &[LessonProgress], now: DateTime<Local>) -> usize {
    let this_week = now.date_naive().iso_week();
    rows.iter()
        .filter_map(|p| p.completed_at)
        .map(|at| at.with_timezone(&Local).date_naive())
        .filter(|date| date.iso_week() == this_week)
        .collect::<HashSet<_>>()
        .len()
}

fn mastery_family(lessons: &[Lesson], rows: &[LessonProgress]) -> Vec<AchievementType> {
    let mut satisfied = Vec::new();
    let completed = completed_lesson_ids(rows);

    let perfect_count = rows
        .iter()
        .filter(|p| p.is_completed && p.score == 100)
        .count();
    if perfect_count >= 1 {
        satisfied.push(AchievementType::PerfectScore);
    }
    if perfect_count >= 10 {
        satisfied.push(AchievementType::Perfectionist);
    }

    let mut by_category: HashMap<LessonCategory, (usize, usize)> = HashMap::new();
    for lesson in lessons {
        let entry = by_category.entry(lesson.category).or_default();
        entry.0 += 1;
        if completed.contains(&lesson.id) {
            entry.1 += 1;
        }
    }

    // Empty categories never satisfy mastery; a badge must be earnable only
    // through actual content.
    for (category, badge) in MASTERY_BADGES {
        if let Some(&(total, done)) = by_category.get(&category) {
            if total > 0 && done == total {
                satisfied.push(badge);
            }
        }
    }

    let tried = categories_completed(lessons, rows);
    if LessonCategory::ALL.iter().all(|c| tried.contains(c)) {
        satisfied.push(AchievementType::CategoryExplorer);
    }

    if !lessons.is_empty()
        && by_category.values().all(|&(total, done)| done == total)
    {
        satisfied.push(AchievementType::AllCategoriesMaster);
    }

    satisfied
}

fn special_family(lessons: &[Lesson], rows: &[LessonProgress]) -> Vec<AchievementType> {
    let completed = completed_lesson_ids(rows);
    let mut satisfied = Vec::new();

    for (badge, patterns) in CALENDAR_BADGES {
        let matching: Vec<&Lesson> = lessons
            .iter()
            .filter(|l| {
                let title = l.title.to_lowercase();
                patterns.iter().any(|p| title.contains(p))
            })
            .collect();
        if !matching.is_empty() && matching.iter().all(|l| completed.contains(&l.id)) {
            satisfied.push(badge);
        }
    }
    satisfied
}

fn social_family(
    lessons: &[Lesson],
    rows: &[LessonProgress],
    activity_count: u32,
) -> Vec<AchievementType> {
    let mut satisfied = Vec::new();

    // Two badges from the same trigger, by design.
    if activity_count >= 1 {
        satisfied.push(AchievementType::FirstFamilyActivity);
        satisfied.push(AchievementType::FamilyTime);
    }
    if activity_count >= 10 {
        satisfied.push(AchievementType::FamilyChampion);
    }

    if let Some(week) = current_week(lessons, rows) {
        let completed = completed_lesson_ids(rows);
        let in_week: Vec<&Lesson> = lessons.iter().filter(|l| l.week_number == week).collect();
        if !in_week.is_empty() && in_week.iter().all(|l| completed.contains(&l.id)) {
            satisfied.push(AchievementType::WeeklyChampion);
        }
    }
    satisfied
}

/// The child's current week: week number of the most recently completed
/// lesson. `None` until something is completed.
fn current_week(lessons: &[Lesson], rows: &[LessonProgress]) -> Option<u32> {
    let latest = rows
        .iter()
        .filter(|p| p.is_completed)
        .max_by_key(|p| p.completed_at)?;
    lessons
        .iter()
        .find(|l| l.id == latest.lesson_id)
        .map(|l| l.week_number)
}
