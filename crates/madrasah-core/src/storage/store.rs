//! SQLite-backed progress store.
//!
//! Holds the `Child`, `Lesson`, `LessonProgress`, `Achievement`, and
//! `FamilyActivity` records the engines read and mutate. Timestamps are
//! stored as RFC 3339 text; the phase map is a JSON column.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::data_dir;
use crate::error::{Result, StoreError};
use crate::model::{
    Achievement, AchievementType, Child, FamilyActivity, Lesson, LessonCategory, LessonProgress,
};

/// Parse datetime from RFC 3339 string with fallback to current time.
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_optional_datetime(dt_str: Option<String>) -> Option<DateTime<Utc>> {
    dt_str.as_deref().map(parse_datetime_fallback)
}

fn parse_uuid_fallback(id_str: &str) -> Uuid {
    Uuid::parse_str(id_str).unwrap_or_else(|_| Uuid::nil())
}

fn row_to_child(row: &rusqlite::Row) -> std::result::Result<Child, rusqlite::Error> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(2)?;
    let last_completed: Option<String> = row.get(7)?;
    Ok(Child {
        id: parse_uuid_fallback(&id),
        name: row.get(1)?,
        created_at: parse_datetime_fallback(&created_at),
        current_streak: row.get(3)?,
        longest_streak: row.get(4)?,
        total_xp: row.get(5)?,
        total_lessons_completed: row.get(6)?,
        last_lesson_completed_date: parse_optional_datetime(last_completed),
    })
}

fn row_to_lesson(row: &rusqlite::Row) -> std::result::Result<Lesson, rusqlite::Error> {
    let id: String = row.get(0)?;
    let category: String = row.get(1)?;
    Ok(Lesson {
        id: parse_uuid_fallback(&id),
        category: LessonCategory::parse(&category),
        order: row.get(2)?,
        week_number: row.get(3)?,
        xp_reward: row.get(4)?,
        title: row.get(5)?,
    })
}

fn row_to_progress(row: &rusqlite::Row) -> std::result::Result<LessonProgress, rusqlite::Error> {
    let lesson_id: String = row.get(0)?;
    let child_id: String = row.get(1)?;
    let completed_at: Option<String> = row.get(3)?;
    let phase_json: String = row.get(7)?;
    let last_accessed: String = row.get(8)?;
    Ok(LessonProgress {
        lesson_id: parse_uuid_fallback(&lesson_id),
        child_id: parse_uuid_fallback(&child_id),
        is_completed: row.get(2)?,
        completed_at: parse_optional_datetime(completed_at),
        score: row.get(4)?,
        xp_earned: row.get(5)?,
        attempts: row.get(6)?,
        last_completed_phase: row.get(9)?,
        phase_progress: serde_json::from_str(&phase_json).unwrap_or_default(),
        last_accessed_at: parse_datetime_fallback(&last_accessed),
    })
}

fn row_to_achievement(row: &rusqlite::Row) -> std::result::Result<Achievement, rusqlite::Error> {
    let child_id: String = row.get(0)?;
    let type_str: String = row.get(1)?;
    let unlocked_at: String = row.get(2)?;
    Ok(Achievement {
        child_id: parse_uuid_fallback(&child_id),
        // Unknown identifiers only appear if the enum shrank across versions.
        achievement_type: AchievementType::parse(&type_str)
            .unwrap_or(AchievementType::FirstLesson),
        unlocked_at: parse_datetime_fallback(&unlocked_at),
        is_new: row.get(3)?,
    })
}

/// SQLite store for learner progress.
///
/// Single-connection, single-writer: callers serialize per-child operations
/// by holding the store for the duration of a completion event.
pub struct ProgressStore {
    conn: Connection,
}

impl ProgressStore {
    /// Open the store at `~/.config/madrasah/madrasah.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("madrasah.db"))
    }

    /// Open the store at an explicit path.
    pub fn open_at(path: &std::path::Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Open an in-memory store (for tests and demos).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "PRAGMA foreign_keys = ON;

                CREATE TABLE IF NOT EXISTS children (
                    id            TEXT PRIMARY KEY,
                    name          TEXT NOT NULL,
                    created_at    TEXT NOT NULL,
                    current_streak  INTEGER NOT NULL DEFAULT 0,
                    longest_streak  INTEGER NOT NULL DEFAULT 0,
                    total_xp        INTEGER NOT NULL DEFAULT 0,
                    total_lessons_completed INTEGER NOT NULL DEFAULT 0,
                    last_lesson_completed_date TEXT
                );

                CREATE TABLE IF NOT EXISTS lessons (
                    id          TEXT PRIMARY KEY,
                    category    TEXT NOT NULL,
                    sort_order  INTEGER NOT NULL,
                    week_number INTEGER NOT NULL,
                    xp_reward   INTEGER NOT NULL,
                    title       TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS lesson_progress (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    lesson_id   TEXT NOT NULL,
                    child_id    TEXT NOT NULL REFERENCES children(id) ON DELETE CASCADE,
                    is_completed INTEGER NOT NULL DEFAULT 0,
                    completed_at TEXT,
                    score       INTEGER NOT NULL DEFAULT 0,
                    xp_earned   INTEGER NOT NULL DEFAULT 0,
                    attempts    INTEGER NOT NULL DEFAULT 0,
                    last_completed_phase TEXT,
                    phase_progress TEXT NOT NULL DEFAULT '{}',
                    last_accessed_at TEXT NOT NULL,
                    UNIQUE(child_id, lesson_id)
                );

                CREATE TABLE IF NOT EXISTS achievements (
                    id          INTEGER PRIMARY KEY AUTOINCREMENT,
                    child_id    TEXT NOT NULL REFERENCES children(id) ON DELETE CASCADE,
                    achievement_type TEXT NOT NULL,
                    unlocked_at TEXT NOT NULL,
                    is_new      INTEGER NOT NULL DEFAULT 1,
                    UNIQUE(child_id, achievement_type)
                );

                CREATE TABLE IF NOT EXISTS family_activities (
                    id          TEXT PRIMARY KEY,
                    child_id    TEXT NOT NULL REFERENCES children(id) ON DELETE CASCADE,
                    title       TEXT NOT NULL,
                    completed_at TEXT
                );

                CREATE INDEX IF NOT EXISTS idx_progress_child ON lesson_progress(child_id);
                CREATE INDEX IF NOT EXISTS idx_achievements_child ON achievements(child_id);
                CREATE INDEX IF NOT EXISTS idx_lessons_week ON lessons(week_number);",
            )
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        Ok(())
    }

    // === Children ===

    /// Insert or update a child profile.
    pub fn save_child(&self, child: &Child) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO children
                 (id, name, created_at, current_streak, longest_streak,
                  total_xp, total_lessons_completed, last_lesson_completed_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    child.id.to_string(),
                    child.name,
                    child.created_at.to_rfc3339(),
                    child.current_streak,
                    child.longest_streak,
                    child.total_xp,
                    child.total_lessons_completed,
                    child.last_lesson_completed_date.map(|d| d.to_rfc3339()),
                ],
            )
            .map_err(StoreError::SaveFailed)?;
        Ok(())
    }

    pub fn child(&self, id: Uuid) -> Result<Option<Child>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, name, created_at, current_streak, longest_streak,
                        total_xp, total_lessons_completed, last_lesson_completed_date
                 FROM children WHERE id = ?1",
                params![id.to_string()],
                row_to_child,
            )
            .optional()
            .map_err(StoreError::from)?;
        Ok(row)
    }

    pub fn children(&self) -> Result<Vec<Child>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, name, created_at, current_streak, longest_streak,
                        total_xp, total_lessons_completed, last_lesson_completed_date
                 FROM children ORDER BY created_at",
            )
            .map_err(StoreError::from)?;
        let rows = stmt
            .query_map([], row_to_child)
            .map_err(StoreError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::from)?;
        Ok(rows)
    }

    /// Delete a child. Progress, achievements, and family activities cascade.
    pub fn delete_child(&self, id: Uuid) -> Result<()> {
        self.conn
            .execute("DELETE FROM children WHERE id = ?1", params![id.to_string()])
            .map_err(StoreError::SaveFailed)?;
        Ok(())
    }

    // === Lessons ===

    pub fn save_lesson(&self, lesson: &Lesson) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO lessons
                 (id, category, sort_order, week_number, xp_reward, title)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    lesson.id.to_string(),
                    lesson.category.as_str(),
                    lesson.order,
                    lesson.week_number,
                    lesson.xp_reward,
                    lesson.title,
                ],
            )
            .map_err(StoreError::SaveFailed)?;
        Ok(())
    }

    pub fn lesson(&self, id: Uuid) -> Result<Option<Lesson>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, category, sort_order, week_number, xp_reward, title
                 FROM lessons WHERE id = ?1",
                params![id.to_string()],
                row_to_lesson,
            )
            .optional()
            .map_err(StoreError::from)?;
        Ok(row)
    }

    /// All lessons sorted by curriculum order.
    pub fn lessons(&self) -> Result<Vec<Lesson>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, category, sort_order, week_number, xp_reward, title
                 FROM lessons ORDER BY sort_order",
            )
            .map_err(StoreError::from)?;
        let rows = stmt
            .query_map([], row_to_lesson)
            .map_err(StoreError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::from)?;
        Ok(rows)
    }

    pub fn lessons_for_week(&self, week_number: u32) -> Result<Vec<Lesson>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, category, sort_order, week_number, xp_reward, title
                 FROM lessons WHERE week_number = ?1 ORDER BY sort_order",
            )
            .map_err(StoreError::from)?;
        let rows = stmt
            .query_map(params![week_number], row_to_lesson)
            .map_err(StoreError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::from)?;
        Ok(rows)
    }

    // === Lesson progress ===

    /// Insert or update the progress row for `(child, lesson)`.
    pub fn save_progress(&self, progress: &LessonProgress) -> Result<()> {
        let phase_json =
            serde_json::to_string(&progress.phase_progress).unwrap_or_else(|_| "{}".into());
        self.conn
            .execute(
                "INSERT INTO lesson_progress
                 (lesson_id, child_id, is_completed, completed_at, score, xp_earned,
                  attempts, last_completed_phase, phase_progress, last_accessed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(child_id, lesson_id) DO UPDATE SET
                    is_completed = excluded.is_completed,
                    completed_at = excluded.completed_at,
                    score = excluded.score,
                    xp_earned = excluded.xp_earned,
                    attempts = excluded.attempts,
                    last_completed_phase = excluded.last_completed_phase,
                    phase_progress = excluded.phase_progress,
                    last_accessed_at = excluded.last_accessed_at",
                params![
                    progress.lesson_id.to_string(),
                    progress.child_id.to_string(),
                    progress.is_completed,
                    progress.completed_at.map(|d| d.to_rfc3339()),
                    progress.score,
                    progress.xp_earned,
                    progress.attempts,
                    progress.last_completed_phase,
                    phase_json,
                    progress.last_accessed_at.to_rfc3339(),
                ],
            )
            .map_err(StoreError::SaveFailed)?;
        Ok(())
    }

    pub fn progress(&self, child_id: Uuid, lesson_id: Uuid) -> Result<Option<LessonProgress>> {
        let row = self
            .conn
            .query_row(
                "SELECT lesson_id, child_id, is_completed, completed_at, score, xp_earned,
                        attempts, phase_progress, last_accessed_at, last_completed_phase
                 FROM lesson_progress WHERE child_id = ?1 AND lesson_id = ?2",
                params![child_id.to_string(), lesson_id.to_string()],
                row_to_progress,
            )
            .optional()
            .map_err(StoreError::from)?;
        Ok(row)
    }

    pub fn progress_for_child(&self, child_id: Uuid) -> Result<Vec<LessonProgress>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT lesson_id, child_id, is_completed, completed_at, score, xp_earned,
                        attempts, phase_progress, last_accessed_at, last_completed_phase
                 FROM lesson_progress WHERE child_id = ?1",
            )
            .map_err(StoreError::from)?;
        let rows = stmt
            .query_map(params![child_id.to_string()], row_to_progress)
            .map_err(StoreError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::from)?;
        Ok(rows)
    }

    // === Achievements ===

    /// Insert an unlock record. The `(child, type)` unique constraint makes a
    /// double unlock a save error rather than a silent duplicate.
    pub fn save_achievement(&self, achievement: &Achievement) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO achievements (child_id, achievement_type, unlocked_at, is_new)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    achievement.child_id.to_string(),
                    achievement.achievement_type.as_str(),
                    achievement.unlocked_at.to_rfc3339(),
                    achievement.is_new,
                ],
            )
            .map_err(StoreError::SaveFailed)?;
        Ok(())
    }

    pub fn achievements_for_child(&self, child_id: Uuid) -> Result<Vec<Achievement>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT child_id, achievement_type, unlocked_at, is_new
                 FROM achievements WHERE child_id = ?1 ORDER BY unlocked_at",
            )
            .map_err(StoreError::from)?;
        let rows = stmt
            .query_map(params![child_id.to_string()], row_to_achievement)
            .map_err(StoreError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::from)?;
        Ok(rows)
    }

    /// Clear the celebration flag. The only permitted post-creation mutation.
    pub fn mark_achievement_seen(
        &self,
        child_id: Uuid,
        achievement_type: AchievementType,
    ) -> Result<()> {
        self.conn
            .execute(
                "UPDATE achievements SET is_new = 0
                 WHERE child_id = ?1 AND achievement_type = ?2",
                params![child_id.to_string(), achievement_type.as_str()],
            )
            .map_err(StoreError::SaveFailed)?;
        Ok(())
    }

    // === Family activities ===

    pub fn save_family_activity(&self, activity: &FamilyActivity) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO family_activities (id, child_id, title, completed_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    activity.id.to_string(),
                    activity.child_id.to_string(),
                    activity.title,
                    activity.completed_at.map(|d| d.to_rfc3339()),
                ],
            )
            .map_err(StoreError::SaveFailed)?;
        Ok(())
    }

    pub fn family_activities(&self, child_id: Uuid) -> Result<Vec<FamilyActivity>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, child_id, title, completed_at
                 FROM family_activities WHERE child_id = ?1 ORDER BY completed_at",
            )
            .map_err(StoreError::from)?;
        let rows = stmt
            .query_map(params![child_id.to_string()], |row| {
                let id: String = row.get(0)?;
                let child_id: String = row.get(1)?;
                let completed_at: Option<String> = row.get(3)?;
                Ok(FamilyActivity {
                    id: parse_uuid_fallback(&id),
                    child_id: parse_uuid_fallback(&child_id),
                    title: row.get(2)?,
                    completed_at: parse_optional_datetime(completed_at),
                })
            })
            .map_err(StoreError::from)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::from)?;
        Ok(rows)
    }

    pub fn completed_family_activity_count(&self, child_id: Uuid) -> Result<u32> {
        let count: u32 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM family_activities
                 WHERE child_id = ?1 AND completed_at IS NOT NULL",
                params![child_id.to_string()],
                |row| row.get(0),
            )
            .map_err(StoreError::from)?;
        Ok(count)
    }
}
