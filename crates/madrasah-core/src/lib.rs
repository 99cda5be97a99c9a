//! # Madrasah Core Library
//!
//! Core business logic for Madrasah, a children's Islamic learning app. The
//! library implements the progress and achievement engine: daily streaks,
//! badge unlocking, and resumable lesson progress. The CLI binary and any
//! GUI host are thin layers over the same operations.
//!
//! ## Architecture
//!
//! - **Progress Tracker**: phase-level progress within a lesson attempt,
//!   resume markers, best-of-all-attempts finalization
//! - **Streak Engine**: calendar-day streak state machine with a static
//!   milestone table
//! - **Achievement Engine**: ~30 declarative unlock rules evaluated as
//!   independent predicates, plus inline time-of-day badges
//! - **Storage**: SQLite-based progress store and TOML-based configuration
//!
//! Engines are explicitly constructed against a [`ProgressStore`]; there is
//! no global state. A lesson completion runs through
//! [`apply_lesson_completion`], which fixes the order the three engines
//! observe each other's writes in and returns the celebration events.
//!
//! ## Key Components
//!
//! - [`ProgressTracker`]: lesson phase tracking and finalization
//! - [`StreakEngine`]: streak continuation, expiry, milestones
//! - [`AchievementEngine`]: badge predicates and progress fractions
//! - [`ProgressStore`]: entity persistence

pub mod achievement;
pub mod curriculum;
pub mod error;
pub mod events;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod storage;
pub mod streak;

pub use achievement::AchievementEngine;
pub use error::{ConfigError, CoreError, Result, StoreError};
pub use events::EngineEvent;
pub use model::{
    Achievement, AchievementMeta, AchievementProgress, AchievementType, Child, FamilyActivity,
    Lesson, LessonCategory, LessonProgress, Requirement,
};
pub use pipeline::{apply_lesson_completion, apply_lesson_completion_at, CompletionOutcome};
pub use progress::{CompletionRecord, ProgressTracker};
pub use storage::{Config, ProgressStore};
pub use streak::{
    hours_remaining_today, next_milestone, StreakEngine, StreakMilestone, MILESTONES,
};
