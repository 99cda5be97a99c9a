//! Entity types persisted through the progress store.

mod achievement;
mod child;
mod family_activity;
mod lesson;
mod lesson_progress;

pub use achievement::{
    Achievement, AchievementMeta, AchievementProgress, AchievementType, Requirement,
};
pub use child::Child;
pub use family_activity::FamilyActivity;
pub use lesson::{Lesson, LessonCategory};
pub use lesson_progress::LessonProgress;
