//! Lesson content descriptors.
//!
//! Lessons are seeded by the host application (or `curriculum`) and are
//! read-only to the engine.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Topical category a lesson belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonCategory {
    Wudu,
    Salah,
    Quran,
    Duaa,
    Stories,
    Pillars,
    Arabic,
    Akhlaq,
}

impl LessonCategory {
    /// All categories, in display order.
    pub const ALL: [LessonCategory; 8] = [
        LessonCategory::Wudu,
        LessonCategory::Salah,
        LessonCategory::Quran,
        LessonCategory::Duaa,
        LessonCategory::Stories,
        LessonCategory::Pillars,
        LessonCategory::Arabic,
        LessonCategory::Akhlaq,
    ];

    /// Stable identifier used for storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonCategory::Wudu => "wudu",
            LessonCategory::Salah => "salah",
            LessonCategory::Quran => "quran",
            LessonCategory::Duaa => "duaa",
            LessonCategory::Stories => "stories",
            LessonCategory::Pillars => "pillars",
            LessonCategory::Arabic => "arabic",
            LessonCategory::Akhlaq => "akhlaq",
        }
    }

    /// Parse a stored identifier. Unknown values map to `Stories` so an old
    /// database with retired categories still loads.
    pub fn parse(s: &str) -> LessonCategory {
        match s {
            "wudu" => LessonCategory::Wudu,
            "salah" => LessonCategory::Salah,
            "quran" => LessonCategory::Quran,
            "duaa" => LessonCategory::Duaa,
            "pillars" => LessonCategory::Pillars,
            "arabic" => LessonCategory::Arabic,
            "akhlaq" => LessonCategory::Akhlaq,
            _ => LessonCategory::Stories,
        }
    }
}

/// Immutable lesson descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: Uuid,
    pub category: LessonCategory,
    /// Position within the overall curriculum.
    pub order: u32,
    pub week_number: u32,
    pub xp_reward: u32,
    pub title: String,
}

impl Lesson {
    pub fn new(
        category: LessonCategory,
        order: u32,
        week_number: u32,
        xp_reward: u32,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            order,
            week_number,
            xp_reward,
            title: title.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trip() {
        for category in LessonCategory::ALL {
            assert_eq!(LessonCategory::parse(category.as_str()), category);
        }
    }

    #[test]
    fn unknown_category_falls_back() {
        assert_eq!(LessonCategory::parse("tajweed"), LessonCategory::Stories);
    }
}
