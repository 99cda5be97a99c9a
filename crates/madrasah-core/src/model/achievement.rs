//! Achievement (badge) types, their declarative rule table, and unlock records.
//!
//! The unlock rules are data, not behavior: every [`AchievementType`] maps to
//! a static [`AchievementMeta`] carrying its display info, XP reward, and a
//! [`Requirement`] describing what satisfies it. The achievement engine reads
//! this table; nothing here evaluates a child.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lesson::LessonCategory;

/// Closed enumeration of every badge the app can award.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementType {
    // Progress
    FirstLesson,
    Streak3,
    Streak7,
    Streak30,
    /// Awarded only by the streak milestone path, never by the sweep.
    Streak100,
    PerfectWeek,
    Xp500,
    Xp1000,
    Xp2500,
    Lessons10,
    Lessons25,
    Lessons50,
    // Mastery
    PerfectScore,
    Perfectionist,
    WuduMaster,
    SalahMaster,
    QuranMaster,
    DuaaMaster,
    StoriesMaster,
    CategoryExplorer,
    AllCategoriesMaster,
    // Special / calendar
    RamadanReady,
    EidCelebration,
    HijriNewYear,
    LaylatAlQadr,
    // Social
    FirstFamilyActivity,
    FamilyTime,
    FamilyChampion,
    WeeklyChampion,
    // Time of day
    EarlyBird,
    NightOwl,
}

/// What satisfies an achievement, expressed as data.
///
/// `Binary` rules have no meaningful partial progress; the UI renders them as
/// locked or unlocked with no bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Binary,
    /// `current_streak` reaching N days.
    Streak(u32),
    /// `total_xp` reaching N.
    TotalXp(u32),
    /// `total_lessons_completed` reaching N.
    LessonsCompleted(u32),
    /// N lessons completed with a score of 100.
    PerfectScores(u32),
    /// Every seeded lesson in the category completed.
    CategoryMastery(LessonCategory),
    /// At least one completed lesson in each of the 8 categories.
    CategoriesTried,
    /// N completed family activities.
    FamilyActivities(u32),
}

/// Static metadata for one achievement type.
#[derive(Debug, Clone, Copy)]
pub struct AchievementMeta {
    /// Stable identifier used for storage.
    pub id: &'static str,
    pub title: &'static str,
    pub icon: &'static str,
    /// XP granted to the child when the badge unlocks.
    pub xp_reward: u32,
    pub requirement: Requirement,
}

impl AchievementType {
    /// All types, grouped by family.
    pub const ALL: [AchievementType; 31] = [
        AchievementType::FirstLesson,
        AchievementType::Streak3,
        AchievementType::Streak7,
        AchievementType::Streak30,
        AchievementType::Streak100,
        AchievementType::PerfectWeek,
        AchievementType::Xp500,
        AchievementType::Xp1000,
        AchievementType::Xp2500,
        AchievementType::Lessons10,
        AchievementType::Lessons25,
        AchievementType::Lessons50,
        AchievementType::PerfectScore,
        AchievementType::Perfectionist,
        AchievementType::WuduMaster,
        AchievementType::SalahMaster,
        AchievementType::QuranMaster,
        AchievementType::DuaaMaster,
        AchievementType::StoriesMaster,
        AchievementType::CategoryExplorer,
        AchievementType::AllCategoriesMaster,
        AchievementType::RamadanReady,
        AchievementType::EidCelebration,
        AchievementType::HijriNewYear,
        AchievementType::LaylatAlQadr,
        AchievementType::FirstFamilyActivity,
        AchievementType::FamilyTime,
        AchievementType::FamilyChampion,
        AchievementType::WeeklyChampion,
        AchievementType::EarlyBird,
        AchievementType::NightOwl,
    ];

    /// Static rule-table lookup.
    pub fn meta(&self) -> &'static AchievementMeta {
        use AchievementType as T;
        use Requirement as R;
        match self {
            T::FirstLesson => &AchievementMeta {
                id: "first_lesson",
                title: "First Steps",
                icon: "🌱",
                xp_reward: 10,
                requirement: R::LessonsCompleted(1),
            },
            T::Streak3 => &AchievementMeta {
                id: "streak_3",
                title: "3-Day Streak",
                icon: "🔥",
                xp_reward: 30,
                requirement: R::Streak(3),
            },
            T::Streak7 => &AchievementMeta {
                id: "streak_7",
                title: "7-Day Streak",
                icon: "🔥",
                xp_reward: 100,
                requirement: R::Streak(7),
            },
            T::Streak30 => &AchievementMeta {
                id: "streak_30",
                title: "30-Day Streak",
                icon: "🏆",
                xp_reward: 500,
                requirement: R::Streak(30),
            },
            T::Streak100 => &AchievementMeta {
                id: "streak_100",
                title: "100-Day Streak",
                icon: "💎",
                xp_reward: 2000,
                requirement: R::Streak(100),
            },
            T::PerfectWeek => &AchievementMeta {
                id: "perfect_week",
                title: "Perfect Week",
                icon: "📅",
                xp_reward: 150,
                requirement: R::Binary,
            },
            T::Xp500 => &AchievementMeta {
                id: "xp_500",
                title: "Rising Star",
                icon: "⭐",
                xp_reward: 50,
                requirement: R::TotalXp(500),
            },
            T::Xp1000 => &AchievementMeta {
                id: "xp_1000",
                title: "Bright Star",
                icon: "🌟",
                xp_reward: 100,
                requirement: R::TotalXp(1000),
            },
            T::Xp2500 => &AchievementMeta {
                id: "xp_2500",
                title: "Shooting Star",
                icon: "💫",
                xp_reward: 250,
                requirement: R::TotalXp(2500),
            },
            T::Lessons10 => &AchievementMeta {
                id: "lessons_10",
                title: "Curious Learner",
                icon: "📖",
                xp_reward: 50,
                requirement: R::LessonsCompleted(10),
            },
            T::Lessons25 => &AchievementMeta {
                id: "lessons_25",
                title: "Dedicated Learner",
                icon: "📚",
                xp_reward: 125,
                requirement: R::LessonsCompleted(25),
            },
            T::Lessons50 => &AchievementMeta {
                id: "lessons_50",
                title: "Scholar in Training",
                icon: "🎓",
                xp_reward: 250,
                requirement: R::LessonsCompleted(50),
            },
            T::PerfectScore => &AchievementMeta {
                id: "perfect_score",
                title: "Perfect Score",
                icon: "💯",
                xp_reward: 50,
                requirement: R::PerfectScores(1),
            },
            T::Perfectionist => &AchievementMeta {
                id: "perfectionist",
                title: "Perfectionist",
                icon: "✨",
                xp_reward: 200,
                requirement: R::PerfectScores(10),
            },
            T::WuduMaster => &AchievementMeta {
                id: "wudu_master",
                title: "Wudu Master",
                icon: "💧",
                xp_reward: 100,
                requirement: R::CategoryMastery(LessonCategory::Wudu),
            },
            T::SalahMaster => &AchievementMeta {
                id: "salah_master",
                title: "Salah Master",
                icon: "🕌",
                xp_reward: 100,
                requirement: R::CategoryMastery(LessonCategory::Salah),
            },
            T::QuranMaster => &AchievementMeta {
                id: "quran_master",
                title: "Quran Master",
                icon: "📗",
                xp_reward: 100,
                requirement: R::CategoryMastery(LessonCategory::Quran),
            },
            T::DuaaMaster => &AchievementMeta {
                id: "duaa_master",
                title: "Duaa Master",
                icon: "🤲",
                xp_reward: 100,
                requirement: R::CategoryMastery(LessonCategory::Duaa),
            },
            T::StoriesMaster => &AchievementMeta {
                id: "stories_master",
                title: "Storyteller",
                icon: "📜",
                xp_reward: 100,
                requirement: R::CategoryMastery(LessonCategory::Stories),
            },
            T::CategoryExplorer => &AchievementMeta {
                id: "category_explorer",
                title: "Explorer",
                icon: "🧭",
                xp_reward: 150,
                requirement: R::CategoriesTried,
            },
            T::AllCategoriesMaster => &AchievementMeta {
                id: "all_categories_master",
                title: "Master of All",
                icon: "👑",
                xp_reward: 500,
                requirement: R::Binary,
            },
            T::RamadanReady => &AchievementMeta {
                id: "ramadan_ready",
                title: "Ramadan Ready",
                icon: "🌙",
                xp_reward: 100,
                requirement: R::Binary,
            },
            T::EidCelebration => &AchievementMeta {
                id: "eid_celebration",
                title: "Eid Celebration",
                icon: "🎉",
                xp_reward: 100,
                requirement: R::Binary,
            },
            T::HijriNewYear => &AchievementMeta {
                id: "hijri_new_year",
                title: "New Beginnings",
                icon: "🗓️",
                xp_reward: 100,
                requirement: R::Binary,
            },
            T::LaylatAlQadr => &AchievementMeta {
                id: "laylat_al_qadr",
                title: "Night of Power",
                icon: "🌌",
                xp_reward: 100,
                requirement: R::Binary,
            },
            T::FirstFamilyActivity => &AchievementMeta {
                id: "first_family_activity",
                title: "Family First",
                icon: "👨‍👩‍👧",
                xp_reward: 25,
                requirement: R::FamilyActivities(1),
            },
            T::FamilyTime => &AchievementMeta {
                id: "family_time",
                title: "Family Time",
                icon: "🏠",
                xp_reward: 25,
                requirement: R::FamilyActivities(1),
            },
            T::FamilyChampion => &AchievementMeta {
                id: "family_champion",
                title: "Family Champion",
                icon: "🏅",
                xp_reward: 150,
                requirement: R::FamilyActivities(10),
            },
            T::WeeklyChampion => &AchievementMeta {
                id: "weekly_champion",
                title: "Weekly Champion",
                icon: "🥇",
                xp_reward: 200,
                requirement: R::Binary,
            },
            T::EarlyBird => &AchievementMeta {
                id: "early_bird",
                title: "Early Bird",
                icon: "🐦",
                xp_reward: 25,
                requirement: R::Binary,
            },
            T::NightOwl => &AchievementMeta {
                id: "night_owl",
                title: "Night Owl",
                icon: "🦉",
                xp_reward: 25,
                requirement: R::Binary,
            },
        }
    }

    /// Stable identifier used for storage.
    pub fn as_str(&self) -> &'static str {
        self.meta().id
    }

    /// Parse a stored identifier.
    pub fn parse(s: &str) -> Option<AchievementType> {
        AchievementType::ALL.iter().copied().find(|t| t.as_str() == s)
    }
}

/// A persisted unlock record. At most one exists per `(child, type)` pair;
/// `is_new` is the only field that may change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub child_id: Uuid,
    pub achievement_type: AchievementType,
    pub unlocked_at: DateTime<Utc>,
    /// True until the celebration has been shown to the user.
    pub is_new: bool,
}

impl Achievement {
    pub fn unlock(child_id: Uuid, achievement_type: AchievementType, at: DateTime<Utc>) -> Self {
        Self {
            child_id,
            achievement_type,
            unlocked_at: at,
            is_new: true,
        }
    }
}

/// Live progress toward a locked, quantifiable achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementProgress {
    pub current: u32,
    pub required: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn storage_ids_are_unique() {
        let ids: HashSet<&'static str> =
            AchievementType::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(ids.len(), AchievementType::ALL.len());
    }

    #[test]
    fn storage_id_round_trip() {
        for achievement_type in AchievementType::ALL {
            assert_eq!(
                AchievementType::parse(achievement_type.as_str()),
                Some(achievement_type)
            );
        }
        assert_eq!(AchievementType::parse("moon_landing"), None);
    }

    #[test]
    fn streak_badge_rewards_match_milestone_table() {
        assert_eq!(AchievementType::Streak3.meta().xp_reward, 30);
        assert_eq!(AchievementType::Streak7.meta().xp_reward, 100);
        assert_eq!(AchievementType::Streak30.meta().xp_reward, 500);
        assert_eq!(AchievementType::Streak100.meta().xp_reward, 2000);
    }

    #[test]
    fn redundant_family_badges_share_a_trigger() {
        assert_eq!(
            AchievementType::FirstFamilyActivity.meta().requirement,
            Requirement::FamilyActivities(1)
        );
        assert_eq!(
            AchievementType::FamilyTime.meta().requirement,
            Requirement::FamilyActivities(1)
        );
    }

    #[test]
    fn new_unlock_is_flagged_for_celebration() {
        let record = Achievement::unlock(Uuid::new_v4(), AchievementType::FirstLesson, Utc::now());
        assert!(record.is_new);
    }
}
