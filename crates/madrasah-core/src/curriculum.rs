//! Bundled starter curriculum.
//!
//! Seeded by `madrasah-cli lesson seed` so demos and fresh installs have
//! content. Production deployments replace this with their own lesson packs;
//! the calendar badges key off lesson titles, so the seasonal titles here are
//! what make those badges earnable.

use crate::model::{Lesson, LessonCategory};

/// The default lesson pack, in curriculum order.
pub fn default_curriculum() -> Vec<Lesson> {
    use LessonCategory::*;
    let plan: [(LessonCategory, u32, u32, &str); 20] = [
        (Wudu, 1, 10, "Washing Hands and Face"),
        (Wudu, 1, 10, "Wiping the Head"),
        (Wudu, 1, 15, "Wudu from Start to Finish"),
        (Salah, 1, 10, "Facing the Qibla"),
        (Salah, 2, 15, "Standing and Bowing"),
        (Salah, 2, 15, "The Five Daily Prayers"),
        (Quran, 2, 15, "Surah Al-Fatiha"),
        (Quran, 3, 15, "Surah Al-Ikhlas"),
        (Duaa, 1, 10, "Duaa Before Eating"),
        (Duaa, 3, 10, "Duaa Before Sleeping"),
        (Stories, 2, 15, "Prophet Nuh and the Ark"),
        (Stories, 3, 15, "Prophet Yunus and the Whale"),
        (Pillars, 3, 15, "The Five Pillars"),
        (Arabic, 1, 10, "Alif, Ba, Ta"),
        (Akhlaq, 2, 10, "Saying Salaam"),
        (Akhlaq, 4, 10, "Kindness to Parents"),
        (Stories, 4, 20, "Why We Fast in Ramadan"),
        (Stories, 4, 20, "Eid Morning"),
        (Pillars, 4, 20, "The Hijri Calendar"),
        (Quran, 4, 20, "Laylat al-Qadr, the Night of Power"),
    ];

    plan.into_iter()
        .enumerate()
        .map(|(i, (category, week, xp, title))| {
            Lesson::new(category, (i + 1) as u32, week, xp, title)
        })
        .collect()
}
