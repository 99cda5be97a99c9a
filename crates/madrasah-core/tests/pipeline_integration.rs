//! End-to-end completion pipeline scenarios.

use chrono::{DateTime, Local, TimeZone, Utc};
use madrasah_core::{
    apply_lesson_completion_at, AchievementType, Child, EngineEvent, Lesson, LessonCategory,
    ProgressStore, ProgressTracker, StreakEngine,
};

fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn seed_child(store: &ProgressStore, name: &str) -> Child {
    let child = Child::new(name);
    store.save_child(&child).unwrap();
    child
}

fn seed_lesson(store: &ProgressStore, category: LessonCategory, order: u32, title: &str) -> Lesson {
    let lesson = Lesson::new(category, order, 1, 10, title);
    store.save_lesson(&lesson).unwrap();
    lesson
}

fn start_lesson(store: &ProgressStore, child: &Child, lesson: &Lesson) {
    ProgressTracker::new(store)
        .save_phase_progress(lesson.id, child.id, "hook")
        .unwrap();
}

#[test]
fn first_lesson_at_eight_thirty() {
    let store = ProgressStore::open_memory().unwrap();
    let child = seed_child(&store, "Amina");
    let lesson = seed_lesson(&store, LessonCategory::Wudu, 1, "Washing Hands");
    start_lesson(&store, &child, &lesson);

    let outcome = apply_lesson_completion_at(
        &store,
        child.id,
        lesson.id,
        80,
        lesson.xp_reward,
        local(2026, 3, 2, 8, 30),
    )
    .unwrap();

    assert_eq!(outcome.child.current_streak, 1);
    assert_eq!(outcome.child.total_lessons_completed, 1);

    let unlocked: Vec<AchievementType> = outcome
        .events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::AchievementUnlocked {
                achievement_type, ..
            } => Some(*achievement_type),
            _ => None,
        })
        .collect();
    assert!(unlocked.contains(&AchievementType::FirstLesson));
    assert!(unlocked.contains(&AchievementType::EarlyBird));

    // Lesson XP plus the two badge rewards.
    let expected = lesson.xp_reward
        + AchievementType::EarlyBird.meta().xp_reward
        + AchievementType::FirstLesson.meta().xp_reward;
    assert_eq!(outcome.child.total_xp, expected);

    // The store saw every mutation.
    let stored = store.child(child.id).unwrap().unwrap();
    assert_eq!(stored.total_xp, expected);
    assert_eq!(stored.current_streak, 1);
}

#[test]
fn third_consecutive_day_awards_streak_milestone() {
    let store = ProgressStore::open_memory().unwrap();
    let mut child = seed_child(&store, "Yusuf");
    child.current_streak = 2;
    child.longest_streak = 2;
    child.last_lesson_completed_date =
        Some(local(2026, 3, 3, 10, 0).with_timezone(&Utc));
    store.save_child(&child).unwrap();

    let lesson = seed_lesson(&store, LessonCategory::Salah, 1, "Facing the Qibla");
    start_lesson(&store, &child, &lesson);

    let outcome = apply_lesson_completion_at(
        &store,
        child.id,
        lesson.id,
        70,
        lesson.xp_reward,
        local(2026, 3, 4, 12, 0),
    )
    .unwrap();

    assert_eq!(outcome.child.current_streak, 3);
    assert_eq!(outcome.child.longest_streak, 3);
    assert!(outcome.events.iter().any(|e| matches!(
        e,
        EngineEvent::MilestoneReached {
            days: 3,
            xp_reward: 30,
            ..
        }
    )));
    // Milestone XP landed on top of the lesson XP and badge rewards.
    assert!(outcome.child.total_xp >= lesson.xp_reward + 30);

    // The sweep ran after the streak update and did not double-award the
    // 3-day badge it could now see.
    let badges = store.achievements_for_child(child.id).unwrap();
    let streak3_count = badges
        .iter()
        .filter(|a| a.achievement_type == AchievementType::Streak3)
        .count();
    assert_eq!(streak3_count, 1);
}

#[test]
fn wudu_mastery_unlocks_exactly_once() {
    let store = ProgressStore::open_memory().unwrap();
    let child = seed_child(&store, "Amina");
    let wudu: Vec<Lesson> = (1..=3)
        .map(|i| seed_lesson(&store, LessonCategory::Wudu, i, &format!("Wudu step {i}")))
        .collect();
    let unrelated = seed_lesson(&store, LessonCategory::Stories, 10, "Prophet Nuh and the Ark");

    for (i, lesson) in wudu.iter().enumerate() {
        start_lesson(&store, &child, lesson);
        apply_lesson_completion_at(
            &store,
            child.id,
            lesson.id,
            90,
            lesson.xp_reward,
            local(2026, 3, 2 + i as u32, 10, 0),
        )
        .unwrap();
    }

    let badges = store.achievements_for_child(child.id).unwrap();
    assert!(badges
        .iter()
        .any(|a| a.achievement_type == AchievementType::WuduMaster));

    // An unrelated completion later re-runs the sweep; still one record.
    start_lesson(&store, &child, &unrelated);
    apply_lesson_completion_at(
        &store,
        child.id,
        unrelated.id,
        90,
        unrelated.xp_reward,
        local(2026, 3, 6, 10, 0),
    )
    .unwrap();

    let badges = store.achievements_for_child(child.id).unwrap();
    let master_count = badges
        .iter()
        .filter(|a| a.achievement_type == AchievementType::WuduMaster)
        .count();
    assert_eq!(master_count, 1);
}

#[test]
fn same_day_repeat_counts_attempts_but_not_streak() {
    let store = ProgressStore::open_memory().unwrap();
    let child = seed_child(&store, "Yusuf");
    let lesson = seed_lesson(&store, LessonCategory::Quran, 1, "Surah Al-Fatiha");
    start_lesson(&store, &child, &lesson);

    apply_lesson_completion_at(
        &store,
        child.id,
        lesson.id,
        60,
        lesson.xp_reward,
        local(2026, 3, 2, 10, 0),
    )
    .unwrap();
    let outcome = apply_lesson_completion_at(
        &store,
        child.id,
        lesson.id,
        90,
        lesson.xp_reward,
        local(2026, 3, 2, 15, 0),
    )
    .unwrap();

    assert_eq!(outcome.child.current_streak, 1);
    assert_eq!(outcome.child.total_lessons_completed, 1);
    assert_eq!(outcome.progress.attempts, 2);
    // Best-of retention.
    assert_eq!(outcome.progress.score, 90);
}

#[test]
fn sweep_sees_xp_earned_in_the_same_event() {
    let store = ProgressStore::open_memory().unwrap();
    let mut child = seed_child(&store, "Amina");
    child.total_xp = 495;
    store.save_child(&child).unwrap();

    let lesson = seed_lesson(&store, LessonCategory::Duaa, 1, "Duaa Before Eating");
    start_lesson(&store, &child, &lesson);

    let outcome = apply_lesson_completion_at(
        &store,
        child.id,
        lesson.id,
        80,
        lesson.xp_reward,
        local(2026, 3, 2, 12, 0),
    )
    .unwrap();

    // 495 + 10 crossed 500 within this very event.
    assert!(outcome.events.iter().any(|e| matches!(
        e,
        EngineEvent::AchievementUnlocked {
            achievement_type: AchievementType::Xp500,
            ..
        }
    )));
}

#[test]
fn expiry_check_is_separate_from_completion() {
    let store = ProgressStore::open_memory().unwrap();
    let child = seed_child(&store, "Yusuf");
    let lesson = seed_lesson(&store, LessonCategory::Arabic, 1, "Alif, Ba, Ta");
    start_lesson(&store, &child, &lesson);

    apply_lesson_completion_at(
        &store,
        child.id,
        lesson.id,
        80,
        lesson.xp_reward,
        local(2026, 3, 2, 10, 0),
    )
    .unwrap();

    // Two days of silence, then the app comes to the foreground.
    let mut stored = store.child(child.id).unwrap().unwrap();
    let engine = StreakEngine::new(&store);
    let reset = engine
        .check_and_reset_expired_streak_at(&mut stored, local(2026, 3, 5, 9, 0))
        .unwrap();
    assert!(reset);
    assert_eq!(stored.current_streak, 0);
    // A later completion starts over at 1, not 0.
    start_lesson(&store, &stored, &lesson);
    let outcome = apply_lesson_completion_at(
        &store,
        stored.id,
        lesson.id,
        80,
        lesson.xp_reward,
        local(2026, 3, 5, 10, 0),
    )
    .unwrap();
    assert_eq!(outcome.child.current_streak, 1);
}
