use clap::Subcommand;
use madrasah_core::{apply_lesson_completion, ProgressStore, ProgressTracker};
use uuid::Uuid;

use super::CliResult;

#[derive(Subcommand)]
pub enum LearnAction {
    /// Record a finished phase within a lesson
    Phase {
        /// Lesson order number (see `lesson list`)
        lesson: u32,
        /// Phase name, e.g. hook, teach, practice, reward
        phase: String,
        #[arg(long)]
        child: Option<Uuid>,
    },
    /// Show where a partially played lesson stopped
    Resume {
        lesson: u32,
        #[arg(long)]
        child: Option<Uuid>,
    },
    /// Finalize a lesson attempt and run streak + achievement checks
    Complete {
        lesson: u32,
        #[arg(long)]
        score: u32,
        /// XP for this attempt; defaults to the lesson's reward
        #[arg(long)]
        xp: Option<u32>,
        #[arg(long)]
        child: Option<Uuid>,
    },
    /// Drop partial progress to restart a lesson from the top
    Restart {
        lesson: u32,
        #[arg(long)]
        child: Option<Uuid>,
    },
}

pub fn run(action: LearnAction) -> CliResult {
    let store = ProgressStore::open()?;

    match action {
        LearnAction::Phase {
            lesson,
            phase,
            child,
        } => {
            let child = super::resolve_child(&store, child)?;
            let lesson = super::resolve_lesson(&store, lesson)?;
            let progress =
                ProgressTracker::new(&store).save_phase_progress(lesson.id, child.id, &phase)?;
            println!("{}", serde_json::to_string_pretty(&progress)?);
        }
        LearnAction::Resume { lesson, child } => {
            let child = super::resolve_child(&store, child)?;
            let lesson = super::resolve_lesson(&store, lesson)?;
            match ProgressTracker::new(&store).load_partial_progress(lesson.id, child.id)? {
                Some(phase) => println!("Stopped after: {phase}"),
                None => println!("Nothing to resume"),
            }
        }
        LearnAction::Complete {
            lesson,
            score,
            xp,
            child,
        } => {
            let child = super::resolve_child(&store, child)?;
            let lesson = super::resolve_lesson(&store, lesson)?;
            let xp = xp.unwrap_or(lesson.xp_reward);
            let outcome = apply_lesson_completion(&store, child.id, lesson.id, score, xp)?;
            println!("{}", serde_json::to_string_pretty(&outcome.events)?);
            println!(
                "Streak: {}  XP: {}  Lessons: {}",
                outcome.child.current_streak,
                outcome.child.total_xp,
                outcome.child.total_lessons_completed
            );
        }
        LearnAction::Restart { lesson, child } => {
            let child = super::resolve_child(&store, child)?;
            let lesson = super::resolve_lesson(&store, lesson)?;
            ProgressTracker::new(&store).clear_partial_progress(lesson.id, child.id)?;
            println!("Partial progress cleared");
        }
    }
    Ok(())
}
