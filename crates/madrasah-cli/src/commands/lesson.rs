use clap::Subcommand;
use madrasah_core::{curriculum, ProgressStore};

use super::CliResult;

#[derive(Subcommand)]
pub enum LessonAction {
    /// Seed the bundled starter curriculum
    Seed,
    /// List lessons in curriculum order
    List {
        /// Only lessons for this week
        #[arg(long)]
        week: Option<u32>,
    },
}

pub fn run(action: LessonAction) -> CliResult {
    let store = ProgressStore::open()?;

    match action {
        LessonAction::Seed => {
            if !store.lessons()?.is_empty() {
                println!("Lessons already seeded");
                return Ok(());
            }
            let lessons = curriculum::default_curriculum();
            for lesson in &lessons {
                store.save_lesson(lesson)?;
            }
            println!("Seeded {} lessons", lessons.len());
        }
        LessonAction::List { week } => {
            let lessons = match week {
                Some(week) => store.lessons_for_week(week)?,
                None => store.lessons()?,
            };
            println!("{}", serde_json::to_string_pretty(&lessons)?);
        }
    }
    Ok(())
}
