use chrono::Utc;
use clap::Subcommand;
use madrasah_core::{AchievementEngine, FamilyActivity, ProgressStore};
use uuid::Uuid;

use super::CliResult;

#[derive(Subcommand)]
pub enum FamilyAction {
    /// Log a completed family activity and re-run the badge sweep
    Log {
        title: String,
        #[arg(long)]
        child: Option<Uuid>,
    },
    /// List logged activities
    List {
        #[arg(long)]
        child: Option<Uuid>,
    },
}

pub fn run(action: FamilyAction) -> CliResult {
    let store = ProgressStore::open()?;

    match action {
        FamilyAction::Log { title, child } => {
            let mut child = super::resolve_child(&store, child)?;
            store.save_family_activity(&FamilyActivity::completed(child.id, title, Utc::now()))?;
            let newly = AchievementEngine::new(&store).check_and_unlock(&mut child)?;
            for badge in &newly {
                let meta = badge.achievement_type.meta();
                println!("Unlocked: {} {}", meta.icon, meta.title);
            }
        }
        FamilyAction::List { child } => {
            let child = super::resolve_child(&store, child)?;
            let activities = store.family_activities(child.id)?;
            println!("{}", serde_json::to_string_pretty(&activities)?);
        }
    }
    Ok(())
}
