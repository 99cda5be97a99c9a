use clap::Subcommand;
use madrasah_core::{AchievementEngine, AchievementType, ProgressStore};
use uuid::Uuid;

use super::CliResult;

#[derive(Subcommand)]
pub enum BadgesAction {
    /// Unlocked badges, or all badges with lock state
    List {
        #[arg(long)]
        locked: bool,
        #[arg(long)]
        child: Option<Uuid>,
    },
    /// Progress toward one locked badge
    Progress {
        /// Badge identifier, e.g. streak_7 or quran_master
        badge: String,
        #[arg(long)]
        child: Option<Uuid>,
    },
    /// Mark a badge's celebration as viewed
    Seen {
        badge: String,
        #[arg(long)]
        child: Option<Uuid>,
    },
}

fn parse_badge(s: &str) -> Result<AchievementType, Box<dyn std::error::Error>> {
    AchievementType::parse(s).ok_or_else(|| format!("unknown badge: {s}").into())
}

pub fn run(action: BadgesAction) -> CliResult {
    let store = ProgressStore::open()?;

    match action {
        BadgesAction::List { locked, child } => {
            let child = super::resolve_child(&store, child)?;
            let unlocked = store.achievements_for_child(child.id)?;
            if locked {
                let have: Vec<AchievementType> =
                    unlocked.iter().map(|a| a.achievement_type).collect();
                for badge in AchievementType::ALL {
                    if !have.contains(&badge) {
                        let meta = badge.meta();
                        println!("{} {}  ({})", meta.icon, meta.title, meta.id);
                    }
                }
            } else {
                println!("{}", serde_json::to_string_pretty(&unlocked)?);
            }
        }
        BadgesAction::Progress { badge, child } => {
            let child = super::resolve_child(&store, child)?;
            let badge = parse_badge(&badge)?;
            let engine = AchievementEngine::new(&store);
            match engine.progress_toward(badge, &child) {
                Some(progress) => println!("{}/{}", progress.current, progress.required),
                None => println!("No progress bar for this badge"),
            }
        }
        BadgesAction::Seen { badge, child } => {
            let child = super::resolve_child(&store, child)?;
            let badge = parse_badge(&badge)?;
            let engine = AchievementEngine::new(&store);
            let mut records = store.achievements_for_child(child.id)?;
            match records.iter_mut().find(|a| a.achievement_type == badge) {
                Some(record) => {
                    engine.mark_as_seen(record)?;
                    println!("Marked as seen");
                }
                None => println!("Badge not unlocked yet"),
            }
        }
    }
    Ok(())
}
