use chrono::Local;
use clap::Subcommand;
use madrasah_core::{hours_remaining_today, next_milestone, ProgressStore, StreakEngine};
use uuid::Uuid;

use super::CliResult;

#[derive(Subcommand)]
pub enum StreakAction {
    /// Current streak, next milestone, and hours left today
    Status {
        #[arg(long)]
        child: Option<Uuid>,
    },
    /// App-foreground expiry check: zero the streak if a full day was missed
    Check {
        #[arg(long)]
        child: Option<Uuid>,
    },
}

pub fn run(action: StreakAction) -> CliResult {
    let store = ProgressStore::open()?;

    match action {
        StreakAction::Status { child } => {
            let child = super::resolve_child(&store, child)?;
            println!(
                "Streak: {} day(s)  Longest: {}",
                child.current_streak, child.longest_streak
            );
            match next_milestone(child.current_streak) {
                Some(m) => println!(
                    "Next milestone: {} days (+{} XP)",
                    m.days, m.xp_reward
                ),
                None => println!("All milestones reached"),
            }
            println!(
                "Hours left today: {}",
                hours_remaining_today(Local::now())
            );
        }
        StreakAction::Check { child } => {
            let mut child = super::resolve_child(&store, child)?;
            let reset = StreakEngine::new(&store).check_and_reset_expired_streak(&mut child)?;
            if reset {
                println!("Streak expired and was reset to 0");
            } else {
                println!("Streak intact: {} day(s)", child.current_streak);
            }
        }
    }
    Ok(())
}
