use clap::Subcommand;
use madrasah_core::{Child, Config, ProgressStore};
use uuid::Uuid;

use super::CliResult;

#[derive(Subcommand)]
pub enum ChildAction {
    /// Create a child profile
    Add { name: String },
    /// List all profiles
    List,
    /// Show one profile
    Show {
        #[arg(long)]
        child: Option<Uuid>,
    },
    /// Make a profile the default for other commands
    Select { id: Uuid },
}

pub fn run(action: ChildAction) -> CliResult {
    let store = ProgressStore::open()?;

    match action {
        ChildAction::Add { name } => {
            let child = Child::new(name);
            store.save_child(&child)?;
            println!("{}", serde_json::to_string_pretty(&child)?);
        }
        ChildAction::List => {
            let children = store.children()?;
            println!("{}", serde_json::to_string_pretty(&children)?);
        }
        ChildAction::Show { child } => {
            let child = super::resolve_child(&store, child)?;
            println!("{}", serde_json::to_string_pretty(&child)?);
        }
        ChildAction::Select { id } => {
            let child = store
                .child(id)?
                .ok_or_else(|| format!("child {id} not found"))?;
            let mut config = Config::load()?;
            config.active_child = Some(child.id);
            config.save()?;
            println!("Selected: {} ({})", child.name, child.id);
        }
    }
    Ok(())
}
