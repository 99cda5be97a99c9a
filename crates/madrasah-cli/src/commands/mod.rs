pub mod badges;
pub mod child;
pub mod family;
pub mod learn;
pub mod lesson;
pub mod streak;

use madrasah_core::{Child, Config, Lesson, ProgressStore};
use uuid::Uuid;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Resolve the child a command operates on: an explicit `--child` id wins,
/// otherwise the active child from config.
pub fn resolve_child(store: &ProgressStore, id: Option<Uuid>) -> Result<Child, Box<dyn std::error::Error>> {
    let id = match id {
        Some(id) => id,
        None => Config::load()?
            .active_child
            .ok_or("no child selected; run `child select <id>` or pass --child")?,
    };
    store
        .child(id)?
        .ok_or_else(|| format!("child {id} not found").into())
}

/// Look a lesson up by its curriculum order number.
pub fn resolve_lesson(store: &ProgressStore, order: u32) -> Result<Lesson, Box<dyn std::error::Error>> {
    store
        .lessons()?
        .into_iter()
        .find(|l| l.order == order)
        .ok_or_else(|| format!("no lesson with order {order}; run `lesson list`").into())
}
