//! Family activity records, counted by the social achievement predicates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An activity a child did together with their family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyActivity {
    pub id: Uuid,
    pub child_id: Uuid,
    pub title: String,
    pub completed_at: Option<DateTime<Utc>>,
}

impl FamilyActivity {
    /// A completed activity logged at `at`.
    pub fn completed(child_id: Uuid, title: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            child_id,
            title: title.into(),
            completed_at: Some(at),
        }
    }
}
