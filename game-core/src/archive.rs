use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::GameState;

/// Submission payload. Names and home type are required; the flags and
/// counters default to `false` / `0` when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameResultInput {
    pub participant1_name: String,
    pub participant2_name: String,
    pub home_type: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(default)]
    pub has_pets: bool,
    #[serde(default)]
    pub has_car: bool,
    #[serde(default)]
    pub participant1_tasks: u32,
    #[serde(default)]
    pub participant2_tasks: u32,
    #[serde(default)]
    pub together_tasks: u32,
}

impl GameResultInput {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            participant1_name: state.participant1_name.clone(),
            participant2_name: state.participant2_name.clone(),
            home_type: state.conditions.home_type.as_str().to_string(),
            has_children: state.conditions.has_children,
            has_pets: state.conditions.has_pets,
            has_car: state.conditions.has_car,
            participant1_tasks: state.counts.participant1,
            participant2_tasks: state.counts.participant2,
            together_tasks: state.counts.together,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameResultRecord {
    pub id: Uuid,
    pub participant1_name: String,
    pub participant2_name: String,
    pub home_type: String,
    pub has_children: bool,
    pub has_pets: bool,
    pub has_car: bool,
    pub participant1_tasks: u32,
    pub participant2_tasks: u32,
    pub together_tasks: u32,
    pub completed_at: DateTime<Utc>,
}

impl GameResultRecord {
    pub fn new(input: GameResultInput, id: Uuid, completed_at: DateTime<Utc>) -> Self {
        Self {
            id,
            participant1_name: input.participant1_name,
            participant2_name: input.participant2_name,
            home_type: input.home_type,
            has_children: input.has_children,
            has_pets: input.has_pets,
            has_car: input.has_car,
            participant1_tasks: input.participant1_tasks,
            participant2_tasks: input.participant2_tasks,
            together_tasks: input.together_tasks,
            completed_at,
        }
    }
}

/// One-way hand-off of finished games. Implementations must not block the
/// caller and must not report failures back; the local game stays the
/// authoritative record either way.
pub trait ArchiveSink {
    fn submit(&self, result: GameResultInput);
}

/// Sink for sessions that do not archive results.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoArchive;

impl ArchiveSink for NoArchive {
    fn submit(&self, _result: GameResultInput) {}
}
