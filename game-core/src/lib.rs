use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod archive;
pub mod catalog;
pub mod results;
pub mod session;
pub mod storage;

pub use archive::{ArchiveSink, GameResultInput, GameResultRecord, NoArchive};
pub use results::{present_results, summarize, ResultView, Summary, SummaryError};
pub use session::{AssignOutcome, GameSession, Route};
pub use storage::{FileStore, GameStorage, KeyValueStore, MemoryStore, StorageError};

pub const DEFAULT_PARTICIPANT1_NAME: &str = "Participant 1";
pub const DEFAULT_PARTICIPANT2_NAME: &str = "Participant 2";

pub const SUPPORTIVE_MESSAGES: &[&str] = &[
    "Great teamwork!",
    "It's great when tasks are shared!",
    "Support and partnership make life easier",
    "Sharing the load strengthens your relationship!",
    "A wonderful example of shared responsibility!",
];

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HomeType {
    House,
    Apartment,
    #[default]
    #[serde(rename = "")]
    Unset,
}

impl HomeType {
    pub fn as_str(self) -> &'static str {
        match self {
            HomeType::House => "house",
            HomeType::Apartment => "apartment",
            HomeType::Unset => "",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdConditions {
    pub home_type: HomeType,
    pub has_children: bool,
    pub has_pets: bool,
    pub has_car: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ParticipantRef {
    Participant1,
    Participant2,
    Together,
    NotRelevant,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Counts {
    pub participant1: u32,
    pub participant2: u32,
    pub together: u32,
}

impl Counts {
    /// Decided tasks, i.e. everything except not-relevant ones.
    pub fn total(&self) -> u32 {
        self.participant1 + self.participant2 + self.together
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompletedAssignment {
    pub task: String,
    pub assigned_to: ParticipantRef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Unconfigured,
    InProgress,
    Complete,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum GameEvent {
    TaskAssigned {
        task: String,
        assigned_to: ParticipantRef,
    },
    SupportiveFeedback {
        message: String,
    },
    GameCompleted,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub participant1_name: String,
    pub participant2_name: String,
    pub conditions: HouseholdConditions,
    pub task_sequence: Vec<String>,
    pub current_index: usize,
    pub counts: Counts,
    pub completed_assignments: Vec<CompletedAssignment>,
}

impl GameState {
    /// Builds a fresh game: blank names fall back to placeholders and the task
    /// sequence is generated once from `conditions`.
    pub fn setup(
        participant1_name: &str,
        participant2_name: &str,
        conditions: HouseholdConditions,
    ) -> Self {
        Self {
            participant1_name: display_name(participant1_name, DEFAULT_PARTICIPANT1_NAME),
            participant2_name: display_name(participant2_name, DEFAULT_PARTICIPANT2_NAME),
            task_sequence: catalog::generate(&conditions),
            conditions,
            current_index: 0,
            counts: Counts::default(),
            completed_assignments: Vec::new(),
        }
    }

    pub fn phase(&self) -> GamePhase {
        if self.task_sequence.is_empty() {
            GamePhase::Unconfigured
        } else if self.current_index < self.task_sequence.len() {
            GamePhase::InProgress
        } else {
            GamePhase::Complete
        }
    }

    pub fn is_complete(&self) -> bool {
        self.phase() == GamePhase::Complete
    }

    pub fn current_task(&self) -> Option<&str> {
        self.task_sequence.get(self.current_index).map(String::as_str)
    }

    /// One-based position of the current task and the sequence length.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.task_sequence.len();
        ((self.current_index + 1).min(total), total)
    }

    pub fn not_relevant_count(&self) -> usize {
        self.completed_assignments
            .iter()
            .filter(|a| a.assigned_to == ParticipantRef::NotRelevant)
            .count()
    }

    /// Checks the invariants every state produced by `setup` and `assign`
    /// upholds. Anything read back from storage must pass this.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.current_index > self.task_sequence.len() {
            return Err(GameError::Malformed("cursor past end of task sequence"));
        }
        if self.completed_assignments.len() != self.current_index {
            return Err(GameError::Malformed("assignment log does not match cursor"));
        }
        let logged_tasks = self
            .completed_assignments
            .iter()
            .zip(&self.task_sequence)
            .all(|(done, task)| &done.task == task);
        if !logged_tasks {
            return Err(GameError::Malformed("assignment log out of task order"));
        }
        let mut tally = Counts::default();
        for done in &self.completed_assignments {
            match done.assigned_to {
                ParticipantRef::Participant1 => tally.participant1 += 1,
                ParticipantRef::Participant2 => tally.participant2 += 1,
                ParticipantRef::Together => tally.together += 1,
                ParticipantRef::NotRelevant => {}
            }
        }
        if tally != self.counts {
            return Err(GameError::Malformed("counters do not match assignment log"));
        }
        Ok(())
    }
}

fn display_name(raw: &str, fallback: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("game has not been set up")]
    NotConfigured,
    #[error("game already complete")]
    AlreadyComplete,
    #[error("malformed game state: {0}")]
    Malformed(&'static str),
}

/// Picks one entry uniformly at random. Callers pass the RNG so that seeded
/// sources give reproducible picks.
pub fn pick_random<'a, T, R: Rng + ?Sized>(pool: &'a [T], rng: &mut R) -> Option<&'a T> {
    pool.choose(rng)
}

/// Applies one decision to the task under the cursor.
///
/// On error the state is left untouched. The random feedback message only
/// shows up in the returned events.
pub fn assign<R: Rng + ?Sized>(
    state: &mut GameState,
    decision: ParticipantRef,
    rng: &mut R,
) -> Result<Vec<GameEvent>, GameError> {
    let task = match state.phase() {
        GamePhase::Unconfigured => return Err(GameError::NotConfigured),
        GamePhase::Complete => return Err(GameError::AlreadyComplete),
        GamePhase::InProgress => state.task_sequence[state.current_index].clone(),
    };

    let mut feedback = None;
    match decision {
        ParticipantRef::Participant1 => state.counts.participant1 += 1,
        ParticipantRef::Participant2 => state.counts.participant2 += 1,
        ParticipantRef::Together => {
            state.counts.together += 1;
            feedback = pick_random(SUPPORTIVE_MESSAGES, rng).map(|m| (*m).to_string());
        }
        ParticipantRef::NotRelevant => {}
    }

    state.completed_assignments.push(CompletedAssignment {
        task: task.clone(),
        assigned_to: decision,
    });
    state.current_index += 1;

    let mut events = vec![GameEvent::TaskAssigned {
        task,
        assigned_to: decision,
    }];
    if let Some(message) = feedback {
        events.push(GameEvent::SupportiveFeedback { message });
    }
    if state.is_complete() {
        events.push(GameEvent::GameCompleted);
    }

    Ok(events)
}
