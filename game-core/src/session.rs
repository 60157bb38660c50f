use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::archive::{ArchiveSink, GameResultInput};
use crate::results::{present_results, ResultView};
use crate::storage::{GameStorage, KeyValueStore};
use crate::{
    assign, GameError, GameEvent, GamePhase, GameState, HouseholdConditions, ParticipantRef,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Welcome,
    Setup,
    Game,
    Results,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignOutcome {
    pub events: Vec<GameEvent>,
    pub next: Route,
}

/// Client-side game flow: setup, one decision at a time, results, restart.
///
/// The stored game is the source of truth. Missing or unreadable data sends
/// the player back to setup; only a failing medium keeps the in-memory copy.
pub struct GameSession<S, A, R = ChaCha8Rng> {
    storage: GameStorage<S>,
    archive: A,
    rng: R,
    state: GameState,
}

impl<S: KeyValueStore, A: ArchiveSink> GameSession<S, A, ChaCha8Rng> {
    pub fn new(store: S, archive: A) -> Self {
        Self::with_rng(store, archive, ChaCha8Rng::from_entropy())
    }
}

impl<S: KeyValueStore, A: ArchiveSink, R: Rng> GameSession<S, A, R> {
    pub fn with_rng(store: S, archive: A, rng: R) -> Self {
        Self {
            storage: GameStorage::new(store),
            archive,
            rng,
            state: GameState::default(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn storage(&self) -> &GameStorage<S> {
        &self.storage
    }

    /// Starts a new game, replacing whatever was stored before.
    pub fn begin(
        &mut self,
        participant1_name: &str,
        participant2_name: &str,
        conditions: HouseholdConditions,
    ) -> &GameState {
        self.state = GameState::setup(participant1_name, participant2_name, conditions);
        self.storage.save(&self.state);
        info!(
            tasks = self.state.task_sequence.len(),
            "new game set up"
        );
        &self.state
    }

    fn reload(&mut self) {
        match self.storage.try_load() {
            Ok(Some(stored)) => self.state = stored,
            Ok(None) => self.state = GameState::default(),
            Err(err) => warn!(%err, "storage unreadable, continuing from memory"),
        }
    }

    /// Guard for the game screen.
    pub fn enter_game(&mut self) -> Result<&GameState, Route> {
        self.reload();
        match self.state.phase() {
            GamePhase::Unconfigured => Err(Route::Setup),
            GamePhase::Complete => Err(Route::Results),
            GamePhase::InProgress => Ok(&self.state),
        }
    }

    /// Guard for the results screen. Draws a fresh quote on every call.
    pub fn enter_results(&mut self) -> Result<ResultView, Route> {
        self.reload();
        if self.state.phase() == GamePhase::Unconfigured || self.state.current_index == 0 {
            return Err(Route::Welcome);
        }
        present_results(&self.state, &mut self.rng).map_err(|_| Route::Welcome)
    }

    /// Applies one decision and persists the result. Finishing the last task
    /// hands a summary to the archive sink.
    pub fn assign(&mut self, decision: ParticipantRef) -> Result<AssignOutcome, GameError> {
        let events = assign(&mut self.state, decision, &mut self.rng)?;
        self.storage.save(&self.state);

        let next = if self.state.is_complete() {
            info!(
                participant1 = self.state.counts.participant1,
                participant2 = self.state.counts.participant2,
                together = self.state.counts.together,
                "game complete"
            );
            self.archive.submit(GameResultInput::from_state(&self.state));
            Route::Results
        } else {
            Route::Game
        };

        Ok(AssignOutcome { events, next })
    }

    pub fn restart(&mut self) -> Route {
        self.storage.clear();
        self.state = GameState::default();
        Route::Welcome
    }
}
