//! State management module for Traffic Run.
//!
//! This module provides the core state types and the machine that owns them:
//!
//! - `obstacle` - Deterministic obstacle generation
//! - `game` - Game records and the keyed game store
//! - `event` - Result and diagnostic events
//! - `transition` - The five game transitions and their guards
//! - `action` - Name-based dispatch from sequencer requests
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          StateMachine                            │
//! │                                                                  │
//! │   id: "traffic-run"                                              │
//! │                                                                  │
//! │   ┌──────────────────────┐      ┌───────────────────────────┐   │
//! │   │      GameStore       │      │          Action           │   │
//! │   │                      │◀─────│  createGame               │   │
//! │   │  game_id → Game      │      │  userMove                 │   │
//! │   │                      │      │  generateObstacleAnd...   │   │
//! │   └──────────────────────┘      │  gameOver                 │   │
//! │                                 │  resetGame                │   │
//! │                                 └───────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────────┘
//!            ▲ apply(action, ctx) -> events       │ read()
//!            │                                    ▼
//!        sequencer                           read paths
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use traffic_run_state::state::{StateMachine, TransitionContext};
//!
//! let mut machine = StateMachine::default();
//! let events = machine.apply_named(
//!     "createGame",
//!     serde_json::json!({"owner": "0xA", "initialSpeed": 2, "startedAt": 100}),
//!     &TransitionContext::new("0xA", 1000),
//! )?;
//! ```

pub mod action;
pub mod event;
pub mod game;
pub mod identity;
pub mod obstacle;
pub mod transition;

// Re-export commonly used types
pub use action::{Action, ActionError, TRANSITION_NAMES};
pub use event::GameEvent;
pub use game::{
    derive_game_id, Game, GameStore, SnapshotError, INITIAL_CAR_POSITION, INITIAL_SCORE,
    LEFT_LANE, RESET_SCORE, RESET_SPEED, RIGHT_LANE,
};
pub use identity::same_identity;
pub use obstacle::{Obstacle, LANE_COUNT, OBSTACLE_SPAWN_Z};
pub use transition::{
    CreateGame, EndGame, GenerateObstacle, MoveAction, ResetGame, TransitionContext, UserMove,
};

/// Identifier used when none is given.
pub const DEFAULT_MACHINE_ID: &str = "traffic-run";

/// The state machine shell.
///
/// Owns one [`GameStore`] and replaces it transition by transition. The
/// sequencer guarantees transitions arrive one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMachine {
    id: String,
    store: GameStore,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new(DEFAULT_MACHINE_ID)
    }
}

impl StateMachine {
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_store(id, GameStore::new())
    }

    /// Create a machine around an existing store (for restoring state).
    pub fn with_store(id: impl Into<String>, store: GameStore) -> Self {
        Self {
            id: id.into(),
            store,
        }
    }

    /// Restore a machine from a JSON store snapshot.
    pub fn restore(id: impl Into<String>, snapshot: &str) -> Result<Self, SnapshotError> {
        Ok(Self::with_store(id, GameStore::from_json(snapshot)?))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current store.
    pub fn read(&self) -> &GameStore {
        &self.store
    }

    /// Look up a single game.
    pub fn get_game(&self, game_id: &str) -> Option<&Game> {
        self.store.get(game_id)
    }

    /// Apply a typed action, returning the emitted events.
    pub fn apply(&mut self, action: Action, ctx: &TransitionContext) -> Vec<GameEvent> {
        let events = action.apply_to(&mut self.store, ctx);
        // Guard failures are already logged by the transition that hit them.
        for event in &events {
            log::debug!("[{}] {}: {}", self.id, event.name(), event);
        }
        events
    }

    /// Apply a transition by name with raw JSON inputs.
    pub fn apply_named(
        &mut self,
        name: &str,
        inputs: serde_json::Value,
        ctx: &TransitionContext,
    ) -> Result<Vec<GameEvent>, ActionError> {
        let action = Action::from_named(name, inputs)?;
        Ok(self.apply(action, ctx))
    }

    /// Serialize the current store.
    pub fn snapshot(&self) -> Result<String, SnapshotError> {
        self.store.to_snapshot()
    }

    /// Digest of the current store.
    pub fn digest(&self) -> String {
        self.store.digest()
    }

    /// Give up the machine, keeping its store.
    pub fn into_store(self) -> GameStore {
        self.store
    }
}
