//! Traffic Run State Library
//!
//! This crate provides the authoritative game logic for Traffic Run as a set
//! of deterministic transitions over a single game store.
//!
//! # Overview
//!
//! The state module provides:
//!
//! - **Obstacle Generation** - Obstacles derived purely from a timestamp, so
//!   every replica spawns the same one.
//!
//! - **Game Store** - Game sessions keyed by a hash-derived id, with a
//!   deterministic digest for checkpointing.
//!
//! - **Transitions** - Create, move, obstacle-and-score, game-over, and reset,
//!   each guarded by existence and ownership checks.
//!
//! - **State Machine** - Owns the store and dispatches named transitions
//!   handed over by the sequencer.
//!
//! # Design Principles
//!
//! 1. **Guards fail softly** - A rejected transition leaves the store as it
//!    was and reports a diagnostic event instead of an error.
//!
//! 2. **Deterministic** - Transitions depend only on the store, the inputs,
//!    the caller, and the block timestamp.
//!
//! 3. **No networking** - Signature recovery, sequencing, and HTTP live
//!    outside this crate.
//!
//! 4. **Serialization-ready** - The store round-trips through JSON.
//!
//! # Example
//!
//! ```rust
//! use traffic_run_state::state::{GameEvent, StateMachine, TransitionContext};
//!
//! let mut machine = StateMachine::default();
//! let owner = TransitionContext::new("0xA", 1000);
//!
//! let events = machine
//!     .apply_named(
//!         "createGame",
//!         serde_json::json!({"owner": "0xA", "initialSpeed": 2, "startedAt": 100}),
//!         &owner,
//!     )
//!     .unwrap();
//!
//! let game_id = match &events[0] {
//!     GameEvent::GameCreated { game_id } => game_id.clone(),
//!     other => panic!("unexpected {other}"),
//! };
//!
//! machine
//!     .apply_named(
//!         "userMove",
//!         serde_json::json!({"gameId": game_id, "actionType": "moveLeft", "timestamp": 0}),
//!         &owner,
//!     )
//!     .unwrap();
//!
//! assert_eq!(machine.get_game(&game_id).unwrap().car_position, 0);
//! ```

pub mod state;

// Re-export everything from state module at crate root
pub use state::*;
