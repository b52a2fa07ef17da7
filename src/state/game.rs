//! Game state management.
//!
//! Tracks Traffic Run sessions: car lane, obstacle, speed, and scoring.
//! The [`GameStore`] is the whole mutable state of the system and the unit
//! the external sequencer checkpoints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::action::Action;
use super::event::GameEvent;
use super::identity::same_identity;
use super::obstacle::{Obstacle, LANE_COUNT};
use super::transition::TransitionContext;

/// Lane the car starts in.
pub const INITIAL_CAR_POSITION: u8 = 1;

/// Score of a game that has not scored yet.
pub const INITIAL_SCORE: i64 = -1;

/// Speed a game is put back to on reset.
pub const RESET_SPEED: u32 = 1;

/// Score a game is put back to on reset.
pub const RESET_SCORE: i64 = 0;

/// Left lane index.
pub const LEFT_LANE: u8 = 0;

/// Right lane index.
pub const RIGHT_LANE: u8 = 1;

/// Game session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    /// Identity that created the game
    pub owner: String,

    /// Lane the car is in
    pub car_position: u8,

    /// Points added per scoring event
    pub speed: u32,

    /// Current score (-1 until the first scoring event)
    pub score: i64,

    /// Current obstacle
    pub obstacle: Obstacle,

    /// Whether the game has ended
    pub is_game_over: bool,

    /// Client-supplied start time
    pub started_at: i64,

    /// When the game ended
    pub ended_at: Option<i64>,
}

impl Game {
    /// Create a new game.
    ///
    /// The first obstacle is generated from the block timestamp, not from
    /// `started_at`.
    pub fn new(owner: String, speed: u32, started_at: i64, block_timestamp: i64) -> Self {
        Self {
            owner,
            car_position: INITIAL_CAR_POSITION,
            speed,
            score: INITIAL_SCORE,
            obstacle: Obstacle::generate(block_timestamp),
            is_game_over: false,
            started_at,
            ended_at: None,
        }
    }

    /// Check if `caller` owns this game.
    pub fn is_owned_by(&self, caller: &str) -> bool {
        same_identity(&self.owner, caller)
    }

    /// Move the car to the left lane. Returns false if already there.
    pub fn move_left(&mut self) -> bool {
        if self.car_position != RIGHT_LANE {
            return false;
        }
        self.car_position = LEFT_LANE;
        true
    }

    /// Move the car to the right lane. Returns false if already there.
    pub fn move_right(&mut self) -> bool {
        if self.car_position != LEFT_LANE {
            return false;
        }
        self.car_position = RIGHT_LANE;
        true
    }

    /// Replace the obstacle with the one spawned at `timestamp`.
    pub fn spawn_obstacle(&mut self, timestamp: i64) -> &Obstacle {
        self.obstacle = Obstacle::generate(timestamp);
        &self.obstacle
    }

    /// Add the current speed to the score, returning the new score.
    pub fn add_score(&mut self) -> i64 {
        self.score = self.score.saturating_add(i64::from(self.speed));
        self.score
    }

    /// Set the game-over flag.
    ///
    /// `ended_at` is stamped whatever the value of `over`.
    pub fn set_game_over(&mut self, over: bool, timestamp: i64) {
        self.is_game_over = over;
        self.ended_at = Some(timestamp);
    }

    /// Put the game back to a fresh run, keeping owner and start time.
    pub fn reset(&mut self, block_timestamp: i64) {
        *self = Self {
            owner: std::mem::take(&mut self.owner),
            car_position: INITIAL_CAR_POSITION,
            speed: RESET_SPEED,
            score: RESET_SCORE,
            obstacle: Obstacle::generate(block_timestamp),
            is_game_over: false,
            started_at: self.started_at,
            ended_at: None,
        };
    }

    /// Length of the run, once it has ended.
    pub fn duration(&self) -> Option<i64> {
        self.ended_at
            .map(|ended| ended.saturating_sub(self.started_at))
    }

    /// Convert to the JSON record served to read paths.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "owner": self.owner,
            "carPosition": self.car_position,
            "speed": self.speed,
            "score": self.score,
            "obstacle": {"lane": self.obstacle.lane, "z": self.obstacle.z},
            "isGameOver": self.is_game_over,
            "startedAt": self.started_at,
            "endedAt": self.ended_at
        })
    }
}

/// Errors loading or saving a store snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid store snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot holds out-of-range lane {lane} for game {game_id}")]
    LaneOutOfRange { game_id: String, lane: u8 },
    #[error("snapshot holds zero speed for game {game_id}")]
    ZeroSpeed { game_id: String },
}

/// Game store - every game keyed by id.
///
/// Ordered so that serialization, and therefore [`GameStore::digest`], is
/// deterministic across replicas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStore {
    games: BTreeMap<String, Game>,
}

impl GameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a game.
    pub fn get(&self, game_id: &str) -> Option<&Game> {
        self.games.get(game_id)
    }

    /// Get a mutable game.
    pub fn get_mut(&mut self, game_id: &str) -> Option<&mut Game> {
        self.games.get_mut(game_id)
    }

    /// Check if a game exists.
    pub fn contains(&self, game_id: &str) -> bool {
        self.games.contains_key(game_id)
    }

    /// Total game count.
    pub fn count(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Iterate games in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Game)> {
        self.games.iter().map(|(id, game)| (id.as_str(), game))
    }

    /// Games owned by `owner`.
    pub fn owned_by<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = (&'a str, &'a Game)> {
        self.iter().filter(move |(_, game)| game.is_owned_by(owner))
    }

    /// Insert a new game under a freshly derived id and return the id.
    pub(crate) fn insert_new(&mut self, caller: &str, block_timestamp: i64, game: Game) -> String {
        let mut nonce = self.games.len() as u64;
        let mut game_id = derive_game_id(caller, block_timestamp, nonce);
        // Only a hand-edited snapshot can make the derived id collide.
        while self.games.contains_key(&game_id) {
            nonce += 1;
            game_id = derive_game_id(caller, block_timestamp, nonce);
        }
        self.games.insert(game_id.clone(), game);
        game_id
    }

    /// Apply an action to a copy of the store.
    pub fn apply(&self, action: Action, ctx: &TransitionContext) -> (Self, Vec<GameEvent>) {
        let mut next = self.clone();
        let events = action.apply_to(&mut next, ctx);
        (next, events)
    }

    /// Hex SHA-256 of the compact JSON of the games mapping.
    ///
    /// Rendering a [`serde_json::Value`] cannot fail, so the digest always
    /// covers the whole mapping.
    pub fn digest(&self) -> String {
        let rendered = serde_json::Value::Object(self.games_json()).to_string();
        let mut hasher = Sha256::new();
        hasher.update(rendered.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Serialize as `{ "games": { id: Game } }`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "games": self.games_json() })
    }

    fn games_json(&self) -> serde_json::Map<String, serde_json::Value> {
        self.games
            .iter()
            .map(|(id, game)| (id.clone(), game.to_json()))
            .collect()
    }

    /// Load a store from a JSON snapshot.
    pub fn from_json(snapshot: &str) -> Result<Self, SnapshotError> {
        let store: Self = serde_json::from_str(snapshot)?;
        for (game_id, game) in &store.games {
            if game.speed == 0 {
                return Err(SnapshotError::ZeroSpeed {
                    game_id: game_id.clone(),
                });
            }
            for lane in [game.car_position, game.obstacle.lane] {
                if lane >= LANE_COUNT {
                    return Err(SnapshotError::LaneOutOfRange {
                        game_id: game_id.clone(),
                        lane,
                    });
                }
            }
        }
        Ok(store)
    }

    /// Serialize to a JSON snapshot string.
    pub fn to_snapshot(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Derive a game id from the creating caller, block time, and a nonce.
pub fn derive_game_id(caller: &str, block_timestamp: i64, nonce: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(caller.as_bytes());
    hasher.update(block_timestamp.to_be_bytes());
    hasher.update(nonce.to_be_bytes());
    format!("0x{:x}", hasher.finalize())
}
