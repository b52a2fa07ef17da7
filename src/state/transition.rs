//! Game transitions.
//!
//! Each transition validates, then mutates. A failed guard leaves the store
//! untouched and returns a single diagnostic event.
//!
//! Guards run in a fixed order for every transition on an existing game:
//!
//! ```text
//! game exists? ──no──▶ GameNotFound
//!      │yes
//!      ▼
//! caller owns it? ──no──▶ UnauthorizedAction / UnauthorizedReset
//!      │yes
//!      ▼
//!   mutate, emit result events
//! ```

use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::event::GameEvent;
use super::game::{Game, GameStore};
use super::identity::same_identity;

/// Ambient facts the sequencer supplies with every transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionContext {
    /// Identity recovered from the request signature
    pub caller: String,

    /// Timestamp of the block the transition is sequenced into
    pub block_timestamp: i64,
}

impl TransitionContext {
    pub fn new(caller: impl Into<String>, block_timestamp: i64) -> Self {
        Self {
            caller: caller.into(),
            block_timestamp,
        }
    }
}

/// Inputs of the create transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGame {
    pub owner: String,
    /// Zero is rejected when the inputs are parsed
    pub initial_speed: NonZeroU32,
    pub started_at: i64,
}

/// Move requested by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MoveAction {
    MoveLeft,
    MoveRight,
    /// Anything else; rejected with `InvalidAction` once guards pass
    Unknown(String),
}

impl MoveAction {
    pub fn as_str(&self) -> &str {
        match self {
            Self::MoveLeft => "moveLeft",
            Self::MoveRight => "moveRight",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for MoveAction {
    fn from(raw: &str) -> Self {
        match raw {
            "moveLeft" => Self::MoveLeft,
            "moveRight" => Self::MoveRight,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for MoveAction {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "moveLeft" => Self::MoveLeft,
            "moveRight" => Self::MoveRight,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<MoveAction> for String {
    fn from(action: MoveAction) -> Self {
        match action {
            MoveAction::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MoveAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs of the move transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMove {
    pub game_id: String,
    pub action_type: MoveAction,
    /// Accepted for wire compatibility; not used by the transition
    pub timestamp: i64,
}

/// Inputs of the obstacle-and-score transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateObstacle {
    pub game_id: String,
    pub timestamp: i64,
}

/// Inputs of the game-over transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndGame {
    pub game_id: String,
    pub over: bool,
    pub timestamp: i64,
}

/// Inputs of the reset transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetGame {
    pub game_id: String,
    /// Accepted for wire compatibility; reset uses the block timestamp
    pub timestamp: i64,
}

/// Look up a game the caller owns, or the diagnostic explaining why not.
fn owned_game<'a>(
    store: &'a mut GameStore,
    game_id: &str,
    caller: &str,
    unauthorized: fn(String, String) -> GameEvent,
) -> Result<&'a mut Game, GameEvent> {
    let Some(game) = store.get_mut(game_id) else {
        log::warn!("game {} not found", game_id);
        return Err(GameEvent::GameNotFound {
            game_id: game_id.to_string(),
        });
    };

    if !game.is_owned_by(caller) {
        log::warn!("{} does not own game {}", caller, game_id);
        return Err(unauthorized(game_id.to_string(), caller.to_string()));
    }

    Ok(game)
}

fn unauthorized_action(game_id: String, caller: String) -> GameEvent {
    GameEvent::UnauthorizedAction { game_id, caller }
}

fn unauthorized_reset(game_id: String, caller: String) -> GameEvent {
    GameEvent::UnauthorizedReset { game_id, caller }
}

/// Create a game owned by the caller.
pub fn create_game(
    store: &mut GameStore,
    ctx: &TransitionContext,
    input: CreateGame,
) -> Vec<GameEvent> {
    if !same_identity(&ctx.caller, &input.owner) {
        log::warn!(
            "create rejected: signer {} is not owner {}",
            ctx.caller,
            input.owner
        );
        return vec![GameEvent::InvalidSigner {
            caller: ctx.caller.clone(),
            owner: input.owner,
        }];
    }

    let game = Game::new(
        input.owner,
        input.initial_speed.get(),
        input.started_at,
        ctx.block_timestamp,
    );
    let game_id = store.insert_new(&ctx.caller, ctx.block_timestamp, game);
    log::info!("game {} created by {}", game_id, ctx.caller);

    vec![GameEvent::GameCreated { game_id }]
}

/// Move the car one lane left or right.
pub fn user_move(
    store: &mut GameStore,
    ctx: &TransitionContext,
    input: UserMove,
) -> Vec<GameEvent> {
    let game = match owned_game(store, &input.game_id, &ctx.caller, unauthorized_action) {
        Ok(game) => game,
        Err(diagnostic) => return vec![diagnostic],
    };

    match input.action_type {
        MoveAction::MoveLeft if game.move_left() => vec![GameEvent::CarMovedLeft {
            game_id: input.game_id,
            position: game.car_position,
        }],
        MoveAction::MoveRight if game.move_right() => vec![GameEvent::CarMovedRight {
            game_id: input.game_id,
            position: game.car_position,
        }],
        MoveAction::MoveLeft | MoveAction::MoveRight => {
            log::debug!(
                "{} on game {} ignored at position {}",
                input.action_type,
                input.game_id,
                game.car_position
            );
            Vec::new()
        }
        MoveAction::Unknown(action) => {
            log::warn!("invalid action {:?} on game {}", action, input.game_id);
            vec![GameEvent::InvalidAction {
                game_id: input.game_id,
                action,
            }]
        }
    }
}

/// Spawn a fresh obstacle and add the game's speed to its score.
pub fn generate_obstacle_and_score_update(
    store: &mut GameStore,
    ctx: &TransitionContext,
    input: GenerateObstacle,
) -> Vec<GameEvent> {
    let game = match owned_game(store, &input.game_id, &ctx.caller, unauthorized_action) {
        Ok(game) => game,
        Err(diagnostic) => return vec![diagnostic],
    };

    let lane = game.spawn_obstacle(input.timestamp).lane;
    let score = game.add_score();
    log::debug!("game {} scored, now {}", input.game_id, score);

    vec![
        GameEvent::ObstacleGenerated {
            game_id: input.game_id.clone(),
            lane,
        },
        GameEvent::ScoreUpdated {
            game_id: input.game_id,
            score,
        },
    ]
}

/// Set the game-over flag and stamp the end time.
pub fn game_over(store: &mut GameStore, ctx: &TransitionContext, input: EndGame) -> Vec<GameEvent> {
    let game = match owned_game(store, &input.game_id, &ctx.caller, unauthorized_action) {
        Ok(game) => game,
        Err(diagnostic) => return vec![diagnostic],
    };

    game.set_game_over(input.over, input.timestamp);
    log::debug!(
        "game {} over={} at {}",
        input.game_id,
        input.over,
        input.timestamp
    );

    vec![GameEvent::GameOver {
        game_id: input.game_id,
        over: input.over,
    }]
}

/// Put a game back to a fresh run.
pub fn reset_game(
    store: &mut GameStore,
    ctx: &TransitionContext,
    input: ResetGame,
) -> Vec<GameEvent> {
    let game = match owned_game(store, &input.game_id, &ctx.caller, unauthorized_reset) {
        Ok(game) => game,
        Err(diagnostic) => return vec![diagnostic],
    };

    game.reset(ctx.block_timestamp);
    log::info!("game {} reset by {}", input.game_id, ctx.caller);

    vec![GameEvent::GameReset {
        game_id: input.game_id,
    }]
}
