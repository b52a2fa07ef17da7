//! Events emitted by transitions.
//!
//! Guard failures never abort a transition. They surface as diagnostic
//! events next to the success events, and callers detect failure by the
//! absence of the expected success event.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A result or diagnostic record produced by a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum GameEvent {
    GameCreated { game_id: String },
    CarMovedLeft { game_id: String, position: u8 },
    CarMovedRight { game_id: String, position: u8 },
    ObstacleGenerated { game_id: String, lane: u8 },
    ScoreUpdated { game_id: String, score: i64 },
    GameOver { game_id: String, over: bool },
    GameReset { game_id: String },

    /// Creator is not the declared owner
    InvalidSigner { caller: String, owner: String },
    /// No game under the given id
    GameNotFound { game_id: String },
    /// Caller does not own the game
    UnauthorizedAction { game_id: String, caller: String },
    /// Caller does not own the game it tried to reset
    UnauthorizedReset { game_id: String, caller: String },
    /// Unrecognized move action
    InvalidAction { game_id: String, action: String },
}

impl GameEvent {
    /// Stable event name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::GameCreated { .. } => "GameCreated",
            Self::CarMovedLeft { .. } => "CarMovedLeft",
            Self::CarMovedRight { .. } => "CarMovedRight",
            Self::ObstacleGenerated { .. } => "ObstacleGenerated",
            Self::ScoreUpdated { .. } => "ScoreUpdated",
            Self::GameOver { .. } => "GameOver",
            Self::GameReset { .. } => "GameReset",
            Self::InvalidSigner { .. } => "InvalidSigner",
            Self::GameNotFound { .. } => "GameNotFound",
            Self::UnauthorizedAction { .. } => "UnauthorizedAction",
            Self::UnauthorizedReset { .. } => "UnauthorizedReset",
            Self::InvalidAction { .. } => "InvalidAction",
        }
    }

    /// Check if this event reports a rejected transition.
    pub fn is_diagnostic(&self) -> bool {
        matches!(
            self,
            Self::InvalidSigner { .. }
                | Self::GameNotFound { .. }
                | Self::UnauthorizedAction { .. }
                | Self::UnauthorizedReset { .. }
                | Self::InvalidAction { .. }
        )
    }

    /// Game the event refers to, if any.
    pub fn game_id(&self) -> Option<&str> {
        match self {
            Self::InvalidSigner { .. } => None,
            Self::GameCreated { game_id }
            | Self::CarMovedLeft { game_id, .. }
            | Self::CarMovedRight { game_id, .. }
            | Self::ObstacleGenerated { game_id, .. }
            | Self::ScoreUpdated { game_id, .. }
            | Self::GameOver { game_id, .. }
            | Self::GameReset { game_id }
            | Self::GameNotFound { game_id }
            | Self::UnauthorizedAction { game_id, .. }
            | Self::UnauthorizedReset { game_id, .. }
            | Self::InvalidAction { game_id, .. } => Some(game_id.as_str()),
        }
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GameCreated { game_id } => write!(f, "Game created with ID {}", game_id),
            Self::CarMovedLeft { position, .. } => {
                write!(f, "Car moved left to position {}", position)
            }
            Self::CarMovedRight { position, .. } => {
                write!(f, "Car moved right to position {}", position)
            }
            Self::ObstacleGenerated { lane, .. } => {
                write!(f, "Obstacle generated in lane {}", lane)
            }
            Self::ScoreUpdated { score, .. } => write!(f, "Score updated to {}", score),
            Self::GameOver { over, .. } => {
                let status = if *over { "over" } else { "active" };
                write!(f, "Game is {}", status)
            }
            Self::GameReset { game_id } => write!(f, "Game {} reset", game_id),
            Self::InvalidSigner { caller, owner } => {
                write!(f, "Signer {} is not the declared owner {}", caller, owner)
            }
            Self::GameNotFound { game_id } => write!(f, "Game {} not found", game_id),
            Self::UnauthorizedAction { game_id, caller } => {
                write!(f, "{} is not allowed to act on game {}", caller, game_id)
            }
            Self::UnauthorizedReset { game_id, caller } => {
                write!(f, "{} is not allowed to reset game {}", caller, game_id)
            }
            Self::InvalidAction { action, .. } => write!(f, "Invalid action {:?}", action),
        }
    }
}
