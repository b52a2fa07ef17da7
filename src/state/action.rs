//! Named transition dispatch.
//!
//! The sequencer hands over a transition name and a JSON body. [`Action`]
//! turns that pair into one typed call, so the handlers never see raw
//! strings. Unknown names and malformed bodies are hard errors; everything
//! past this point fails softly through events.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::event::GameEvent;
use super::game::GameStore;
use super::transition::{
    self, CreateGame, EndGame, GenerateObstacle, ResetGame, TransitionContext, UserMove,
};

/// Transition names accepted by [`Action::from_named`].
pub const TRANSITION_NAMES: [&str; 5] = [
    "createGame",
    "userMove",
    "generateObstacleAndScoreUpdate",
    "gameOver",
    "resetGame",
];

/// Errors turning a named request into an [`Action`].
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("unknown transition {0:?}")]
    UnknownTransition(String),
    #[error("malformed inputs for {name}: {source}")]
    MalformedInput {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A typed transition request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", content = "inputs", rename_all = "camelCase")]
pub enum Action {
    CreateGame(CreateGame),
    UserMove(UserMove),
    GenerateObstacleAndScoreUpdate(GenerateObstacle),
    GameOver(EndGame),
    ResetGame(ResetGame),
}

impl Action {
    /// Build an action from a transition name and its JSON inputs.
    pub fn from_named(name: &str, inputs: serde_json::Value) -> Result<Self, ActionError> {
        fn parse<T: serde::de::DeserializeOwned>(
            name: &'static str,
            inputs: serde_json::Value,
        ) -> Result<T, ActionError> {
            serde_json::from_value(inputs)
                .map_err(|source| ActionError::MalformedInput { name, source })
        }

        match name {
            "createGame" => Ok(Self::CreateGame(parse("createGame", inputs)?)),
            "userMove" => Ok(Self::UserMove(parse("userMove", inputs)?)),
            "generateObstacleAndScoreUpdate" => Ok(Self::GenerateObstacleAndScoreUpdate(parse(
                "generateObstacleAndScoreUpdate",
                inputs,
            )?)),
            "gameOver" => Ok(Self::GameOver(parse("gameOver", inputs)?)),
            "resetGame" => Ok(Self::ResetGame(parse("resetGame", inputs)?)),
            other => Err(ActionError::UnknownTransition(other.to_string())),
        }
    }

    /// Transition name of this action.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateGame(_) => "createGame",
            Self::UserMove(_) => "userMove",
            Self::GenerateObstacleAndScoreUpdate(_) => "generateObstacleAndScoreUpdate",
            Self::GameOver(_) => "gameOver",
            Self::ResetGame(_) => "resetGame",
        }
    }

    /// Run the matching transition against `store` in place.
    pub fn apply_to(self, store: &mut GameStore, ctx: &TransitionContext) -> Vec<GameEvent> {
        log::debug!(
            "applying {} for {} at block {}",
            self.name(),
            ctx.caller,
            ctx.block_timestamp
        );
        match self {
            Self::CreateGame(input) => transition::create_game(store, ctx, input),
            Self::UserMove(input) => transition::user_move(store, ctx, input),
            Self::GenerateObstacleAndScoreUpdate(input) => {
                transition::generate_obstacle_and_score_update(store, ctx, input)
            }
            Self::GameOver(input) => transition::game_over(store, ctx, input),
            Self::ResetGame(input) => transition::reset_game(store, ctx, input),
        }
    }
}
