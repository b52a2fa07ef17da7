//! Property tests over random transition sequences.

use std::num::NonZeroU32;

use proptest::prelude::*;

use traffic_run_state::state::{
    Action, CreateGame, EndGame, GameEvent, GameStore, GenerateObstacle, MoveAction, ResetGame,
    StateMachine, TransitionContext, UserMove,
};

const OWNER: &str = "0xOwner";

fn create_game(machine: &mut StateMachine, speed: u32, block_timestamp: i64) -> String {
    let events = machine.apply(
        Action::CreateGame(CreateGame {
            owner: OWNER.to_string(),
            initial_speed: NonZeroU32::new(speed).unwrap(),
            started_at: 0,
        }),
        &TransitionContext::new(OWNER.to_lowercase(), block_timestamp),
    );
    match events.as_slice() {
        [GameEvent::GameCreated { game_id }] => game_id.clone(),
        other => panic!("unexpected events {:?}", other),
    }
}

/// An owner action on `game_id`, picked by `kind`.
fn owner_action(game_id: &str, kind: u8, timestamp: i64) -> Action {
    let game_id = game_id.to_string();
    match kind % 5 {
        0 => Action::UserMove(UserMove {
            game_id,
            action_type: MoveAction::MoveLeft,
            timestamp,
        }),
        1 => Action::UserMove(UserMove {
            game_id,
            action_type: MoveAction::MoveRight,
            timestamp,
        }),
        2 => Action::GenerateObstacleAndScoreUpdate(GenerateObstacle { game_id, timestamp }),
        3 => Action::GameOver(EndGame {
            game_id,
            over: timestamp % 2 == 0,
            timestamp,
        }),
        _ => Action::ResetGame(ResetGame { game_id, timestamp }),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Car and obstacle lanes never leave {0, 1}.
    #[test]
    fn prop_lanes_stay_in_range(
        speed in 1u32..100,
        steps in prop::collection::vec((any::<u8>(), any::<i64>()), 0..64)
    ) {
        let mut machine = StateMachine::default();
        let game_id = create_game(&mut machine, speed, 1000);
        let ctx = TransitionContext::new(OWNER, 2000);

        for (kind, timestamp) in steps {
            machine.apply(owner_action(&game_id, kind, timestamp), &ctx);
            let game = machine.get_game(&game_id).unwrap();
            prop_assert!(game.car_position <= 1);
            prop_assert!(game.obstacle.lane <= 1);
            prop_assert_eq!(game.obstacle.z, -70);
        }
    }

    /// Moves toggle the car only when the move table allows it.
    #[test]
    fn prop_moves_follow_table(moves in prop::collection::vec(any::<bool>(), 0..64)) {
        let mut machine = StateMachine::default();
        let game_id = create_game(&mut machine, 1, 1000);
        let ctx = TransitionContext::new(OWNER, 2000);

        for left in moves {
            let before = machine.get_game(&game_id).unwrap().car_position;
            let action_type = if left { MoveAction::MoveLeft } else { MoveAction::MoveRight };
            let events = machine.apply(
                Action::UserMove(UserMove { game_id: game_id.clone(), action_type, timestamp: 0 }),
                &ctx,
            );
            let after = machine.get_game(&game_id).unwrap().car_position;

            let expected = if left { 0 } else { 1 };
            prop_assert_eq!(after, expected);
            prop_assert_eq!(events.len(), usize::from(before != expected));
        }
    }

    /// Every scoring call adds exactly the current speed.
    #[test]
    fn prop_score_adds_speed(
        speed in 1u32..10_000,
        timestamps in prop::collection::vec(any::<i64>(), 1..32)
    ) {
        let mut machine = StateMachine::default();
        let game_id = create_game(&mut machine, speed, 1000);
        let ctx = TransitionContext::new(OWNER, 2000);

        for timestamp in timestamps {
            let before = machine.get_game(&game_id).unwrap().score;
            machine.apply(
                Action::GenerateObstacleAndScoreUpdate(GenerateObstacle {
                    game_id: game_id.clone(),
                    timestamp,
                }),
                &ctx,
            );
            let game = machine.get_game(&game_id).unwrap();
            prop_assert_eq!(game.score, before + i64::from(speed));
            prop_assert!(game.score > before);
            prop_assert_eq!(i64::from(game.obstacle.lane), timestamp.rem_euclid(2));
        }
    }

    /// Resetting twice gives the same fields apart from the obstacle.
    #[test]
    fn prop_reset_idempotent(
        steps in prop::collection::vec((any::<u8>(), any::<i64>()), 0..32),
        first_block in any::<i64>(),
        second_block in any::<i64>()
    ) {
        let mut machine = StateMachine::default();
        let game_id = create_game(&mut machine, 5, 1000);
        let ctx = TransitionContext::new(OWNER, 2000);
        for (kind, timestamp) in steps {
            machine.apply(owner_action(&game_id, kind, timestamp), &ctx);
        }

        let reset = || Action::ResetGame(ResetGame { game_id: game_id.clone(), timestamp: 0 });
        machine.apply(reset(), &TransitionContext::new(OWNER, first_block));
        let mut once = machine.get_game(&game_id).unwrap().clone();
        machine.apply(reset(), &TransitionContext::new(OWNER, second_block));
        let twice = machine.get_game(&game_id).unwrap().clone();

        prop_assert_eq!(twice.car_position, 1);
        prop_assert_eq!(twice.speed, 1);
        prop_assert_eq!(twice.score, 0);
        prop_assert!(!twice.is_game_over);
        prop_assert_eq!(twice.ended_at, None);

        once.obstacle = twice.obstacle;
        prop_assert_eq!(once, twice);
    }

    /// A caller who does not own the game never changes the store.
    #[test]
    fn prop_foreign_caller_is_noop(
        steps in prop::collection::vec((any::<u8>(), any::<i64>()), 1..32)
    ) {
        let mut machine = StateMachine::default();
        let game_id = create_game(&mut machine, 3, 1000);
        let before = machine.read().clone();
        let intruder = TransitionContext::new("0xIntruder", 2000);

        for (kind, timestamp) in steps {
            let action = owner_action(&game_id, kind, timestamp);
            let expected = match action {
                Action::ResetGame(_) => GameEvent::UnauthorizedReset {
                    game_id: game_id.clone(),
                    caller: "0xIntruder".to_string(),
                },
                _ => GameEvent::UnauthorizedAction {
                    game_id: game_id.clone(),
                    caller: "0xIntruder".to_string(),
                },
            };
            let events = machine.apply(action, &intruder);
            prop_assert_eq!(events, vec![expected]);
        }
        prop_assert_eq!(machine.read(), &before);
    }

    /// The store survives a JSON round-trip unchanged.
    #[test]
    fn prop_snapshot_roundtrip(
        games in 1usize..4,
        steps in prop::collection::vec((any::<u8>(), any::<i64>()), 0..32)
    ) {
        let mut machine = StateMachine::default();
        let ids: Vec<String> = (0..games)
            .map(|n| create_game(&mut machine, 2, 1000 + n as i64))
            .collect();
        let ctx = TransitionContext::new(OWNER, 3000);
        for (step, (kind, timestamp)) in steps.into_iter().enumerate() {
            let game_id = &ids[step % ids.len()];
            machine.apply(owner_action(game_id, kind, timestamp), &ctx);
        }

        let snapshot = machine.snapshot().unwrap();
        let restored = GameStore::from_json(&snapshot).unwrap();
        prop_assert_eq!(&restored, machine.read());
        prop_assert_eq!(restored.digest(), machine.digest());
    }
}
