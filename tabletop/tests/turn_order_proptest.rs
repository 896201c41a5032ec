//! Property tests for the turn-order arithmetic.

use proptest::prelude::*;
use tabletop::GameState;

/// States reachable from a fresh session by some number of advances.
fn reachable_state() -> impl Strategy<Value = GameState> {
    (1usize..=8, 0usize..64).prop_map(|(players, advances)| {
        let order: Vec<i64> = (1..=players as i64).collect();
        let mut state = GameState::new(order);
        for _ in 0..advances {
            state.advance_turn();
        }
        state
    })
}

proptest! {
    #[test]
    fn revert_is_left_inverse_of_advance(mut state in reachable_state()) {
        let before = state.clone();

        state.advance_turn();
        state.revert_turn();

        prop_assert_eq!(state, before);
    }

    #[test]
    fn advance_keeps_index_in_bounds_and_round_positive(mut state in reachable_state()) {
        state.advance_turn();

        prop_assert!(state.current_player_index < state.player_order.len());
        prop_assert!(state.round_number >= 1);
    }

    #[test]
    fn revert_keeps_index_in_bounds_and_round_positive(mut state in reachable_state()) {
        state.revert_turn();

        prop_assert!(state.current_player_index < state.player_order.len());
        prop_assert!(state.round_number >= 1);
    }

    #[test]
    fn full_round_of_advances_returns_to_first_player(
        players in 1usize..=8,
        rounds in 1usize..=4,
    ) {
        let order: Vec<i64> = (1..=players as i64).collect();
        let mut state = GameState::new(order);

        for _ in 0..players * rounds {
            state.advance_turn();
        }

        prop_assert_eq!(state.current_player_index, 0);
        prop_assert_eq!(state.round_number, 1 + rounds as i64);
    }
}
