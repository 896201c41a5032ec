//! Game state model and turn-order arithmetic.
//!
//! `GameState` is the single persisted entity of a running session. All
//! round/index arithmetic lives here as pure methods so the invariants are
//! testable without a database:
//!
//! - `player_order` holds distinct player ids
//! - `current_player_index` stays in `[0, len)` while the order is
//!   non-empty, and is pinned at `0` when it is empty
//! - `round_number` is `1` or greater once initialized

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::players::PlayerId;

/// Fixed identifier of the singleton game-state row. Only one session is
/// modeled at a time; supporting concurrent sessions would mean keeping the
/// active id somewhere instead of this constant.
pub const GAME_STATE_ID: i64 = 1;

/// The persisted turn-order state of the running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub id: i64,
    /// Ordered, duplicate-free sequence of player ids. Order is an explicit
    /// position, not insertion order of the backing store.
    pub player_order: Vec<PlayerId>,
    pub current_player_index: usize,
    pub round_number: i64,
    pub notes: String,
    pub hidden_notes: String,
}

impl GameState {
    /// A freshly initialized session: index 0, round 1, empty notes.
    pub fn new(player_order: Vec<PlayerId>) -> Self {
        Self {
            id: GAME_STATE_ID,
            player_order,
            current_player_index: 0,
            round_number: 1,
            notes: String::new(),
            hidden_notes: String::new(),
        }
    }

    /// Advances to the next player's turn, starting a new round when the
    /// order wraps. With an empty order there is no player to point at, but
    /// round progression still moves.
    pub fn advance_turn(&mut self) {
        if self.player_order.is_empty() {
            self.round_number += 1;
            return;
        }

        self.current_player_index += 1;
        if self.current_player_index == self.player_order.len() {
            self.current_player_index = 0;
            self.round_number += 1;
        }
    }

    /// Exact inverse of [`advance_turn`](Self::advance_turn). At the initial
    /// boundary (index 0, round 1) this is a no-op so the round never drops
    /// below 1.
    pub fn revert_turn(&mut self) {
        if self.current_player_index > 0 {
            self.current_player_index -= 1;
            return;
        }

        if self.round_number > 1 {
            self.round_number -= 1;
            self.current_player_index = self.player_order.len().saturating_sub(1);
        }
    }

    /// Replaces the order wholesale. The index is left untouched unless the
    /// new order is too short to contain it, in which case it wraps to 0 to
    /// keep the in-bounds invariant.
    pub fn set_player_order(&mut self, new_order: Vec<PlayerId>) {
        self.player_order = new_order;
        if self.current_player_index >= self.player_order.len() {
            self.current_player_index = 0;
        }
    }

    /// Removes a player from the order, compensating the index so it keeps
    /// referencing the same intended player. Returns `false` if the id was
    /// not in the order.
    ///
    /// Removing an entry before the current one shifts the index down by
    /// one. Removing the current entry while it is last wraps the index to
    /// 0 (the turn passes to the first player; the round is unchanged).
    pub fn remove_from_order(&mut self, player_id: PlayerId) -> bool {
        let Some(pos) = self.player_order.iter().position(|&id| id == player_id) else {
            return false;
        };

        self.player_order.remove(pos);
        if pos < self.current_player_index {
            self.current_player_index -= 1;
        }
        if self.current_player_index >= self.player_order.len() {
            self.current_player_index = 0;
        }
        true
    }

    /// Drops every id not present in `existing`, applying the same
    /// index-shift rule as single removal, once per removed id, in order.
    /// Returns the removed ids. Used when players are deleted out-of-band.
    pub fn retain_members(&mut self, existing: &HashSet<PlayerId>) -> Vec<PlayerId> {
        let missing: Vec<PlayerId> = self
            .player_order
            .iter()
            .copied()
            .filter(|id| !existing.contains(id))
            .collect();

        for id in &missing {
            self.remove_from_order(*id);
        }

        missing
    }
}

/// One entry of the serialized turn order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerOrderEntry {
    pub id: PlayerId,
    pub name: String,
}

/// The wire shape pushed to the GM and players after every mutation.
///
/// Downstream dashboards depend on this exact shape; field names serialize
/// in camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub id: i64,
    pub current_player_index: usize,
    pub round_number: i64,
    pub player_order: Vec<PlayerOrderEntry>,
    pub notes: String,
    pub hidden_notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_order(ids: &[PlayerId]) -> GameState {
        GameState::new(ids.to_vec())
    }

    #[test]
    fn test_new_starts_at_index_zero_round_one() {
        let state = state_with_order(&[1, 2, 3]);
        assert_eq!(state.id, GAME_STATE_ID);
        assert_eq!(state.current_player_index, 0);
        assert_eq!(state.round_number, 1);
        assert_eq!(state.notes, "");
        assert_eq!(state.hidden_notes, "");
    }

    #[test]
    fn test_advance_turn_walks_the_order() {
        // Scenario: three players, two advances land on the third player,
        // one more wraps into round 2.
        let mut state = state_with_order(&[1, 2, 3]);

        state.advance_turn();
        state.advance_turn();
        assert_eq!(state.current_player_index, 2);
        assert_eq!(state.round_number, 1);

        state.advance_turn();
        assert_eq!(state.current_player_index, 0);
        assert_eq!(state.round_number, 2);
    }

    #[test]
    fn test_full_round_of_advances_returns_to_start() {
        for n in 1..=5 {
            let order: Vec<PlayerId> = (1..=n).collect();
            let mut state = state_with_order(&order);
            for _ in 0..n {
                state.advance_turn();
            }
            assert_eq!(state.current_player_index, 0, "n = {n}");
            assert_eq!(state.round_number, 2, "n = {n}");
        }
    }

    #[test]
    fn test_advance_turn_empty_order_bumps_round_only() {
        let mut state = state_with_order(&[]);

        state.advance_turn();

        assert_eq!(state.current_player_index, 0);
        assert_eq!(state.round_number, 2);
    }

    #[test]
    fn test_revert_turn_is_inverse_of_advance() {
        let mut state = state_with_order(&[1, 2, 3]);
        state.advance_turn();
        state.advance_turn();
        let before = state.clone();

        state.advance_turn();
        state.revert_turn();

        assert_eq!(state, before);
    }

    #[test]
    fn test_revert_turn_wraps_across_round_boundary() {
        let mut state = state_with_order(&[1, 2, 3]);
        state.round_number = 2;

        state.revert_turn();

        assert_eq!(state.current_player_index, 2);
        assert_eq!(state.round_number, 1);
    }

    #[test]
    fn test_revert_turn_at_initial_boundary_is_noop() {
        let mut state = state_with_order(&[1, 2, 3]);

        state.revert_turn();

        assert_eq!(state.current_player_index, 0);
        assert_eq!(state.round_number, 1);
    }

    #[test]
    fn test_revert_turn_empty_order_decrements_round() {
        let mut state = state_with_order(&[]);
        state.round_number = 3;

        state.revert_turn();

        assert_eq!(state.current_player_index, 0);
        assert_eq!(state.round_number, 2);
    }

    #[test]
    fn test_remove_before_current_shifts_index_down() {
        // Scenario: index points at player 2; removing player 1 (earlier in
        // the order) must keep the index referencing player 2.
        let mut state = state_with_order(&[1, 2, 3]);
        state.advance_turn();
        assert_eq!(state.player_order[state.current_player_index], 2);

        assert!(state.remove_from_order(1));

        assert_eq!(state.player_order, vec![2, 3]);
        assert_eq!(state.current_player_index, 0);
        assert_eq!(state.player_order[state.current_player_index], 2);
    }

    #[test]
    fn test_remove_after_current_leaves_index_alone() {
        let mut state = state_with_order(&[1, 2, 3]);
        state.advance_turn();

        assert!(state.remove_from_order(3));

        assert_eq!(state.player_order, vec![1, 2]);
        assert_eq!(state.current_player_index, 1);
    }

    #[test]
    fn test_remove_current_last_entry_wraps_index() {
        let mut state = state_with_order(&[1, 2, 3]);
        state.advance_turn();
        state.advance_turn();
        assert_eq!(state.current_player_index, 2);

        assert!(state.remove_from_order(3));

        assert_eq!(state.player_order, vec![1, 2]);
        assert_eq!(state.current_player_index, 0);
        assert_eq!(state.round_number, 1);
    }

    #[test]
    fn test_remove_unknown_id_returns_false() {
        let mut state = state_with_order(&[1, 2]);

        assert!(!state.remove_from_order(99));

        assert_eq!(state.player_order, vec![1, 2]);
    }

    #[test]
    fn test_remove_last_remaining_player_pins_index_at_zero() {
        let mut state = state_with_order(&[7]);

        assert!(state.remove_from_order(7));

        assert!(state.player_order.is_empty());
        assert_eq!(state.current_player_index, 0);
    }

    #[test]
    fn test_retain_members_removes_missing_ids_in_order() {
        let mut state = state_with_order(&[1, 2, 3, 4]);
        state.current_player_index = 3;

        let existing: HashSet<PlayerId> = [2, 4].into_iter().collect();
        let removed = state.retain_members(&existing);

        assert_eq!(removed, vec![1, 3]);
        assert_eq!(state.player_order, vec![2, 4]);
        // Two removals before the index shift it down twice.
        assert_eq!(state.current_player_index, 1);
    }

    #[test]
    fn test_retain_members_with_no_missing_ids_changes_nothing() {
        let mut state = state_with_order(&[1, 2]);
        let before = state.clone();

        let existing: HashSet<PlayerId> = [1, 2, 3].into_iter().collect();
        let removed = state.retain_members(&existing);

        assert!(removed.is_empty());
        assert_eq!(state, before);
    }

    #[test]
    fn test_set_player_order_keeps_index_when_in_bounds() {
        let mut state = state_with_order(&[1, 2, 3]);
        state.advance_turn();

        state.set_player_order(vec![3, 2, 1]);

        assert_eq!(state.current_player_index, 1);
        assert_eq!(state.round_number, 1);
    }

    #[test]
    fn test_set_player_order_wraps_out_of_bounds_index() {
        let mut state = state_with_order(&[1, 2, 3]);
        state.current_player_index = 2;

        state.set_player_order(vec![1]);

        assert_eq!(state.current_player_index, 0);
    }

    #[test]
    fn test_snapshot_serializes_to_camel_case_wire_shape() {
        let snapshot = GameSnapshot {
            id: GAME_STATE_ID,
            current_player_index: 1,
            round_number: 2,
            player_order: vec![PlayerOrderEntry {
                id: 7,
                name: "Mira".to_string(),
            }],
            notes: "camped at the bridge".to_string(),
            hidden_notes: "ambush at dawn".to_string(),
        };

        let value = serde_json::to_value(&snapshot).expect("snapshot serializes");

        assert_eq!(value["id"], 1);
        assert_eq!(value["currentPlayerIndex"], 1);
        assert_eq!(value["roundNumber"], 2);
        assert_eq!(value["playerOrder"][0]["id"], 7);
        assert_eq!(value["playerOrder"][0]["name"], "Mira");
        assert_eq!(value["notes"], "camped at the bridge");
        assert_eq!(value["hiddenNotes"], "ambush at dawn");
    }
}
