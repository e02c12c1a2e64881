//! State transitions.
//!
//! Each function applies one accepted intent to the game state and
//! returns the message that announces the change. They are synchronous
//! and free of I/O; the store actor is the only caller at runtime.

use boardsync_protocol::{GameState, RollHistoryEntry, ServerMessage};

use crate::dice::DiceRoll;
use crate::layout;

/// Records a throw: new dice, new score, newest history entry.
pub fn apply_roll(state: &mut GameState, roll: DiceRoll) -> ServerMessage {
    state.dice = roll.dice;
    state.white_count = roll.score;
    state.roll_history.push(RollHistoryEntry {
        dice: roll.dice,
        score: roll.score,
    });

    ServerMessage::DiceRolled {
        dice: state.dice,
        white_count: state.white_count,
        roll_history: state.roll_history.clone(),
    }
}

/// Moves one token.
///
/// An unknown `token_id` leaves every token in place; the move still
/// counts.
pub fn apply_move(state: &mut GameState, token_id: &str, x: f64, y: f64) -> ServerMessage {
    match state.tokens.iter_mut().find(|t| t.id == token_id) {
        Some(token) => {
            token.x = x;
            token.y = y;
        }
        None => tracing::debug!(token_id, "move names unknown token"),
    }
    state.move_count += 1;

    ServerMessage::TokensUpdated {
        tokens: state.tokens.clone(),
        move_count: state.move_count,
    }
}

/// Restores the starting board.
pub fn apply_reset(state: &mut GameState) -> ServerMessage {
    *state = layout::initial_state();
    ServerMessage::GameReset(state.clone())
}

#[cfg(test)]
mod tests {
    use boardsync_protocol::{DiceFace, ROLL_HISTORY_CAP};

    use super::*;
    use crate::layout::initial_state;
    use DiceFace::{Black, White};

    #[test]
    fn test_apply_roll_all_black_scores_eight() {
        let mut state = initial_state();
        let msg = apply_roll(&mut state, DiceRoll::from_faces([Black; 4]));

        assert_eq!(state.white_count, 8);
        assert_eq!(state.dice, [Black; 4]);
        let newest = state.roll_history.latest().unwrap();
        assert_eq!(newest.dice, [Black; 4]);
        assert_eq!(newest.score, 8);
        assert!(matches!(msg, ServerMessage::DiceRolled { white_count: 8, .. }));
    }

    #[test]
    fn test_apply_roll_history_capped_newest_first() {
        let mut state = initial_state();
        let rolls = [
            [White, Black, Black, Black],
            [White, White, Black, Black],
            [White, White, White, Black],
            [White, White, White, White],
            [Black, Black, Black, Black],
            [Black, White, Black, Black],
        ];
        for faces in rolls {
            apply_roll(&mut state, DiceRoll::from_faces(faces));
        }

        assert_eq!(state.roll_history.len(), ROLL_HISTORY_CAP);
        let scores: Vec<u8> = state.roll_history.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![1, 8, 4, 3, 2]);
        assert_eq!(state.white_count, 1);
    }

    #[test]
    fn test_apply_roll_leaves_tokens_alone() {
        let mut state = initial_state();
        apply_roll(&mut state, DiceRoll::from_faces([White; 4]));
        assert_eq!(state.tokens, initial_state().tokens);
        assert_eq!(state.move_count, 0);
    }

    #[test]
    fn test_apply_move_known_token_moves_only_it() {
        let mut state = initial_state();
        state.move_count = 3;

        let msg = apply_move(&mut state, "red-0", 10.0, 20.0);

        let ServerMessage::TokensUpdated { tokens, move_count } = msg else {
            panic!("expected tokens_updated");
        };
        assert_eq!(move_count, 4);
        let red0 = tokens.iter().find(|t| t.id == "red-0").unwrap();
        assert_eq!((red0.x, red0.y), (10.0, 20.0));

        let untouched = initial_state();
        for token in tokens.iter().filter(|t| t.id != "red-0") {
            assert_eq!(Some(token), untouched.token(&token.id));
        }
    }

    #[test]
    fn test_apply_move_unknown_token_still_counts() {
        let mut state = initial_state();
        apply_move(&mut state, "purple-9", 1.0, 1.0);

        assert_eq!(state.move_count, 1);
        assert_eq!(state.tokens, initial_state().tokens);
    }

    #[test]
    fn test_apply_move_keeps_token_ids() {
        let mut state = initial_state();
        for i in 0..10 {
            apply_move(&mut state, "blue-1", f64::from(i), 0.0);
        }
        let ids: Vec<&str> = state.tokens.iter().map(|t| t.id.as_str()).collect();
        let expected = initial_state();
        let expected_ids: Vec<&str> = expected.tokens.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, expected_ids);
        assert!(state.has_unique_token_ids());
    }

    #[test]
    fn test_apply_reset_restores_initial_state() {
        let mut state = initial_state();
        apply_roll(&mut state, DiceRoll::from_faces([Black; 4]));
        apply_move(&mut state, "green-2", 5.0, 5.0);

        let msg = apply_reset(&mut state);

        assert_eq!(state, initial_state());
        assert_eq!(msg, ServerMessage::GameReset(initial_state()));
    }
}
