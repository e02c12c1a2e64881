//! The canonical starting board.
//!
//! The board is a 5×5 grid of 120px cells. Each color starts in one
//! cell on the edge midpoints, with its four tokens lined up 20px apart
//! from the cell centre.

use boardsync_protocol::{Color, DiceFace, DiceSet, GameState, RollHistory, Token, DICE_COUNT};

/// Edge length of one grid cell, in board pixels.
pub const CELL_SIZE: f64 = 120.0;

/// Horizontal gap between tokens of the same color.
pub const TOKEN_SPACING: f64 = 20.0;

/// Tokens per color.
pub const TOKENS_PER_COLOR: usize = 4;

/// Home cell `(gx, gy)` of each color, in [`Color::ALL`] order.
pub const HOME_CELLS: [(u32, u32); 4] = [(0, 2), (2, 0), (2, 4), (4, 2)];

/// Dice shown before the first roll.
pub const INITIAL_DICE: DiceSet = [DiceFace::White; DICE_COUNT];

/// Pixel centre of grid cell `(gx, gy)`.
pub fn cell_centre(gx: u32, gy: u32) -> (f64, f64) {
    let half = CELL_SIZE / 2.0;
    (
        f64::from(gx) * CELL_SIZE + half,
        f64::from(gy) * CELL_SIZE + half,
    )
}

/// All sixteen tokens at their home positions, grouped by color.
pub fn initial_tokens() -> Vec<Token> {
    Color::ALL
        .iter()
        .zip(HOME_CELLS)
        .flat_map(|(&color, (gx, gy))| {
            let (cx, cy) = cell_centre(gx, gy);
            (0..TOKENS_PER_COLOR).map(move |j| Token {
                id: format!("{color}-{j}"),
                x: cx + TOKEN_SPACING * j as f64,
                y: cy,
                color,
            })
        })
        .collect()
}

/// The state a fresh server starts from, and what `reset` restores.
pub fn initial_state() -> GameState {
    GameState {
        tokens: initial_tokens(),
        dice: INITIAL_DICE,
        roll_history: RollHistory::new(),
        white_count: 0,
        move_count: 0,
    }
}
