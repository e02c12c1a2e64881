//! The board data model: everything that makes up one game's state.
//!
//! These types travel on the wire inside [`ServerMessage`]s
//! (`crate::ServerMessage`), so their serde shape is part of the contract
//! with the browser and desktop clients.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// A player color. Each color owns four tokens.
///
/// Serialized lowercase (`"red"`), which is what the clients render from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Blue,
    Green,
    Yellow,
}

impl Color {
    /// All colors in seating order.
    pub const ALL: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];

    /// The wire name of this color.
    pub fn as_str(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Yellow => "yellow",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One face of a two-sided die.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiceFace {
    White,
    Black,
}

/// Number of dice thrown per roll.
pub const DICE_COUNT: usize = 4;

/// The faces of one roll. A fixed-size array, so "exactly four dice"
/// holds by construction and a payload with 3 or 5 faces fails to decode.
pub type DiceSet = [DiceFace; DICE_COUNT];

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// A movable piece on the board.
///
/// `id` is stable for the life of the process (`"red-0"` … `"yellow-3"`);
/// `x`/`y` are board pixels and change on every accepted move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub color: Color,
}

// ---------------------------------------------------------------------------
// Roll history
// ---------------------------------------------------------------------------

/// One past roll as shown in the "last rolls" panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollHistoryEntry {
    pub dice: DiceSet,
    pub score: u8,
}

/// Maximum number of entries kept in a [`RollHistory`].
pub const ROLL_HISTORY_CAP: usize = 5;

/// Returned when a decoded history exceeds [`ROLL_HISTORY_CAP`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("roll history holds at most {cap} entries, got {0}", cap = ROLL_HISTORY_CAP)]
pub struct HistoryOverflow(pub usize);

/// Bounded, newest-first list of recent rolls.
///
/// On the wire this is a plain JSON array. Decoding goes through
/// `TryFrom<Vec<_>>`, so an array longer than the cap is rejected
/// instead of silently truncated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RollHistoryEntry>", into = "Vec<RollHistoryEntry>")]
pub struct RollHistory(VecDeque<RollHistoryEntry>);

impl RollHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self(VecDeque::with_capacity(ROLL_HISTORY_CAP + 1))
    }

    /// Records a roll as the newest entry, evicting the oldest once the
    /// cap is exceeded.
    pub fn push(&mut self, entry: RollHistoryEntry) {
        self.0.push_front(entry);
        self.0.truncate(ROLL_HISTORY_CAP);
    }

    /// The most recent roll, if any.
    pub fn latest(&self) -> Option<&RollHistoryEntry> {
        self.0.front()
    }

    /// Iterates newest-first.
    pub fn iter(&self) -> impl Iterator<Item = &RollHistoryEntry> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<RollHistoryEntry>> for RollHistory {
    type Error = HistoryOverflow;

    fn try_from(entries: Vec<RollHistoryEntry>) -> Result<Self, Self::Error> {
        if entries.len() > ROLL_HISTORY_CAP {
            return Err(HistoryOverflow(entries.len()));
        }
        Ok(Self(entries.into()))
    }
}

impl From<RollHistory> for Vec<RollHistoryEntry> {
    fn from(history: RollHistory) -> Self {
        history.0.into()
    }
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// The whole shared game: the aggregate root.
///
/// Exactly one authoritative instance exists per server process, owned
/// by the state store. Clients only ever hold copies received in
/// snapshots and broadcasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub tokens: Vec<Token>,
    pub dice: DiceSet,
    pub roll_history: RollHistory,
    /// Score of the latest roll (1..=8), or 0 before the first roll.
    pub white_count: u8,
    /// Number of accepted move requests since the last reset.
    pub move_count: u64,
}

impl GameState {
    /// Looks up a token by id.
    pub fn token(&self, id: &str) -> Option<&Token> {
        self.tokens.iter().find(|t| t.id == id)
    }

    /// Returns `true` if no two tokens share an id.
    pub fn has_unique_token_ids(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.tokens.len());
        self.tokens.iter().all(|t| seen.insert(t.id.as_str()))
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(score: u8) -> RollHistoryEntry {
        RollHistoryEntry {
            dice: [DiceFace::White; DICE_COUNT],
            score,
        }
    }

    #[test]
    fn test_color_serializes_lowercase() {
        let json = serde_json::to_string(&Color::Yellow).unwrap();
        assert_eq!(json, "\"yellow\"");
        assert_eq!(Color::Yellow.to_string(), "yellow");
    }

    #[test]
    fn test_dice_face_unknown_value_rejected() {
        let result: Result<DiceFace, _> = serde_json::from_str("\"grey\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_dice_set_wrong_length_rejected() {
        let result: Result<DiceSet, _> =
            serde_json::from_str(r#"["white","black","white"]"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_roll_history_push_keeps_newest_first() {
        let mut history = RollHistory::new();
        history.push(entry(1));
        history.push(entry(2));

        let scores: Vec<u8> = history.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![2, 1]);
        assert_eq!(history.latest().map(|e| e.score), Some(2));
    }

    #[test]
    fn test_roll_history_push_evicts_oldest_past_cap() {
        let mut history = RollHistory::new();
        for score in 1..=6 {
            history.push(entry(score));
        }

        assert_eq!(history.len(), ROLL_HISTORY_CAP);
        let scores: Vec<u8> = history.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![6, 5, 4, 3, 2]);
    }

    #[test]
    fn test_roll_history_serializes_as_plain_array() {
        let mut history = RollHistory::new();
        history.push(entry(3));

        let json: serde_json::Value = serde_json::to_value(&history).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["score"], 3);
        assert_eq!(json[0]["dice"][0], "white");
    }

    #[test]
    fn test_roll_history_over_cap_rejected_on_decode() {
        let entries: Vec<RollHistoryEntry> = (1..=6).map(entry).collect();
        let json = serde_json::to_string(&entries).unwrap();

        let result: Result<RollHistory, _> = serde_json::from_str(&json);
        assert!(result.is_err());
    }

    #[test]
    fn test_history_overflow_display_names_cap_and_len() {
        assert_eq!(
            HistoryOverflow(6).to_string(),
            "roll history holds at most 5 entries, got 6"
        );
    }

    #[test]
    fn test_game_state_has_unique_token_ids_detects_duplicates() {
        let token = Token {
            id: "red-0".into(),
            x: 0.0,
            y: 0.0,
            color: Color::Red,
        };
        let mut state = GameState {
            tokens: vec![token.clone()],
            dice: [DiceFace::White; DICE_COUNT],
            roll_history: RollHistory::new(),
            white_count: 0,
            move_count: 0,
        };
        assert!(state.has_unique_token_ids());

        state.tokens.push(token);
        assert!(!state.has_unique_token_ids());
    }

    #[test]
    fn test_game_state_json_field_names() {
        let state = GameState {
            tokens: vec![Token {
                id: "blue-2".into(),
                x: 300.5,
                y: 60.0,
                color: Color::Blue,
            }],
            dice: [DiceFace::Black; DICE_COUNT],
            roll_history: RollHistory::new(),
            white_count: 8,
            move_count: 12,
        };
        let json: serde_json::Value = serde_json::to_value(&state).unwrap();

        assert_eq!(json["tokens"][0]["id"], "blue-2");
        assert_eq!(json["tokens"][0]["x"], 300.5);
        assert_eq!(json["tokens"][0]["color"], "blue");
        assert_eq!(json["dice"], serde_json::json!(["black", "black", "black", "black"]));
        assert_eq!(json["roll_history"], serde_json::json!([]));
        assert_eq!(json["white_count"], 8);
        assert_eq!(json["move_count"], 12);

        let decoded: GameState = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, state);
    }
}
