/// Game chain, profile scores, and the progression gate.
///
/// The gate is derived, never stored: a game is unlocked iff the
/// previous game's last recorded accuracy reaches the pass threshold.
/// Callers recompute it from the profile on every menu interaction, so
/// there is no cached unlock state to go stale.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Minimum accuracy that unlocks the next game in the chain.
pub const PASS_THRESHOLD: f64 = 0.8;

/// The four minigames, in gate order.
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum GameId {
    Treasure,
    Unjumble,
    AddLetters,
    Memory,
}

impl GameId {
    pub const ALL: [GameId; 4] = [
        GameId::Treasure,
        GameId::Unjumble,
        GameId::AddLetters,
        GameId::Memory,
    ];

    /// The game that must be passed before this one. The first game in
    /// the chain has no prerequisite.
    pub fn prerequisite(self) -> Option<GameId> {
        let pos = GameId::ALL.iter().position(|g| *g == self)?;
        if pos == 0 {
            None
        } else {
            Some(GameId::ALL[pos - 1])
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            GameId::Treasure => "Treasure Hunt",
            GameId::Unjumble => "Unjumble",
            GameId::AddLetters => "Add the Letters",
            GameId::Memory => "Memory Match",
        }
    }
}

/// Last recorded accuracy per game, ordered by the game chain.
pub type Scores = BTreeMap<GameId, f64>;

/// All four games at 0.0, the shape every profile starts with.
pub fn default_scores() -> Scores {
    GameId::ALL.iter().map(|g| (*g, 0.0)).collect()
}

pub const GUEST_NAME: &str = "Guest";

/// One player's identity and progress. The map controller owns the
/// single mutable instance and applies score updates explicitly after
/// each session.
#[derive(Clone, Debug)]
pub struct Profile {
    pub username: String,
    pub scores: Scores,
}

impl Profile {
    pub fn new(username: &str) -> Self {
        Profile {
            username: username.to_string(),
            scores: default_scores(),
        }
    }

    /// Guest progress lives only for the current run.
    pub fn is_guest(&self) -> bool {
        self.username == GUEST_NAME
    }

    pub fn is_unlocked(&self, game: GameId) -> bool {
        is_unlocked(&self.scores, game)
    }

    pub fn score(&self, game: GameId) -> f64 {
        self.scores.get(&game).copied().unwrap_or(0.0)
    }
}

/// Derived gate: first game always open, otherwise the prerequisite's
/// stored accuracy must reach the threshold.
pub fn is_unlocked(scores: &Scores, game: GameId) -> bool {
    match game.prerequisite() {
        None => true,
        Some(prereq) => {
            scores.get(&prereq).copied().unwrap_or(0.0) >= PASS_THRESHOLD
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_game_is_always_unlocked() {
        let empty = Scores::new();
        assert!(is_unlocked(&empty, GameId::Treasure));

        let mut scores = default_scores();
        scores.insert(GameId::Treasure, 0.0);
        assert!(is_unlocked(&scores, GameId::Treasure));
    }

    #[test]
    fn below_threshold_keeps_the_next_game_locked() {
        let mut scores = default_scores();
        scores.insert(GameId::Treasure, 0.6);
        assert!(!is_unlocked(&scores, GameId::Unjumble));
    }

    #[test]
    fn threshold_unlocks_the_next_game() {
        let mut scores = default_scores();
        scores.insert(GameId::Treasure, 0.8);
        assert!(is_unlocked(&scores, GameId::Unjumble));
        // But not the one after it.
        assert!(!is_unlocked(&scores, GameId::AddLetters));
    }

    #[test]
    fn chain_order_is_fixed() {
        assert_eq!(GameId::Treasure.prerequisite(), None);
        assert_eq!(GameId::Unjumble.prerequisite(), Some(GameId::Treasure));
        assert_eq!(GameId::AddLetters.prerequisite(), Some(GameId::Unjumble));
        assert_eq!(GameId::Memory.prerequisite(), Some(GameId::AddLetters));
    }

    #[test]
    fn missing_score_counts_as_zero() {
        let scores = Scores::new();
        assert!(!is_unlocked(&scores, GameId::Memory));
    }

    #[test]
    fn game_ids_serialize_as_snake_case_keys() {
        assert_eq!(
            serde_json::to_string(&GameId::AddLetters).unwrap(),
            "\"add_letters\""
        );
        assert_eq!(
            serde_json::from_str::<GameId>("\"treasure\"").unwrap(),
            GameId::Treasure
        );
    }

    #[test]
    fn guest_profile_is_flagged() {
        assert!(Profile::new(GUEST_NAME).is_guest());
        assert!(!Profile::new("Alice").is_guest());
    }
}
