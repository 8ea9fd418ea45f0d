//! Gemeinsame Identifikations- und Spieltypen
//!
//! IDs verwenden das Newtype-Pattern um Verwechslungen zwischen Spielnummer
//! und Scoreboard-Slot zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};

/// Fortlaufende Spielnummer (beginnt bei 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameId(pub u64);

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "game:{}", self.0)
    }
}

/// Index eines Eintrags im Scoreboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotIndex(pub usize);

impl std::fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "slot:{}", self.0)
    }
}

/// Rolle eines Spielers innerhalb einer Partie
///
/// `PlayerA` ist immer der zuerst akzeptierte Client und beginnt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerRole {
    PlayerA,
    PlayerB,
}

impl PlayerRole {
    /// Gibt die Rolle des Gegners zurueck
    pub fn gegner(self) -> Self {
        match self {
            Self::PlayerA => Self::PlayerB,
            Self::PlayerB => Self::PlayerA,
        }
    }

    /// Stein, den diese Rolle auf das Brett setzt
    pub fn stein(self) -> Cell {
        match self {
            Self::PlayerA => Cell::PlayerA,
            Self::PlayerB => Cell::PlayerB,
        }
    }

    /// Sieg-Ergebnis fuer diese Rolle
    pub fn sieg(self) -> GameResult {
        match self {
            Self::PlayerA => GameResult::WinA,
            Self::PlayerB => GameResult::WinB,
        }
    }
}

impl std::fmt::Display for PlayerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PlayerA => f.write_str("A"),
            Self::PlayerB => f.write_str("B"),
        }
    }
}

/// Zustand eines einzelnen Brettfelds
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    #[default]
    Empty,
    PlayerA,
    PlayerB,
}

impl Cell {
    /// Besitzer des Steins (None bei leerem Feld)
    pub fn besitzer(self) -> Option<PlayerRole> {
        match self {
            Self::Empty => None,
            Self::PlayerA => Some(PlayerRole::PlayerA),
            Self::PlayerB => Some(PlayerRole::PlayerB),
        }
    }

    pub fn ist_leer(self) -> bool {
        self == Self::Empty
    }
}

/// Ergebnis einer Partie
///
/// Einmal von `InProgress` auf einen Endzustand gesetzt, wird das Ergebnis
/// fuer die Lebensdauer des Bretts nicht mehr zurueckgesetzt.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    #[default]
    InProgress,
    WinA,
    WinB,
    Tie,
}

impl GameResult {
    /// Gibt true zurueck wenn die Partie beendet ist
    pub fn ist_beendet(self) -> bool {
        self != Self::InProgress
    }

    /// Gewinner der Partie (None bei Unentschieden oder laufender Partie)
    pub fn gewinner(self) -> Option<PlayerRole> {
        match self {
            Self::WinA => Some(PlayerRole::PlayerA),
            Self::WinB => Some(PlayerRole::PlayerB),
            Self::InProgress | Self::Tie => None,
        }
    }

    /// Label fuer Logs und Metriken
    pub fn label(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::WinA => "win_a",
            Self::WinB => "win_b",
            Self::Tie => "tie",
        }
    }
}
