//! gomoku-game – Spiellogik ohne Netzwerk
//!
//! - `Board`: 8x8-Brett mit Zugzaehler und Endergebnis
//! - `win_check`: Suche nach fuenf Steinen in einer Reihe
//! - `Regeln`: Diagonalen und Unentschieden-Schwelle
//! - `Scoreboard`: geteilte Bestenliste mit fester Kapazitaet

pub mod board;
pub mod rules;
pub mod scoreboard;
pub mod win_check;

pub use board::{Board, BRETT_GROESSE, FELDER};
pub use rules::{Regeln, UnentschiedenRegel};
pub use scoreboard::{Scoreboard, ScoreboardEntry, STANDARD_KAPAZITAET};
pub use win_check::{gewinner_suchen, richtung_pruefen, Richtung, GEWINN_LAENGE};
