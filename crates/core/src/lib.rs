//! gomoku-core – Gemeinsame Typen und Fehlertypen
//!
//! Dieses Crate stellt die fundamentalen Bausteine bereit, die von allen
//! anderen Gomoku-Crates gemeinsam genutzt werden.

pub mod error;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use error::{GomokuError, Result};
pub use types::{Cell, GameId, GameResult, PlayerRole, SlotIndex};
