//! Fehlertypen fuer Gomoku
//!
//! Zentraler Fehler-Enum fuer Spielregeln und Scoreboard. Der Lobby-Crate
//! konvertiert ihn via `#[from]` in seinen eigenen Session-Fehler.

use thiserror::Error;

/// Globaler Result-Alias fuer Gomoku
pub type Result<T> = std::result::Result<T, GomokuError>;

/// Alle Fehler der Spiel- und Scoreboard-Logik
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GomokuError {
    // --- Zuege ---
    #[error("Zug ausserhalb des Bretts: ({row}, {col})")]
    ZugAusserhalb { row: usize, col: usize },

    #[error("Feld ({row}, {col}) ist bereits belegt")]
    FeldBelegt { row: usize, col: usize },

    #[error("Partie ist bereits beendet")]
    PartieBeendet,

    // --- Spielernamen ---
    #[error("Ungueltiger Spielername: {0}")]
    UngueltigerName(String),

    // --- Scoreboard ---
    #[error("Scoreboard voll: alle {kapazitaet} Plaetze belegt")]
    ScoreboardVoll { kapazitaet: usize },

    #[error("Ungueltiger Scoreboard-Slot: {0}")]
    UngueltigerSlot(usize),

    #[error("Kein Endergebnis zum Eintragen")]
    KeinEndergebnis,
}

impl GomokuError {
    /// Gibt true zurueck wenn der Fehler durch eine Client-Eingabe ausgeloest wurde
    pub fn ist_protokollverletzung(&self) -> bool {
        matches!(
            self,
            Self::ZugAusserhalb { .. }
                | Self::FeldBelegt { .. }
                | Self::PartieBeendet
                | Self::UngueltigerName(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fehler_anzeige() {
        let e = GomokuError::ZugAusserhalb { row: 8, col: 2 };
        assert_eq!(e.to_string(), "Zug ausserhalb des Bretts: (8, 2)");

        let e = GomokuError::ScoreboardVoll { kapazitaet: 10 };
        assert!(e.to_string().contains("10"));
    }

    #[test]
    fn protokollverletzung_erkennung() {
        assert!(GomokuError::FeldBelegt { row: 0, col: 0 }.ist_protokollverletzung());
        assert!(GomokuError::UngueltigerName("".into()).ist_protokollverletzung());
        assert!(!GomokuError::ScoreboardVoll { kapazitaet: 10 }.ist_protokollverletzung());
        assert!(!GomokuError::UngueltigerSlot(11).ist_protokollverletzung());
    }
}
