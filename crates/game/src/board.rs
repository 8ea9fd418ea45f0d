//! Spielbrett – 8x8 Felder, Zugzaehler, Endergebnis
//!
//! Invarianten:
//! - `zuege` entspricht immer der Anzahl belegter Felder
//! - `ergebnis` bleibt `InProgress` bis eine Auswertung ein Ende feststellt
//!   und wird danach nie mehr zurueckgesetzt

use gomoku_core::error::{GomokuError, Result};
use gomoku_core::types::{Cell, GameResult, PlayerRole};
use gomoku_protocol::BoardSnapshot;

use crate::rules::Regeln;
use crate::win_check::gewinner_suchen;

/// Kantenlaenge des Bretts
pub const BRETT_GROESSE: usize = 8;

/// Anzahl Felder insgesamt
pub const FELDER: u32 = (BRETT_GROESSE * BRETT_GROESSE) as u32;

/// Spielbrett einer Partie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    zellen: [[Cell; BRETT_GROESSE]; BRETT_GROESSE],
    zuege: u32,
    ergebnis: GameResult,
}

impl Board {
    /// Erstellt ein leeres Brett
    pub fn neu() -> Self {
        Self {
            zellen: [[Cell::Empty; BRETT_GROESSE]; BRETT_GROESSE],
            zuege: 0,
            ergebnis: GameResult::InProgress,
        }
    }

    /// Feld an (row, col), None ausserhalb des Bretts
    pub fn zelle(&self, row: usize, col: usize) -> Option<Cell> {
        self.zellen.get(row).and_then(|zeile| zeile.get(col)).copied()
    }

    /// Anzahl gespielter Zuege
    pub fn zuege(&self) -> u32 {
        self.zuege
    }

    pub fn ergebnis(&self) -> GameResult {
        self.ergebnis
    }

    /// Gibt true zurueck wenn kein Feld mehr frei ist
    pub fn ist_voll(&self) -> bool {
        self.zuege >= FELDER
    }

    /// Setzt den Stein einer Rolle auf ein freies Feld
    ///
    /// # Fehler
    /// - `PartieBeendet` wenn das Ergebnis bereits feststeht
    /// - `ZugAusserhalb` wenn row/col nicht in `[0, 8)` liegen
    /// - `FeldBelegt` wenn das Feld nicht leer ist
    pub fn stein_setzen(&mut self, row: usize, col: usize, rolle: PlayerRole) -> Result<()> {
        if self.ergebnis.ist_beendet() {
            return Err(GomokuError::PartieBeendet);
        }

        let feld = self
            .zellen
            .get_mut(row)
            .and_then(|zeile| zeile.get_mut(col))
            .ok_or(GomokuError::ZugAusserhalb { row, col })?;

        if !feld.ist_leer() {
            return Err(GomokuError::FeldBelegt { row, col });
        }

        *feld = rolle.stein();
        self.zuege += 1;
        Ok(())
    }

    /// Wertet das Brett nach einem Zug aus
    ///
    /// Eine Fuenferreihe hat Vorrang vor dem Unentschieden, auch wenn beide
    /// im selben Zug eintreten. Ein bereits gesetztes Ergebnis bleibt stehen.
    pub fn auswerten(&mut self, regeln: &Regeln) -> GameResult {
        if self.ergebnis.ist_beendet() {
            return self.ergebnis;
        }

        if let Some(gewinner) = gewinner_suchen(self, regeln) {
            self.ergebnis = gewinner.sieg();
        } else if self.zuege >= regeln.unentschieden.schwelle() {
            self.ergebnis = GameResult::Tie;
        }

        self.ergebnis
    }

    /// Serialisierbarer Snapshot fuer das Protokoll
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            size: BRETT_GROESSE as u8,
            cells: self.zellen.iter().map(|zeile| zeile.to_vec()).collect(),
            moves: self.zuege,
            result: self.ergebnis,
        }
    }

    #[cfg(test)]
    pub(crate) fn feld_setzen_roh(&mut self, row: usize, col: usize, stein: Cell) {
        if self.zellen[row][col].ist_leer() && !stein.ist_leer() {
            self.zuege += 1;
        }
        self.zellen[row][col] = stein;
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::neu()
    }
}

/// Textdarstellung fuer Logs (`-` leer, `A`/`B` Steine)
impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for zeile in &self.zellen {
            for feld in zeile {
                let zeichen = match feld {
                    Cell::Empty => '-',
                    Cell::PlayerA => 'A',
                    Cell::PlayerB => 'B',
                };
                write!(f, "[ {zeichen} ]")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
