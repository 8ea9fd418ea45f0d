//! Spielregeln
//!
//! Zwei Stellschrauben fuer den Regelsatz:
//! - Zaehlen diagonale Fuenferreihen?
//! - Ab wie vielen Zuegen ist die Partie unentschieden?

use serde::{Deserialize, Serialize};

use crate::board::FELDER;
use crate::win_check::Richtung;

/// Schwelle fuer ein Unentschieden
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnentschiedenRegel {
    /// Unentschieden wenn alle N*N Felder belegt sind
    #[default]
    VollesBrett,
    /// Unentschieden bereits nach N*N-1 Zuegen
    Referenz,
}

impl UnentschiedenRegel {
    /// Anzahl Zuege, ab der ohne Gewinner ein Unentschieden gilt
    pub fn schwelle(self) -> u32 {
        match self {
            Self::VollesBrett => FELDER,
            Self::Referenz => FELDER - 1,
        }
    }
}

/// Regelsatz einer Partie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Regeln {
    /// Diagonale Reihen zaehlen als Gewinn
    pub diagonalen: bool,
    /// Schwelle fuer Unentschieden
    pub unentschieden: UnentschiedenRegel,
}

impl Default for Regeln {
    fn default() -> Self {
        Self {
            diagonalen: true,
            unentschieden: UnentschiedenRegel::VollesBrett,
        }
    }
}

impl Regeln {
    /// Klassischer Regelsatz: nur Zeilen/Spalten, Unentschieden bei N*N-1
    pub fn referenz() -> Self {
        Self {
            diagonalen: false,
            unentschieden: UnentschiedenRegel::Referenz,
        }
    }

    /// Richtungen, die bei der Gewinnpruefung durchsucht werden
    pub fn richtungen(&self) -> &'static [Richtung] {
        if self.diagonalen {
            &Richtung::ALLE
        } else {
            &Richtung::ACHSEN
        }
    }
}
