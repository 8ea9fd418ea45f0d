//! Gewinnpruefung – fuenf gleiche Steine in einer Reihe
//!
//! Jede Richtung wird unabhaengig ueber alle Startfelder gescannt. Die Scans
//! laufen als scoped Threads ueber eine unveraenderliche Referenz auf das
//! Brett; jeder liefert sein eigenes `Option<PlayerRole>`, kombiniert wird
//! erst nachdem alle fertig sind.

use gomoku_core::types::{Cell, PlayerRole};

use crate::board::{Board, BRETT_GROESSE};
use crate::rules::Regeln;

/// Anzahl gleicher Steine fuer einen Gewinn
pub const GEWINN_LAENGE: usize = 5;

/// Scan-Richtung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Richtung {
    /// Entlang einer Zeile (col + 1)
    Horizontal,
    /// Entlang einer Spalte (row + 1)
    Vertikal,
    /// Nach rechts unten (row + 1, col + 1)
    Diagonal,
    /// Nach links unten (row + 1, col - 1)
    Antidiagonal,
}

impl Richtung {
    /// Nur Zeilen und Spalten
    pub const ACHSEN: [Richtung; 2] = [Richtung::Horizontal, Richtung::Vertikal];

    /// Alle vier Richtungen
    pub const ALLE: [Richtung; 4] = [
        Richtung::Horizontal,
        Richtung::Vertikal,
        Richtung::Diagonal,
        Richtung::Antidiagonal,
    ];

    fn schritt(self) -> (isize, isize) {
        match self {
            Self::Horizontal => (0, 1),
            Self::Vertikal => (1, 0),
            Self::Diagonal => (1, 1),
            Self::Antidiagonal => (1, -1),
        }
    }
}

/// Feld `k` Schritte von (row, col) entfernt, None ausserhalb des Bretts
fn versetzt(row: usize, col: usize, richtung: Richtung, k: usize) -> Option<(usize, usize)> {
    let (dr, dc) = richtung.schritt();
    let r = row as isize + dr * k as isize;
    let c = col as isize + dc * k as isize;
    if r < 0 || c < 0 || r >= BRETT_GROESSE as isize || c >= BRETT_GROESSE as isize {
        return None;
    }
    Some((r as usize, c as usize))
}

/// Sucht in einer Richtung nach einer Reihe von mindestens fuenf gleichen Steinen
///
/// Eine laengere Reihe enthaelt immer eine Fuenferreihe ab ihrem Anfang und
/// wird daher ebenfalls erkannt.
pub fn richtung_pruefen(board: &Board, richtung: Richtung) -> Option<PlayerRole> {
    for row in 0..BRETT_GROESSE {
        for col in 0..BRETT_GROESSE {
            let stein = match board.zelle(row, col) {
                Some(stein) if !stein.ist_leer() => stein,
                _ => continue,
            };

            let reihe = (1..GEWINN_LAENGE).all(|k| {
                versetzt(row, col, richtung, k).and_then(|(r, c)| board.zelle(r, c)) == Some(stein)
            });

            if reihe {
                return stein.besitzer();
            }
        }
    }
    None
}

/// Prueft alle vom Regelsatz vorgesehenen Richtungen parallel
///
/// Wartet auf alle Scans (Barriere) und gibt den ersten gemeldeten Gewinner
/// zurueck. Da pro Zug nur ein Stein gesetzt wird, koennen nicht beide
/// Spieler gleichzeitig eine neue Reihe haben.
pub fn gewinner_suchen(board: &Board, regeln: &Regeln) -> Option<PlayerRole> {
    let ergebnisse: Vec<Option<PlayerRole>> = std::thread::scope(|scope| {
        let scans: Vec<_> = regeln
            .richtungen()
            .iter()
            .map(|&richtung| scope.spawn(move || richtung_pruefen(board, richtung)))
            .collect();

        scans
            .into_iter()
            .map(|scan| {
                scan.join()
                    .unwrap_or_else(|panik| std::panic::resume_unwind(panik))
            })
            .collect()
    });

    ergebnisse.into_iter().flatten().next()
}

/// Hilfsfunktion fuer Tests: Stein an einer Position ohne Spielablauf
#[cfg(test)]
pub(crate) fn brett_mit(steine: &[(usize, usize, Cell)]) -> Board {
    let mut board = Board::neu();
    for &(row, col, stein) in steine {
        board.feld_setzen_roh(row, col, stein);
    }
    board
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reihe(
        start: (usize, usize),
        richtung: Richtung,
        laenge: usize,
        stein: Cell,
    ) -> Vec<(usize, usize, Cell)> {
        (0..laenge)
            .map(|k| {
                let (r, c) = versetzt(start.0, start.1, richtung, k).expect("Reihe im Brett");
                (r, c, stein)
            })
            .collect()
    }

    #[test]
    fn leeres_brett_hat_keinen_gewinner() {
        let board = Board::neu();
        assert_eq!(gewinner_suchen(&board, &Regeln::default()), None);
    }

    #[test]
    fn horizontal_an_allen_startspalten() {
        // Start bei Spalte 0 bis zur letzten Spalte, die noch fuenf Felder erlaubt
        for row in 0..BRETT_GROESSE {
            for col in 0..=(BRETT_GROESSE - GEWINN_LAENGE) {
                let board = brett_mit(&reihe((row, col), Richtung::Horizontal, 5, Cell::PlayerA));
                assert_eq!(
                    richtung_pruefen(&board, Richtung::Horizontal),
                    Some(PlayerRole::PlayerA),
                    "Zeile {row}, Start {col}"
                );
                assert_eq!(richtung_pruefen(&board, Richtung::Vertikal), None);
            }
        }
    }

    #[test]
    fn vertikal_an_allen_startzeilen() {
        for col in 0..BRETT_GROESSE {
            for row in 0..=(BRETT_GROESSE - GEWINN_LAENGE) {
                let board = brett_mit(&reihe((row, col), Richtung::Vertikal, 5, Cell::PlayerB));
                assert_eq!(
                    gewinner_suchen(&board, &Regeln::referenz()),
                    Some(PlayerRole::PlayerB),
                    "Spalte {col}, Start {row}"
                );
            }
        }
    }

    #[test]
    fn vier_in_einer_reihe_reichen_nicht() {
        let board = brett_mit(&reihe((2, 0), Richtung::Horizontal, 4, Cell::PlayerA));
        assert_eq!(gewinner_suchen(&board, &Regeln::default()), None);
    }

    #[test]
    fn unterbrochene_reihe_zaehlt_nicht() {
        let mut steine = reihe((0, 0), Richtung::Horizontal, 6, Cell::PlayerA);
        steine[2].2 = Cell::PlayerB;
        let board = brett_mit(&steine);
        assert_eq!(gewinner_suchen(&board, &Regeln::default()), None);
    }

    #[test]
    fn sechs_in_einer_reihe_gewinnen() {
        let board = brett_mit(&reihe((7, 1), Richtung::Horizontal, 6, Cell::PlayerB));
        assert_eq!(
            gewinner_suchen(&board, &Regeln::default()),
            Some(PlayerRole::PlayerB)
        );
    }

    #[test]
    fn diagonalen_nur_mit_regel() {
        let diagonal = brett_mit(&reihe((1, 2), Richtung::Diagonal, 5, Cell::PlayerA));
        let anti = brett_mit(&reihe((0, 7), Richtung::Antidiagonal, 5, Cell::PlayerB));

        assert_eq!(
            gewinner_suchen(&diagonal, &Regeln::default()),
            Some(PlayerRole::PlayerA)
        );
        assert_eq!(
            gewinner_suchen(&anti, &Regeln::default()),
            Some(PlayerRole::PlayerB)
        );

        // Referenz-Regeln ignorieren Diagonalen
        assert_eq!(gewinner_suchen(&diagonal, &Regeln::referenz()), None);
        assert_eq!(gewinner_suchen(&anti, &Regeln::referenz()), None);
    }

    #[test]
    fn reihe_am_rand_laeuft_nicht_ueber() {
        // Vier Steine am Zeilenende plus einer am Anfang der naechsten Zeile
        let mut steine = reihe((0, 4), Richtung::Horizontal, 4, Cell::PlayerA);
        steine.push((1, 0, Cell::PlayerA));
        let board = brett_mit(&steine);
        assert_eq!(gewinner_suchen(&board, &Regeln::default()), None);
    }
}
