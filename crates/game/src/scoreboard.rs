//! Scoreboard – Geteilte Bestenliste aller Spieler
//!
//! Feste Anzahl Slots; ein Slot mit leerem Namen ist frei. Ein Name belegt
//! beim ersten Auftreten den ersten freien Slot und behaelt ihn fuer die
//! Lebensdauer des Prozesses.
//!
//! Jede Lese-Aendern-Schreiben-Folge (Aufloesen, Sieg, Unentschieden) laeuft
//! komplett unter einem einzigen Lock, damit zwei Partien nie denselben
//! freien Slot beanspruchen oder ein Ergebnis doppelt zaehlen.

use gomoku_core::error::{GomokuError, Result};
use gomoku_core::types::{GameResult, SlotIndex};
use gomoku_protocol::ScoreSnapshot;
use parking_lot::Mutex;
use std::sync::Arc;

/// Standard-Kapazitaet
pub const STANDARD_KAPAZITAET: usize = 10;

// ---------------------------------------------------------------------------
// ScoreboardEntry
// ---------------------------------------------------------------------------

/// Ein Eintrag der Bestenliste
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreboardEntry {
    /// Spielername (leer = freier Slot)
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub slot: SlotIndex,
}

impl ScoreboardEntry {
    fn frei(slot: usize) -> Self {
        Self {
            name: String::new(),
            wins: 0,
            losses: 0,
            ties: 0,
            slot: SlotIndex(slot),
        }
    }

    /// Gibt true zurueck wenn der Slot noch keinem Spieler gehoert
    pub fn ist_frei(&self) -> bool {
        self.name.is_empty()
    }

    /// Serialisierbarer Snapshot fuer das Protokoll
    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            slot: self.slot,
            name: self.name.clone(),
            wins: self.wins,
            losses: self.losses,
            ties: self.ties,
        }
    }
}

// ---------------------------------------------------------------------------
// Scoreboard
// ---------------------------------------------------------------------------

/// Bestenliste mit fester Kapazitaet
///
/// Thread-safe via Arc + Mutex. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct Scoreboard {
    inner: Arc<Mutex<Vec<ScoreboardEntry>>>,
}

impl Scoreboard {
    /// Erstellt ein Scoreboard mit `kapazitaet` freien Slots
    pub fn neu(kapazitaet: usize) -> Self {
        let eintraege = (0..kapazitaet).map(ScoreboardEntry::frei).collect();
        Self {
            inner: Arc::new(Mutex::new(eintraege)),
        }
    }

    pub fn kapazitaet(&self) -> usize {
        self.inner.lock().len()
    }

    /// Anzahl belegter Slots
    pub fn belegt(&self) -> usize {
        self.inner.lock().iter().filter(|e| !e.ist_frei()).count()
    }

    /// Gibt true zurueck wenn kein freier Slot mehr existiert
    pub fn ist_voll(&self) -> bool {
        self.inner.lock().iter().all(|e| !e.ist_frei())
    }

    /// Kopie eines Eintrags (None bei ungueltigem Slot)
    pub fn eintrag(&self, slot: SlotIndex) -> Option<ScoreboardEntry> {
        self.inner.lock().get(slot.0).cloned()
    }

    /// Alle belegten Eintraege in Slot-Reihenfolge
    pub fn eintraege(&self) -> Vec<ScoreboardEntry> {
        self.inner
            .lock()
            .iter()
            .filter(|e| !e.ist_frei())
            .cloned()
            .collect()
    }

    /// Findet den Slot eines Namens oder legt ihn im ersten freien Slot an
    ///
    /// Idempotent: ein zweiter Aufruf mit demselben Namen liefert denselben
    /// Slot und veraendert keine Zaehler.
    ///
    /// # Fehler
    /// - `UngueltigerName` bei leerem Namen
    /// - `ScoreboardVoll` wenn der Name neu ist und kein Slot frei ist
    pub fn aufloesen(&self, name: &str) -> Result<SlotIndex> {
        let mut eintraege = self.inner.lock();
        aufloesen_in(&mut eintraege, name)
    }

    /// Loest die Namen beider Spieler einer Partie unter einem Lock auf
    ///
    /// Entweder werden beide Namen aufgeloest oder es wird kein Slot belegt.
    /// Tragen beide Spieler denselben Namen, teilen sie sich einen Slot.
    pub fn paar_aufloesen(&self, name_a: &str, name_b: &str) -> Result<(SlotIndex, SlotIndex)> {
        let mut eintraege = self.inner.lock();

        for name in [name_a, name_b] {
            name_pruefen(name)?;
        }

        let mut neue_namen = 0;
        if suchen(&eintraege, name_a).is_none() {
            neue_namen += 1;
        }
        if name_b != name_a && suchen(&eintraege, name_b).is_none() {
            neue_namen += 1;
        }

        let freie = eintraege.iter().filter(|e| e.ist_frei()).count();
        if neue_namen > freie {
            tracing::warn!(
                spieler_a = name_a,
                spieler_b = name_b,
                kapazitaet = eintraege.len(),
                "Scoreboard voll – Spieler koennen nicht eingetragen werden"
            );
            return Err(GomokuError::ScoreboardVoll {
                kapazitaet: eintraege.len(),
            });
        }

        let slot_a = aufloesen_in(&mut eintraege, name_a)?;
        let slot_b = aufloesen_in(&mut eintraege, name_b)?;
        Ok((slot_a, slot_b))
    }

    /// Traegt einen Sieg fuer `gewinner` und eine Niederlage fuer `verlierer` ein
    pub fn sieg_eintragen(&self, gewinner: SlotIndex, verlierer: SlotIndex) -> Result<()> {
        let mut eintraege = self.inner.lock();
        sieg_in(&mut eintraege, gewinner, verlierer)
    }

    /// Traegt ein Unentschieden fuer beide Slots ein
    pub fn unentschieden_eintragen(&self, slot_a: SlotIndex, slot_b: SlotIndex) -> Result<()> {
        let mut eintraege = self.inner.lock();
        unentschieden_in(&mut eintraege, slot_a, slot_b)
    }

    /// Traegt das Endergebnis einer Partie ein und liefert beide Eintraege danach
    ///
    /// Die zurueckgegebenen Kopien stammen aus derselben Lock-Phase wie die
    /// Aenderung und sind damit konsistent zum eingetragenen Ergebnis.
    pub fn ergebnis_eintragen(
        &self,
        ergebnis: GameResult,
        slot_a: SlotIndex,
        slot_b: SlotIndex,
    ) -> Result<(ScoreboardEntry, ScoreboardEntry)> {
        let mut eintraege = self.inner.lock();

        match ergebnis {
            GameResult::WinA => sieg_in(&mut eintraege, slot_a, slot_b)?,
            GameResult::WinB => sieg_in(&mut eintraege, slot_b, slot_a)?,
            GameResult::Tie => unentschieden_in(&mut eintraege, slot_a, slot_b)?,
            GameResult::InProgress => return Err(GomokuError::KeinEndergebnis),
        }

        Ok((
            eintraege[slot_a.0].clone(),
            eintraege[slot_b.0].clone(),
        ))
    }
}

impl Default for Scoreboard {
    fn default() -> Self {
        Self::neu(STANDARD_KAPAZITAET)
    }
}

// ---------------------------------------------------------------------------
// Operationen auf der gesperrten Liste
// ---------------------------------------------------------------------------

fn name_pruefen(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(GomokuError::UngueltigerName(
            "Name darf nicht leer sein".into(),
        ));
    }
    Ok(())
}

fn suchen(eintraege: &[ScoreboardEntry], name: &str) -> Option<SlotIndex> {
    eintraege
        .iter()
        .find(|e| !e.ist_frei() && e.name == name)
        .map(|e| e.slot)
}

fn aufloesen_in(eintraege: &mut [ScoreboardEntry], name: &str) -> Result<SlotIndex> {
    name_pruefen(name)?;

    if let Some(slot) = suchen(eintraege, name) {
        return Ok(slot);
    }

    let kapazitaet = eintraege.len();
    let frei = eintraege
        .iter_mut()
        .find(|e| e.ist_frei())
        .ok_or(GomokuError::ScoreboardVoll { kapazitaet })?;

    frei.name = name.to_string();
    frei.wins = 0;
    frei.losses = 0;
    frei.ties = 0;

    tracing::debug!(name = name, slot = %frei.slot, "Scoreboard-Slot belegt");
    Ok(frei.slot)
}

fn slot_pruefen(eintraege: &[ScoreboardEntry], slot: SlotIndex) -> Result<()> {
    match eintraege.get(slot.0) {
        Some(e) if !e.ist_frei() => Ok(()),
        _ => Err(GomokuError::UngueltigerSlot(slot.0)),
    }
}

fn sieg_in(
    eintraege: &mut [ScoreboardEntry],
    gewinner: SlotIndex,
    verlierer: SlotIndex,
) -> Result<()> {
    // Beide Slots vor der ersten Aenderung pruefen
    slot_pruefen(eintraege, gewinner)?;
    slot_pruefen(eintraege, verlierer)?;

    eintraege[gewinner.0].wins += 1;
    eintraege[verlierer.0].losses += 1;
    Ok(())
}

fn unentschieden_in(
    eintraege: &mut [ScoreboardEntry],
    slot_a: SlotIndex,
    slot_b: SlotIndex,
) -> Result<()> {
    slot_pruefen(eintraege, slot_a)?;
    slot_pruefen(eintraege, slot_b)?;

    eintraege[slot_a.0].ties += 1;
    eintraege[slot_b.0].ties += 1;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
