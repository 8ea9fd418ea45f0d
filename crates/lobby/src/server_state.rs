//! Gemeinsamer Lobby-Zustand
//!
//! Haelt Konfiguration, Scoreboard, Metriken, den Spielzaehler und die
//! Liste laufender Partien. Wird als `Arc<LobbyState>` zwischen dem
//! Accept-Loop und allen Sessions geteilt.

use dashmap::DashMap;
use gomoku_core::types::GameId;
use gomoku_game::{Regeln, Scoreboard, STANDARD_KAPAZITAET};
use gomoku_observability::GomokuMetrics;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Konfiguration fuer Lobby und Sessions
#[derive(Debug, Clone)]
pub struct LobbyConfig {
    /// Regelsatz aller Partien
    pub regeln: Regeln,
    /// Maximale Laenge eines Spielernamens (in Zeichen)
    pub max_name_laenge: usize,
    /// Wartezeit auf den Namen eines Spielers
    pub namen_timeout: Duration,
    /// Wartezeit auf einen Zug
    pub zug_timeout: Duration,
    /// Anzahl Scoreboard-Slots
    pub scoreboard_kapazitaet: usize,
    /// Listen-Backlog des TCP-Sockets
    pub backlog: u32,
    /// Frist fuer laufende Partien beim Shutdown
    pub shutdown_frist: Duration,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            regeln: Regeln::default(),
            max_name_laenge: 20,
            namen_timeout: Duration::from_secs(60),
            zug_timeout: Duration::from_secs(300),
            scoreboard_kapazitaet: STANDARD_KAPAZITAET,
            backlog: 10,
            shutdown_frist: Duration::from_secs(30),
        }
    }
}

/// Eintrag einer laufenden Partie
#[derive(Debug, Clone)]
pub struct PartieInfo {
    /// Gegenstellen von Spieler A und B
    pub spieler: [Option<SocketAddr>; 2],
    pub gestartet: Instant,
}

/// Gemeinsamer Zustand (thread-safe, Arc-geteilt)
pub struct LobbyState {
    pub config: Arc<LobbyConfig>,
    pub scoreboard: Scoreboard,
    pub metriken: GomokuMetrics,
    /// Laufende Partien nach Spielnummer
    pub partien: DashMap<GameId, PartieInfo>,
    naechste_id: AtomicU64,
}

impl LobbyState {
    /// Erstellt einen neuen LobbyState mit leerem Scoreboard
    pub fn neu(config: LobbyConfig, metriken: GomokuMetrics) -> Arc<Self> {
        let scoreboard = Scoreboard::neu(config.scoreboard_kapazitaet);
        let state = Self {
            config: Arc::new(config),
            scoreboard,
            metriken,
            partien: DashMap::new(),
            naechste_id: AtomicU64::new(1),
        };
        state.scoreboard_metriken_aktualisieren();
        Arc::new(state)
    }

    /// Vergibt die naechste Spielnummer (beginnend bei 1, streng steigend)
    pub fn naechste_spiel_id(&self) -> GameId {
        GameId(self.naechste_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Anzahl aktuell laufender Partien
    pub fn laufende_partien(&self) -> usize {
        self.partien.len()
    }

    /// Uebertraegt den Fuellstand des Scoreboards in die Metriken
    pub fn scoreboard_metriken_aktualisieren(&self) {
        self.metriken
            .scoreboard_setzen(self.scoreboard.belegt(), self.scoreboard.kapazitaet());
    }
}
