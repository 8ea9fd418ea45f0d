//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use gomoku_game::{Regeln, STANDARD_KAPAZITAET};
use gomoku_lobby::LobbyConfig;
use gomoku_observability::logging::{log_format_gueltig, log_level_gueltig};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Allgemeine Server-Einstellungen
    pub server: ServerEinstellungen,
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// Spielregeln und Zeitlimits
    pub spiel: SpielEinstellungen,
    /// Scoreboard-Einstellungen
    pub scoreboard: ScoreboardEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
    /// Observability-Einstellungen (Metriken, Health)
    pub observability: ObservabilityEinstellungen,
    /// Verhalten beim Herunterfahren
    pub shutdown: ShutdownEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename des Servers (nur fuer Logs)
    pub name: String,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "Gomoku Server".into(),
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer den Spiel-Listener und den Observability-Server
    pub bind_adresse: String,
    /// TCP-Port fuer Spieler-Verbindungen
    pub tcp_port: u16,
    /// Listen-Backlog des TCP-Sockets
    pub backlog: u32,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            tcp_port: 17307,
            backlog: 10,
        }
    }
}

/// Spielregeln und Zeitlimits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpielEinstellungen {
    /// Maximale Laenge eines Spielernamens in Zeichen
    pub max_name_laenge: usize,
    /// Sekunden bis ein Spieler seinen Namen gesendet haben muss
    pub namen_timeout_sek: u64,
    /// Sekunden fuer einen Zug
    pub zug_timeout_sek: u64,
    /// Diagonalen und Unentschieden-Schwelle
    pub regeln: Regeln,
}

impl Default for SpielEinstellungen {
    fn default() -> Self {
        Self {
            max_name_laenge: 20,
            namen_timeout_sek: 60,
            zug_timeout_sek: 300,
            regeln: Regeln::default(),
        }
    }
}

/// Scoreboard-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreboardEinstellungen {
    /// Anzahl Slots (ein Slot pro Spielername)
    pub kapazitaet: usize,
}

impl Default for ScoreboardEinstellungen {
    fn default() -> Self {
        Self {
            kapazitaet: STANDARD_KAPAZITAET,
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level oder EnvFilter-Direktive
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Observability-Einstellungen (Metriken + Health-Check)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityEinstellungen {
    /// Aktiviert den Observability-Server
    pub aktiviert: bool,
    /// Port fuer Metriken und Health (Standard: 9300)
    pub port: u16,
}

impl Default for ObservabilityEinstellungen {
    fn default() -> Self {
        Self {
            aktiviert: false,
            port: 9300,
        }
    }
}

/// Verhalten beim Herunterfahren
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutdownEinstellungen {
    /// Sekunden, die laufende Partien nach dem Shutdown-Signal noch haben
    pub frist_sek: u64,
}

impl Default for ShutdownEinstellungen {
    fn default() -> Self {
        Self { frist_sek: 30 }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        let config = match std::fs::read_to_string(pfad) {
            Ok(inhalt) => toml::from_str::<Self>(&inhalt)
                .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Self::default()
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
                ))
            }
        };
        config.pruefen()?;
        Ok(config)
    }

    /// Prueft Werte, die serde allein nicht ausschliessen kann
    pub fn pruefen(&self) -> anyhow::Result<()> {
        if self.scoreboard.kapazitaet == 0 {
            anyhow::bail!("scoreboard.kapazitaet muss groesser als 0 sein");
        }
        if self.spiel.max_name_laenge == 0 {
            anyhow::bail!("spiel.max_name_laenge muss groesser als 0 sein");
        }
        if self.spiel.namen_timeout_sek == 0 || self.spiel.zug_timeout_sek == 0 {
            anyhow::bail!("spiel.namen_timeout_sek und spiel.zug_timeout_sek muessen groesser als 0 sein");
        }
        if !log_level_gueltig(&self.logging.level) {
            anyhow::bail!(
                "logging.level '{}' ungueltig (Stufe oder ziel=stufe, z.B. \"info,gomoku_lobby=debug\")",
                self.logging.level
            );
        }
        if !log_format_gueltig(&self.logging.format) {
            anyhow::bail!(
                "logging.format '{}' ungueltig (erlaubt: text, json)",
                self.logging.format
            );
        }
        Ok(())
    }

    /// Gibt die vollstaendige Bind-Adresse fuer TCP zurueck
    pub fn tcp_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.tcp_port)
    }

    /// Gibt die Bind-Adresse fuer den Observability-Server zurueck
    pub fn observability_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.observability.port)
    }

    /// Leitet die Lobby-Konfiguration ab
    pub fn lobby_config(&self) -> LobbyConfig {
        LobbyConfig {
            regeln: self.spiel.regeln,
            max_name_laenge: self.spiel.max_name_laenge,
            namen_timeout: Duration::from_secs(self.spiel.namen_timeout_sek),
            zug_timeout: Duration::from_secs(self.spiel.zug_timeout_sek),
            scoreboard_kapazitaet: self.scoreboard.kapazitaet,
            backlog: self.netzwerk.backlog,
            shutdown_frist: Duration::from_secs(self.shutdown.frist_sek),
        }
    }
}
