//! Fehlertypen fuer Partie-Sessions

use gomoku_core::error::GomokuError;
use gomoku_core::types::PlayerRole;
use gomoku_protocol::ErrorCode;
use thiserror::Error;

/// Grund fuer den Abbruch einer Partie
///
/// Jeder Fehler einer Session endet in einem Abbruch: beide Spieler werden
/// (sofern noch verbunden) benachrichtigt und beide Verbindungen geschlossen.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Spiel- oder Scoreboard-Fehler
    #[error(transparent)]
    Gomoku(#[from] GomokuError),

    /// Spieler hat die Verbindung geschlossen
    #[error("Spieler {0} hat die Verbindung getrennt")]
    Getrennt(PlayerRole),

    /// Lese- oder Schreibfehler auf der Verbindung eines Spielers
    #[error("Verbindungsfehler bei Spieler {rolle}: {quelle}")]
    Verbindung {
        rolle: PlayerRole,
        #[source]
        quelle: std::io::Error,
    },

    /// Spieler hat nicht rechtzeitig geantwortet
    #[error("Zeitueberschreitung bei Spieler {0}")]
    Timeout(PlayerRole),

    /// Spieler hat gegen das Protokoll verstossen
    #[error("Protokollverletzung von Spieler {rolle}: {grund}")]
    Protokoll {
        rolle: PlayerRole,
        code: ErrorCode,
        grund: String,
    },

    /// Server faehrt herunter
    #[error("Server wird heruntergefahren")]
    Shutdown,

    /// Interner Fehler
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

impl SessionError {
    /// Erstellt eine Protokollverletzung
    pub fn protokoll(rolle: PlayerRole, code: ErrorCode, grund: impl Into<String>) -> Self {
        Self::Protokoll {
            rolle,
            code,
            grund: grund.into(),
        }
    }

    /// Erstellt einen internen Fehler
    pub fn intern(msg: impl Into<String>) -> Self {
        Self::Intern(msg.into())
    }

    /// Spieler, der den Abbruch ausgeloest hat (falls einer verantwortlich ist)
    pub fn verursacher(&self) -> Option<PlayerRole> {
        match self {
            Self::Getrennt(rolle) | Self::Timeout(rolle) => Some(*rolle),
            Self::Verbindung { rolle, .. } | Self::Protokoll { rolle, .. } => Some(*rolle),
            Self::Gomoku(_) | Self::Shutdown | Self::Intern(_) => None,
        }
    }

    /// Gibt true zurueck wenn der Verursacher nicht mehr erreichbar ist
    pub fn verursacher_weg(&self) -> bool {
        matches!(self, Self::Getrennt(_) | Self::Verbindung { .. })
    }

    /// Fehler-Code, den `empfaenger` in der Abbruch-Nachricht erhaelt
    pub fn code_fuer(&self, empfaenger: PlayerRole) -> ErrorCode {
        match self {
            Self::Getrennt(_) | Self::Verbindung { .. } => {
                if self.verursacher() == Some(empfaenger) {
                    ErrorCode::ProtocolViolation
                } else {
                    ErrorCode::OpponentLeft
                }
            }
            Self::Timeout(_) => ErrorCode::Timeout,
            Self::Protokoll { code, .. } => *code,
            Self::Gomoku(GomokuError::ScoreboardVoll { .. }) => ErrorCode::ScoreboardFull,
            Self::Gomoku(e) if e.ist_protokollverletzung() => ErrorCode::ProtocolViolation,
            Self::Gomoku(_) | Self::Intern(_) => ErrorCode::InternalError,
            Self::Shutdown => ErrorCode::ServerShutdown,
        }
    }

    /// Kurzer Grund fuer Logs und Metrik-Labels
    pub fn grund(&self) -> &'static str {
        match self {
            Self::Getrennt(_) | Self::Verbindung { .. } => "getrennt",
            Self::Timeout(_) => "timeout",
            Self::Protokoll { .. } => "protokoll",
            Self::Gomoku(GomokuError::ScoreboardVoll { .. }) => "scoreboard_voll",
            Self::Gomoku(_) | Self::Intern(_) => "intern",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Result-Typ fuer Sessions
pub type SessionResult<T> = Result<T, SessionError>;
