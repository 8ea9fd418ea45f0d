//! Spiel-Protokoll (TCP)
//!
//! Definiert alle Nachrichten die waehrend einer Partie zwischen Client und
//! Server ausgetauscht werden.
//!
//! ## Ablauf
//! ```text
//! Server -> beide   Welcome   (Rolle, leeres Brett)
//! Client -> Server  Name
//! Server -> beide   Opponent  (Name des Gegners)
//! Server -> beide   Turn      (wer ist am Zug)      <-+
//! aktiv  -> Server  Move      (row, col)              |
//! Server -> beide   Continue  (aktualisiertes Brett) -+
//! Server -> beide   GameOver  (Ergebnis, Brett, Slots, Scoreboard-Eintraege)
//! ```
//!
//! ## Design
//! - Jede Nachricht traegt die `game_id` der Partie (0 solange keine vergeben)
//! - JSON-Serialisierung via serde, Tagged Enum ueber das Feld `type`

use gomoku_core::types::{Cell, GameId, GameResult, PlayerRole, SlotIndex};
use serde::{Deserialize, Serialize};

/// Aktuelle Protokollversion (wird im Welcome mitgeschickt)
pub const PROTOKOLL_VERSION: u16 = 1;

// ---------------------------------------------------------------------------
// Fehler-Codes
// ---------------------------------------------------------------------------

/// Standardisierte Fehler-Codes fuer Abbruch-Nachrichten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Protokoll
    ProtocolViolation,
    InvalidName,
    InvalidMove,
    NotYourTurn,
    Timeout,
    // Partie
    OpponentLeft,
    ScoreboardFull,
    // Server
    ServerShutdown,
    InternalError,
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Serialisierbarer Zustand des Spielbretts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    /// Kantenlaenge des Bretts
    pub size: u8,
    /// Felder zeilenweise (`cells[row][col]`)
    pub cells: Vec<Vec<Cell>>,
    /// Anzahl gespielter Zuege
    pub moves: u32,
    /// Ergebnis zum Zeitpunkt des Snapshots
    pub result: GameResult,
}

impl BoardSnapshot {
    /// Gibt das Feld an (row, col) zurueck, falls vorhanden
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|zeile| zeile.get(col)).copied()
    }
}

/// Serialisierbarer Scoreboard-Eintrag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub slot: SlotIndex,
    pub name: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

// ---------------------------------------------------------------------------
// Nachrichten
// ---------------------------------------------------------------------------

/// Begruessung beim Partiestart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    /// Zugewiesene Rolle
    pub role: PlayerRole,
    /// Leeres Startbrett
    pub board: BoardSnapshot,
    pub protocol_version: u16,
}

/// Name des Spielers (Client -> Server) bzw. des Gegners (Server -> Client)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameMessage {
    pub name: String,
}

/// Wer ist am Zug
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnMessage {
    pub active: PlayerRole,
}

/// Zug des aktiven Spielers
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MoveRequest {
    pub row: usize,
    pub col: usize,
}

/// Partie laeuft weiter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinueMessage {
    pub board: BoardSnapshot,
}

/// Partie ist beendet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameOverMessage {
    /// Endergebnis (`win_a`, `win_b` oder `tie`)
    pub outcome: GameResult,
    /// Endstand des Bretts
    pub board: BoardSnapshot,
    /// Scoreboard-Slots von Spieler A und B
    pub slots: [SlotIndex; 2],
    /// Scoreboard-Eintraege von Spieler A und B nach dem Eintragen
    pub scores: [ScoreSnapshot; 2],
}

/// Fehler-/Abbruchnachricht
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Haupt-Enum: GameMessage
// ---------------------------------------------------------------------------

/// Alle moeglichen Spiel-Nachrichten (typsicher via Tagged Enum)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GamePayload {
    Welcome(WelcomeMessage),
    Name(NameMessage),
    Opponent(NameMessage),
    Turn(TurnMessage),
    Move(MoveRequest),
    Continue(ContinueMessage),
    GameOver(Box<GameOverMessage>),
    Error(ErrorResponse),
}

impl GamePayload {
    /// Kurzname fuer Logs
    pub fn art(&self) -> &'static str {
        match self {
            Self::Welcome(_) => "welcome",
            Self::Name(_) => "name",
            Self::Opponent(_) => "opponent",
            Self::Turn(_) => "turn",
            Self::Move(_) => "move",
            Self::Continue(_) => "continue",
            Self::GameOver(_) => "game_over",
            Self::Error(_) => "error",
        }
    }
}

/// Ein Frame des Spielprotokolls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMessage {
    /// Spielnummer der Partie (0 vor der Zuordnung)
    pub game_id: GameId,
    /// Inhalt der Nachricht
    pub payload: GamePayload,
}

impl GameMessage {
    /// Erstellt eine neue Nachricht
    pub fn new(game_id: GameId, payload: GamePayload) -> Self {
        Self { game_id, payload }
    }

    /// Erstellt eine Zug-Nachricht
    pub fn zug(game_id: GameId, row: usize, col: usize) -> Self {
        Self::new(game_id, GamePayload::Move(MoveRequest { row, col }))
    }

    /// Erstellt eine Fehler-Nachricht
    pub fn error(game_id: GameId, code: ErrorCode, message: impl Into<String>) -> Self {
        Self::new(
            game_id,
            GamePayload::Error(ErrorResponse {
                code,
                message: message.into(),
            }),
        )
    }

    /// Serialisiert die Nachricht als JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialisiert eine Nachricht aus JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn leeres_brett() -> BoardSnapshot {
        BoardSnapshot {
            size: 8,
            cells: vec![vec![Cell::Empty; 8]; 8],
            moves: 0,
            result: GameResult::InProgress,
        }
    }

    #[test]
    fn move_ist_getaggt() {
        let msg = GameMessage::zug(GameId(3), 4, 5);
        let json = msg.to_json().unwrap();
        assert!(json.contains("\"type\":\"move\""));
        assert!(json.contains("\"row\":4"));
        assert!(json.contains("\"col\":5"));

        let decoded = GameMessage::from_json(&json).unwrap();
        assert_eq!(decoded.game_id, GameId(3));
        assert!(matches!(
            decoded.payload,
            GamePayload::Move(MoveRequest { row: 4, col: 5 })
        ));
    }

    #[test]
    fn client_json_wird_akzeptiert() {
        // So schreibt ein Client seinen Namen, ohne die Server-Typen zu kennen
        let json = r#"{"game_id":0,"payload":{"type":"name","name":"Alice"}}"#;
        let msg = GameMessage::from_json(json).unwrap();
        match msg.payload {
            GamePayload::Name(n) => assert_eq!(n.name, "Alice"),
            andere => panic!("Erwartet Name-Payload, war {}", andere.art()),
        }
    }

    #[test]
    fn welcome_enthaelt_rolle_und_brett() {
        let msg = GameMessage::new(
            GameId(1),
            GamePayload::Welcome(WelcomeMessage {
                role: PlayerRole::PlayerB,
                board: leeres_brett(),
                protocol_version: PROTOKOLL_VERSION,
            }),
        );
        let json = msg.to_json().unwrap();
        assert!(json.contains("\"type\":\"welcome\""));
        assert!(json.contains("\"role\":\"player_b\""));
        assert!(json.contains("\"result\":\"in_progress\""));
    }

    #[test]
    fn game_over_serialisierung() {
        let score = |slot: usize, name: &str| ScoreSnapshot {
            slot: SlotIndex(slot),
            name: name.to_string(),
            wins: 1,
            losses: 0,
            ties: 0,
        };
        let msg = GameMessage::new(
            GameId(9),
            GamePayload::GameOver(Box::new(GameOverMessage {
                outcome: GameResult::WinA,
                board: leeres_brett(),
                slots: [SlotIndex(0), SlotIndex(1)],
                scores: [score(0, "Alice"), score(1, "Bob")],
            })),
        );
        let json = msg.to_json().unwrap();
        assert!(json.contains("\"type\":\"game_over\""));
        assert!(json.contains("\"outcome\":\"win_a\""));

        let decoded = GameMessage::from_json(&json).unwrap();
        if let GamePayload::GameOver(over) = decoded.payload {
            assert_eq!(over.slots, [SlotIndex(0), SlotIndex(1)]);
            assert_eq!(over.scores[1].name, "Bob");
        } else {
            panic!("Erwartet GameOver-Payload");
        }
    }

    #[test]
    fn error_codes_screaming_snake_case() {
        let msg = GameMessage::error(GameId(2), ErrorCode::NotYourTurn, "Nicht am Zug");
        let json = msg.to_json().unwrap();
        assert!(json.contains("\"code\":\"NOT_YOUR_TURN\""));
    }

    #[test]
    fn unbekannter_typ_wird_abgelehnt() {
        let json = r#"{"game_id":1,"payload":{"type":"resign"}}"#;
        assert!(GameMessage::from_json(json).is_err());
    }

    #[test]
    fn snapshot_feldzugriff() {
        let mut brett = leeres_brett();
        brett.cells[2][3] = Cell::PlayerA;
        assert_eq!(brett.cell(2, 3), Some(Cell::PlayerA));
        assert_eq!(brett.cell(8, 0), None);
    }
}
