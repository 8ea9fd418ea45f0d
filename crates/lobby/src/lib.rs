//! gomoku-lobby – TCP-Lobby und Partie-Sessions
//!
//! ## Architektur
//!
//! ```text
//! TCP Listener (LobbyServer)
//!     |  nimmt Verbindungen paarweise an
//!     v
//! GameSession (pro Paar ein Task)
//!     |  Begruessung -> Zugschleife -> Auswertung -> Beendet
//!     |
//!     +-- PlayerConnection (Framed<S, FrameCodec>, je Spieler)
//!     +-- Board / Regeln  (gomoku-game)
//!     +-- Scoreboard      (geteilt ueber LobbyState)
//! ```

pub mod connection;
pub mod error;
pub mod server_state;
pub mod session;
pub mod tcp;

// Bequeme Re-Exporte
pub use connection::PlayerConnection;
pub use error::{SessionError, SessionResult};
pub use server_state::{LobbyConfig, LobbyState, PartieInfo};
pub use session::{name_pruefen, GameSession, SessionAusgang, SessionPhase};
pub use tcp::LobbyServer;
