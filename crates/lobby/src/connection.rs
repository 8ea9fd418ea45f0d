//! Spieler-Verbindung – Framed-Stream mit fester Rolle
//!
//! Kapselt `Framed<S, FrameCodec>` und uebersetzt Stream-Ereignisse in
//! `SessionError`s, die bereits wissen, welcher Spieler betroffen ist.
//! Generisch ueber den Stream, damit Sessions auch ueber
//! `tokio::io::duplex` getestet werden koennen.

use futures_util::{SinkExt, StreamExt};
use gomoku_core::types::PlayerRole;
use gomoku_protocol::{ErrorCode, FrameCodec, FrameFehler, GameMessage};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;

use crate::error::{SessionError, SessionResult};

/// Verbindung eines Spielers innerhalb einer Partie
pub struct PlayerConnection<S> {
    rolle: PlayerRole,
    peer: Option<SocketAddr>,
    framed: Framed<S, FrameCodec>,
}

impl<S> PlayerConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn neu(stream: S, rolle: PlayerRole) -> Self {
        Self {
            rolle,
            peer: None,
            framed: Framed::new(stream, FrameCodec::new()),
        }
    }

    /// Setzt die Gegenstelle (nur fuer Logs)
    pub fn mit_peer(mut self, peer: SocketAddr) -> Self {
        self.peer = Some(peer);
        self
    }

    pub fn rolle(&self) -> PlayerRole {
        self.rolle
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Sendet eine Nachricht und wartet bis sie geschrieben ist
    pub async fn senden(&mut self, nachricht: GameMessage) -> SessionResult<()> {
        tracing::trace!(
            rolle = %self.rolle,
            art = nachricht.payload.art(),
            "Nachricht senden"
        );
        self.framed.send(nachricht).await.map_err(|fehler| match fehler {
            FrameFehler::Io(quelle) => SessionError::Verbindung {
                rolle: self.rolle,
                quelle,
            },
            andere => SessionError::intern(andere.to_string()),
        })
    }

    /// Wartet auf den naechsten Frame
    ///
    /// - Verbindungsende: `Getrennt`
    /// - Unlesbarer Frame (zu gross, kein JSON, unbekannter Typ): `Protokoll`
    /// - Sonstiger IO-Fehler: `Verbindung`
    pub async fn empfangen(&mut self) -> SessionResult<GameMessage> {
        match self.framed.next().await {
            Some(Ok(nachricht)) => {
                tracing::trace!(
                    rolle = %self.rolle,
                    art = nachricht.payload.art(),
                    "Nachricht empfangen"
                );
                Ok(nachricht)
            }
            Some(Err(FrameFehler::Io(quelle))) => Err(SessionError::Verbindung {
                rolle: self.rolle,
                quelle,
            }),
            Some(Err(fehler)) => {
                let code = fehler.code().unwrap_or(ErrorCode::ProtocolViolation);
                Err(SessionError::protokoll(self.rolle, code, fehler.to_string()))
            }
            None => Err(SessionError::Getrennt(self.rolle)),
        }
    }

    /// Wie `empfangen`, aber hoechstens `dauer` lang
    pub async fn empfangen_mit_timeout(&mut self, dauer: Duration) -> SessionResult<GameMessage> {
        match tokio::time::timeout(dauer, self.empfangen()).await {
            Ok(ergebnis) => ergebnis,
            Err(_) => Err(SessionError::Timeout(self.rolle)),
        }
    }

    /// Leert den Sendepuffer und schliesst die Schreibseite
    pub async fn schliessen(&mut self) {
        if let Err(e) = SinkExt::<GameMessage>::close(&mut self.framed).await {
            tracing::debug!(rolle = %self.rolle, fehler = %e, "Schliessen fehlgeschlagen");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gomoku_core::types::GameId;
    use gomoku_protocol::GamePayload;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn senden_und_empfangen_ueber_duplex() {
        let (a, b) = tokio::io::duplex(4096);
        let mut server = PlayerConnection::neu(a, PlayerRole::PlayerA);
        let mut client = PlayerConnection::neu(b, PlayerRole::PlayerB);

        client.senden(GameMessage::zug(GameId(1), 2, 3)).await.unwrap();
        let msg = server.empfangen().await.unwrap();
        assert!(matches!(msg.payload, GamePayload::Move(m) if m.row == 2 && m.col == 3));
    }

    #[tokio::test]
    async fn geschlossene_gegenseite_meldet_getrennt() {
        let (a, b) = tokio::io::duplex(4096);
        let mut server = PlayerConnection::neu(a, PlayerRole::PlayerB);
        drop(b);

        assert!(matches!(
            server.empfangen().await,
            Err(SessionError::Getrennt(PlayerRole::PlayerB))
        ));
    }

    #[tokio::test]
    async fn kaputter_frame_ist_protokollverletzung() {
        let (a, mut b) = tokio::io::duplex(4096);
        let mut server = PlayerConnection::neu(a, PlayerRole::PlayerA);

        b.write_all(&[0, 0, 0, 5]).await.unwrap();
        b.write_all(b"hallo").await.unwrap();

        match server.empfangen().await {
            Err(SessionError::Protokoll { rolle, code, .. }) => {
                assert_eq!(rolle, PlayerRole::PlayerA);
                assert_eq!(code, ErrorCode::ProtocolViolation);
            }
            andere => panic!("Protokollverletzung erwartet, war {andere:?}"),
        }
    }

    #[tokio::test]
    async fn unbekannter_nachrichtentyp_ist_protokollverletzung() {
        let (a, mut b) = tokio::io::duplex(4096);
        let mut server = PlayerConnection::neu(a, PlayerRole::PlayerB);

        let json = br#"{"game_id":1,"payload":{"type":"resign"}}"#;
        b.write_all(&(json.len() as u32).to_be_bytes()).await.unwrap();
        b.write_all(json).await.unwrap();

        assert!(matches!(
            server.empfangen().await,
            Err(SessionError::Protokoll {
                rolle: PlayerRole::PlayerB,
                code: ErrorCode::ProtocolViolation,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn timeout_beim_empfangen() {
        let (a, _b) = tokio::io::duplex(4096);
        let mut server = PlayerConnection::neu(a, PlayerRole::PlayerA);

        assert!(matches!(
            server.empfangen_mit_timeout(Duration::from_millis(20)).await,
            Err(SessionError::Timeout(PlayerRole::PlayerA))
        ));
    }
}
