//! TCP-Lobby – Bindet den Socket, bildet Paare und startet Partien
//!
//! Der `LobbyServer` nimmt Verbindungen paarweise an: die erste wartet,
//! bis eine zweite eintrifft, dann startet eine `GameSession` als eigener
//! tokio-Task und der Loop nimmt sofort das naechste Paar an. Hat der
//! wartende Spieler inzwischen getrennt, wartet stattdessen der neue.
//!
//! ## Shutdown
//! 1. Keine neuen Verbindungen mehr annehmen
//! 2. Einen wartenden Spieler mit `SERVER_SHUTDOWN` verabschieden
//! 3. Laufende Partien bis zur Frist zu Ende spielen lassen
//! 4. Verbleibende Partien abbrechen und auf ihr Ende warten

use futures_util::FutureExt;
use gomoku_core::types::{GameId, PlayerRole};
use gomoku_protocol::{ErrorCode, GameMessage};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};

use crate::connection::PlayerConnection;
use crate::server_state::LobbyState;
use crate::session::{GameSession, SessionAusgang};

/// Pause nach einem fehlgeschlagenen Accept
const ACCEPT_BACKOFF: Duration = Duration::from_millis(10);

/// TCP-Lobby-Server
pub struct LobbyServer {
    state: Arc<LobbyState>,
    listener: TcpListener,
}

impl LobbyServer {
    /// Bindet den Listener mit `SO_REUSEADDR` und dem konfigurierten Backlog
    ///
    /// Port 0 waehlt einen freien Port, siehe `lokale_adresse`.
    pub fn binden(state: Arc<LobbyState>, bind_addr: SocketAddr) -> std::io::Result<Self> {
        let socket = if bind_addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(bind_addr)?;
        let listener = socket.listen(state.config.backlog)?;

        Ok(Self { state, listener })
    }

    /// Tatsaechlich gebundene Adresse
    pub fn lokale_adresse(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn state(&self) -> &Arc<LobbyState> {
        &self.state
    }

    /// Startet den Accept-Loop
    ///
    /// Laeuft bis `shutdown_rx` ein `true`-Signal empfaengt. Fehler einzelner
    /// Verbindungen oder Partien beenden den Loop nie.
    pub async fn starten(self, mut shutdown_rx: watch::Receiver<bool>) -> std::io::Result<()> {
        let lokale_addr = self.listener.local_addr()?;
        tracing::info!(adresse = %lokale_addr, "TCP Lobby-Server gestartet");

        let mut sessions: JoinSet<SessionAusgang> = JoinSet::new();
        let (abbruch_tx, abbruch_rx) = watch::channel(false);
        let mut wartend: Option<(TcpStream, SocketAddr)> = None;

        loop {
            tokio::select! {
                biased;

                // Neue eingehende Verbindung
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            tracing::debug!(peer = %peer_addr, "Verbindung akzeptiert");
                            match wartend.take() {
                                Some(erster) if noch_verbunden(&erster.0) => {
                                    self.partie_starten(
                                        &mut sessions,
                                        erster,
                                        (stream, peer_addr),
                                        abbruch_rx.clone(),
                                    );
                                }
                                verlassen => {
                                    if let Some((_, alt)) = verlassen {
                                        tracing::debug!(peer = %alt, "Wartender Spieler hat die Verbindung getrennt");
                                    }
                                    tracing::debug!(peer = %peer_addr, "Spieler wartet auf Gegner");
                                    wartend = Some((stream, peer_addr));
                                }
                            }
                        }
                        Err(e) => {
                            // Ein wartender Spieler bleibt erhalten
                            tracing::error!(fehler = %e, "TCP-Accept-Fehler");
                            tokio::time::sleep(ACCEPT_BACKOFF).await;
                        }
                    }
                }

                // Beendete Partie einsammeln
                Some(beendet) = sessions.join_next(), if !sessions.is_empty() => {
                    session_abschliessen(beendet);
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("Lobby-Server: Shutdown-Signal empfangen");
                        break;
                    }
                }
            }
        }

        drop(self.listener);

        if let Some((stream, peer_addr)) = wartend.take() {
            wartenden_verabschieden(stream, peer_addr).await;
        }

        sessions_beenden(sessions, abbruch_tx, self.state.config.shutdown_frist).await;

        tracing::info!("TCP Lobby-Server gestoppt");
        Ok(())
    }

    fn partie_starten(
        &self,
        sessions: &mut JoinSet<SessionAusgang>,
        (stream_a, peer_a): (TcpStream, SocketAddr),
        (stream_b, peer_b): (TcpStream, SocketAddr),
        abbruch_rx: watch::Receiver<bool>,
    ) {
        let game_id = self.state.naechste_spiel_id();
        tracing::info!(
            game_id = %game_id,
            spieler_a = %peer_a,
            spieler_b = %peer_b,
            "Paar gebildet"
        );

        let session = GameSession::aus_verbindungen(
            game_id,
            PlayerConnection::neu(stream_a, PlayerRole::PlayerA).mit_peer(peer_a),
            PlayerConnection::neu(stream_b, PlayerRole::PlayerB).mit_peer(peer_b),
            Arc::clone(&self.state),
        );
        sessions.spawn(session.ausfuehren(abbruch_rx));
    }
}

/// Prueft ohne zu warten, ob die Gegenstelle die Verbindung geschlossen hat
///
/// Bereits gesendete Daten (z.B. ein frueher Name) bleiben im Puffer.
fn noch_verbunden(stream: &TcpStream) -> bool {
    let mut puffer = [0u8; 1];
    match stream.peek(&mut puffer).now_or_never() {
        None => true,
        Some(Ok(n)) => n > 0,
        Some(Err(_)) => false,
    }
}

fn session_abschliessen(ergebnis: Result<SessionAusgang, JoinError>) {
    match ergebnis {
        Ok(ausgang) => tracing::trace!(?ausgang, "Session-Task beendet"),
        Err(e) => tracing::error!(fehler = %e, "Session-Task abgestuerzt"),
    }
}

async fn wartenden_verabschieden(stream: TcpStream, peer_addr: SocketAddr) {
    tracing::info!(peer = %peer_addr, "Wartender Spieler wird verabschiedet");
    let mut verbindung = PlayerConnection::neu(stream, PlayerRole::PlayerA).mit_peer(peer_addr);
    let abschied = GameMessage::error(
        GameId(0),
        ErrorCode::ServerShutdown,
        "Server wird heruntergefahren",
    );
    if let Err(e) = verbindung.senden(abschied).await {
        tracing::debug!(peer = %peer_addr, fehler = %e, "Abschied nicht zugestellt");
    }
    verbindung.schliessen().await;
}

/// Wartet bis zur Frist auf laufende Partien und bricht den Rest ab
async fn sessions_beenden(
    mut sessions: JoinSet<SessionAusgang>,
    abbruch_tx: watch::Sender<bool>,
    frist: Duration,
) {
    if sessions.is_empty() {
        return;
    }

    tracing::info!(
        laufend = sessions.len(),
        frist_sek = frist.as_secs(),
        "Warte auf laufende Partien"
    );

    let rechtzeitig = tokio::time::timeout(frist, async {
        while let Some(beendet) = sessions.join_next().await {
            session_abschliessen(beendet);
        }
    })
    .await;

    if rechtzeitig.is_err() {
        tracing::warn!(
            verbleibend = sessions.len(),
            "Shutdown-Frist abgelaufen, Partien werden abgebrochen"
        );
        let _ = abbruch_tx.send(true);
        while let Some(beendet) = sessions.join_next().await {
            session_abschliessen(beendet);
        }
    }
}
