//! Gemeinsame Hilfsfunktionen fuer die Lobby-Integrationstests
//!
//! Startet einen echten `LobbyServer` auf einem freien Port und spricht ihn
//! ueber `Framed<TcpStream, FrameCodec>` an, wie ein Client es tut.

#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use gomoku_core::types::{GameId, PlayerRole};
use gomoku_lobby::{LobbyConfig, LobbyServer, LobbyState};
use gomoku_observability::GomokuMetrics;
use gomoku_protocol::{
    message::{GameOverMessage, MoveRequest, NameMessage},
    ErrorCode, FrameCodec, GameMessage, GamePayload,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;

pub type Client = Framed<TcpStream, FrameCodec>;

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: Arc<LobbyState>,
    pub shutdown_tx: watch::Sender<bool>,
    pub task: JoinHandle<std::io::Result<()>>,
}

pub async fn server(config: LobbyConfig) -> TestServer {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let state = LobbyState::neu(config, GomokuMetrics::neu().unwrap());
    let lobby = LobbyServer::binden(Arc::clone(&state), "127.0.0.1:0".parse().unwrap())
        .expect("Bind fehlgeschlagen");
    let addr = lobby.lokale_adresse().unwrap();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let task = tokio::spawn(lobby.starten(shutdown_rx));

    TestServer {
        addr,
        state,
        shutdown_tx,
        task,
    }
}

pub async fn verbinden(addr: SocketAddr) -> Client {
    let stream = TcpStream::connect(addr).await.expect("Verbindung fehlgeschlagen");
    Framed::new(stream, FrameCodec::new())
}

pub async fn lesen(client: &mut Client) -> GameMessage {
    tokio::time::timeout(Duration::from_secs(5), client.next())
        .await
        .expect("Zeitueberschreitung beim Lesen")
        .expect("Verbindung unerwartet geschlossen")
        .expect("Frame-Fehler")
}

pub async fn senden(client: &mut Client, payload: GamePayload) {
    client
        .send(GameMessage::new(GameId(0), payload))
        .await
        .expect("Senden fehlgeschlagen");
}

pub async fn fehler_code(client: &mut Client) -> ErrorCode {
    match lesen(client).await.payload {
        GamePayload::Error(e) => e.code,
        andere => panic!("Fehler erwartet, war {}", andere.art()),
    }
}

/// Gibt true zurueck wenn der Server die Verbindung geschlossen hat
pub async fn ist_geschlossen(client: &mut Client) -> bool {
    matches!(
        tokio::time::timeout(Duration::from_secs(5), client.next()).await,
        Ok(None) | Ok(Some(Err(_)))
    )
}

/// Verbindet zwei Clients und liefert sie nach Rolle sortiert (A, B)
pub async fn paar(addr: SocketAddr) -> (Client, Client, GameId) {
    let mut erster = verbinden(addr).await;
    let mut zweiter = verbinden(addr).await;

    let (rolle_1, id_1) = welcome(&mut erster).await;
    let (rolle_2, id_2) = welcome(&mut zweiter).await;
    assert_ne!(rolle_1, rolle_2);
    assert_eq!(id_1, id_2);

    if rolle_1 == PlayerRole::PlayerA {
        (erster, zweiter, id_1)
    } else {
        (zweiter, erster, id_1)
    }
}

async fn welcome(client: &mut Client) -> (PlayerRole, GameId) {
    let nachricht = lesen(client).await;
    match nachricht.payload {
        GamePayload::Welcome(w) => {
            assert_eq!(w.board.moves, 0);
            (w.role, nachricht.game_id)
        }
        andere => panic!("Welcome erwartet, war {}", andere.art()),
    }
}

pub async fn name_senden(client: &mut Client, name: &str) {
    senden(client, GamePayload::Name(NameMessage { name: name.into() })).await;
}

/// Namen austauschen und Gegnernamen pruefen
pub async fn namen(a: &mut Client, b: &mut Client, name_a: &str, name_b: &str) {
    name_senden(a, name_a).await;
    name_senden(b, name_b).await;

    match lesen(a).await.payload {
        GamePayload::Opponent(n) => assert_eq!(n.name, name_b),
        andere => panic!("Opponent erwartet, war {}", andere.art()),
    }
    match lesen(b).await.payload {
        GamePayload::Opponent(n) => assert_eq!(n.name, name_a),
        andere => panic!("Opponent erwartet, war {}", andere.art()),
    }
}

pub async fn zugrecht(a: &mut Client, b: &mut Client) -> PlayerRole {
    let mut rollen = Vec::new();
    for client in [a, b] {
        match lesen(client).await.payload {
            GamePayload::Turn(t) => rollen.push(t.active),
            andere => panic!("Turn erwartet, war {}", andere.art()),
        }
    }
    assert_eq!(rollen[0], rollen[1]);
    rollen[0]
}

pub async fn zug_senden(client: &mut Client, row: usize, col: usize) {
    senden(client, GamePayload::Move(MoveRequest { row, col })).await;
}

/// Spielt einen Zug von `rolle` und liefert die Antwort (fuer beide gleich)
pub async fn zug(
    a: &mut Client,
    b: &mut Client,
    rolle: PlayerRole,
    row: usize,
    col: usize,
) -> GamePayload {
    assert_eq!(zugrecht(a, b).await, rolle);
    let aktiv = match rolle {
        PlayerRole::PlayerA => &mut *a,
        PlayerRole::PlayerB => &mut *b,
    };
    zug_senden(aktiv, row, col).await;

    let antwort_a = lesen(a).await.payload;
    let antwort_b = lesen(b).await.payload;
    assert_eq!(antwort_a.art(), antwort_b.art());
    antwort_a
}

/// A setzt (0,0)..(0,4), B setzt (7,0)..(7,3)
pub async fn a_gewinnt(a: &mut Client, b: &mut Client) -> GameOverMessage {
    for col in 0..4 {
        let antwort = zug(a, b, PlayerRole::PlayerA, 0, col).await;
        assert!(matches!(antwort, GamePayload::Continue(_)));
        let antwort = zug(a, b, PlayerRole::PlayerB, 7, col).await;
        assert!(matches!(antwort, GamePayload::Continue(_)));
    }
    match zug(a, b, PlayerRole::PlayerA, 0, 4).await {
        GamePayload::GameOver(ende) => *ende,
        andere => panic!("GameOver erwartet, war {}", andere.art()),
    }
}

/// Zugfolge fuer ein volles Brett ohne Fuenferreihe in irgendeiner Richtung
///
/// A belegt (row, col) wenn (col / 2 + row) gerade ist, sonst B. A und B
/// ziehen abwechselnd in Zeilenreihenfolge ihrer Felder.
pub fn remis_zuege() -> Vec<(PlayerRole, usize, usize)> {
    let felder = |rolle: PlayerRole| {
        (0..8)
            .flat_map(|r| (0..8).map(move |c| (r, c)))
            .filter(move |&(r, c)| {
                let a = (c / 2 + r) % 2 == 0;
                a == (rolle == PlayerRole::PlayerA)
            })
            .collect::<Vec<_>>()
    };
    let a = felder(PlayerRole::PlayerA);
    let b = felder(PlayerRole::PlayerB);
    a.iter()
        .zip(b.iter())
        .flat_map(|(&(ra, ca), &(rb, cb))| {
            [(PlayerRole::PlayerA, ra, ca), (PlayerRole::PlayerB, rb, cb)]
        })
        .collect()
}
