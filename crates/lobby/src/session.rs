//! Partie-Session – Lebenszyklus einer Partie zwischen zwei Spielern
//!
//! Jede Session laeuft in einem eigenen tokio-Task und besitzt beide
//! Verbindungen exklusiv.
//!
//! ## State Machine
//! ```text
//! Begruessung -> Zugschleife -> Auswertung -> Beendet
//!      |              |             |
//!      +--------------+-------------+--> Beendet (Abbruch)
//! ```
//!
//! - **Begruessung**: Rolle + leeres Brett senden, Namen empfangen (parallel),
//!   Gegnernamen austauschen, Namen im Scoreboard aufloesen
//! - **Zugschleife**: Zugrecht ansagen, Zug des aktiven Spielers empfangen,
//!   pruefen, setzen, Brett auswerten
//! - **Auswertung**: Ergebnis ins Scoreboard eintragen, Endstand an beide
//!
//! Jeder Fehler fuehrt zum Abbruch: beide Spieler erhalten (soweit erreichbar)
//! eine Fehler-Nachricht, das Scoreboard bleibt unveraendert.

use gomoku_core::types::{GameId, GameResult, PlayerRole, SlotIndex};
use gomoku_game::{Board, Regeln};
use gomoku_protocol::{
    message::{
        ContinueMessage, GameOverMessage, MoveRequest, NameMessage, TurnMessage, WelcomeMessage,
    },
    ErrorCode, GameMessage, GamePayload, PROTOKOLL_VERSION,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;

use crate::connection::PlayerConnection;
use crate::error::{SessionError, SessionResult};
use crate::server_state::{LobbyState, PartieInfo};

/// Maximale Wartezeit fuer letzte Nachrichten (Endstand, Abbruch) an einen Spieler
const ABSCHIED_TIMEOUT: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Phase und Ausgang
// ---------------------------------------------------------------------------

/// Phase der Session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Begruessung,
    Zugschleife,
    Auswertung,
    Beendet,
}

/// Wie eine Session geendet hat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionAusgang {
    /// Regulaer beendet mit Endergebnis
    Beendet(GameResult),
    /// Abgebrochen (Grund wie in den Metriken)
    Abgebrochen(&'static str),
}

// ---------------------------------------------------------------------------
// Namenspruefung
// ---------------------------------------------------------------------------

/// Prueft einen Spielernamen
///
/// Ungueltig sind leere Namen, Namen mit mehr als `max_laenge` Zeichen und
/// Namen mit Steuerzeichen.
pub fn name_pruefen(name: &str, max_laenge: usize) -> Result<(), String> {
    if name.is_empty() {
        return Err("Name darf nicht leer sein".into());
    }
    if name.chars().count() > max_laenge {
        return Err(format!("Name laenger als {max_laenge} Zeichen"));
    }
    if name.chars().any(char::is_control) {
        return Err("Name enthaelt Steuerzeichen".into());
    }
    Ok(())
}

async fn name_empfangen<S>(
    verbindung: &mut PlayerConnection<S>,
    timeout: Duration,
    max_laenge: usize,
) -> SessionResult<String>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let rolle = verbindung.rolle();
    let nachricht = verbindung.empfangen_mit_timeout(timeout).await?;

    match nachricht.payload {
        GamePayload::Name(NameMessage { name }) => {
            name_pruefen(&name, max_laenge)
                .map_err(|grund| SessionError::protokoll(rolle, ErrorCode::InvalidName, grund))?;
            Ok(name)
        }
        andere => Err(SessionError::protokoll(
            rolle,
            ErrorCode::ProtocolViolation,
            format!("Name erwartet, '{}' erhalten", andere.art()),
        )),
    }
}

/// Wartet bis das Abbruch-Signal gesetzt ist (nie, wenn der Sender fehlt)
async fn abbruch_abwarten(abbruch_rx: &mut watch::Receiver<bool>) {
    loop {
        if *abbruch_rx.borrow_and_update() {
            return;
        }
        if abbruch_rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

fn index(rolle: PlayerRole) -> usize {
    match rolle {
        PlayerRole::PlayerA => 0,
        PlayerRole::PlayerB => 1,
    }
}

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

/// Eine Partie zwischen Spieler A und Spieler B
pub struct GameSession<S> {
    game_id: GameId,
    /// Verbindungen, Index 0 = Spieler A
    spieler: [PlayerConnection<S>; 2],
    namen: [String; 2],
    slots: Option<[SlotIndex; 2]>,
    board: Board,
    /// Wer als naechstes ziehen darf
    am_zug: PlayerRole,
    phase: SessionPhase,
    state: Arc<LobbyState>,
}

impl<S> GameSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Erstellt eine Session; `spieler_a` wurde zuerst angenommen
    pub fn neu(
        game_id: GameId,
        spieler_a: S,
        spieler_b: S,
        state: Arc<LobbyState>,
    ) -> Self {
        Self::aus_verbindungen(
            game_id,
            PlayerConnection::neu(spieler_a, PlayerRole::PlayerA),
            PlayerConnection::neu(spieler_b, PlayerRole::PlayerB),
            state,
        )
    }

    /// Erstellt eine Session aus bereits eingerichteten Verbindungen
    pub fn aus_verbindungen(
        game_id: GameId,
        spieler_a: PlayerConnection<S>,
        spieler_b: PlayerConnection<S>,
        state: Arc<LobbyState>,
    ) -> Self {
        Self {
            game_id,
            spieler: [spieler_a, spieler_b],
            namen: [String::new(), String::new()],
            slots: None,
            board: Board::neu(),
            am_zug: PlayerRole::PlayerA,
            phase: SessionPhase::Begruessung,
            state,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Fuehrt die Partie bis zum Ende aus
    ///
    /// Endet immer in `Beendet`; beide Verbindungen sind danach geschlossen.
    /// Ein `true` auf `abbruch_rx` bricht die Partie mit `SERVER_SHUTDOWN` ab.
    pub async fn ausfuehren(mut self, mut abbruch_rx: watch::Receiver<bool>) -> SessionAusgang {
        let game_id = self.game_id;
        self.state.partien.insert(
            game_id,
            PartieInfo {
                spieler: [self.spieler[0].peer(), self.spieler[1].peer()],
                gestartet: Instant::now(),
            },
        );
        self.state.metriken.partie_gestartet();
        tracing::info!(game_id = %game_id, "Partie beginnt");

        let gespielt = tokio::select! {
            ergebnis = self.ablauf() => ergebnis,
            _ = abbruch_abwarten(&mut abbruch_rx) => Err(SessionError::Shutdown),
        };

        // Ab hier steht das Ergebnis fest; kein Abbruch durch Shutdown mehr
        let ergebnis = match gespielt {
            Ok(ergebnis) => {
                self.phase_wechseln(SessionPhase::Auswertung);
                self.auswerten(ergebnis).await
            }
            Err(fehler) => Err(fehler),
        };

        let ausgang = match ergebnis {
            Ok(ergebnis) => {
                self.state.metriken.partie_beendet(ergebnis.label());
                SessionAusgang::Beendet(ergebnis)
            }
            Err(fehler) => {
                self.abbrechen(&fehler).await;
                self.state.metriken.partie_abgebrochen(fehler.grund());
                SessionAusgang::Abgebrochen(fehler.grund())
            }
        };

        self.phase_wechseln(SessionPhase::Beendet);
        for verbindung in &mut self.spieler {
            verbindung.schliessen().await;
        }
        self.state.partien.remove(&game_id);

        ausgang
    }

    /// Begruessung und Zugschleife bis zum Endergebnis
    async fn ablauf(&mut self) -> SessionResult<GameResult> {
        self.begruessen().await?;
        self.phase_wechseln(SessionPhase::Zugschleife);
        self.zugschleife().await
    }

    fn phase_wechseln(&mut self, phase: SessionPhase) {
        tracing::debug!(
            game_id = %self.game_id,
            von = ?self.phase,
            nach = ?phase,
            "Phasenwechsel"
        );
        self.phase = phase;
    }

    // -----------------------------------------------------------------------
    // Begruessung
    // -----------------------------------------------------------------------

    async fn begruessen(&mut self) -> SessionResult<()> {
        for verbindung in &mut self.spieler {
            let welcome = GameMessage::new(
                self.game_id,
                GamePayload::Welcome(WelcomeMessage {
                    role: verbindung.rolle(),
                    board: self.board.snapshot(),
                    protocol_version: PROTOKOLL_VERSION,
                }),
            );
            verbindung.senden(welcome).await?;
        }

        let timeout = self.state.config.namen_timeout;
        let max_laenge = self.state.config.max_name_laenge;
        let [a, b] = &mut self.spieler;
        let (name_a, name_b) = tokio::try_join!(
            name_empfangen(a, timeout, max_laenge),
            name_empfangen(b, timeout, max_laenge)
        )?;

        tracing::info!(
            game_id = %self.game_id,
            spieler_a = %name_a,
            spieler_b = %name_b,
            "Spielernamen empfangen"
        );

        let [a, b] = &mut self.spieler;
        a.senden(GameMessage::new(
            self.game_id,
            GamePayload::Opponent(NameMessage {
                name: name_b.clone(),
            }),
        ))
        .await?;
        b.senden(GameMessage::new(
            self.game_id,
            GamePayload::Opponent(NameMessage {
                name: name_a.clone(),
            }),
        ))
        .await?;

        let (slot_a, slot_b) = self.state.scoreboard.paar_aufloesen(&name_a, &name_b)?;
        self.state.scoreboard_metriken_aktualisieren();
        tracing::debug!(
            game_id = %self.game_id,
            slot_a = %slot_a,
            slot_b = %slot_b,
            "Scoreboard-Slots zugeordnet"
        );

        self.namen = [name_a, name_b];
        self.slots = Some([slot_a, slot_b]);
        self.am_zug = PlayerRole::PlayerA;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Zugschleife
    // -----------------------------------------------------------------------

    async fn zugschleife(&mut self) -> SessionResult<GameResult> {
        let regeln = self.state.config.regeln;

        loop {
            let ansage = GameMessage::new(
                self.game_id,
                GamePayload::Turn(TurnMessage {
                    active: self.am_zug,
                }),
            );
            self.an_beide(ansage).await?;

            let rolle = self.am_zug;
            let MoveRequest { row, col } = self.zug_empfangen().await?;

            self.board
                .stein_setzen(row, col, rolle)
                .map_err(|e| SessionError::protokoll(rolle, ErrorCode::InvalidMove, e.to_string()))?;
            self.state.metriken.zug_gezaehlt();
            tracing::debug!(
                game_id = %self.game_id,
                spieler = %rolle,
                row,
                col,
                zuege = self.board.zuege(),
                "Zug gesetzt"
            );

            let ergebnis = self.brett_auswerten(regeln).await?;
            if ergebnis.ist_beendet() {
                return Ok(ergebnis);
            }

            let weiter = GameMessage::new(
                self.game_id,
                GamePayload::Continue(ContinueMessage {
                    board: self.board.snapshot(),
                }),
            );
            self.an_beide(weiter).await?;

            self.am_zug = rolle.gegner();
        }
    }

    /// Wertet das Brett auf dem Blocking-Pool aus (die Gewinnpruefung startet eigene Threads)
    async fn brett_auswerten(&mut self, regeln: Regeln) -> SessionResult<GameResult> {
        let mut brett = self.board.clone();
        let (brett, ergebnis) = tokio::task::spawn_blocking(move || {
            let ergebnis = brett.auswerten(&regeln);
            (brett, ergebnis)
        })
        .await
        .map_err(|e| SessionError::intern(format!("Gewinnpruefung abgestuerzt: {e}")))?;
        self.board = brett;
        Ok(ergebnis)
    }

    /// Wartet auf den Zug des aktiven Spielers
    ///
    /// Der wartende Spieler wird gleichzeitig beobachtet: eine Trennung wird
    /// sofort erkannt, jede Nachricht von ihm ist `NOT_YOUR_TURN`.
    async fn zug_empfangen(&mut self) -> SessionResult<MoveRequest> {
        let timeout = self.state.config.zug_timeout;
        let aktiv_rolle = self.am_zug;
        let [a, b] = &mut self.spieler;
        let (aktiv, wartend) = match aktiv_rolle {
            PlayerRole::PlayerA => (a, b),
            PlayerRole::PlayerB => (b, a),
        };

        tokio::select! {
            nachricht = aktiv.empfangen_mit_timeout(timeout) => match nachricht?.payload {
                GamePayload::Move(zug) => Ok(zug),
                andere => Err(SessionError::protokoll(
                    aktiv_rolle,
                    ErrorCode::ProtocolViolation,
                    format!("Zug erwartet, '{}' erhalten", andere.art()),
                )),
            },
            nachricht = wartend.empfangen() => {
                let nachricht = nachricht?;
                Err(SessionError::protokoll(
                    aktiv_rolle.gegner(),
                    ErrorCode::NotYourTurn,
                    format!("'{}' waehrend des gegnerischen Zugs", nachricht.payload.art()),
                ))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Auswertung
    // -----------------------------------------------------------------------

    /// Traegt das Ergebnis ein und schickt beiden den Endstand
    ///
    /// Schlaegt nur fehl, wenn das Scoreboard nichts eingetragen hat. Danach
    /// gilt die Partie als beendet, auch wenn ein Spieler den Endstand nicht
    /// mehr empfaengt.
    async fn auswerten(&mut self, ergebnis: GameResult) -> SessionResult<GameResult> {
        let [slot_a, slot_b] = self
            .slots
            .ok_or_else(|| SessionError::intern("Auswertung ohne Scoreboard-Slots"))?;

        let (eintrag_a, eintrag_b) =
            self.state
                .scoreboard
                .ergebnis_eintragen(ergebnis, slot_a, slot_b)?;

        let ende = GameMessage::new(
            self.game_id,
            GamePayload::GameOver(Box::new(GameOverMessage {
                outcome: ergebnis,
                board: self.board.snapshot(),
                slots: [slot_a, slot_b],
                scores: [eintrag_a.snapshot(), eintrag_b.snapshot()],
            })),
        );
        for rolle in [PlayerRole::PlayerA, PlayerRole::PlayerB] {
            self.zustellen(rolle, ende.clone()).await;
        }

        tracing::info!(
            game_id = %self.game_id,
            ergebnis = ergebnis.label(),
            zuege = self.board.zuege(),
            spieler_a = %self.namen[0],
            spieler_b = %self.namen[1],
            "Partie beendet"
        );
        tracing::debug!(game_id = %self.game_id, "Endstand:\n{}", self.board);

        Ok(ergebnis)
    }

    // -----------------------------------------------------------------------
    // Hilfsfunktionen
    // -----------------------------------------------------------------------

    async fn an_beide(&mut self, nachricht: GameMessage) -> SessionResult<()> {
        let [a, b] = &mut self.spieler;
        a.senden(nachricht.clone()).await?;
        b.senden(nachricht).await
    }

    /// Benachrichtigt beide Spieler ueber den Abbruch
    async fn abbrechen(&mut self, fehler: &SessionError) {
        tracing::warn!(
            game_id = %self.game_id,
            phase = ?self.phase,
            grund = fehler.grund(),
            verursacher = ?fehler.verursacher(),
            fehler = %fehler,
            "Partie abgebrochen"
        );

        let verursacher = fehler.verursacher();
        for rolle in [PlayerRole::PlayerA, PlayerRole::PlayerB] {
            if verursacher == Some(rolle) && fehler.verursacher_weg() {
                continue;
            }

            let text = if verursacher.is_some() && verursacher != Some(rolle) {
                format!("Partie abgebrochen: {fehler}")
            } else {
                fehler.to_string()
            };
            let nachricht = GameMessage::error(self.game_id, fehler.code_fuer(rolle), text);
            self.zustellen(rolle, nachricht).await;
        }
    }

    /// Letzte Nachricht an einen Spieler, hoechstens `ABSCHIED_TIMEOUT` lang
    async fn zustellen(&mut self, rolle: PlayerRole, nachricht: GameMessage) {
        let art = nachricht.payload.art();
        let verbindung = &mut self.spieler[index(rolle)];
        match tokio::time::timeout(ABSCHIED_TIMEOUT, verbindung.senden(nachricht)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(game_id = %self.game_id, spieler = %rolle, art, fehler = %e, "Nachricht nicht zugestellt");
            }
            Err(_) => {
                tracing::debug!(game_id = %self.game_id, spieler = %rolle, art, "Zustellung: Zeitueberschreitung");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
