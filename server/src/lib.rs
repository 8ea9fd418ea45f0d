//! gomoku-server – Bibliotheks-Root
//!
//! Verdrahtet Konfiguration, Lobby und Observability und stellt den
//! oeffentlichen Einstiegspunkt fuer Tests bereit.

pub mod config;

use anyhow::{Context, Result};
use config::ServerConfig;
use gomoku_lobby::{LobbyServer, LobbyState};
use gomoku_observability::{observability_server_starten, GomokuMetrics};
use std::future::Future;
use std::net::SocketAddr;
use tokio::sync::watch;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Subsysteme und laeuft bis Ctrl-C
    pub async fn starten(self) -> Result<()> {
        self.ausfuehren(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(fehler = %e, "Ctrl-C-Handler fehlgeschlagen");
            }
        })
        .await
    }

    /// Startet alle Subsysteme und laeuft bis `signal` fertig ist
    ///
    /// Reihenfolge:
    /// 1. Metriken und Lobby-Zustand anlegen
    /// 2. TCP-Listener binden (Fehler hier beenden den Start)
    /// 3. Observability-Server starten (falls aktiviert)
    /// 4. Auf das Signal warten, dann Shutdown an alle Subsysteme
    pub async fn ausfuehren<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tracing::info!(
            server_name = %self.config.server.name,
            tcp = %self.config.tcp_bind_adresse(),
            diagonalen = self.config.spiel.regeln.diagonalen,
            unentschieden = ?self.config.spiel.regeln.unentschieden,
            scoreboard = self.config.scoreboard.kapazitaet,
            "Server startet"
        );

        let metriken = GomokuMetrics::neu()?;
        let state = LobbyState::neu(self.config.lobby_config(), metriken.clone());

        let tcp_addr: SocketAddr = self
            .config
            .tcp_bind_adresse()
            .parse()
            .context("Ungueltige TCP-Bind-Adresse")?;
        let lobby = LobbyServer::binden(state, tcp_addr)
            .with_context(|| format!("TCP-Listener auf {tcp_addr} konnte nicht gebunden werden"))?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let observability = if self.config.observability.aktiviert {
            let addr: SocketAddr = self
                .config
                .observability_bind_adresse()
                .parse()
                .context("Ungueltige Observability-Bind-Adresse")?;
            Some(tokio::spawn(observability_server_starten(
                addr,
                metriken,
                shutdown_rx.clone(),
            )))
        } else {
            None
        };

        let lobby_task = tokio::spawn(lobby.starten(shutdown_rx));

        tracing::info!("Server laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        signal.await;
        tracing::info!("Shutdown-Signal empfangen, Server wird beendet");
        let _ = shutdown_tx.send(true);

        lobby_task.await.context("Lobby-Task abgestuerzt")??;
        if let Some(task) = observability {
            if let Err(e) = task.await.context("Observability-Task abgestuerzt")? {
                tracing::error!(fehler = %e, "Observability-Server beendet mit Fehler");
            }
        }

        tracing::info!("Server beendet");
        Ok(())
    }
}
