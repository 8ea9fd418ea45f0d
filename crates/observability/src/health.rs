//! Health-Check-Endpunkt fuer den Gomoku-Server
//!
//! Endpoint: `GET /health`
//! Response: JSON mit Status, Version, Uptime, laufenden Partien und
//! Scoreboard-Fuellstand. `degraded` sobald das Scoreboard voll ist, da dann
//! keine neuen Spielernamen mehr angenommen werden.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::metrics::GomokuMetrics;

/// Status des Health-Checks
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Antwort des Health-Check-Endpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub active_games: i64,
    pub scoreboard_used: i64,
    pub scoreboard_capacity: i64,
}

/// Geteilter Zustand fuer den Health-Check-Handler
#[derive(Clone)]
pub struct HealthState {
    pub start_time: Arc<Instant>,
    pub metriken: GomokuMetrics,
}

impl HealthState {
    pub fn neu(metriken: GomokuMetrics) -> Self {
        Self {
            start_time: Arc::new(Instant::now()),
            metriken,
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Erstellt die Health-Antwort aus dem aktuellen Metrik-Stand
    pub fn bericht(&self) -> HealthResponse {
        let status = if self.metriken.scoreboard_voll() {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        };

        HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.uptime_seconds(),
            active_games: self.metriken.games_active.get(),
            scoreboard_used: self.metriken.scoreboard_slots_used.get(),
            scoreboard_capacity: self.metriken.scoreboard_capacity.get(),
        }
    }
}

/// Axum-Router fuer den `/health`-Endpunkt
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state)
}

/// `GET /health` – gibt den Serverstatus zurueck
///
/// Auch bei `degraded` 200, laufende Partien sind nicht betroffen.
async fn health_handler(State(state): State<HealthState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.bericht()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> HealthState {
        HealthState::neu(GomokuMetrics::neu().unwrap())
    }

    #[test]
    fn health_state_frisch_erstellt() {
        let state = state();
        assert!(state.uptime_seconds() < 5);
        let bericht = state.bericht();
        assert_eq!(bericht.status, HealthStatus::Healthy);
        assert_eq!(bericht.active_games, 0);
    }

    #[test]
    fn bericht_zaehlt_laufende_partien() {
        let state = state();
        state.metriken.partie_gestartet();
        state.metriken.partie_gestartet();
        state.metriken.partie_beendet("tie");
        assert_eq!(state.bericht().active_games, 1);
    }

    #[test]
    fn volles_scoreboard_ist_degraded() {
        let state = state();
        state.metriken.scoreboard_setzen(10, 10);

        let bericht = state.bericht();
        assert_eq!(bericht.status, HealthStatus::Degraded);
        assert_eq!(bericht.scoreboard_used, 10);
        assert_eq!(bericht.scoreboard_capacity, 10);
    }

    #[test]
    fn health_response_serialisierung() {
        let response = HealthResponse {
            status: HealthStatus::Healthy,
            version: "0.1.0".to_string(),
            uptime_seconds: 3600,
            active_games: 2,
            scoreboard_used: 4,
            scoreboard_capacity: 10,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"healthy\""));
        assert!(json.contains("\"version\":\"0.1.0\""));
        assert!(json.contains("\"uptime_seconds\":3600"));
        assert!(json.contains("\"active_games\":2"));
    }

    #[test]
    fn health_response_deserialisierung() {
        let json = r#"{"status":"degraded","version":"0.1.0","uptime_seconds":100,
            "active_games":0,"scoreboard_used":10,"scoreboard_capacity":10}"#;
        let response: HealthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.status, HealthStatus::Degraded);
        assert_eq!(response.uptime_seconds, 100);
        assert_eq!(response.scoreboard_used, 10);
    }
}
