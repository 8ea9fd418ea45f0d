//! Prometheus-kompatible Metriken fuer den Gomoku-Server
//!
//! Registrierte Metriken:
//! - `gomoku_games_started_total` – Counter: Gestartete Partien
//! - `gomoku_games_finished_total{ergebnis}` – Counter: Regulaer beendete Partien
//! - `gomoku_games_aborted_total{grund}` – Counter: Abgebrochene Partien
//! - `gomoku_games_active` – Gauge: Aktuell laufende Partien
//! - `gomoku_moves_total` – Counter: Gespielte Zuege
//! - `gomoku_scoreboard_slots_used` – Gauge: Belegte Scoreboard-Slots
//! - `gomoku_scoreboard_capacity` – Gauge: Scoreboard-Kapazitaet

use anyhow::Result;
use axum::{extract::State, response::IntoResponse, routing::get, Router};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Alle Gomoku-Prometheus-Metriken
///
/// Clone teilt dieselbe Registry; jede Partie haelt eine Kopie.
#[derive(Clone)]
pub struct GomokuMetrics {
    pub registry: Arc<Registry>,

    // Partie-Metriken
    pub games_started_total: IntCounter,
    pub games_finished_total: IntCounterVec,
    pub games_aborted_total: IntCounterVec,
    pub games_active: IntGauge,
    pub moves_total: IntCounter,

    // Scoreboard-Metriken
    pub scoreboard_slots_used: IntGauge,
    pub scoreboard_capacity: IntGauge,
}

impl GomokuMetrics {
    /// Erstellt und registriert alle Metriken in einer neuen Registry
    pub fn neu() -> Result<Self> {
        let registry = Registry::new();

        // --- Partie-Metriken ---
        let games_started_total = IntCounter::with_opts(Opts::new(
            "gomoku_games_started_total",
            "Gesamtanzahl gestarteter Partien",
        ))?;
        registry.register(Box::new(games_started_total.clone()))?;

        let games_finished_total = IntCounterVec::new(
            Opts::new(
                "gomoku_games_finished_total",
                "Regulaer beendete Partien nach Ergebnis",
            ),
            &["ergebnis"],
        )?;
        registry.register(Box::new(games_finished_total.clone()))?;

        let games_aborted_total = IntCounterVec::new(
            Opts::new(
                "gomoku_games_aborted_total",
                "Abgebrochene Partien nach Grund",
            ),
            &["grund"],
        )?;
        registry.register(Box::new(games_aborted_total.clone()))?;

        let games_active = IntGauge::with_opts(Opts::new(
            "gomoku_games_active",
            "Anzahl aktuell laufender Partien",
        ))?;
        registry.register(Box::new(games_active.clone()))?;

        let moves_total = IntCounter::with_opts(Opts::new(
            "gomoku_moves_total",
            "Gesamtanzahl gueltiger Zuege",
        ))?;
        registry.register(Box::new(moves_total.clone()))?;

        // --- Scoreboard-Metriken ---
        let scoreboard_slots_used = IntGauge::with_opts(Opts::new(
            "gomoku_scoreboard_slots_used",
            "Belegte Scoreboard-Slots",
        ))?;
        registry.register(Box::new(scoreboard_slots_used.clone()))?;

        let scoreboard_capacity = IntGauge::with_opts(Opts::new(
            "gomoku_scoreboard_capacity",
            "Anzahl Scoreboard-Slots insgesamt",
        ))?;
        registry.register(Box::new(scoreboard_capacity.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            games_started_total,
            games_finished_total,
            games_aborted_total,
            games_active,
            moves_total,
            scoreboard_slots_used,
            scoreboard_capacity,
        })
    }

    /// Partie gestartet: Zaehler und aktive Partien erhoehen
    pub fn partie_gestartet(&self) {
        self.games_started_total.inc();
        self.games_active.inc();
    }

    /// Partie mit Ergebnis beendet (`win_a`, `win_b`, `tie`)
    pub fn partie_beendet(&self, ergebnis: &str) {
        self.games_finished_total
            .with_label_values(&[ergebnis])
            .inc();
        self.games_active.dec();
    }

    /// Partie ohne Ergebnis abgebrochen
    pub fn partie_abgebrochen(&self, grund: &str) {
        self.games_aborted_total.with_label_values(&[grund]).inc();
        self.games_active.dec();
    }

    pub fn zug_gezaehlt(&self) {
        self.moves_total.inc();
    }

    /// Uebernimmt den aktuellen Fuellstand des Scoreboards
    pub fn scoreboard_setzen(&self, belegt: usize, kapazitaet: usize) {
        self.scoreboard_slots_used.set(belegt as i64);
        self.scoreboard_capacity.set(kapazitaet as i64);
    }

    /// Gibt true zurueck wenn alle Scoreboard-Slots belegt sind
    pub fn scoreboard_voll(&self) -> bool {
        let kapazitaet = self.scoreboard_capacity.get();
        kapazitaet > 0 && self.scoreboard_slots_used.get() >= kapazitaet
    }

    /// Exportiert alle Metriken im Prometheus-Textformat
    pub fn exportieren(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Axum-Router fuer den `/metrics`-Endpunkt
pub fn metrics_router(metriken: GomokuMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metriken)
}

async fn metrics_handler(State(metriken): State<GomokuMetrics>) -> impl IntoResponse {
    match metriken.exportieren() {
        Ok(text) => (
            axum::http::StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4",
            )],
            text,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Metriken-Export fehlgeschlagen: {err}");
            axum::http::StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
