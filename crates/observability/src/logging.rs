//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable (hat Vorrang vor der Config-Datei):
//! - `GOMOKU_LOG_LEVEL`: Log-Level oder EnvFilter-Direktive, Standard: info
//! - `GOMOKU_LOG_FORMAT`: Format (text/json), Standard: text

use tracing_subscriber::{fmt, EnvFilter};

const ENV_LEVEL: &str = "GOMOKU_LOG_LEVEL";
const ENV_FORMAT: &str = "GOMOKU_LOG_FORMAT";

/// Initialisiert das Logging-System.
///
/// `level` und `format` stammen aus der Konfiguration und werden nur
/// verwendet wenn die Umgebungsvariablen fehlen.
pub fn logging_initialisieren(level: &str, format: &str) {
    let filter = EnvFilter::try_from_env(ENV_LEVEL)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let format = std::env::var(ENV_FORMAT).unwrap_or_else(|_| format.to_string());

    match format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_current_span(true)
                .init();
        }
        _ => {
            fmt().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Prueft einen Log-Level bzw. eine EnvFilter-Direktive
///
/// Erlaubt sind kommagetrennte Stufen (`info`) oder `ziel=stufe`-Paare;
/// ein Wort ohne `=` muss eine Stufe sein.
pub fn log_level_gueltig(level: &str) -> bool {
    !level.trim().is_empty()
        && level.split(',').all(|teil| {
            let stufe = teil.rsplit_once('=').map_or(teil, |(_, stufe)| stufe);
            ist_stufe(stufe.trim())
        })
        && EnvFilter::try_new(level).is_ok()
}

fn ist_stufe(stufe: &str) -> bool {
    matches!(
        stufe.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error" | "off"
    )
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}
