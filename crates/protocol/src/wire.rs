//! Wire-Format fuer Spieler-Verbindungen
//!
//! Jeder Frame ist eine `GameMessage` als JSON, davor die Laenge als
//! u32 big-endian. Das Framing selbst uebernimmt `LengthDelimitedCodec`;
//! dieser Codec legt nur JSON darueber und ordnet Fehler den
//! Protokoll-Fehlercodes zu.

use bytes::{Bytes, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder, LengthDelimitedCodec, LengthDelimitedCodecError};

use crate::message::{ErrorCode, GameMessage};

/// Groesstes erlaubtes Frame (Payload ohne Laengenfeld)
///
/// Ein Endstand mit Brett und zwei Scoreboard-Eintraegen braucht unter 2 KB.
pub const MAX_FRAME_GROESSE: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// Fehler
// ---------------------------------------------------------------------------

/// Fehler beim Lesen oder Schreiben eines Frames
#[derive(Debug, thiserror::Error)]
pub enum FrameFehler {
    #[error("Verbindungsfehler: {0}")]
    Io(#[from] io::Error),

    #[error("Frame ueberschreitet {max} Bytes")]
    ZuGross { max: usize },

    /// Payload ist kein JSON oder abgeschnitten
    #[error("Frame ist kein gueltiges JSON: {0}")]
    KeinJson(#[source] serde_json::Error),

    /// Gueltiges JSON, aber keine bekannte Nachricht
    #[error("Unbekannte Nachricht: {0}")]
    UnbekannteNachricht(#[source] serde_json::Error),
}

impl FrameFehler {
    /// Fehlercode fuer die Gegenstelle; `None` wenn die Verbindung selbst kaputt ist
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Io(_) => None,
            Self::ZuGross { .. } | Self::KeinJson(_) | Self::UnbekannteNachricht(_) => {
                Some(ErrorCode::ProtocolViolation)
            }
        }
    }

    fn aus_json(fehler: serde_json::Error) -> Self {
        match fehler.classify() {
            serde_json::error::Category::Data => Self::UnbekannteNachricht(fehler),
            _ => Self::KeinJson(fehler),
        }
    }
}

// ---------------------------------------------------------------------------
// FrameCodec
// ---------------------------------------------------------------------------

/// Codec fuer `Framed<_, FrameCodec>`, von Server und Test-Clients genutzt
#[derive(Debug)]
pub struct FrameCodec {
    rahmen: LengthDelimitedCodec,
    max: usize,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self::mit_limit(MAX_FRAME_GROESSE)
    }

    /// Codec mit eigenem Frame-Limit
    pub fn mit_limit(max: usize) -> Self {
        let rahmen = LengthDelimitedCodec::builder()
            .length_field_length(4)
            .big_endian()
            .max_frame_length(max)
            .new_codec();
        Self { rahmen, max }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = GameMessage;
    type Error = FrameFehler;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<GameMessage>, FrameFehler> {
        let payload = match self.rahmen.decode(src) {
            Ok(Some(payload)) => payload,
            Ok(None) => return Ok(None),
            Err(e) if ist_zu_gross(&e) => return Err(FrameFehler::ZuGross { max: self.max }),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&payload)
            .map(Some)
            .map_err(FrameFehler::aus_json)
    }
}

impl Encoder<GameMessage> for FrameCodec {
    type Error = FrameFehler;

    fn encode(&mut self, item: GameMessage, dst: &mut BytesMut) -> Result<(), FrameFehler> {
        let json = serde_json::to_vec(&item).map_err(FrameFehler::KeinJson)?;
        if json.len() > self.max {
            return Err(FrameFehler::ZuGross { max: self.max });
        }
        self.rahmen.encode(Bytes::from(json), dst)?;
        Ok(())
    }
}

fn ist_zu_gross(fehler: &io::Error) -> bool {
    fehler
        .get_ref()
        .is_some_and(|inner| inner.is::<LengthDelimitedCodecError>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{GamePayload, MoveRequest};
    use bytes::BufMut;
    use gomoku_core::types::GameId;

    fn roh(json: &str) -> BytesMut {
        let mut buf = BytesMut::new();
        buf.put_u32(json.len() as u32);
        buf.put_slice(json.as_bytes());
        buf
    }

    #[test]
    fn client_frame_wird_gelesen() {
        let mut buf = roh(r#"{"game_id":3,"payload":{"type":"move","row":7,"col":0}}"#);
        let msg = FrameCodec::new().decode(&mut buf).unwrap().unwrap();

        assert_eq!(msg.game_id, GameId(3));
        assert!(matches!(
            msg.payload,
            GamePayload::Move(MoveRequest { row: 7, col: 0 })
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn geschriebener_frame_hat_laengenpraefix() {
        let mut buf = BytesMut::new();
        FrameCodec::new()
            .encode(GameMessage::zug(GameId(1), 2, 3), &mut buf)
            .unwrap();

        let laenge = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        assert_eq!(buf.len(), 4 + laenge);
        let json: serde_json::Value = serde_json::from_slice(&buf[4..]).unwrap();
        assert_eq!(json["payload"]["type"], "move");
    }

    #[test]
    fn halber_zug_wartet_auf_rest() {
        let mut codec = FrameCodec::new();
        let mut voll = BytesMut::new();
        codec.encode(GameMessage::zug(GameId(1), 4, 4), &mut voll).unwrap();
        let rest = voll.split_off(voll.len() - 3);

        assert!(codec.decode(&mut voll).unwrap().is_none());
        voll.unsplit(rest);
        assert!(codec.decode(&mut voll).unwrap().is_some());
    }

    #[test]
    fn zwei_zuege_in_einem_puffer() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(GameMessage::zug(GameId(5), 0, 0), &mut buf).unwrap();
        codec.encode(GameMessage::zug(GameId(5), 0, 1), &mut buf).unwrap();

        let erster = codec.decode(&mut buf).unwrap().unwrap();
        let zweiter = codec.decode(&mut buf).unwrap().unwrap();
        assert!(matches!(erster.payload, GamePayload::Move(MoveRequest { col: 0, .. })));
        assert!(matches!(zweiter.payload, GamePayload::Move(MoveRequest { col: 1, .. })));
    }

    #[test]
    fn zu_grosser_frame_ist_protokollverletzung() {
        let mut buf = BytesMut::new();
        buf.put_u32(200);
        buf.put_slice(&[b' '; 200]);

        let fehler = FrameCodec::mit_limit(100).decode(&mut buf).unwrap_err();
        assert!(matches!(fehler, FrameFehler::ZuGross { max: 100 }));
        assert_eq!(fehler.code(), Some(ErrorCode::ProtocolViolation));
    }

    #[test]
    fn zu_grosse_nachricht_wird_nicht_gesendet() {
        let mut buf = BytesMut::new();
        let fehler = FrameCodec::mit_limit(10)
            .encode(GameMessage::zug(GameId(1), 0, 0), &mut buf)
            .unwrap_err();
        assert!(matches!(fehler, FrameFehler::ZuGross { max: 10 }));
        assert!(buf.is_empty());
    }

    #[test]
    fn kein_json() {
        let fehler = FrameCodec::new().decode(&mut roh("hallo")).unwrap_err();
        assert!(matches!(fehler, FrameFehler::KeinJson(_)));
        assert_eq!(fehler.code(), Some(ErrorCode::ProtocolViolation));
    }

    #[test]
    fn unbekannter_nachrichtentyp() {
        let mut buf = roh(r#"{"game_id":1,"payload":{"type":"resign"}}"#);
        let fehler = FrameCodec::new().decode(&mut buf).unwrap_err();
        assert!(matches!(fehler, FrameFehler::UnbekannteNachricht(_)));
    }

    #[test]
    fn io_fehler_hat_keinen_code() {
        let fehler = FrameFehler::from(io::Error::from(io::ErrorKind::ConnectionReset));
        assert_eq!(fehler.code(), None);
    }
}
