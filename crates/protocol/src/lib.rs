//! gomoku-protocol – Netzwerkprotokoll-Definitionen
//!
//! Dieses Crate definiert alle Nachrichtentypen die zwischen Client und
//! Server ausgetauscht werden, sowie den Frame-Codec fuer TCP.

pub mod message;
pub mod wire;

pub use message::{
    BoardSnapshot, ErrorCode, GameMessage, GamePayload, ScoreSnapshot, PROTOKOLL_VERSION,
};
pub use wire::{FrameCodec, FrameFehler, MAX_FRAME_GROESSE};
