use crate::types::*;
use serde::{Deserialize, Serialize};

/// Channel-voice messages the pipeline emits. Pitch bend is carried
/// normalized in [-1, 1]; the wire adapter converts to 14 bits.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum MidiMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    PitchBend { channel: u8, value: f32 },
    ControlChange { channel: u8, controller: u8, value: u8 },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MidiOutputDevice {
    pub id: DeviceId,
    pub name: String,
    pub is_available: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum MidiError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Open MIDI output connection: drop closes it.
pub trait MidiOutputConn: Send {
    fn send(&mut self, message: MidiMessage) -> Result<(), MidiError>;
    fn close(self: Box<Self>);
}

pub trait MidiOutputPort: Send + Sync {
    fn list_outputs(&self) -> Result<Vec<MidiOutputDevice>, MidiError>;

    fn open_output(&self, device_id: &DeviceId) -> Result<Box<dyn MidiOutputConn>, MidiError>;
}
