use serde::Serialize;

/// Events published for display/diagnostic consumers. MIDI emission goes
/// through the output port; these mirror what happened for anyone watching.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum EngineEvent {
    Pluck {
        notation: String,
        octave: i32,
        velocity: u8,
    },
    Release {
        velocity: u8,
    },
    VoicingChanged {
        notations: Vec<String>,
    },
    TransposeChanged {
        semitones: i32,
    },
    RepeaterToggled {
        active: bool,
    },
}
