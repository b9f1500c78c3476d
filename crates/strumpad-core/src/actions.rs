use crate::events::EngineEvent;
use strumpad_domain_notes::{parse_notation, NoteObject};
use strumpad_ports::config::ButtonAction;
use tracing::debug;

/// Mutable state the button actions operate on: the authored base chord,
/// the transpose toggle, and the repeater toggle.
pub struct ActionState {
    base_notes: Vec<NoteObject>,
    transpose_active: bool,
    transpose_semitones: i32,
    repeater_active: bool,
}

impl ActionState {
    pub fn new(base_notes: Vec<NoteObject>, repeater_active: bool) -> Self {
        Self {
            base_notes,
            transpose_active: false,
            transpose_semitones: 0,
            repeater_active,
        }
    }

    pub fn base_notes(&self) -> &[NoteObject] {
        &self.base_notes
    }

    pub fn repeater_active(&self) -> bool {
        self.repeater_active
    }

    /// Semitone offset applied to plucked notes at emit time; 0 while
    /// transpose is off.
    pub fn transpose_semitones(&self) -> i32 {
        if self.transpose_active {
            self.transpose_semitones
        } else {
            0
        }
    }

    /// Run one decoded button action. Returns the event to publish, if the
    /// action changed anything. `VoicingChanged` tells the engine to
    /// regenerate the strummer's note spread.
    pub fn apply(&mut self, action: &ButtonAction) -> Option<EngineEvent> {
        match action {
            ButtonAction::None => None,
            ButtonAction::ToggleRepeater => {
                self.repeater_active = !self.repeater_active;
                debug!(active = self.repeater_active, "repeater toggled");
                Some(EngineEvent::RepeaterToggled {
                    active: self.repeater_active,
                })
            }
            ButtonAction::Transpose { semitones } => {
                // Same interval while active turns transpose off; anything
                // else turns it on with the new interval.
                if self.transpose_active && self.transpose_semitones == *semitones {
                    self.transpose_active = false;
                    self.transpose_semitones = 0;
                } else {
                    self.transpose_active = true;
                    self.transpose_semitones = *semitones;
                }
                debug!(semitones = self.transpose_semitones(), "transpose changed");
                Some(EngineEvent::TransposeChanged {
                    semitones: self.transpose_semitones(),
                })
            }
            ButtonAction::SetStrumNotes { notes } => {
                if notes.is_empty() {
                    return None;
                }
                self.base_notes = notes.iter().map(|n| parse_notation(n)).collect();
                Some(EngineEvent::VoicingChanged {
                    notations: notes.clone(),
                })
            }
        }
    }
}
