use crate::actions::ActionState;
use crate::events::EngineEvent;
use crate::snapshot::{shared_snapshot, InteractionSnapshot, SharedSnapshot};
use crate::strummer::Strummer;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use strumpad_domain_notes::{fill_note_spread, parse_notation, NoteObject};
use strumpad_domain_signal::{shape, validate_curve, FrameDecoder};
use strumpad_ports::config::{ButtonAction, ConfigError};
use strumpad_ports::midi::{MidiError, MidiMessage, MidiOutputConn};
use strumpad_ports::storage::SettingsDto;
use strumpad_ports::types::PenState;
use tracing::{debug, warn};

const RECENT_EVENT_CAP: usize = 32;

/// Shaped durations cap here so the scheduler never sees a non-finite or
/// overflowing value.
const MAX_NOTE_HOLD: Duration = Duration::from_secs(60 * 60);

fn shaped_duration(secs: f32) -> Duration {
    Duration::try_from_secs_f32(secs.max(0.0))
        .unwrap_or(MAX_NOTE_HOLD)
        .min(MAX_NOTE_HOLD)
}

#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("midi error: {0}")]
    Midi(#[from] MidiError),
}

struct PendingNoteOff {
    due: Instant,
    channel: u8,
    note: u8,
}

/// The sample-driven pipeline: decode, snapshot, shape, strum, emit.
///
/// One frame (or simulated pointer sample) is processed to completion
/// before the next; the engine owns all mutable pipeline state and is the
/// snapshot's single writer. Hosts that deliver frames from callbacks must
/// serialize calls (one engine per physical device).
pub struct Engine {
    settings: SettingsDto,
    decoder: FrameDecoder,
    strummer: Strummer,
    snapshot: SharedSnapshot,
    actions: ActionState,
    midi: Box<dyn MidiOutputConn>,
    events: VecDeque<EngineEvent>,
    pending_note_offs: Vec<PendingNoteOff>,
    held_notes: Vec<u8>,
    holding: bool,
    last_repeat: Option<Instant>,
    last_pluck_velocity: u8,
    last_duration: f32,
    prev_primary: bool,
    prev_secondary: bool,
    prev_tablet_buttons: [bool; 8],
}

impl Engine {
    /// Validates the whole configuration up front: a malformed mapping or
    /// curve refuses to activate instead of producing garbage per-frame.
    pub fn new(settings: SettingsDto, midi: Box<dyn MidiOutputConn>) -> Result<Self, EngineError> {
        validate_curve("noteDuration", &settings.note_duration)?;
        validate_curve("pitchBend", &settings.pitch_bend)?;
        validate_curve("noteVelocity", &settings.note_velocity)?;
        let decoder = FrameDecoder::new(&settings.mappings, settings.report_length)?;

        let base_notes: Vec<NoteObject> = settings
            .strumming
            .initial_notes
            .iter()
            .map(|n| parse_notation(n))
            .collect();
        let actions = ActionState::new(base_notes, settings.note_repeater.active);

        let mut engine = Self {
            settings,
            decoder,
            strummer: Strummer::new(),
            snapshot: shared_snapshot(),
            actions,
            midi,
            events: VecDeque::new(),
            pending_note_offs: Vec::new(),
            held_notes: Vec::new(),
            holding: false,
            last_repeat: None,
            last_pluck_velocity: 0,
            last_duration: 0.0,
            prev_primary: false,
            prev_secondary: false,
            prev_tablet_buttons: [false; 8],
        };
        engine.rebuild_voicing();
        Ok(engine)
    }

    /// Shared read handle for display consumers. The engine stays the only
    /// writer.
    pub fn snapshot(&self) -> SharedSnapshot {
        self.snapshot.clone()
    }

    pub fn settings(&self) -> &SettingsDto {
        &self.settings
    }

    pub fn voicing(&self) -> &[NoteObject] {
        self.strummer.notes()
    }

    /// Drain events accumulated since the last poll.
    pub fn poll_events(&mut self) -> Vec<EngineEvent> {
        self.events.drain(..).collect()
    }

    pub fn handle_frame(&mut self, bytes: &[u8]) -> Result<(), EngineError> {
        self.handle_frame_at(bytes, Instant::now())
    }

    /// Run one raw device report through the full pipeline. A corrupt
    /// frame is dropped wholesale; every piece of engine state survives it.
    pub fn handle_frame_at(&mut self, bytes: &[u8], now: Instant) -> Result<(), EngineError> {
        let frame = match self.decoder.decode(bytes) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(error = %err, "dropping corrupt frame");
                return Ok(());
            }
        };

        self.snapshot.write().apply(&frame);
        let snap = *self.snapshot.read();

        if frame.state == Some(PenState::Buttons) {
            if let Some(buttons) = frame.buttons {
                self.handle_tablet_buttons(buttons);
            }
            return self.flush_due_note_offs(now);
        }

        if self.settings.stylus_buttons.active {
            if snap.primary_button_pressed && !self.prev_primary {
                let action = self.settings.stylus_buttons.primary_button_action.clone();
                self.execute_action(&action);
            }
            if snap.secondary_button_pressed && !self.prev_secondary {
                let action = self.settings.stylus_buttons.secondary_button_action.clone();
                self.execute_action(&action);
            }
        }
        self.prev_primary = snap.primary_button_pressed;
        self.prev_secondary = snap.secondary_button_pressed;

        self.process_sample(snap, now)
    }

    pub fn handle_pointer_sample(
        &mut self,
        x: f64,
        y: f64,
        pressure: f64,
        tilt_x: f64,
        tilt_y: f64,
    ) -> Result<(), EngineError> {
        self.handle_pointer_sample_at(x, y, pressure, tilt_x, tilt_y, Instant::now())
    }

    /// Pointer/pen samples in lieu of hardware frames, already normalized
    /// by the host.
    pub fn handle_pointer_sample_at(
        &mut self,
        x: f64,
        y: f64,
        pressure: f64,
        tilt_x: f64,
        tilt_y: f64,
        now: Instant,
    ) -> Result<(), EngineError> {
        {
            let mut snap = self.snapshot.write();
            snap.x = x;
            snap.y = y;
            snap.pressure = pressure;
            snap.tilt_x = tilt_x;
            snap.tilt_y = tilt_y;
            snap.state = if pressure > 0.0 {
                PenState::Contact
            } else {
                PenState::None
            };
        }
        let snap = *self.snapshot.read();
        self.process_sample(snap, now)
    }

    /// Run one decoded button action against engine state.
    pub fn execute_action(&mut self, action: &ButtonAction) {
        if let Some(event) = self.actions.apply(action) {
            if matches!(event, EngineEvent::VoicingChanged { .. }) {
                self.rebuild_voicing();
            }
            self.push_event(event);
        }
    }

    fn handle_tablet_buttons(&mut self, buttons: [bool; 8]) {
        for slot in 0..8u8 {
            let pressed = buttons[slot as usize];
            if pressed && !self.prev_tablet_buttons[slot as usize] {
                if let Some(action) = self.settings.tablet_buttons.get(&(slot + 1)).cloned() {
                    self.execute_action(&action);
                }
            }
        }
        self.prev_tablet_buttons = buttons;
    }

    fn process_sample(
        &mut self,
        snap: InteractionSnapshot,
        now: Instant,
    ) -> Result<(), EngineError> {
        let channel = self.settings.strumming.midi_channel;

        let bend_input = snap.control_input(self.settings.pitch_bend.control) as f32;
        let bend = shape(&self.settings.pitch_bend, bend_input);
        self.midi.send(MidiMessage::PitchBend {
            channel,
            value: bend,
        })?;

        let duration_input = snap.control_input(self.settings.note_duration.control) as f32;
        let duration = shape(&self.settings.note_duration, duration_input);
        self.last_duration = duration;

        let velocity_input = snap.control_input(self.settings.note_velocity.control) as f32;
        let shaped_velocity = shape(&self.settings.note_velocity, velocity_input);

        let in_contact = snap.state == PenState::Contact
            && snap.pressure >= f64::from(self.settings.strumming.pressure_threshold);

        if !in_contact {
            self.handle_release(now)?;
        } else if let Some(pluck) = self.strummer.strum(snap.x, snap.pressure) {
            let note_number = (pluck.note.midi_number() + self.actions.transpose_semitones())
                .clamp(0, 127) as u8;
            debug!(
                notation = %pluck.note.notation,
                octave = pluck.note.octave,
                velocity = pluck.velocity,
                "pluck"
            );

            // Velocity 0 would read as note-off on the wire; the pluck is
            // still recorded so the segment stays debounced.
            if pluck.velocity > 0 {
                self.midi.send(MidiMessage::NoteOn {
                    channel,
                    note: note_number,
                    velocity: pluck.velocity,
                })?;
                self.schedule_note_off(channel, note_number, duration, now);
            }

            self.held_notes.clear();
            self.held_notes.push(note_number);
            self.holding = true;
            self.last_repeat = Some(now);
            self.last_pluck_velocity = pluck.velocity;
            self.push_event(EngineEvent::Pluck {
                notation: pluck.note.notation.clone(),
                octave: pluck.note.octave,
                velocity: pluck.velocity,
            });
        }

        self.run_repeater(shaped_velocity, duration, channel, now)?;
        self.flush_due_note_offs(now)
    }

    fn handle_release(&mut self, now: Instant) -> Result<(), EngineError> {
        if !self.strummer.is_sounding() && !self.holding {
            return Ok(());
        }

        self.strummer.clear_strum();
        self.holding = false;
        self.held_notes.clear();
        self.last_repeat = None;

        let release = self.settings.strum_release;
        if release.active && self.last_duration <= release.max_duration {
            let velocity = (f32::from(self.last_pluck_velocity) * release.velocity_multiplier)
                .clamp(1.0, 127.0) as u8;
            let channel = release
                .midi_channel
                .unwrap_or(self.settings.strumming.midi_channel);
            self.midi.send(MidiMessage::NoteOn {
                channel,
                note: release.midi_note,
                velocity,
            })?;
            self.schedule_note_off(channel, release.midi_note, self.last_duration, now);
            self.push_event(EngineEvent::Release { velocity });
        }

        Ok(())
    }

    fn run_repeater(
        &mut self,
        shaped_velocity: f32,
        duration: f32,
        channel: u8,
        now: Instant,
    ) -> Result<(), EngineError> {
        let repeater = self.settings.note_repeater;
        if !self.actions.repeater_active() || !self.holding || self.held_notes.is_empty() {
            return Ok(());
        }

        let interval = if repeater.frequency_multiplier > 0.0 {
            duration / repeater.frequency_multiplier
        } else {
            duration
        };
        let due = match self.last_repeat {
            Some(last) => now.duration_since(last) >= shaped_duration(interval),
            None => true,
        };
        if !due {
            return Ok(());
        }

        let velocity = (shaped_velocity * repeater.pressure_multiplier).clamp(1.0, 127.0) as u8;
        let notes: Vec<u8> = self.held_notes.clone();
        for note in notes {
            self.midi.send(MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            })?;
            self.schedule_note_off(channel, note, duration, now);
        }
        self.last_repeat = Some(now);
        Ok(())
    }

    fn rebuild_voicing(&mut self) {
        let voicing = fill_note_spread(
            self.actions.base_notes(),
            self.settings.strumming.lower_note_spread,
            self.settings.strumming.upper_note_spread,
        );
        self.strummer.set_notes(voicing);
    }

    fn schedule_note_off(&mut self, channel: u8, note: u8, duration_secs: f32, now: Instant) {
        let due = now + shaped_duration(duration_secs);
        self.pending_note_offs.push(PendingNoteOff { due, channel, note });
    }

    fn flush_due_note_offs(&mut self, now: Instant) -> Result<(), EngineError> {
        let mut i = 0;
        while i < self.pending_note_offs.len() {
            if self.pending_note_offs[i].due <= now {
                let off = self.pending_note_offs.swap_remove(i);
                self.midi.send(MidiMessage::NoteOff {
                    channel: off.channel,
                    note: off.note,
                })?;
            } else {
                i += 1;
            }
        }
        Ok(())
    }

    fn push_event(&mut self, event: EngineEvent) {
        if self.events.len() >= RECENT_EVENT_CAP {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}
