use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use strumpad_core::{Engine, EngineError, EngineEvent};
use strumpad_ports::config::{ButtonAction, FieldSpec};
use strumpad_ports::midi::{MidiError, MidiMessage, MidiOutputConn};
use strumpad_ports::storage::SettingsDto;

#[derive(Clone, Default)]
struct Recorder {
    messages: Arc<Mutex<Vec<MidiMessage>>>,
}

impl Recorder {
    fn note_ons(&self) -> Vec<(u8, u8)> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter_map(|m| match m {
                MidiMessage::NoteOn { note, velocity, .. } => Some((*note, *velocity)),
                _ => None,
            })
            .collect()
    }

    fn all(&self) -> Vec<MidiMessage> {
        self.messages.lock().unwrap().clone()
    }

    fn note_offs(&self) -> Vec<u8> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter_map(|m| match m {
                MidiMessage::NoteOff { note, .. } => Some(*note),
                _ => None,
            })
            .collect()
    }
}

struct RecordingConn(Recorder);

impl MidiOutputConn for RecordingConn {
    fn send(&mut self, message: MidiMessage) -> Result<(), MidiError> {
        self.0.messages.lock().unwrap().push(message);
        Ok(())
    }

    fn close(self: Box<Self>) {}
}

fn engine_with_recorder(settings: SettingsDto) -> (Engine, Recorder) {
    let recorder = Recorder::default();
    let engine = Engine::new(settings, Box::new(RecordingConn(recorder.clone())))
        .expect("default settings validate");
    (engine, recorder)
}

/// Contact report for the default Deco-class layout: status 161, x/y/pressure
/// raw bytes, neutral tilt.
fn contact_frame(x_raw: u8, y_raw: u8, pressure_raw: u8) -> [u8; 10] {
    [2, 161, 0, x_raw, 0, y_raw, 0, pressure_raw, 0, 0]
}

fn hover_frame() -> [u8; 10] {
    [2, 160, 0, 0, 0, 0, 0, 0, 0, 0]
}

#[test]
fn default_voicing_spreads_the_initial_chord() {
    let (engine, _) = engine_with_recorder(SettingsDto::default());
    // C-E-G base with 3 below and 3 above.
    let spelled: Vec<String> = engine
        .voicing()
        .iter()
        .map(|n| format!("{}{}", n.notation, n.octave))
        .collect();
    assert_eq!(
        spelled,
        vec!["C3", "E3", "G3", "C4", "E4", "G4", "C5", "E5", "G5"]
    );
}

#[test]
fn full_pressure_pluck_on_the_lowest_string() {
    let (mut engine, recorder) = engine_with_recorder(SettingsDto::default());
    let now = Instant::now();

    engine.handle_frame_at(&contact_frame(0, 0, 63), now).unwrap();

    // C3 under the octave * 12 convention.
    assert_eq!(recorder.note_ons(), vec![(36, 127)]);
    let events = engine.poll_events();
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::Pluck {
            notation,
            octave: 3,
            velocity: 127,
        } if notation == "C"
    )));
}

#[test]
fn repeated_frames_in_one_segment_pluck_once() {
    let (mut engine, recorder) = engine_with_recorder(SettingsDto::default());
    let now = Instant::now();

    for _ in 0..20 {
        engine.handle_frame_at(&contact_frame(3, 0, 63), now).unwrap();
    }
    assert_eq!(recorder.note_ons().len(), 1);
}

#[test]
fn release_rearms_the_strummer() {
    let (mut engine, recorder) = engine_with_recorder(SettingsDto::default());
    let now = Instant::now();

    engine.handle_frame_at(&contact_frame(0, 0, 63), now).unwrap();
    engine.handle_frame_at(&hover_frame(), now).unwrap();
    engine.handle_frame_at(&contact_frame(0, 0, 63), now).unwrap();

    assert_eq!(recorder.note_ons(), vec![(36, 127), (36, 127)]);
}

#[test]
fn note_off_fires_after_the_shaped_duration() {
    let (mut engine, recorder) = engine_with_recorder(SettingsDto::default());
    let now = Instant::now();

    engine.handle_frame_at(&contact_frame(0, 0, 63), now).unwrap();
    assert!(recorder.note_offs().is_empty());

    // Default duration config peaks at 1.5 s with neutral tilt; two
    // seconds later the hold is over.
    engine
        .handle_frame_at(&hover_frame(), now + Duration::from_secs(2))
        .unwrap();
    assert_eq!(recorder.note_offs(), vec![36]);
}

#[test]
fn corrupt_frames_are_dropped_without_touching_state() {
    let (mut engine, recorder) = engine_with_recorder(SettingsDto::default());
    let now = Instant::now();

    engine.handle_frame_at(&contact_frame(0, 0, 63), now).unwrap();
    let before = *engine.snapshot().read();

    // Truncated report, then an unknown status code.
    engine.handle_frame_at(&[2, 161, 0], now).unwrap();
    engine
        .handle_frame_at(&[2, 99, 0, 0, 0, 0, 0, 0, 0, 0], now)
        .unwrap();

    assert_eq!(*engine.snapshot().read(), before);
    assert_eq!(recorder.note_ons().len(), 1);
}

#[test]
fn transpose_action_shifts_subsequent_plucks() {
    let (mut engine, recorder) = engine_with_recorder(SettingsDto::default());
    let now = Instant::now();

    engine.execute_action(&ButtonAction::Transpose { semitones: 12 });
    engine.handle_frame_at(&contact_frame(0, 0, 63), now).unwrap();
    assert_eq!(recorder.note_ons(), vec![(48, 127)]);

    // Same interval again toggles transpose off.
    engine.execute_action(&ButtonAction::Transpose { semitones: 12 });
    engine.handle_frame_at(&hover_frame(), now).unwrap();
    engine.handle_frame_at(&contact_frame(0, 0, 63), now).unwrap();
    assert_eq!(recorder.note_ons(), vec![(48, 127), (36, 127)]);
}

#[test]
fn set_strum_notes_action_rebuilds_the_voicing() {
    let (mut engine, _) = engine_with_recorder(SettingsDto::default());

    engine.execute_action(&ButtonAction::SetStrumNotes {
        notes: vec!["A3".to_string(), "C4".to_string()],
    });

    // 3 below + 2 base + 3 above.
    assert_eq!(engine.voicing().len(), 8);
    let events = engine.poll_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEvent::VoicingChanged { .. })));
}

#[test]
fn pointer_samples_drive_the_pipeline_like_frames() {
    let (mut engine, recorder) = engine_with_recorder(SettingsDto::default());
    let now = Instant::now();

    engine
        .handle_pointer_sample_at(0.05, 0.2, 0.5, 0.0, 0.0, now)
        .unwrap();
    assert_eq!(recorder.note_ons(), vec![(36, 63)]);

    // Pointer-up releases and re-arms.
    engine
        .handle_pointer_sample_at(0.05, 0.2, 0.0, 0.0, 0.0, now)
        .unwrap();
    engine
        .handle_pointer_sample_at(0.05, 0.2, 0.5, 0.0, 0.0, now)
        .unwrap();
    assert_eq!(recorder.note_ons(), vec![(36, 63), (36, 63)]);
}

#[test]
fn degenerate_config_is_refused_at_build_time() {
    let mut settings = SettingsDto::default();
    settings.note_velocity.curve = 0.0;
    let result = Engine::new(
        settings,
        Box::new(RecordingConn(Recorder::default())),
    );
    assert!(matches!(result, Err(EngineError::Config(_))));

    let mut settings = SettingsDto::default();
    settings.report_length = 4;
    let result = Engine::new(
        settings,
        Box::new(RecordingConn(Recorder::default())),
    );
    assert!(matches!(result, Err(EngineError::Config(_))));
}

#[test]
fn short_strum_release_fires_the_percussive_hit() {
    let mut settings = SettingsDto::default();
    settings.strum_release.active = true;
    settings.strum_release.midi_channel = Some(9);
    settings.strum_release.velocity_multiplier = 0.5;
    let (mut engine, recorder) = engine_with_recorder(settings);
    let now = Instant::now();

    // Full tilt shapes the duration to its 0.15 s floor, inside the
    // 0.25 s release window.
    engine
        .handle_frame_at(&[2, 161, 0, 0, 0, 0, 0, 63, 60, 0], now)
        .unwrap();
    engine
        .handle_frame_at(&[2, 160, 0, 0, 0, 0, 0, 0, 60, 0], now)
        .unwrap();

    let hits: Vec<MidiMessage> = recorder
        .all()
        .into_iter()
        .filter(|m| matches!(m, MidiMessage::NoteOn { note: 38, .. }))
        .collect();
    // Half of the pluck's 127, on the override channel.
    assert_eq!(
        hits,
        vec![MidiMessage::NoteOn {
            channel: 9,
            note: 38,
            velocity: 63,
        }]
    );
    assert!(engine
        .poll_events()
        .iter()
        .any(|e| matches!(e, EngineEvent::Release { velocity: 63 })));
}

#[test]
fn slow_strum_release_stays_silent() {
    let mut settings = SettingsDto::default();
    settings.strum_release.active = true;
    let (mut engine, recorder) = engine_with_recorder(settings);
    let now = Instant::now();

    // Neutral tilt shapes the duration to 1.5 s, past the release window.
    engine.handle_frame_at(&contact_frame(0, 0, 63), now).unwrap();
    engine.handle_frame_at(&hover_frame(), now).unwrap();

    assert_eq!(recorder.note_ons(), vec![(36, 127)]);
}

#[test]
fn release_velocity_never_drops_below_one() {
    let mut settings = SettingsDto::default();
    settings.strum_release.active = true;
    settings.strum_release.velocity_multiplier = 0.001;
    let (mut engine, recorder) = engine_with_recorder(settings);
    let now = Instant::now();

    engine
        .handle_frame_at(&[2, 161, 0, 0, 0, 0, 0, 63, 60, 0], now)
        .unwrap();
    engine
        .handle_frame_at(&[2, 160, 0, 0, 0, 0, 0, 0, 60, 0], now)
        .unwrap();

    // No override channel configured: the hit rides the strumming channel.
    assert!(recorder.all().contains(&MidiMessage::NoteOn {
        channel: 0,
        note: 38,
        velocity: 1,
    }));
}

#[test]
fn tablet_button_press_edge_fires_its_action_once() {
    let mut settings = SettingsDto::default();
    settings
        .mappings
        .insert("buttons".to_string(), FieldSpec::BitFlags { byte_index: 2 });
    settings
        .tablet_buttons
        .insert(1, ButtonAction::ToggleRepeater);
    let (mut engine, _) = engine_with_recorder(settings);
    let now = Instant::now();

    let button_frame = |bits: u8| [2, 240, bits, 0, 0, 0, 0, 0, 0, 0];

    engine.handle_frame_at(&button_frame(1), now).unwrap();
    engine.handle_frame_at(&button_frame(1), now).unwrap();
    let toggles = engine
        .poll_events()
        .iter()
        .filter(|e| matches!(e, EngineEvent::RepeaterToggled { .. }))
        .count();
    assert_eq!(toggles, 1);

    // Releasing the button re-arms the edge.
    engine.handle_frame_at(&button_frame(0), now).unwrap();
    engine.handle_frame_at(&button_frame(1), now).unwrap();
    assert!(engine
        .poll_events()
        .iter()
        .any(|e| matches!(e, EngineEvent::RepeaterToggled { active: false })));
}

#[test]
fn stylus_button_edge_triggers_its_action_once_while_held() {
    let mut settings = SettingsDto::default();
    settings.stylus_buttons.active = true;
    settings.stylus_buttons.primary_button_action = ButtonAction::Transpose { semitones: 12 };
    let (mut engine, recorder) = engine_with_recorder(settings);
    let now = Instant::now();

    // Status 165: contact with the primary stylus button down.
    let pressed = [2, 165, 0, 0, 0, 0, 0, 63, 0, 0];
    engine.handle_frame_at(&pressed, now).unwrap();
    engine.handle_frame_at(&pressed, now).unwrap();
    let transposes = engine
        .poll_events()
        .iter()
        .filter(|e| matches!(e, EngineEvent::TransposeChanged { .. }))
        .count();
    assert_eq!(transposes, 1);

    // The action runs before the strum, so the pluck is already shifted.
    assert_eq!(recorder.note_ons(), vec![(48, 127)]);

    // Release and press again: the same interval toggles transpose off.
    engine.handle_frame_at(&contact_frame(0, 0, 63), now).unwrap();
    engine.handle_frame_at(&pressed, now).unwrap();
    assert!(engine
        .poll_events()
        .iter()
        .any(|e| matches!(e, EngineEvent::TransposeChanged { semitones: 0 })));
}

#[test]
fn extreme_duration_configs_never_panic_the_sample_loop() {
    let mut settings = SettingsDto::default();
    settings.note_duration.max = f32::MAX;
    settings.note_repeater.active = true;
    settings.note_repeater.frequency_multiplier = f32::MIN_POSITIVE;
    let (mut engine, recorder) = engine_with_recorder(settings);
    let now = Instant::now();

    engine.handle_frame_at(&contact_frame(0, 0, 63), now).unwrap();
    engine
        .handle_frame_at(&contact_frame(3, 0, 63), now + Duration::from_secs(5))
        .unwrap();

    // The hold is astronomically long: the off stays pending and the
    // repeater interval never comes due.
    assert!(recorder.note_offs().is_empty());
    assert_eq!(recorder.note_ons().len(), 1);
}

#[test]
fn repeater_refires_held_notes_at_the_shaped_interval() {
    let mut settings = SettingsDto::default();
    settings.note_repeater.active = true;
    settings.note_repeater.frequency_multiplier = 1.0;
    let (mut engine, recorder) = engine_with_recorder(settings);
    let now = Instant::now();

    engine.handle_frame_at(&contact_frame(0, 0, 63), now).unwrap();
    assert_eq!(recorder.note_ons().len(), 1);

    // Held in place before the interval elapses: nothing extra.
    engine
        .handle_frame_at(&contact_frame(0, 0, 63), now + Duration::from_millis(100))
        .unwrap();
    assert_eq!(recorder.note_ons().len(), 1);

    // Past the 1.5 s duration interval the held note re-fires.
    engine
        .handle_frame_at(&contact_frame(0, 0, 63), now + Duration::from_secs(2))
        .unwrap();
    assert_eq!(recorder.note_ons().len(), 2);
}
