use pretty_assertions::assert_eq;
use strumpad_ports::config::{ButtonAction, FieldSpec};
use strumpad_ports::storage::SettingsDto;
use strumpad_ports::types::PenState;

#[test]
fn bare_action_names_decode() {
    let action: ButtonAction = serde_json::from_str("\"none\"").unwrap();
    assert_eq!(action, ButtonAction::None);

    let action: ButtonAction = serde_json::from_str("\"\"").unwrap();
    assert_eq!(action, ButtonAction::None);

    let action: ButtonAction = serde_json::from_str("\"toggle-repeater\"").unwrap();
    assert_eq!(action, ButtonAction::ToggleRepeater);
}

#[test]
fn parameterized_actions_decode_from_arrays() {
    let action: ButtonAction = serde_json::from_str("[\"transpose\", -5]").unwrap();
    assert_eq!(action, ButtonAction::Transpose { semitones: -5 });

    let action: ButtonAction =
        serde_json::from_str("[\"set-strum-notes\", [\"A3\", \"C4\", \"E4\"]]").unwrap();
    assert_eq!(
        action,
        ButtonAction::SetStrumNotes {
            notes: vec!["A3".to_string(), "C4".to_string(), "E4".to_string()],
        }
    );
}

#[test]
fn malformed_actions_are_rejected() {
    assert!(serde_json::from_str::<ButtonAction>("\"sharpen\"").is_err());
    assert!(serde_json::from_str::<ButtonAction>("[\"transpose\"]").is_err());
    assert!(serde_json::from_str::<ButtonAction>("[\"transpose\", \"up\"]").is_err());
    assert!(serde_json::from_str::<ButtonAction>("[12, \"transpose\"]").is_err());
    assert!(serde_json::from_str::<ButtonAction>("[\"set-strum-notes\", [1, 2]]").is_err());
}

#[test]
fn actions_reserialize_to_their_persisted_shape() {
    let json = serde_json::to_string(&ButtonAction::Transpose { semitones: 12 }).unwrap();
    assert_eq!(json, "[\"transpose\",12]");

    let json = serde_json::to_string(&ButtonAction::ToggleRepeater).unwrap();
    assert_eq!(json, "\"toggle-repeater\"");
}

#[test]
fn field_specs_decode_from_tagged_json() {
    let spec: FieldSpec =
        serde_json::from_str(r#"{"type": "range", "byteIndex": 3, "max": 124}"#).unwrap();
    assert_eq!(
        spec,
        FieldSpec::Range {
            byte_index: 3,
            min: 0,
            max: 124,
        }
    );

    let spec: FieldSpec = serde_json::from_str(
        r#"{"type": "wrapped-range", "byteIndex": 8,
            "positiveMax": 60, "negativeMin": 256, "negativeMax": 196}"#,
    )
    .unwrap();
    assert_eq!(
        spec,
        FieldSpec::WrappedRange {
            byte_index: 8,
            positive_min: 0,
            positive_max: 60,
            negative_min: 256,
            negative_max: 196,
        }
    );

    let spec: FieldSpec = serde_json::from_str(
        r#"{"type": "code", "byteIndex": 1,
            "values": {"161": {"state": "contact"}}}"#,
    )
    .unwrap();
    match spec {
        FieldSpec::Code { byte_index, values } => {
            assert_eq!(byte_index, 1);
            assert_eq!(values[&161].state, Some(PenState::Contact));
        }
        other => panic!("expected code spec, got {other:?}"),
    }
}

#[test]
fn empty_settings_document_fills_every_default() {
    let settings: SettingsDto = serde_json::from_str("{}").unwrap();

    assert_eq!(
        settings.strumming.initial_notes,
        vec!["C4".to_string(), "E4".to_string(), "G4".to_string()]
    );
    assert_eq!(settings.strumming.upper_note_spread, 3);
    assert_eq!(settings.report_length, 10);
    assert!(settings.mappings.contains_key("status"));
    assert!(settings.mappings.contains_key("pressure"));
    assert_eq!(settings.note_duration.max, 1.5);
}

#[test]
fn partial_settings_keep_unmentioned_defaults() {
    let settings: SettingsDto = serde_json::from_str(
        r#"{"strumming": {"initialNotes": ["D3", "A3"], "midiChannel": 2}}"#,
    )
    .unwrap();

    assert_eq!(
        settings.strumming.initial_notes,
        vec!["D3".to_string(), "A3".to_string()]
    );
    assert_eq!(settings.strumming.midi_channel, 2);
    // Unmentioned siblings come from defaults.
    assert_eq!(settings.strumming.lower_note_spread, 3);
    assert!(!settings.strum_release.active);
}
