use crate::config::{ButtonAction, ControlSource, CurveConfig, FieldMap, FieldSpec, SpreadMode};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_note_duration() -> CurveConfig {
    CurveConfig {
        min: 0.15,
        max: 1.5,
        curve: 1.0,
        spread: SpreadMode::Inverse,
        multiplier: 1.0,
        default_value: 1.0,
        control: ControlSource::TiltXy,
    }
}

fn default_pitch_bend() -> CurveConfig {
    CurveConfig {
        min: -1.0,
        max: 1.0,
        curve: 4.0,
        spread: SpreadMode::Central,
        multiplier: 1.0,
        default_value: 0.0,
        control: ControlSource::YAxis,
    }
}

fn default_note_velocity() -> CurveConfig {
    CurveConfig {
        min: 0.0,
        max: 127.0,
        curve: 4.0,
        spread: SpreadMode::Direct,
        multiplier: 1.0,
        default_value: 64.0,
        control: ControlSource::Pressure,
    }
}

fn default_report_length() -> usize {
    10
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrummingConfig {
    pub initial_notes: Vec<String>,
    pub upper_note_spread: usize,
    pub lower_note_spread: usize,
    pub midi_channel: u8,
    pub pressure_threshold: f32,
}

impl Default for StrummingConfig {
    fn default() -> Self {
        Self {
            initial_notes: vec!["C4".to_string(), "E4".to_string(), "G4".to_string()],
            upper_note_spread: 3,
            lower_note_spread: 3,
            midi_channel: 0,
            pressure_threshold: 0.1,
        }
    }
}

/// Percussive hit fired when the pen lifts after a short strum.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrumReleaseConfig {
    pub active: bool,
    pub midi_note: u8,
    pub midi_channel: Option<u8>,
    pub max_duration: f32,
    pub velocity_multiplier: f32,
}

impl Default for StrumReleaseConfig {
    fn default() -> Self {
        Self {
            active: false,
            midi_note: 38,
            midi_channel: None,
            max_duration: 0.25,
            velocity_multiplier: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NoteRepeaterConfig {
    pub active: bool,
    pub pressure_multiplier: f32,
    pub frequency_multiplier: f32,
}

impl Default for NoteRepeaterConfig {
    fn default() -> Self {
        Self {
            active: false,
            pressure_multiplier: 1.0,
            frequency_multiplier: 1.0,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StylusButtonsConfig {
    pub active: bool,
    pub primary_button_action: ButtonAction,
    pub secondary_button_action: ButtonAction,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsDto {
    #[serde(default = "default_note_duration")]
    pub note_duration: CurveConfig,
    #[serde(default = "default_pitch_bend")]
    pub pitch_bend: CurveConfig,
    #[serde(default = "default_note_velocity")]
    pub note_velocity: CurveConfig,
    pub strumming: StrummingConfig,
    pub strum_release: StrumReleaseConfig,
    pub note_repeater: NoteRepeaterConfig,
    pub stylus_buttons: StylusButtonsConfig,
    /// Tablet hardware button slot (1-based) -> bound action.
    pub tablet_buttons: BTreeMap<u8, ButtonAction>,
    pub selected_midi_out: Option<DeviceId>,
    #[serde(default = "default_report_length")]
    pub report_length: usize,
    pub mappings: FieldMap,
}

impl Default for SettingsDto {
    fn default() -> Self {
        Self {
            note_duration: default_note_duration(),
            pitch_bend: default_pitch_bend(),
            note_velocity: default_note_velocity(),
            strumming: StrummingConfig::default(),
            strum_release: StrumReleaseConfig::default(),
            note_repeater: NoteRepeaterConfig::default(),
            stylus_buttons: StylusButtonsConfig::default(),
            tablet_buttons: BTreeMap::new(),
            selected_midi_out: None,
            report_length: default_report_length(),
            mappings: default_field_map(),
        }
    }
}

/// Report layout of the reference tablet (XP-Pen Deco-class, 10-byte report).
pub fn default_field_map() -> FieldMap {
    use crate::config::CodeValue;
    use crate::types::PenState;

    let mut status_values: BTreeMap<u8, CodeValue> = BTreeMap::new();
    status_values.insert(
        192,
        CodeValue {
            state: Some(PenState::None),
            ..CodeValue::default()
        },
    );
    status_values.insert(
        160,
        CodeValue {
            state: Some(PenState::Hover),
            ..CodeValue::default()
        },
    );
    status_values.insert(
        162,
        CodeValue {
            state: Some(PenState::Hover),
            secondary_button_pressed: true,
            ..CodeValue::default()
        },
    );
    status_values.insert(
        164,
        CodeValue {
            state: Some(PenState::Hover),
            primary_button_pressed: true,
            ..CodeValue::default()
        },
    );
    status_values.insert(
        161,
        CodeValue {
            state: Some(PenState::Contact),
            ..CodeValue::default()
        },
    );
    status_values.insert(
        163,
        CodeValue {
            state: Some(PenState::Contact),
            secondary_button_pressed: true,
            ..CodeValue::default()
        },
    );
    status_values.insert(
        165,
        CodeValue {
            state: Some(PenState::Contact),
            primary_button_pressed: true,
            ..CodeValue::default()
        },
    );
    status_values.insert(
        240,
        CodeValue {
            state: Some(PenState::Buttons),
            ..CodeValue::default()
        },
    );

    let mut map = FieldMap::new();
    map.insert(
        "status".to_string(),
        FieldSpec::Code {
            byte_index: 1,
            values: status_values,
        },
    );
    map.insert(
        "x".to_string(),
        FieldSpec::Range {
            byte_index: 3,
            min: 0,
            max: 124,
        },
    );
    map.insert(
        "y".to_string(),
        FieldSpec::Range {
            byte_index: 5,
            min: 0,
            max: 70,
        },
    );
    map.insert(
        "pressure".to_string(),
        FieldSpec::Range {
            byte_index: 7,
            min: 0,
            max: 63,
        },
    );
    map.insert(
        "tiltX".to_string(),
        FieldSpec::WrappedRange {
            byte_index: 8,
            positive_min: 0,
            positive_max: 60,
            negative_min: 256,
            negative_max: 196,
        },
    );
    map.insert(
        "tiltY".to_string(),
        FieldSpec::WrappedRange {
            byte_index: 9,
            positive_min: 0,
            positive_max: 60,
            negative_min: 256,
            negative_max: 196,
        },
    );
    map
}

pub trait StoragePort: Send + Sync {
    fn load_settings(&self) -> Result<SettingsDto, StorageError>;
    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError>;
}
