use crate::types::PenState;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Symmetry of the input-to-output response curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpreadMode {
    Direct,
    Inverse,
    Central,
}

/// Which decoded axis feeds an expressive parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlSource {
    #[serde(rename = "yaxis")]
    YAxis,
    #[serde(rename = "pressure")]
    Pressure,
    #[serde(rename = "tiltX")]
    TiltX,
    #[serde(rename = "tiltY")]
    TiltY,
    #[serde(rename = "tiltXY")]
    TiltXy,
}

/// Response-curve configuration for one expressive parameter.
///
/// `multiplier` is display-only range compression: it narrows the range a
/// configuration UI reports (see `effective_max`), it never scales the live
/// shaped output.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveConfig {
    pub min: f32,
    pub max: f32,
    pub curve: f32,
    pub spread: SpreadMode,
    pub multiplier: f32,
    #[serde(rename = "default")]
    pub default_value: f32,
    pub control: ControlSource,
}

/// Discrete fields decoded from a status code byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CodeValue {
    pub state: Option<PenState>,
    pub primary_button_pressed: bool,
    pub secondary_button_pressed: bool,
}

/// How one named field is recovered from the raw report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum FieldSpec {
    /// Unsigned byte scaled into [0, 1] as `(raw - min) / (max - min)`.
    #[serde(rename_all = "camelCase")]
    Range {
        byte_index: usize,
        #[serde(default)]
        min: u16,
        max: u16,
    },
    /// Signed axis folded into one unsigned byte: small values are the
    /// positive side, values above `negative_max` wrap to the negative side.
    #[serde(rename_all = "camelCase")]
    WrappedRange {
        byte_index: usize,
        #[serde(default)]
        positive_min: u16,
        positive_max: u16,
        negative_min: u16,
        negative_max: u16,
    },
    /// Byte looked up in a table of discrete named values.
    #[serde(rename_all = "camelCase")]
    Code {
        byte_index: usize,
        values: BTreeMap<u8, CodeValue>,
    },
    /// Byte read as eight independent button bits.
    #[serde(rename_all = "camelCase")]
    BitFlags { byte_index: usize },
}

impl FieldSpec {
    pub fn byte_index(&self) -> usize {
        match self {
            FieldSpec::Range { byte_index, .. }
            | FieldSpec::WrappedRange { byte_index, .. }
            | FieldSpec::Code { byte_index, .. }
            | FieldSpec::BitFlags { byte_index } => *byte_index,
        }
    }
}

/// Named field mapping for one device report layout.
pub type FieldMap = BTreeMap<String, FieldSpec>;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("field '{field}': byte index {index} outside report of {report_len} bytes")]
    ByteIndexOutOfRange {
        field: String,
        index: usize,
        report_len: usize,
    },
    #[error("field '{field}': zero-width range (max == min)")]
    ZeroWidthRange { field: String },
    #[error("field '{field}': empty code table")]
    EmptyCodeTable { field: String },
    #[error("curve config '{name}': curve exponent must be > 0 (got {value})")]
    NonPositiveCurve { name: String, value: f32 },
    #[error("curve config '{name}': zero-width range (max == min)")]
    ZeroWidthCurveRange { name: String },
}

/// A button binding, decoded from its persisted JSON shape once at load time.
///
/// The persisted form is either a bare action name (`"toggle-repeater"`) or
/// an array of name plus parameters (`["transpose", 12]`,
/// `["set-strum-notes", ["C4", "E4", "G4"]]`).
#[derive(Clone, Debug, PartialEq, Default)]
pub enum ButtonAction {
    #[default]
    None,
    ToggleRepeater,
    Transpose {
        semitones: i32,
    },
    SetStrumNotes {
        notes: Vec<String>,
    },
}

impl Serialize for ButtonAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde_json::{json, Value};
        let value: Value = match self {
            ButtonAction::None => json!("none"),
            ButtonAction::ToggleRepeater => json!("toggle-repeater"),
            ButtonAction::Transpose { semitones } => json!(["transpose", semitones]),
            ButtonAction::SetStrumNotes { notes } => json!(["set-strum-notes", notes]),
        };
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ButtonAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde_json::Value;

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Name(String),
            Call(Vec<Value>),
        }

        let (name, params) = match Repr::deserialize(deserializer)? {
            Repr::Name(name) => (name, Vec::new()),
            Repr::Call(items) => {
                let mut items = items.into_iter();
                let name = match items.next() {
                    Some(Value::String(name)) => name,
                    _ => return Err(D::Error::custom("action array must start with a name")),
                };
                (name, items.collect())
            }
        };

        match name.as_str() {
            "" | "none" => Ok(ButtonAction::None),
            "toggle-repeater" => Ok(ButtonAction::ToggleRepeater),
            "transpose" => {
                let semitones = params
                    .first()
                    .and_then(Value::as_i64)
                    .ok_or_else(|| D::Error::custom("transpose expects a semitone count"))?;
                Ok(ButtonAction::Transpose {
                    semitones: semitones as i32,
                })
            }
            "set-strum-notes" => {
                let notes = params
                    .first()
                    .and_then(Value::as_array)
                    .ok_or_else(|| D::Error::custom("set-strum-notes expects a note array"))?
                    .iter()
                    .map(|v| {
                        v.as_str()
                            .map(str::to_string)
                            .ok_or_else(|| D::Error::custom("note must be a string"))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ButtonAction::SetStrumNotes { notes })
            }
            other => Err(D::Error::custom(format!("unknown action '{other}'"))),
        }
    }
}
