use serde::Serialize;
use std::collections::BTreeMap;
use strumpad_ports::config::{ConfigError, FieldMap, FieldSpec};
use strumpad_ports::frame::FrameError;
use strumpad_ports::types::PenState;

/// All semantic fields recovered from one raw report.
///
/// Scalar axes land in `values` under their configured names; the status
/// code and button bits decode into the typed fields. Serializable as the
/// diagnostic axis map for display consumers.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DecodedFrame {
    pub values: BTreeMap<String, f64>,
    pub state: Option<PenState>,
    pub primary_button_pressed: bool,
    pub secondary_button_pressed: bool,
    /// Tablet hardware buttons, present only for button-mode reports.
    pub buttons: Option<[bool; 8]>,
}

impl DecodedFrame {
    fn axis(&self, name: &str) -> f64 {
        self.values.get(name).copied().unwrap_or(0.0)
    }

    pub fn x(&self) -> f64 {
        self.axis("x")
    }

    pub fn y(&self) -> f64 {
        self.axis("y")
    }

    pub fn pressure(&self) -> f64 {
        self.axis("pressure")
    }

    pub fn tilt_x(&self) -> f64 {
        self.axis("tiltX")
    }

    pub fn tilt_y(&self) -> f64 {
        self.axis("tiltY")
    }
}

/// Field map compiled against a fixed report length.
///
/// All structural checks (byte indices, range widths, code tables) happen
/// once here; `decode` itself is a pure function over the report bytes.
pub struct FrameDecoder {
    fields: Vec<(String, FieldSpec)>,
    report_len: usize,
}

impl FrameDecoder {
    pub fn new(map: &FieldMap, report_len: usize) -> Result<Self, ConfigError> {
        for (name, spec) in map {
            if spec.byte_index() >= report_len {
                return Err(ConfigError::ByteIndexOutOfRange {
                    field: name.clone(),
                    index: spec.byte_index(),
                    report_len,
                });
            }
            match spec {
                FieldSpec::Range { min, max, .. } if max == min => {
                    return Err(ConfigError::ZeroWidthRange {
                        field: name.clone(),
                    });
                }
                FieldSpec::WrappedRange {
                    positive_min,
                    positive_max,
                    negative_min,
                    negative_max,
                    ..
                } if positive_max == positive_min || negative_min == negative_max => {
                    return Err(ConfigError::ZeroWidthRange {
                        field: name.clone(),
                    });
                }
                FieldSpec::Code { values, .. } if values.is_empty() => {
                    return Err(ConfigError::EmptyCodeTable {
                        field: name.clone(),
                    });
                }
                _ => {}
            }
        }

        Ok(Self {
            fields: map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            report_len,
        })
    }

    pub fn report_len(&self) -> usize {
        self.report_len
    }

    /// Decode one raw report. A short report is a transient device error;
    /// the caller drops the frame and keeps its previous state.
    pub fn decode(&self, frame: &[u8]) -> Result<DecodedFrame, FrameError> {
        if frame.len() < self.report_len {
            return Err(FrameError::Truncated {
                got: frame.len(),
                expected: self.report_len,
            });
        }

        let mut decoded = DecodedFrame::default();

        // Status first: the pen state decides how the rest of the report
        // is interpreted.
        for (name, spec) in &self.fields {
            if let FieldSpec::Code { byte_index, values } = spec {
                let code = frame[*byte_index];
                let value = values.get(&code).ok_or(FrameError::UnknownCode {
                    field: name.clone(),
                    code,
                })?;
                decoded.state = value.state;
                decoded.primary_button_pressed = value.primary_button_pressed;
                decoded.secondary_button_pressed = value.secondary_button_pressed;
                break;
            }
        }

        let in_button_mode = decoded.state == Some(PenState::Buttons);

        for (name, spec) in &self.fields {
            match spec {
                FieldSpec::Code { .. } => {}
                FieldSpec::Range {
                    byte_index,
                    min,
                    max,
                } => {
                    // Coordinates carry button data in button-mode reports.
                    if in_button_mode && (name == "x" || name == "y") {
                        continue;
                    }
                    let raw = f64::from(frame[*byte_index]);
                    let value = (raw - f64::from(*min)) / (f64::from(*max) - f64::from(*min));
                    decoded.values.insert(name.clone(), value);
                }
                FieldSpec::WrappedRange {
                    byte_index,
                    positive_min,
                    positive_max,
                    negative_min,
                    negative_max,
                } => {
                    let raw = f64::from(frame[*byte_index]);
                    let value = if raw < f64::from(*negative_max) {
                        raw / (f64::from(*positive_max) - f64::from(*positive_min))
                    } else {
                        -(f64::from(*negative_min) - raw)
                            / (f64::from(*negative_min) - f64::from(*negative_max))
                    };
                    decoded.values.insert(name.clone(), value);
                }
                FieldSpec::BitFlags { byte_index } => {
                    if !in_button_mode {
                        continue;
                    }
                    let bits = frame[*byte_index];
                    let mut buttons = [false; 8];
                    for (i, slot) in buttons.iter_mut().enumerate() {
                        *slot = bits & (1 << i) != 0;
                    }
                    decoded.buttons = Some(buttons);
                }
            }
        }

        Ok(decoded)
    }
}
