use serde::{Deserialize, Serialize};

/// Chromatic scale spelled with sharps.
pub const SHARP_NOTATIONS: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Chromatic scale spelled with flats.
pub const FLAT_NOTATIONS: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Accidental spellings that resolve to a natural, and their corrections.
pub const ODD_NOTATIONS: [&str; 4] = ["B#", "Cb", "E#", "Fb"];
pub const CORRECTED_NOTATIONS: [&str; 4] = ["C", "C", "F", "F"];

/// One note of a voicing. `secondary` marks notes generated by octave
/// spreading rather than authored in the base chord.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteObject {
    pub notation: String,
    pub octave: i32,
    #[serde(default)]
    pub secondary: bool,
}

impl NoteObject {
    pub fn new(notation: impl Into<String>, octave: i32) -> Self {
        Self {
            notation: notation.into(),
            octave,
            secondary: false,
        }
    }

    /// Pitch number under the `octave * 12` convention (C4 = 48).
    pub fn midi_number(&self) -> i32 {
        self.octave * 12 + index_of_notation(&self.notation).unwrap_or(0) as i32
    }

    /// Shift by semitones, keeping the accidental style of the source
    /// spelling (sharps stay sharps, flats stay flats).
    pub fn transpose(&self, semitones: i32) -> NoteObject {
        if semitones == 0 {
            return self.clone();
        }

        let midi = self.midi_number() + semitones;
        let octave = midi.div_euclid(12);
        let index = midi.rem_euclid(12) as usize;

        let notation = if self.notation.contains('b') {
            FLAT_NOTATIONS[index]
        } else {
            SHARP_NOTATIONS[index]
        };

        NoteObject {
            notation: notation.to_string(),
            octave,
            secondary: self.secondary,
        }
    }
}

/// Chromatic index of a pitch class, accepting sharp or flat spellings.
pub fn index_of_notation(notation: &str) -> Option<usize> {
    SHARP_NOTATIONS
        .iter()
        .position(|n| *n == notation)
        .or_else(|| FLAT_NOTATIONS.iter().position(|n| *n == notation))
}

/// Pitch class at a chromatic index, wrapping past the octave.
pub fn notation_at_index(index: usize, prefer_flat: bool) -> &'static str {
    let index = index % 12;
    if prefer_flat {
        FLAT_NOTATIONS[index]
    } else {
        SHARP_NOTATIONS[index]
    }
}

/// Replace spellings like B# or Fb with the natural they sound as.
pub fn correct_odd_notation(notation: &str) -> &str {
    match ODD_NOTATIONS.iter().position(|n| *n == notation) {
        Some(pos) => CORRECTED_NOTATIONS[pos],
        None => notation,
    }
}

/// Best-effort notation parser, never fails.
///
/// The final character, if a digit, is the octave; the rest is the pitch
/// class (one optional accidental). No trailing digit means octave 4.
/// Empty input parses as C4.
pub fn parse_notation(notation: &str) -> NoteObject {
    let mut chars = notation.chars();
    match chars.next_back() {
        Some(last) if last.is_ascii_digit() => NoteObject {
            notation: chars.as_str().to_string(),
            octave: last.to_digit(10).unwrap_or(4) as i32,
            secondary: false,
        },
        Some(_) => NoteObject::new(notation, 4),
        None => NoteObject::new("C", 4),
    }
}

/// Notation string to pitch number: `octave * 12 + pitch class index`,
/// so C4 = 48. Unknown pitch classes fall back to C.
pub fn notation_to_midi(notation: &str) -> i32 {
    parse_notation(notation).midi_number()
}

/// Pitch class of a pitch number (octave discarded, sharp spelling).
pub fn midi_to_notation(midi: i32) -> &'static str {
    SHARP_NOTATIONS[midi.rem_euclid(12) as usize]
}

/// Sort notation strings by octave, then by chromatic index within the
/// octave. Stable, so equal pitches keep their authored order.
pub fn sort_notations(notes: &[String]) -> Vec<String> {
    let mut sorted = notes.to_vec();
    sorted.sort_by_key(|n| {
        let parsed = parse_notation(n);
        (parsed.octave, index_of_notation(&parsed.notation).unwrap_or(0))
    });
    sorted
}

/// Equal-temperament frequency, A4 = 440 Hz. None for unknown pitch classes.
pub fn frequency_for_notation(notation: &str) -> Option<f64> {
    let parsed = parse_notation(notation);
    let corrected = correct_odd_notation(&parsed.notation);
    let index = index_of_notation(corrected)? as i32;
    let midi = parsed.octave * 12 + index;
    // A4 sits at pitch number 57 under the octave * 12 convention.
    Some(440.0 * f64::powf(2.0, f64::from(midi - 57) / 12.0))
}
