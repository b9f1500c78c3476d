use crate::model::{
    correct_odd_notation, FLAT_NOTATIONS, SHARP_NOTATIONS,
};
use std::collections::HashMap;

// Scale degrees as chromatic offsets from the root.
const MAJOR_STEPS: [usize; 7] = [0, 2, 4, 5, 7, 9, 11];
const MINOR_STEPS: [usize; 7] = [0, 2, 3, 5, 7, 8, 10];

/// Notes of a key signature, spelled in the table the root comes from.
/// With `octave` set, each note carries its octave digit and the scale
/// crosses into the next octave where it wraps past B.
pub fn notes_in_key_signature(key: &str, major: bool, octave: Option<i32>) -> Vec<String> {
    // Uppercase only the root letter so flat spellings survive ("eb" -> "Eb").
    let mut chars = key.chars();
    let key = match chars.next() {
        Some(first) => format!("{}{}", first.to_ascii_uppercase(), chars.as_str()),
        None => return Vec::new(),
    };
    let key = correct_odd_notation(&key);

    let (table, start) = match SHARP_NOTATIONS.iter().position(|n| *n == key) {
        Some(pos) => (&SHARP_NOTATIONS, pos),
        None => match FLAT_NOTATIONS.iter().position(|n| *n == key) {
            Some(pos) => (&FLAT_NOTATIONS, pos),
            None => return Vec::new(),
        },
    };

    // Two octaves of candidates starting at the root, octave digit attached
    // when requested.
    let mut candidates = Vec::with_capacity(24);
    for (idx, notation) in table.iter().cycle().take(24).enumerate() {
        match octave {
            Some(base) => {
                let oct = base + (idx / 12) as i32;
                candidates.push(format!("{notation}{oct}"));
            }
            None => candidates.push((*notation).to_string()),
        }
    }
    let candidates = &candidates[start..];

    let steps = if major { MAJOR_STEPS } else { MINOR_STEPS };
    steps
        .iter()
        .filter_map(|&step| candidates.get(step).cloned())
        .collect()
}

/// Pregenerated key signature lookup for every root, major and minor.
/// Minor keys are stored under the root with an `m` suffix (`"Am"`).
#[derive(Clone, Debug, Default)]
pub struct KeySignatureTable {
    keys: HashMap<String, Vec<String>>,
}

impl KeySignatureTable {
    pub fn generate() -> Self {
        let mut keys = HashMap::with_capacity(24);
        for root in SHARP_NOTATIONS {
            keys.insert(root.to_string(), notes_in_key_signature(root, true, None));
            keys.insert(
                format!("{root}m"),
                notes_in_key_signature(root, false, None),
            );
        }
        Self { keys }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.keys.get(key).map(Vec::as_slice)
    }

    /// Whether a pitch class belongs to the key signature.
    pub fn contains(&self, key: &str, notation: &str) -> bool {
        self.get(key)
            .map(|notes| notes.iter().any(|n| n == notation))
            .unwrap_or(false)
    }
}
