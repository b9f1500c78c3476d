use crate::model::NoteObject;

/// Widen a base chord by octave doubling.
///
/// `upper` extra notes are generated above the chord by cycling the base
/// low-to-high, bumping the octave each time the cycle wraps; `lower` extra
/// notes below by cycling high-to-low and dropping the octave on wrap.
/// Generated notes are marked `secondary`. Result is
/// `[lower (low to high), base, upper (low to high)]`, so the length is
/// always `lower + base.len() + upper`. An empty base yields an empty result.
pub fn fill_note_spread(notes: &[NoteObject], lower: usize, upper: usize) -> Vec<NoteObject> {
    if notes.is_empty() {
        return Vec::new();
    }

    let mut upper_notes = Vec::with_capacity(upper);
    for c in 0..upper {
        let source = &notes[c % notes.len()];
        let octave_increase = (c / notes.len()) as i32;
        upper_notes.push(NoteObject {
            notation: source.notation.clone(),
            octave: source.octave + octave_increase + 1,
            secondary: true,
        });
    }

    let mut lower_notes = Vec::with_capacity(lower);
    for c in 0..lower {
        let reverse_index = notes.len() - 1 - (c % notes.len());
        let source = &notes[reverse_index];
        let octave_decrease = (c / notes.len()) as i32;
        lower_notes.push(NoteObject {
            notation: source.notation.clone(),
            octave: source.octave - octave_decrease - 1,
            secondary: true,
        });
    }

    // Generation walks the chord downward, but string assignment wants the
    // whole voicing ordered by pitch.
    lower_notes.reverse();

    let mut spread = Vec::with_capacity(lower + notes.len() + upper);
    spread.extend(lower_notes);
    spread.extend(notes.iter().cloned());
    spread.extend(upper_notes);
    spread
}
