use strumpad_domain_notes::NoteObject;

/// A string was sounded: which note, and how hard.
#[derive(Clone, Debug, PartialEq)]
pub struct Pluck {
    pub note: NoteObject,
    pub velocity: u8,
}

/// Maps a moving position across evenly spaced virtual strings to at most
/// one pluck per string-crossing.
///
/// The playable width is divided into one segment per note. A pluck fires
/// only when the segment index changes; holding inside a segment never
/// re-triggers, however many samples arrive. `clear_strum` re-arms every
/// segment for the next pass.
pub struct Strummer {
    width: f64,
    height: f64,
    notes: Vec<NoteObject>,
    last_x: f64,
    last_strummed_index: Option<usize>,
}

impl Strummer {
    pub fn new() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            notes: Vec::new(),
            last_x: -1.0,
            last_strummed_index: None,
        }
    }

    pub fn notes(&self) -> &[NoteObject] {
        &self.notes
    }

    /// Replace the voicing. Bounds are re-derived, but the armed state is
    /// kept: a changed chord takes effect on the next segment crossing,
    /// not retroactively.
    pub fn set_notes(&mut self, notes: Vec<NoteObject>) {
        self.notes = notes;
        self.update_bounds(self.width, self.height);
    }

    pub fn update_bounds(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    /// Process one position/pressure sample. Velocity is
    /// `floor(pressure * 127)` clamped into 0..=127.
    pub fn strum(&mut self, x: f64, pressure: f64) -> Option<Pluck> {
        if self.notes.is_empty() {
            return None;
        }

        let string_width = self.width / self.notes.len() as f64;
        let index = ((x / string_width).floor() as isize)
            .clamp(0, self.notes.len() as isize - 1) as usize;
        self.last_x = x;

        if self.last_strummed_index == Some(index) {
            return None;
        }
        self.last_strummed_index = Some(index);

        let velocity = (pressure * 127.0).floor().clamp(0.0, 127.0) as u8;
        Some(Pluck {
            note: self.notes[index].clone(),
            velocity,
        })
    }

    /// Re-arm every segment; called on pen/pointer release.
    pub fn clear_strum(&mut self) {
        self.last_strummed_index = None;
    }

    pub fn is_sounding(&self) -> bool {
        self.last_strummed_index.is_some()
    }
}

impl Default for Strummer {
    fn default() -> Self {
        Self::new()
    }
}
