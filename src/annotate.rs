//! Error-mark annotation.
//!
//! Wraps runs of flagged entries in colour overrides:
//!
//! ```text
//! c4 \override NoteHead.color = #red \override Stem.color = #red \override Accidental.color = #red
//! d e \override NoteHead.color = #black \override Stem.color = #black \override Accidental.color = #black
//! f
//! ```
//!
//! Pitch-error positions count pitched entries only (notes and chords); duration-error
//! positions count every entry. Both count pickup entries first. The overrides are
//! plain text around the music and decode to nothing.

use crate::types::{ErrorMarks, NoteEvent};
use std::collections::BTreeSet;

pub const DEFAULT_HIGHLIGHT_COLOR: &str = "red";
pub const DEFAULT_RESET_COLOR: &str = "black";

/// `\override` tokens colouring note heads, stems and accidentals
pub fn note_override(color: &str) -> String {
    format!(
        "\\override NoteHead.color = #{color} \\override Stem.color = #{color} \\override Accidental.color = #{color}"
    )
}

/// `\override` token colouring rests
pub fn rest_override(color: &str) -> String {
    format!("\\override Staff.Rest.color = #{}", color)
}

/// Walks the events of one encode pass and decides where overrides go.
#[derive(Debug)]
pub struct Annotator {
    pitch_errors: BTreeSet<usize>,
    duration_errors: BTreeSet<usize>,
    highlight: String,
    reset: String,
    pitched_seen: usize,
    events_seen: usize,
    notes_active: bool,
    rests_active: bool,
}

impl Annotator {
    pub fn new(marks: &ErrorMarks, highlight: &str, reset: &str) -> Self {
        Self {
            pitch_errors: marks.pitches.iter().copied().collect(),
            duration_errors: marks.durations.iter().copied().collect(),
            highlight: highlight.to_string(),
            reset: reset.to_string(),
            pitched_seen: 0,
            events_seen: 0,
            notes_active: false,
            rests_active: false,
        }
    }

    /// Overrides to write in front of `event`, in order
    pub fn before(&mut self, event: &NoteEvent) -> Vec<String> {
        let mut flagged = self.duration_errors.contains(&self.events_seen);
        self.events_seen += 1;
        if !event.is_rest() {
            flagged |= self.pitch_errors.contains(&self.pitched_seen);
            self.pitched_seen += 1;
        }

        if !flagged {
            return self.finish();
        }

        // a flagged entry of the other kind closes the open run first
        let mut tokens = Vec::new();
        if event.is_rest() {
            if self.notes_active {
                tokens.push(note_override(&self.reset));
                self.notes_active = false;
            }
            if !self.rests_active {
                tokens.push(rest_override(&self.highlight));
                self.rests_active = true;
            }
        } else {
            if self.rests_active {
                tokens.push(rest_override(&self.reset));
                self.rests_active = false;
            }
            if !self.notes_active {
                tokens.push(note_override(&self.highlight));
                self.notes_active = true;
            }
        }
        tokens
    }

    /// Count an entry that is not written, so later positions stay aligned
    pub fn skip(&mut self, event: &NoteEvent) {
        self.events_seen += 1;
        if !event.is_rest() {
            self.pitched_seen += 1;
        }
    }

    /// Reset overrides closing any open run
    pub fn finish(&mut self) -> Vec<String> {
        let mut tokens = Vec::new();
        if self.notes_active {
            tokens.push(note_override(&self.reset));
            self.notes_active = false;
        }
        if self.rests_active {
            tokens.push(rest_override(&self.reset));
            self.rests_active = false;
        }
        tokens
    }
}
