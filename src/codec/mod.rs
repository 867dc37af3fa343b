//! Codecs for the constructs that need more than a table lookup.
//!
//! - `elision` - drops repeated note duration tokens
//! - `tie` - `c2~ c8` segments ⇄ one tied duration
//! - `triplet` - triplet runs ⇄ `\tuplet 3/2 { ... }` groups
//! - `chord` - `<c e g>` with octaves tracked inside the chord
//!
//! Every codec takes the pass state (`RelativeOctaveContext`, `DurationTracker`) by
//! `&mut`; none of them keeps state of its own between calls.

pub mod chord;
pub mod elision;
pub mod tie;
pub mod triplet;

use crate::error::TranslateError;
use crate::octave::RelativeOctaveContext;
use crate::tables::pitch::spell;
use crate::types::{Accidental, Letter, Pitch};

/// A pitch as written in notation: word plus octave mark delta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrittenPitch {
    pub letter: Letter,
    pub accidental: Accidental,
    pub delta: i32,
}

/// Pitch word plus octave marks, advancing the octave context
pub fn write_pitch(pitch: &Pitch, ctx: &mut RelativeOctaveContext) -> Result<String, TranslateError> {
    let marks = ctx.marks_for_next(pitch)?;
    Ok(format!("{}{}", spell(pitch.letter, pitch.accidental), marks))
}
