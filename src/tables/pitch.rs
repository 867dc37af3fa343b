//! # Pitch Table
//!
//! Pitch words follow the Dutch note names used by LilyPond: `is` raises, `es`
//! lowers, and the E and A flats contract to `ees`/`aes` in the canonical spelling.
//!
//! Octave marks are `'` (up) and `,` (down). In relative mode a mark string is an
//! octave delta against the nearest-position rule; in absolute mode it counts from
//! the unmarked octave, where `c` is C3 and `c'` is middle C.

use crate::error::TranslateError;
use crate::types::{check_octave, Accidental, Letter, MAX_OCTAVE, MIN_OCTAVE};

/// Octave written without marks in absolute mode
pub const UNMARKED_OCTAVE: i32 = 3;

/// Largest relative delta. The nearest-position rule can land one octave outside
/// the supported range, so the span is one wider than the range itself.
pub const MAX_MARK_DELTA: i32 = MAX_OCTAVE - MIN_OCTAVE + 1;

// Contracted forms LilyPond also accepts
const ALIASES: [(Letter, Accidental, &str); 4] = [
    (Letter::E, Accidental::Flat, "es"),
    (Letter::E, Accidental::DoubleFlat, "eses"),
    (Letter::A, Accidental::Flat, "as"),
    (Letter::A, Accidental::DoubleFlat, "ases"),
];

/// Pitch word for a letter and accidental
pub fn spell(letter: Letter, accidental: Accidental) -> &'static str {
    use Accidental::*;
    use Letter::*;
    match (letter, accidental) {
        (C, Natural) => "c",
        (C, Sharp) => "cis",
        (C, Flat) => "ces",
        (C, DoubleSharp) => "cisis",
        (C, DoubleFlat) => "ceses",
        (D, Natural) => "d",
        (D, Sharp) => "dis",
        (D, Flat) => "des",
        (D, DoubleSharp) => "disis",
        (D, DoubleFlat) => "deses",
        (E, Natural) => "e",
        (E, Sharp) => "eis",
        (E, Flat) => "ees",
        (E, DoubleSharp) => "eisis",
        (E, DoubleFlat) => "eeses",
        (F, Natural) => "f",
        (F, Sharp) => "fis",
        (F, Flat) => "fes",
        (F, DoubleSharp) => "fisis",
        (F, DoubleFlat) => "feses",
        (G, Natural) => "g",
        (G, Sharp) => "gis",
        (G, Flat) => "ges",
        (G, DoubleSharp) => "gisis",
        (G, DoubleFlat) => "geses",
        (A, Natural) => "a",
        (A, Sharp) => "ais",
        (A, Flat) => "aes",
        (A, DoubleSharp) => "aisis",
        (A, DoubleFlat) => "aeses",
        (B, Natural) => "b",
        (B, Sharp) => "bis",
        (B, Flat) => "bes",
        (B, DoubleSharp) => "bisis",
        (B, DoubleFlat) => "beses",
    }
}

/// Letter and accidental for a pitch word
pub fn unspell(word: &str) -> Result<(Letter, Accidental), TranslateError> {
    Letter::ALL
        .into_iter()
        .flat_map(|letter| Accidental::ALL.into_iter().map(move |accidental| (letter, accidental)))
        .find(|(letter, accidental)| spell(*letter, *accidental) == word)
        .or_else(|| {
            ALIASES
                .iter()
                .find(|(_, _, alias)| *alias == word)
                .map(|(letter, accidental, _)| (*letter, *accidental))
        })
        .ok_or_else(|| TranslateError::UnknownSpelling(word.to_string()))
}

/// Mark string for a relative octave delta: `''` for +2, `,` for -1
pub fn octave_marks(delta: i32) -> Result<String, TranslateError> {
    if delta.abs() > MAX_MARK_DELTA {
        return Err(TranslateError::OctaveOutOfRange(delta));
    }
    let mark = if delta > 0 { "'" } else { "," };
    Ok(mark.repeat(delta.unsigned_abs() as usize))
}

/// Octave delta for a mark string. Mixing `'` and `,` is rejected.
pub fn marks_to_delta(marks: &str) -> Result<i32, TranslateError> {
    let ups = marks.chars().filter(|&c| c == '\'').count();
    let downs = marks.chars().filter(|&c| c == ',').count();
    if ups + downs != marks.chars().count() || (ups > 0 && downs > 0) {
        return Err(TranslateError::UnknownToken(marks.to_string()));
    }
    let delta = ups as i32 - downs as i32;
    if delta.abs() > MAX_MARK_DELTA {
        return Err(TranslateError::OctaveOutOfRange(delta));
    }
    Ok(delta)
}

/// Mark string writing `octave` in absolute mode
pub fn absolute_marks(octave: i32) -> Result<String, TranslateError> {
    check_octave(octave)?;
    octave_marks(octave - UNMARKED_OCTAVE)
}

/// Absolute octave written by a mark string
pub fn marks_to_absolute(marks: &str) -> Result<i32, TranslateError> {
    check_octave(UNMARKED_OCTAVE + marks_to_delta(marks)?)
}
