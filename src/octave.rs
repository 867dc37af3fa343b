//! # Octave Resolver
//!
//! Relative-octave notation writes pitches without octave numbers. Each letter is
//! placed at the position nearest the previous letter, counted in diatonic steps:
//! at most three steps away in either direction. Explicit marks shift the reference
//! octave before the search.
//!
//! ```text
//! previous  target  steps  octave
//! c'        d       +1     same
//! c'        g       -3     one below (g is 4 steps up, 3 down)
//! b         c       +1     one above (crosses the B/C boundary)
//! c'        g'      -3+1   same (the mark lifts the reference)
//! ```
//!
//! The forward direction (`resolve`) decodes a letter and mark delta into an absolute
//! octave. The reverse direction (`marks_between`) finds the mark string that makes
//! the forward rule land on a given absolute pitch, so that
//! `resolve(prev, target.letter, delta(marks_between(prev, target))) == target.octave`.

use crate::error::TranslateError;
use crate::tables::pitch::{absolute_marks, octave_marks, UNMARKED_OCTAVE};
use crate::types::{check_octave, Accidental, Letter, Pitch};

/// Signed diatonic steps from `from` to the nearest `to`, in `-3..=3`
fn nearest_steps(from: Letter, to: Letter) -> i32 {
    let steps = (to.index() - from.index()).rem_euclid(7);
    if steps > 3 {
        steps - 7
    } else {
        steps
    }
}

fn nearest_octave(reference_octave: i32, previous: Letter, target: Letter) -> i32 {
    let steps = nearest_steps(previous, target);
    reference_octave + (previous.index() + steps).div_euclid(7)
}

/// Forward rule: the absolute octave of `target` written after `previous`
/// (C when absent) with `delta` octave marks.
pub fn resolve(
    reference_octave: i32,
    previous: Option<Letter>,
    target: Letter,
    delta: i32,
) -> Result<i32, TranslateError> {
    let previous = previous.unwrap_or_default();
    check_octave(nearest_octave(reference_octave + delta, previous, target))
}

/// Reverse rule: the marks that take `previous` to `target`
pub fn marks_between(previous: &Pitch, target: &Pitch) -> Result<String, TranslateError> {
    let predicted = nearest_octave(previous.octave, previous.letter, target.letter);
    octave_marks(target.octave - predicted)
}

fn letter_from_text(text: &str) -> Result<Letter, TranslateError> {
    let mut chars = text.chars();
    match (chars.next().and_then(Letter::from_char), chars.next()) {
        (Some(letter), None) => Ok(letter),
        _ => Err(TranslateError::InvalidPitchContext(format!(
            "'{}' is not a pitch letter",
            text
        ))),
    }
}

/// [`resolve`] with letters given as text, as they appear in notation
pub fn resolve_letters(
    reference_octave: i32,
    previous: Option<&str>,
    target: &str,
    delta: i32,
) -> Result<i32, TranslateError> {
    let previous = previous.map(letter_from_text).transpose()?;
    let target = letter_from_text(target)?;
    resolve(reference_octave, previous, target, delta)
}

/// Running octave state of one translation pass.
///
/// Created at the start of a pass and threaded through every pitch by `&mut`.
#[derive(Debug, Clone, PartialEq)]
pub struct RelativeOctaveContext {
    pub previous: Option<Pitch>,
    pub reference_octave: i32,
    pub relative: bool,
}

impl Default for RelativeOctaveContext {
    fn default() -> Self {
        Self::absolute()
    }
}

impl RelativeOctaveContext {
    /// Relative mode anchored on `anchor`, or on the unmarked octave when absent
    pub fn relative(anchor: Option<Pitch>) -> Self {
        Self {
            reference_octave: anchor.map_or(UNMARKED_OCTAVE, |p| p.octave),
            previous: anchor,
            relative: true,
        }
    }

    /// Absolute mode: marks count from the unmarked octave
    pub fn absolute() -> Self {
        Self {
            previous: None,
            reference_octave: UNMARKED_OCTAVE,
            relative: false,
        }
    }

    /// Decode one written pitch and make it the new previous pitch.
    pub fn resolve_next(
        &mut self,
        letter: Letter,
        accidental: Accidental,
        delta: i32,
    ) -> Result<Pitch, TranslateError> {
        let octave = if self.relative {
            resolve(
                self.reference_octave,
                self.previous.map(|p| p.letter),
                letter,
                delta,
            )?
        } else {
            check_octave(UNMARKED_OCTAVE + delta)?
        };

        let pitch = Pitch::new(letter, accidental, octave)?;
        self.advance(pitch);
        Ok(pitch)
    }

    /// Marks to write for `target`, which then becomes the new previous pitch.
    pub fn marks_for_next(&mut self, target: &Pitch) -> Result<String, TranslateError> {
        let marks = if !self.relative {
            absolute_marks(target.octave)?
        } else {
            match &self.previous {
                Some(previous) => marks_between(previous, target)?,
                None => {
                    let predicted = nearest_octave(self.reference_octave, Letter::C, target.letter);
                    octave_marks(target.octave - predicted)?
                }
            }
        };
        self.advance(*target);
        Ok(marks)
    }

    fn advance(&mut self, pitch: Pitch) {
        self.previous = Some(pitch);
        self.reference_octave = pitch.octave;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::pitch::marks_to_delta;
    use crate::types::{MAX_OCTAVE, MIN_OCTAVE};

    fn pitch(s: &str) -> Pitch {
        s.parse().unwrap()
    }

    #[test]
    fn test_nearest_position() {
        // c' d -> D4
        assert_eq!(resolve(4, Some(Letter::C), Letter::D, 0).unwrap(), 4);
        // c' g -> G3 (three steps down is nearer than four up)
        assert_eq!(resolve(4, Some(Letter::C), Letter::G, 0).unwrap(), 3);
        // c' f -> F4 (three steps up)
        assert_eq!(resolve(4, Some(Letter::C), Letter::F, 0).unwrap(), 4);
        // b c -> C one octave up
        assert_eq!(resolve(3, Some(Letter::B), Letter::C, 0).unwrap(), 4);
        // c b -> B one octave down
        assert_eq!(resolve(4, Some(Letter::C), Letter::B, 0).unwrap(), 3);
        // c' g' -> G4
        assert_eq!(resolve(4, Some(Letter::C), Letter::G, 1).unwrap(), 4);
    }

    #[test]
    fn test_missing_previous_defaults_to_c() {
        assert_eq!(resolve(3, None, Letter::E, 0).unwrap(), 3);
        assert_eq!(resolve(3, None, Letter::A, 0).unwrap(), 2);
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            resolve(8, Some(Letter::B), Letter::C, 0),
            Err(TranslateError::OctaveOutOfRange(9))
        ));
        assert!(matches!(
            resolve(0, Some(Letter::C), Letter::C, -1),
            Err(TranslateError::OctaveOutOfRange(-1))
        ));
    }

    #[test]
    fn test_letters_as_text() {
        assert_eq!(resolve_letters(4, Some("c"), "g", 0).unwrap(), 3);
        assert_eq!(resolve_letters(4, None, "D", 0).unwrap(), 4);
        assert!(matches!(
            resolve_letters(4, Some("h"), "c", 0),
            Err(TranslateError::InvalidPitchContext(_))
        ));
        assert!(matches!(
            resolve_letters(4, Some("c"), "cis", 0),
            Err(TranslateError::InvalidPitchContext(_))
        ));
    }

    #[test]
    fn test_marks_between() {
        assert_eq!(marks_between(&pitch("C4"), &pitch("D4")).unwrap(), "");
        assert_eq!(marks_between(&pitch("C4"), &pitch("G4")).unwrap(), "'");
        assert_eq!(marks_between(&pitch("C4"), &pitch("C5")).unwrap(), "'");
        assert_eq!(marks_between(&pitch("C4"), &pitch("C2")).unwrap(), ",,");
        assert_eq!(marks_between(&pitch("B3"), &pitch("C4")).unwrap(), "");
        assert_eq!(marks_between(&pitch("G4"), &pitch("C4")).unwrap(), ",");
    }

    #[test]
    fn test_resolve_inverts_marks_between() {
        for prev_octave in MIN_OCTAVE..=MAX_OCTAVE {
            for target_octave in MIN_OCTAVE..=MAX_OCTAVE {
                for prev_letter in Letter::ALL {
                    for target_letter in Letter::ALL {
                        let prev = Pitch::natural(prev_letter, prev_octave).unwrap();
                        let target = Pitch::natural(target_letter, target_octave).unwrap();
                        let marks = marks_between(&prev, &target).unwrap();
                        let delta = marks_to_delta(&marks).unwrap();
                        let octave =
                            resolve(prev.octave, Some(prev.letter), target.letter, delta).unwrap();
                        assert_eq!(octave, target.octave, "{} -> {}", prev, target);
                    }
                }
            }
        }
    }

    #[test]
    fn test_context_tracks_previous_pitch() {
        let mut ctx = RelativeOctaveContext::relative(Some(pitch("C4")));
        let e = ctx
            .resolve_next(Letter::E, Accidental::Natural, 0)
            .unwrap();
        assert_eq!(e, pitch("E4"));
        let a = ctx
            .resolve_next(Letter::A, Accidental::Natural, 0)
            .unwrap();
        assert_eq!(a, pitch("A4"));
        let c = ctx
            .resolve_next(Letter::C, Accidental::Sharp, 1)
            .unwrap();
        assert_eq!(c, pitch("C#6"));
        assert_eq!(ctx.reference_octave, 6);
    }

    #[test]
    fn test_context_absolute_mode() {
        let mut ctx = RelativeOctaveContext::absolute();
        let p = ctx.resolve_next(Letter::G, Accidental::Natural, 1).unwrap();
        assert_eq!(p, pitch("G4"));
        let p = ctx.resolve_next(Letter::C, Accidental::Natural, 0).unwrap();
        assert_eq!(p, pitch("C3"));
        assert_eq!(ctx.marks_for_next(&pitch("D5")).unwrap(), "''");
    }

    #[test]
    fn test_context_marks_round_trip() {
        let melody = ["C4", "G3", "A5", "Bb2", "C#3", "F8", "D0"].map(pitch);
        let mut encoder = RelativeOctaveContext::relative(Some(pitch("C4")));
        let mut decoder = encoder.clone();
        for target in melody {
            let marks = encoder.marks_for_next(&target).unwrap();
            let decoded = decoder
                .resolve_next(target.letter, target.accidental, marks_to_delta(&marks).unwrap())
                .unwrap();
            assert_eq!(decoded, target);
        }
    }
}
