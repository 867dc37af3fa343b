//! Chord codec.
//!
//! A chord is written `<c e g>4`. The first tone is placed against the pitch before
//! the chord; each later tone against the tone before it inside the chord. The last
//! tone becomes the previous pitch for whatever follows the chord.

use crate::codec::{write_pitch, WrittenPitch};
use crate::error::TranslateError;
use crate::octave::RelativeOctaveContext;
use crate::types::{Duration, NoteEvent, NoteValue, Pitch, Voice};

/// `<p1 p2 ...>` without the duration token
pub fn write_chord(
    pitches: &[Pitch],
    ctx: &mut RelativeOctaveContext,
) -> Result<String, TranslateError> {
    let tones = pitches
        .iter()
        .map(|pitch| write_pitch(pitch, ctx))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("<{}>", tones.join(" ")))
}

/// Resolve the written tones of one chord in order
pub fn read_chord(
    tones: &[WrittenPitch],
    ctx: &mut RelativeOctaveContext,
) -> Result<Vec<Pitch>, TranslateError> {
    tones
        .iter()
        .map(|tone| ctx.resolve_next(tone.letter, tone.accidental, tone.delta))
        .collect()
}

/// Upper tones and bass line of a chord progression
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressionParts {
    pub treble: Voice,
    pub bass: Voice,
}

/// Split block chords into a treble voice and a bass voice.
///
/// The first written tone of each chord goes to the bass; the remaining tones stay
/// in the treble as a chord (or a single note). A one-tone chord leaves a rest in
/// the treble.
pub fn split_progression(
    chords: &[Vec<Pitch>],
    value: NoteValue,
) -> Result<ProgressionParts, TranslateError> {
    let mut treble = Vec::with_capacity(chords.len());
    let mut bass = Vec::with_capacity(chords.len());
    let note = Duration::Note {
        value,
        tied: Vec::new(),
    };

    for (index, chord) in chords.iter().enumerate() {
        let (root, upper) = chord.split_first().ok_or_else(|| {
            TranslateError::InvalidPitchContext(format!("chord {} of the progression is empty", index + 1))
        })?;

        bass.push(NoteEvent::note(*root, note.clone()));
        treble.push(match upper {
            [] => NoteEvent::rest(Duration::Rest { value }),
            [single] => NoteEvent::note(*single, note.clone()),
            tones => NoteEvent::chord(tones.to_vec(), note.clone()),
        });
    }

    Ok(ProgressionParts {
        treble: Voice::new(treble),
        bass: Voice::new(bass),
    })
}
