//! Tie codec.
//!
//! A tied duration is written as one segment per value, each repeating the pitch
//! (or chord) and joined by `~`: `c2~ c8`. Decoding folds the segments back into one
//! `Duration::Note` with the values in source order. Continuation segments must
//! repeat the spelling of the first; their octave marks are not read.

use crate::error::TranslateError;
use crate::types::{Accidental, Duration, Letter, NoteValue, Pitch};

/// The written values of a duration, head first
pub fn segments(duration: &Duration) -> Vec<NoteValue> {
    match duration {
        Duration::Note { value, tied } => std::iter::once(*value).chain(tied.iter().copied()).collect(),
        Duration::Rest { value } => vec![*value],
        Duration::TripletMember { base } => vec![NoteValue::plain(*base)],
    }
}

pub type Spelling = (Letter, Accidental);

/// Accumulates the segments of one tied note or chord while decoding.
#[derive(Debug, Clone)]
pub struct TieJoiner {
    pitches: Vec<Pitch>,
    head: NoteValue,
    tail: Vec<NoteValue>,
}

impl TieJoiner {
    pub fn start(pitches: Vec<Pitch>, value: NoteValue) -> Self {
        Self {
            pitches,
            head: value,
            tail: Vec::new(),
        }
    }

    /// Append a continuation segment after checking it repeats the tied spelling
    pub fn join(&mut self, spelling: &[Spelling], value: NoteValue) -> Result<(), TranslateError> {
        let matches = spelling.len() == self.pitches.len()
            && self
                .pitches
                .iter()
                .zip(spelling)
                .all(|(p, (letter, accidental))| p.letter == *letter && p.accidental == *accidental);

        if !matches {
            let expected: Vec<String> = self.pitches.iter().map(|p| p.to_string()).collect();
            return Err(TranslateError::InvalidPitchContext(format!(
                "tie continues {} with a different pitch",
                expected.join(" ")
            )));
        }
        self.tail.push(value);
        Ok(())
    }

    pub fn pitches(&self) -> &[Pitch] {
        &self.pitches
    }

    /// The tied pitches and their combined duration
    pub fn finish(self) -> (Vec<Pitch>, Duration) {
        (
            self.pitches,
            Duration::Note {
                value: self.head,
                tied: self.tail,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BaseDuration;

    fn half() -> NoteValue {
        NoteValue::plain(BaseDuration::Half)
    }

    fn eighth() -> NoteValue {
        NoteValue::plain(BaseDuration::Eighth)
    }

    #[test]
    fn test_segments() {
        let tied = Duration::tied(half(), [eighth(), eighth()]);
        assert_eq!(segments(&tied), vec![half(), eighth(), eighth()]);
        assert_eq!(segments(&Duration::rest(BaseDuration::Half)), vec![half()]);
        assert_eq!(segments(&Duration::triplet(BaseDuration::Eighth)), vec![eighth()]);
    }

    #[test]
    fn test_join_keeps_source_order() {
        let c4: Pitch = "C4".parse().unwrap();
        let mut joiner = TieJoiner::start(vec![c4], half());
        joiner.join(&[(Letter::C, Accidental::Natural)], eighth()).unwrap();
        let (pitches, duration) = joiner.finish();
        assert_eq!(pitches, vec![c4]);
        assert_eq!(duration, Duration::tied(half(), [eighth()]));
    }

    #[test]
    fn test_join_rejects_other_spelling() {
        let c4: Pitch = "C4".parse().unwrap();
        let mut joiner = TieJoiner::start(vec![c4], half());
        assert!(matches!(
            joiner.join(&[(Letter::C, Accidental::Sharp)], eighth()),
            Err(TranslateError::InvalidPitchContext(_))
        ));
        assert!(matches!(
            joiner.join(&[(Letter::D, Accidental::Natural)], eighth()),
            Err(TranslateError::InvalidPitchContext(_))
        ));
    }

    #[test]
    fn test_join_chord() {
        let chord: Vec<Pitch> = ["C4", "E4", "G4"].iter().map(|s| s.parse().unwrap()).collect();
        let mut joiner = TieJoiner::start(chord.clone(), half());
        let spelling: Vec<Spelling> = chord.iter().map(|p| (p.letter, p.accidental)).collect();
        joiner.join(&spelling, half()).unwrap();
        assert!(joiner.join(&spelling[..2], half()).is_err());
        assert_eq!(joiner.pitches().len(), 3);
    }
}
