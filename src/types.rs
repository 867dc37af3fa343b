//! # Voice Model Types
//!
//! This module defines the absolute-pitch side of the translator: the note/duration
//! stream that notation text is decoded into and encoded from.
//!
//! ## Type Hierarchy
//! ```text
//! Voice
//!   ├── TimeSignature (beats, beat unit)
//!   ├── Option<Pickup> (length + its own short event list)
//!   ├── barlines: BTreeMap<measure number, override token>
//!   └── Vec<NoteEvent>
//!         ├── Note  { pitch: Pitch, duration: Duration }
//!         ├── Chord { pitches: Vec<Pitch>, duration: Duration }
//!         └── Rest  { duration: Duration }
//!
//! Duration (enum)
//!   ├── Note { value: NoteValue, tied: Vec<NoteValue> }
//!   ├── Rest { value: NoteValue }
//!   └── TripletMember { base: BaseDuration }
//! ```
//!
//! ## Key Concepts
//!
//! ### Octaves
//! Octave numbers are scientific (C4 is middle C) and follow the letter, not the
//! sounding pitch: B#3 is written in octave 3 even though it sounds like C4. The
//! supported range is `MIN_OCTAVE..=MAX_OCTAVE`.
//!
//! ### Metric Weight
//! Durations are measured in integer ticks, `TICKS_PER_WHOLE` to the whole note, which
//! keeps dotted and triplet 64ths exact. Weights are looked up through the duration
//! table, never stored on the events.
//!
//! ### Triplet Rests
//! A rest inside a triplet group is a `NoteEvent::Rest` whose duration is a
//! `Duration::TripletMember`.

use crate::error::TranslateError;
use crate::measure::extract_pickup;
use crate::tables::duration::{duration_weight, value_weight};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Lowest supported octave number.
pub const MIN_OCTAVE: i32 = 0;
/// Highest supported octave number.
pub const MAX_OCTAVE: i32 = 8;
/// Metric weight of a whole note.
pub const TICKS_PER_WHOLE: u32 = 384;

/// Pitch letters C through B, in diatonic order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Letter {
    #[default]
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    pub const ALL: [Letter; 7] = [
        Letter::C,
        Letter::D,
        Letter::E,
        Letter::F,
        Letter::G,
        Letter::A,
        Letter::B,
    ];

    /// Diatonic step above C (C = 0, B = 6)
    pub fn index(self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 1,
            Letter::E => 2,
            Letter::F => 3,
            Letter::G => 4,
            Letter::A => 5,
            Letter::B => 6,
        }
    }

    /// Parse a letter name in either case
    pub fn from_char(c: char) -> Option<Letter> {
        match c.to_ascii_uppercase() {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Accidentals supported by the pitch table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Accidental {
    #[default]
    Natural,
    Sharp,       // #
    Flat,        // b
    DoubleSharp, // x
    DoubleFlat,  // bb
}

impl Accidental {
    pub const ALL: [Accidental; 5] = [
        Accidental::Natural,
        Accidental::Sharp,
        Accidental::Flat,
        Accidental::DoubleSharp,
        Accidental::DoubleFlat,
    ];

    /// Suffix used by stream spellings such as `C#4` or `Bbb3`
    pub fn stream_suffix(self) -> &'static str {
        match self {
            Accidental::Natural => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
            Accidental::DoubleSharp => "x",
            Accidental::DoubleFlat => "bb",
        }
    }

    pub fn from_stream_suffix(suffix: &str) -> Option<Accidental> {
        Self::ALL
            .into_iter()
            .find(|accidental| accidental.stream_suffix() == suffix)
    }
}

/// An absolute pitch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pitch {
    pub letter: Letter,
    pub accidental: Accidental,
    pub octave: i32,
}

impl Pitch {
    pub fn new(letter: Letter, accidental: Accidental, octave: i32) -> Result<Self, TranslateError> {
        check_octave(octave)?;
        Ok(Self {
            letter,
            accidental,
            octave,
        })
    }

    pub fn natural(letter: Letter, octave: i32) -> Result<Self, TranslateError> {
        Self::new(letter, Accidental::Natural, octave)
    }

    /// Absolute position in diatonic steps, ignoring accidentals
    pub fn diatonic_position(&self) -> i32 {
        self.octave * 7 + self.letter.index()
    }
}

pub(crate) fn check_octave(octave: i32) -> Result<i32, TranslateError> {
    if (MIN_OCTAVE..=MAX_OCTAVE).contains(&octave) {
        Ok(octave)
    } else {
        Err(TranslateError::OctaveOutOfRange(octave))
    }
}

impl FromStr for Pitch {
    type Err = TranslateError;

    /// Parse a stream spelling: letter, optional accidental suffix, octave number.
    /// Examples: `C4`, `F#3`, `Bb2`, `Gx5`, `Ebb4`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let letter = chars
            .next()
            .and_then(Letter::from_char)
            .ok_or_else(|| TranslateError::UnknownSpelling(s.to_string()))?;

        let rest = chars.as_str();
        let digits_start = rest
            .find(|c: char| c.is_ascii_digit() || c == '-')
            .ok_or_else(|| TranslateError::UnknownSpelling(s.to_string()))?;
        let (suffix, octave_text) = rest.split_at(digits_start);

        let accidental = Accidental::from_stream_suffix(suffix)
            .ok_or_else(|| TranslateError::UnknownSpelling(s.to_string()))?;
        let octave: i32 = octave_text
            .parse()
            .map_err(|_| TranslateError::UnknownSpelling(s.to_string()))?;

        Pitch::new(letter, accidental, octave)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.letter,
            self.accidental.stream_suffix(),
            self.octave
        )
    }
}

/// Undotted note values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BaseDuration {
    Whole,
    Half,
    #[default]
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
    SixtyFourth,
}

impl BaseDuration {
    pub const ALL: [BaseDuration; 7] = [
        BaseDuration::Whole,
        BaseDuration::Half,
        BaseDuration::Quarter,
        BaseDuration::Eighth,
        BaseDuration::Sixteenth,
        BaseDuration::ThirtySecond,
        BaseDuration::SixtyFourth,
    ];

    /// The number written in notation (whole = 1, quarter = 4, ...)
    pub fn denominator(self) -> u32 {
        match self {
            BaseDuration::Whole => 1,
            BaseDuration::Half => 2,
            BaseDuration::Quarter => 4,
            BaseDuration::Eighth => 8,
            BaseDuration::Sixteenth => 16,
            BaseDuration::ThirtySecond => 32,
            BaseDuration::SixtyFourth => 64,
        }
    }

    pub fn from_denominator(denominator: u32) -> Option<BaseDuration> {
        Self::ALL
            .into_iter()
            .find(|base| base.denominator() == denominator)
    }

    pub fn ticks(self) -> u32 {
        TICKS_PER_WHOLE / self.denominator()
    }
}

/// A single written value: a base duration plus zero, one or two dots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NoteValue {
    pub base: BaseDuration,
    pub dots: u8,
}

impl NoteValue {
    pub const fn new(base: BaseDuration, dots: u8) -> Self {
        Self { base, dots }
    }

    pub const fn plain(base: BaseDuration) -> Self {
        Self { base, dots: 0 }
    }

    pub const fn dotted(base: BaseDuration) -> Self {
        Self { base, dots: 1 }
    }
}

/// How long an entry of the stream lasts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Duration {
    /// A sounding value, optionally tied to further values (in order)
    Note { value: NoteValue, tied: Vec<NoteValue> },
    /// A silent value
    Rest { value: NoteValue },
    /// One member of a 3:2 triplet group
    TripletMember { base: BaseDuration },
}

impl Duration {
    pub fn note(base: BaseDuration) -> Self {
        Duration::Note {
            value: NoteValue::plain(base),
            tied: Vec::new(),
        }
    }

    pub fn dotted_note(base: BaseDuration) -> Self {
        Duration::Note {
            value: NoteValue::dotted(base),
            tied: Vec::new(),
        }
    }

    /// A tied sum; `values` must not be empty
    pub fn tied(value: NoteValue, tail: impl IntoIterator<Item = NoteValue>) -> Self {
        Duration::Note {
            value,
            tied: tail.into_iter().collect(),
        }
    }

    pub fn rest(base: BaseDuration) -> Self {
        Duration::Rest {
            value: NoteValue::plain(base),
        }
    }

    pub fn dotted_rest(base: BaseDuration) -> Self {
        Duration::Rest {
            value: NoteValue::dotted(base),
        }
    }

    pub fn triplet(base: BaseDuration) -> Self {
        Duration::TripletMember { base }
    }

    pub fn is_triplet(&self) -> bool {
        matches!(self, Duration::TripletMember { .. })
    }

    pub fn is_tied(&self) -> bool {
        matches!(self, Duration::Note { tied, .. } if !tied.is_empty())
    }

    /// Metric weight in ticks, as declared by the duration table
    pub fn weight(&self) -> Result<u32, TranslateError> {
        duration_weight(self)
    }
}

/// One entry of a voice
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NoteEvent {
    Note { pitch: Pitch, duration: Duration },
    Chord { pitches: Vec<Pitch>, duration: Duration },
    Rest { duration: Duration },
}

impl NoteEvent {
    pub fn note(pitch: Pitch, duration: Duration) -> Self {
        NoteEvent::Note { pitch, duration }
    }

    pub fn chord(pitches: Vec<Pitch>, duration: Duration) -> Self {
        NoteEvent::Chord { pitches, duration }
    }

    pub fn rest(duration: Duration) -> Self {
        NoteEvent::Rest { duration }
    }

    pub fn duration(&self) -> &Duration {
        match self {
            NoteEvent::Note { duration, .. }
            | NoteEvent::Chord { duration, .. }
            | NoteEvent::Rest { duration } => duration,
        }
    }

    /// Pitches sounded by this event, in written order (empty for rests)
    pub fn pitches(&self) -> &[Pitch] {
        match self {
            NoteEvent::Note { pitch, .. } => std::slice::from_ref(pitch),
            NoteEvent::Chord { pitches, .. } => pitches,
            NoteEvent::Rest { .. } => &[],
        }
    }

    pub fn is_rest(&self) -> bool {
        matches!(self, NoteEvent::Rest { .. })
    }

    pub fn weight(&self) -> Result<u32, TranslateError> {
        self.duration().weight()
    }
}

/// Time signature (e.g., 4/4, 3/4, 6/8)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    pub beats: u32,
    pub beat_unit: u32,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            beats: 4,
            beat_unit: 4,
        }
    }
}

impl TimeSignature {
    /// Returns `None` unless `beats > 0`, the beat unit is a written note value and
    /// the measure weight fits in a `u32`
    pub fn new(beats: u32, beat_unit: u32) -> Option<Self> {
        let unit = BaseDuration::from_denominator(beat_unit)?;
        if beats == 0 {
            return None;
        }
        beats.checked_mul(unit.ticks())?;
        Some(Self { beats, beat_unit })
    }

    /// Metric weight of one full measure
    pub fn measure_weight(&self) -> Result<u32, TranslateError> {
        BaseDuration::from_denominator(self.beat_unit)
            .and_then(|unit| self.beats.checked_mul(unit.ticks()))
            .ok_or_else(|| TranslateError::UnknownDuration(format!("measure of {}", self)))
    }
}

impl FromStr for TimeSignature {
    type Err = TranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            TranslateError::InvalidDocument(format!(
                "time-signature must be in format N/D: {}",
                s
            ))
        };
        let (beats, unit) = s.trim().split_once('/').ok_or_else(invalid)?;
        let beats = beats.trim().parse().map_err(|_| invalid())?;
        let unit = unit.trim().parse().map_err(|_| invalid())?;
        TimeSignature::new(beats, unit).ok_or_else(invalid)
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats, self.beat_unit)
    }
}

/// A partial measure in front of the first full measure
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pickup {
    pub length: NoteValue,
    pub events: Vec<NoteEvent>,
}

/// One voice of music: the unit of translation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Voice {
    pub events: Vec<NoteEvent>,
    pub time_signature: TimeSignature,
    pub pickup: Option<Pickup>,
    /// Maps 1-based measure number to a literal barline token such as `\bar "||"`
    pub barlines: BTreeMap<u32, String>,
}

impl Voice {
    pub fn new(events: Vec<NoteEvent>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    pub fn with_time_signature(mut self, time_signature: TimeSignature) -> Self {
        self.time_signature = time_signature;
        self
    }

    pub fn with_barline(mut self, measure: u32, token: impl Into<String>) -> Self {
        self.barlines.insert(measure, token.into());
        self
    }

    /// Move the front of the stream into a pickup measure of the given length.
    pub fn with_pickup(mut self, length: NoteValue) -> Result<Self, TranslateError> {
        let target = value_weight(length)?;
        let events = std::mem::take(&mut self.events);
        let (pickup, rest) = extract_pickup(events, target)?;
        self.events = rest;
        self.pickup = Some(Pickup {
            length,
            events: pickup,
        });
        Ok(self)
    }

    /// Every pitch in stream order, pickup first
    pub fn pitches(&self) -> impl Iterator<Item = &Pitch> {
        self.pickup
            .iter()
            .flat_map(|p| p.events.iter())
            .chain(self.events.iter())
            .flat_map(|e| e.pitches().iter())
    }
}

/// Positions flagged by a grader: pitch errors index pitched events, duration errors
/// index all events. Both count pickup events first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorMarks {
    pub pitches: Vec<usize>,
    pub durations: Vec<usize>,
}

/// Key signature read from a `\key` directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySignature {
    pub tonic: Letter,
    pub accidental: Accidental,
    pub mode: String, // major, minor, dorian, ...
}

/// Tempo read from a `\tempo` directive: `\tempo "Allegro" 4 = 120`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tempo {
    pub text: Option<String>,
    pub beat: Option<NoteValue>,
    pub bpm: Option<u32>,
}

/// Result of decoding one voice of notation text
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedVoice {
    pub events: Vec<NoteEvent>,
    pub relative: bool,
    pub key: Option<KeySignature>,
    pub tempo: Option<Tempo>,
    pub time_signature: Option<TimeSignature>,
    pub pickup: Option<NoteValue>,
    /// Contents of `%{ ... %}` blocks, kept as opaque metadata
    pub comments: Vec<String>,
}

impl DecodedVoice {
    /// Build a voice from the decoded stream, carving out the declared pickup.
    pub fn into_voice(self) -> Result<Voice, TranslateError> {
        let voice = Voice::new(self.events).with_time_signature(self.time_signature.unwrap_or_default());
        match self.pickup {
            Some(length) => voice.with_pickup(length),
            None => Ok(voice),
        }
    }
}
