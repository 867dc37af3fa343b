//! # Notation Encoder
//!
//! Writes a `Voice` as one voice of relative-octave notation text:
//!
//! ```text
//! \relative c' {
//!   \partial 4 g4
//!   c d e2
//!   <c e g>1 \bar "||"
//!   \tuplet 3/2 { c8 d e } f2.
//!   \bar "|."
//! }
//! ```
//!
//! One line is written per measure. Every pitch goes through the octave context,
//! every duration token through the elision tracker, and every entry of the main
//! stream through the measure tracker so barline overrides land after the entry
//! that completes their measure.

use crate::annotate::{Annotator, DEFAULT_HIGHLIGHT_COLOR, DEFAULT_RESET_COLOR};
use crate::codec::chord::write_chord;
use crate::codec::elision::DurationTracker;
use crate::codec::tie::segments;
use crate::codec::triplet::{group_runs, Segment, TUPLET_RATIO};
use crate::codec::write_pitch;
use crate::error::TranslateError;
use crate::measure::MeasureTracker;
use crate::octave::RelativeOctaveContext;
use crate::tables::duration::value_token;
use crate::tables::pitch::{absolute_marks, spell};
use crate::types::{ErrorMarks, Letter, NoteEvent, Pitch, Voice};
use log::{debug, trace};
use std::collections::BTreeMap;

/// Barline written at the end of the voice unless configured otherwise
pub const DEFAULT_FINAL_BARLINE: &str = "\\bar \"|.\"";

/// How octaves are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OctaveMode {
    /// `\relative` block, marks only where the nearest position is wrong
    #[default]
    Relative,
    /// Every pitch carries its absolute marks (`c` = C3)
    Absolute,
}

/// Encoder settings
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeOptions {
    pub octave_mode: OctaveMode,
    /// Token written before the closing brace; `None` writes nothing
    pub final_barline: Option<String>,
    pub highlight_color: String,
    pub reset_color: String,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            octave_mode: OctaveMode::Relative,
            final_barline: Some(DEFAULT_FINAL_BARLINE.to_string()),
            highlight_color: DEFAULT_HIGHLIGHT_COLOR.to_string(),
            reset_color: DEFAULT_RESET_COLOR.to_string(),
        }
    }
}

/// Encode a voice, optionally colouring the entries flagged in `marks`.
pub fn to_lilypond(
    voice: &Voice,
    options: &EncodeOptions,
    marks: Option<&ErrorMarks>,
) -> Result<String, TranslateError> {
    debug!(
        "encoding voice: {} entries, pickup {}, time {}",
        voice.events.len(),
        voice.pickup.as_ref().map_or(0, |p| p.events.len()),
        voice.time_signature
    );

    let mut ly = String::new();
    let ctx = match options.octave_mode {
        OctaveMode::Relative => {
            let anchor = relative_anchor(voice)?;
            ly.push_str(&format!(
                "\\relative {}{} {{\n",
                spell(anchor.letter, anchor.accidental),
                absolute_marks(anchor.octave)?
            ));
            RelativeOctaveContext::relative(Some(anchor))
        }
        OctaveMode::Absolute => {
            ly.push_str("{\n");
            RelativeOctaveContext::absolute()
        }
    };

    let mut encoder = Encoder {
        ctx,
        tracker: DurationTracker::new(),
        annotator: marks.map(|m| Annotator::new(m, &options.highlight_color, &options.reset_color)),
        barlines: &voice.barlines,
        line: Vec::new(),
        lines: Vec::new(),
    };

    if let Some(pickup) = &voice.pickup {
        encoder.line.push(format!("\\partial {}", value_token(pickup.length)?));
        encoder.write_events(&pickup.events, None)?;
        encoder.end_line();
    }

    let mut measures = MeasureTracker::new(voice.time_signature)?;
    encoder.write_events(&voice.events, Some(&mut measures))?;

    if let Some(annotator) = encoder.annotator.as_mut() {
        let resets = annotator.finish();
        encoder.line.extend(resets);
    }
    encoder.end_line();
    if let Some(barline) = &options.final_barline {
        encoder.line.push(barline.clone());
        encoder.end_line();
    }

    for line in &encoder.lines {
        ly.push_str("  ");
        ly.push_str(line);
        ly.push('\n');
    }
    ly.push_str("}\n");
    Ok(ly)
}

/// C in the octave of the first pitch, or middle C for a voice without pitches
fn relative_anchor(voice: &Voice) -> Result<Pitch, TranslateError> {
    let octave = voice.pitches().next().map_or(4, |p| p.octave);
    Pitch::natural(Letter::C, octave)
}

struct Encoder<'a> {
    ctx: RelativeOctaveContext,
    tracker: DurationTracker,
    annotator: Option<Annotator>,
    barlines: &'a BTreeMap<u32, String>,
    line: Vec<String>,
    lines: Vec<String>,
}

impl<'a> Encoder<'a> {
    fn end_line(&mut self) {
        if !self.line.is_empty() {
            self.lines.push(self.line.join(" "));
            self.line.clear();
        }
    }

    fn annotate(&mut self, event: &NoteEvent) -> Vec<String> {
        self.annotator
            .as_mut()
            .map(|annotator| annotator.before(event))
            .unwrap_or_default()
    }

    fn write_events(
        &mut self,
        events: &[NoteEvent],
        mut measures: Option<&mut MeasureTracker>,
    ) -> Result<(), TranslateError> {
        for segment in group_runs(events) {
            let weight = match segment {
                Segment::Single(event) => {
                    let overrides = self.annotate(event);
                    self.line.extend(overrides);
                    let text = self.write_event(event)?;
                    self.line.push(text);
                    event.weight()?
                }
                Segment::Triplet(members) => {
                    let mut written = Vec::with_capacity(members.len());
                    let mut weight = 0;
                    for member in members {
                        // overrides land inside the group, in front of their member
                        written.extend(self.annotate(member));
                        written.push(self.write_event(member)?);
                        weight += member.weight()?;
                    }
                    self.line.push(format!(
                        "\\tuplet {} {{ {} }}",
                        TUPLET_RATIO,
                        written.join(" ")
                    ));
                    weight
                }
                Segment::Dropped(members) => {
                    if let Some(annotator) = self.annotator.as_mut() {
                        members.iter().for_each(|m| annotator.skip(m));
                    }
                    continue;
                }
            };

            if let Some(measures) = measures.as_deref_mut() {
                let completed = measures.advance(weight);
                for measure in &completed {
                    trace!("measure {} complete", measure);
                    if let Some(barline) = self.barlines.get(measure) {
                        self.line.push(barline.clone());
                    }
                }
                if !completed.is_empty() {
                    self.end_line();
                }
            }
        }
        Ok(())
    }

    /// One entry with its tie segments, e.g. `c2~ c8`, `<c e g>4`, `r4`
    fn write_event(&mut self, event: &NoteEvent) -> Result<String, TranslateError> {
        let values = segments(event.duration());
        let mut parts = Vec::with_capacity(values.len());

        for (index, value) in values.into_iter().enumerate() {
            let token = value_token(value)?;
            let text = match event {
                NoteEvent::Rest { .. } => format!("r{}", self.tracker.rest_token(&token)),
                NoteEvent::Note { pitch, .. } => {
                    let word = if index == 0 {
                        write_pitch(pitch, &mut self.ctx)?
                    } else {
                        spell(pitch.letter, pitch.accidental).to_string()
                    };
                    format!("{}{}", word, self.tracker.note_token(&token).unwrap_or_default())
                }
                NoteEvent::Chord { pitches, .. } => {
                    let chord = if index == 0 {
                        write_chord(pitches, &mut self.ctx)?
                    } else {
                        let words: Vec<&str> = pitches
                            .iter()
                            .map(|p| spell(p.letter, p.accidental))
                            .collect();
                        format!("<{}>", words.join(" "))
                    };
                    format!("{}{}", chord, self.tracker.note_token(&token).unwrap_or_default())
                }
            };
            parts.push(text);
        }

        Ok(parts.join("~ "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BaseDuration, Duration, NoteValue, TimeSignature};

    fn note(pitch: &str, duration: Duration) -> NoteEvent {
        NoteEvent::note(pitch.parse().unwrap(), duration)
    }

    fn body(ly: &str) -> Vec<&str> {
        ly.lines().skip(1).map(str::trim).collect()
    }

    #[test]
    fn test_second_and_elision() {
        let voice = Voice::new(vec![
            note("C4", Duration::note(BaseDuration::Quarter)),
            note("D4", Duration::note(BaseDuration::Quarter)),
            note("E4", Duration::note(BaseDuration::Half)),
        ]);
        let ly = to_lilypond(&voice, &EncodeOptions::default(), None).unwrap();
        assert_eq!(ly, "\\relative c' {\n  c4 d e2\n  \\bar \"|.\"\n}\n");
    }

    #[test]
    fn test_rests_never_elide() {
        let voice = Voice::new(vec![
            NoteEvent::rest(Duration::rest(BaseDuration::Quarter)),
            NoteEvent::rest(Duration::rest(BaseDuration::Quarter)),
        ]);
        let ly = to_lilypond(&voice, &EncodeOptions::default(), None).unwrap();
        assert_eq!(body(&ly)[0], "r4 r4");
    }

    #[test]
    fn test_rest_after_note_keeps_token() {
        let voice = Voice::new(vec![
            note("C4", Duration::note(BaseDuration::Quarter)),
            NoteEvent::rest(Duration::rest(BaseDuration::Quarter)),
            note("D4", Duration::note(BaseDuration::Quarter)),
        ]);
        let ly = to_lilypond(&voice, &EncodeOptions::default(), None).unwrap();
        assert_eq!(body(&ly)[0], "c4 r4 d");
    }

    #[test]
    fn test_triplet_group() {
        let voice = Voice::new(vec![
            note("C4", Duration::triplet(BaseDuration::Eighth)),
            note("D4", Duration::triplet(BaseDuration::Eighth)),
            note("E4", Duration::triplet(BaseDuration::Eighth)),
        ]);
        let ly = to_lilypond(&voice, &EncodeOptions::default(), None).unwrap();
        assert_eq!(body(&ly)[0], "\\tuplet 3/2 { c8 d e }");
    }

    #[test]
    fn test_ties_and_chords() {
        let half = NoteValue::plain(BaseDuration::Half);
        let quarter = NoteValue::plain(BaseDuration::Quarter);
        let voice = Voice::new(vec![
            note("G4", Duration::tied(half, [quarter])),
            NoteEvent::chord(
                vec!["C4".parse().unwrap(), "E4".parse().unwrap(), "G4".parse().unwrap()],
                Duration::tied(quarter, [half]),
            ),
        ]);
        let ly = to_lilypond(&voice, &EncodeOptions::default(), None).unwrap();
        assert!(ly.starts_with("\\relative c' {"));
        assert_eq!(body(&ly)[0], "g'2~ g4 <c, e g>~ <c e g>2");
    }

    #[test]
    fn test_barline_override_after_completed_measure() {
        let voice = Voice::new(vec![
            note("C4", Duration::note(BaseDuration::Half)),
            note("D4", Duration::note(BaseDuration::Half)),
            note("E4", Duration::note(BaseDuration::Whole)),
        ])
        .with_barline(1, "\\bar \"||\"");
        let ly = to_lilypond(&voice, &EncodeOptions::default(), None).unwrap();
        assert_eq!(body(&ly)[..2], ["c2 d \\bar \"||\"", "e1"]);
    }

    #[test]
    fn test_pickup_is_not_a_measure() {
        let voice = Voice::new(vec![
            note("G3", Duration::note(BaseDuration::Quarter)),
            note("C4", Duration::note(BaseDuration::Whole)),
            note("D4", Duration::note(BaseDuration::Whole)),
        ])
        .with_time_signature(TimeSignature::default())
        .with_barline(1, "\\bar \"||\"")
        .with_pickup(NoteValue::plain(BaseDuration::Quarter))
        .unwrap();
        let ly = to_lilypond(&voice, &EncodeOptions::default(), None).unwrap();
        assert!(ly.starts_with("\\relative c {"));
        assert_eq!(body(&ly)[..3], ["\\partial 4 g'4", "c1 \\bar \"||\"", "d"]);
    }

    #[test]
    fn test_absolute_mode() {
        let voice = Voice::new(vec![
            note("C4", Duration::note(BaseDuration::Quarter)),
            note("G2", Duration::note(BaseDuration::Quarter)),
        ]);
        let options = EncodeOptions {
            octave_mode: OctaveMode::Absolute,
            final_barline: None,
            ..EncodeOptions::default()
        };
        let ly = to_lilypond(&voice, &options, None).unwrap();
        assert_eq!(ly, "{\n  c'4 g,\n}\n");
    }

    #[test]
    fn test_error_marks_wrap_run() {
        let voice = Voice::new(vec![
            note("C4", Duration::note(BaseDuration::Quarter)),
            note("D4", Duration::note(BaseDuration::Quarter)),
        ]);
        let marks = ErrorMarks {
            pitches: vec![1],
            durations: vec![],
        };
        let ly = to_lilypond(&voice, &EncodeOptions::default(), Some(&marks)).unwrap();
        assert!(ly.contains("c4 \\override NoteHead.color = #red"));
        assert!(ly.contains("#red d \\override NoteHead.color = #black"));
    }
}
