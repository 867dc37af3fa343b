//! Triplet codec.
//!
//! Consecutive `TripletMember` entries are written three at a time as
//! `\tuplet 3/2 { c8 d e }`. Inside the group the members are ordinary notes of their
//! base value; the bracket carries the triplet-ness. A run whose length is not a
//! multiple of three keeps its complete groups and drops the incomplete remainder.

use crate::error::TranslateError;
use crate::types::{BaseDuration, Duration, NoteEvent, NoteValue};
use log::warn;

/// The only tuplet ratio the translator reads or writes
pub const TUPLET_RATIO: &str = "3/2";
pub const GROUP_SIZE: usize = 3;

/// One unit of encoder output
#[derive(Debug, Clone, PartialEq)]
pub enum Segment<'a> {
    Single(&'a NoteEvent),
    Triplet([&'a NoteEvent; GROUP_SIZE]),
    /// Trailing members of a run that do not fill a group; not written
    Dropped(&'a [NoteEvent]),
}

/// Split events into plain entries and complete triplet groups.
pub fn group_runs(events: &[NoteEvent]) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut index = 0;

    while index < events.len() {
        if !events[index].duration().is_triplet() {
            segments.push(Segment::Single(&events[index]));
            index += 1;
            continue;
        }

        let run_end = events[index..]
            .iter()
            .position(|e| !e.duration().is_triplet())
            .map_or(events.len(), |offset| index + offset);
        let run = &events[index..run_end];

        for group in run.chunks_exact(GROUP_SIZE) {
            segments.push(Segment::Triplet([&group[0], &group[1], &group[2]]));
        }
        let dropped = run.len() % GROUP_SIZE;
        if dropped > 0 {
            segments.push(Segment::Dropped(&run[run.len() - dropped..]));
            warn!(
                "dropping {} trailing triplet member(s) of a run of {} starting at entry {}",
                dropped,
                run.len(),
                index
            );
        }
        index = run_end;
    }

    segments
}

/// Tag a plain decoded duration as a triplet member.
///
/// Returns a message for the caller to locate when the value cannot be a member.
pub fn tag_member(duration: Duration) -> Result<Duration, String> {
    let value = match &duration {
        Duration::Note { value, tied } if tied.is_empty() => *value,
        Duration::Rest { value } => *value,
        Duration::Note { .. } => return Err("triplet members cannot be tied".to_string()),
        Duration::TripletMember { .. } => return Err("nested tuplet groups are not supported".to_string()),
    };
    member_base(value).map(Duration::triplet)
}

fn member_base(value: NoteValue) -> Result<BaseDuration, String> {
    if value.dots > 0 {
        return Err("triplet members cannot be dotted".to_string());
    }
    Ok(value.base)
}

/// Check a `\tuplet` ratio token
pub fn check_ratio(ratio: &str, line: usize, column: usize) -> Result<(), TranslateError> {
    if ratio == TUPLET_RATIO {
        Ok(())
    } else {
        Err(TranslateError::MalformedTuplet {
            line,
            column,
            message: format!("unsupported tuplet ratio {}, expected {}", ratio, TUPLET_RATIO),
        })
    }
}
