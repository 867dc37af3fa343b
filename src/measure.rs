//! # Measure Tracker
//!
//! Accumulates metric weight entry by entry to find measure boundaries, so the
//! encoder can splice barline overrides after the entry that completes a measure.
//!
//! Measures are numbered from 1. The pickup is not a measure: the tracker only
//! sees the main stream, and measure 1 is the first full measure.
//!
//! Also carves a pickup off the front of a stream (`extract_pickup`).

use crate::codec::triplet::GROUP_SIZE;
use crate::error::TranslateError;
use crate::types::{NoteEvent, TimeSignature};
use log::{debug, warn};

#[derive(Debug, Clone)]
pub struct MeasureTracker {
    measure_weight: u32,
    accumulated: u32,
    completed: u32,
}

impl MeasureTracker {
    pub fn new(time_signature: TimeSignature) -> Result<Self, TranslateError> {
        Ok(Self {
            measure_weight: time_signature.measure_weight()?,
            accumulated: 0,
            completed: 0,
        })
    }

    /// Add one entry's weight and return the measures it completed.
    ///
    /// An entry that runs past the barline completes the measure it crosses; the
    /// overshoot counts toward the next measure.
    pub fn advance(&mut self, weight: u32) -> Vec<u32> {
        let mut completed = Vec::new();
        if self.measure_weight == 0 {
            return completed;
        }
        self.accumulated = self.accumulated.saturating_add(weight);
        while self.accumulated >= self.measure_weight {
            self.accumulated -= self.measure_weight;
            self.completed += 1;
            completed.push(self.completed);
        }
        completed
    }
}

/// Split the front of a stream into a pickup of `target_weight`.
///
/// Entries are consumed until their total reaches or exceeds the target. The
/// remainder always starts right after the last consumed entry, whether that entry
/// was a note, a chord or a rest. A triplet group is taken or left whole, grouped
/// the same way the encoder groups runs.
pub fn extract_pickup(
    events: Vec<NoteEvent>,
    target_weight: u32,
) -> Result<(Vec<NoteEvent>, Vec<NoteEvent>), TranslateError> {
    let mut total = 0;
    let mut consumed = 0;

    while consumed < events.len() && total < target_weight {
        let unit = if events[consumed].duration().is_triplet() {
            events[consumed..]
                .iter()
                .take(GROUP_SIZE)
                .take_while(|e| e.duration().is_triplet())
                .count()
        } else {
            1
        };
        for event in &events[consumed..consumed + unit] {
            total += event.weight()?;
        }
        consumed += unit;
    }

    if total < target_weight {
        warn!(
            "stream of weight {} is shorter than the pickup weight {}",
            total, target_weight
        );
    } else if total > target_weight {
        debug!(
            "pickup entries sum to {}, past the declared {}",
            total, target_weight
        );
    }

    let mut pickup = events;
    let rest = pickup.split_off(consumed);
    Ok((pickup, rest))
}
