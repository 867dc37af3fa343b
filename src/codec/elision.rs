//! Duration elision: notes drop a duration token equal to the last one written.
//!
//! Rests always write their token. Every written token, rest tokens included,
//! becomes the new "last" token, so `c4 r4 d` decodes `d` as a quarter.

use crate::types::{BaseDuration, NoteValue};

/// Encode-side state: the last duration token written in this pass
#[derive(Debug, Default)]
pub struct DurationTracker {
    last: Option<String>,
}

impl DurationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The token to write after a note or chord, or `None` when it is elided
    pub fn note_token(&mut self, token: &str) -> Option<String> {
        if self.last.as_deref() == Some(token) {
            return None;
        }
        self.last = Some(token.to_string());
        Some(token.to_string())
    }

    /// The token to write after a rest; never elided
    pub fn rest_token(&mut self, token: &str) -> String {
        self.last = Some(token.to_string());
        token.to_string()
    }
}

/// Decode-side mirror: the value an unmarked note inherits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningDuration {
    current: NoteValue,
}

impl Default for RunningDuration {
    fn default() -> Self {
        Self {
            current: NoteValue::plain(BaseDuration::Quarter),
        }
    }
}

impl RunningDuration {
    /// Apply an optional written value and return the effective one
    pub fn observe(&mut self, written: Option<NoteValue>) -> NoteValue {
        if let Some(value) = written {
            self.current = value;
        }
        self.current
    }

    pub fn current(&self) -> NoteValue {
        self.current
    }
}
