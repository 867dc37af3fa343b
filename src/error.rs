//! # Error Types
//!
//! This module defines all error types for the lilyvoice translator.
//!
//! A translation pass is atomic: the first error aborts the pass and is returned to the
//! caller, who can fix the input and translate again. Structural errors found while
//! decoding notation text carry the line and column of the offending token.
//!
//! ## Error Types
//! - `UnknownDuration` - a stream duration that has no notation token
//! - `UnknownToken` - a notation token (or mark string) the translator cannot read
//! - `UnknownSpelling` - a pitch word or stream spelling outside the pitch table
//! - `OctaveOutOfRange` - an octave outside 0..=8, or a mark string beyond that span
//! - `InvalidPitchContext` - a letter or tie that cannot be resolved against its context
//! - `MalformedChord` / `MalformedTuplet` - bracket structure errors
//! - `UnexpectedEndOfInput` - input ended while a construct was still open
//! - `InvalidDocument` - the YAML voice document could not be read
//!
//! ## Usage
//! ```rust
//! use lilyvoice::{decode, TranslateError};
//!
//! match decode(r"\relative c' { c4 d <e g") {
//!     Ok(voice) => println!("{} events", voice.events.len()),
//!     Err(TranslateError::MalformedChord { line, column, message }) => {
//!         eprintln!("chord at {}:{}: {}", line, column, message);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    /// A duration that the duration table cannot turn into notation.
    ///
    /// # Example
    /// ```
    /// # use lilyvoice::TranslateError;
    /// let err = TranslateError::UnknownDuration("d64n".to_string());
    /// assert_eq!(err.to_string(), "Unknown duration: d64n");
    /// ```
    #[error("Unknown duration: {0}")]
    UnknownDuration(String),

    /// A notation token the translator does not understand.
    #[error("Unknown notation token: {0}")]
    UnknownToken(String),

    /// A pitch spelling that is not in the pitch table.
    #[error("Unknown pitch spelling: {0}")]
    UnknownSpelling(String),

    /// An octave number outside the supported range.
    ///
    /// # Example
    /// ```
    /// # use lilyvoice::TranslateError;
    /// let err = TranslateError::OctaveOutOfRange(9);
    /// assert_eq!(err.to_string(), "Octave 9 is outside the supported range 0..=8");
    /// ```
    #[error("Octave {0} is outside the supported range 0..=8")]
    OctaveOutOfRange(i32),

    /// A pitch that cannot be placed relative to its context.
    #[error("Invalid pitch context: {0}")]
    InvalidPitchContext(String),

    /// A chord bracket that is unterminated, empty, or holds something other than pitches.
    #[error("Malformed chord at line {line}, column {column}: {message}")]
    MalformedChord {
        line: usize,
        column: usize,
        message: String,
    },

    /// A tuplet group that is unterminated, uses an unsupported ratio, or holds
    /// members a triplet cannot carry.
    #[error("Malformed tuplet at line {line}, column {column}: {message}")]
    MalformedTuplet {
        line: usize,
        column: usize,
        message: String,
    },

    /// The notation text ended while a directive, chord, tie or group was open.
    #[error("Unexpected end of input: expected {expected}")]
    UnexpectedEndOfInput { expected: String },

    /// The YAML voice document is invalid.
    ///
    /// # Example
    /// ```
    /// # use lilyvoice::TranslateError;
    /// let err = TranslateError::InvalidDocument("time-signature must be in format N/D".to_string());
    /// assert_eq!(err.to_string(), "Invalid voice document: time-signature must be in format N/D");
    /// ```
    #[error("Invalid voice document: {0}")]
    InvalidDocument(String),
}
