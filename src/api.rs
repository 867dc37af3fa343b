//! # Public API
//!
//! Entry points for translating between voices and LilyPond text.
//!
//! ## Encoding
//!
//! - [`encode()`] - Relative-octave notation with default settings
//! - [`encode_with_options()`] - Octave mode, final barline and highlight colours
//! - [`encode_with_errors()`] - Colour the entries a grader flagged
//! - [`encode_document()`] - Encode a YAML voice document
//!
//! ## Decoding
//!
//! - [`decode()`] - Notation text to events and extracted directives
//! - [`decode_voice()`] - Notation text to a [`Voice`] with its pickup carved out
//! - [`decode_document()`] - Notation text to a YAML voice document
//!
//! ## Typical Usage
//!
//! ```rust
//! use lilyvoice::{encode, BaseDuration, Duration, NoteEvent, Pitch, Voice};
//!
//! let voice = Voice::new(vec![
//!     NoteEvent::note("C4".parse()?, Duration::note(BaseDuration::Quarter)),
//!     NoteEvent::note("D4".parse()?, Duration::note(BaseDuration::Quarter)),
//!     NoteEvent::note("E4".parse()?, Duration::note(BaseDuration::Half)),
//! ]);
//!
//! let ly = encode(&voice)?;
//! assert!(ly.contains("c4 d e2"));
//! # Ok::<(), lilyvoice::TranslateError>(())
//! ```
//!
//! ## Documents
//!
//! ```rust
//! use lilyvoice::encode_document;
//!
//! let yaml = r#"
//! time-signature: 3/4
//! notes: [C4, E4, G4]
//! durations: [4n, 4n, 4n]
//! "#;
//!
//! let ly = encode_document(yaml)?;
//! assert!(ly.starts_with("\\relative c' {"));
//! # Ok::<(), lilyvoice::TranslateError>(())
//! ```

use crate::document::VoiceDocument;
use crate::lilypond::to_lilypond;
use crate::{parse, DecodedVoice, EncodeOptions, ErrorMarks, TranslateError, Voice};

/// Encode a voice in relative-octave mode with a final `\bar "|."`.
///
/// # Errors
/// Returns [`TranslateError`] if a duration has no notation or a pitch leaves the
/// supported octave range.
pub fn encode(voice: &Voice) -> Result<String, TranslateError> {
    to_lilypond(voice, &EncodeOptions::default(), None)
}

/// Encode with custom settings.
///
/// # Example
/// ```rust
/// use lilyvoice::{encode_with_options, BaseDuration, Duration, EncodeOptions, NoteEvent, OctaveMode, Voice};
///
/// let voice = Voice::new(vec![NoteEvent::note("C5".parse()?, Duration::note(BaseDuration::Whole))]);
/// let options = EncodeOptions {
///     octave_mode: OctaveMode::Absolute,
///     final_barline: None,
///     ..EncodeOptions::default()
/// };
/// assert_eq!(encode_with_options(&voice, &options)?, "{\n  c''1\n}\n");
/// # Ok::<(), lilyvoice::TranslateError>(())
/// ```
pub fn encode_with_options(voice: &Voice, options: &EncodeOptions) -> Result<String, TranslateError> {
    to_lilypond(voice, options, None)
}

/// Encode with the flagged pitches and durations coloured.
///
/// Pitch indices count pitched entries; duration indices count all entries.
pub fn encode_with_errors(
    voice: &Voice,
    options: &EncodeOptions,
    marks: &ErrorMarks,
) -> Result<String, TranslateError> {
    to_lilypond(voice, options, Some(marks))
}

/// Encode a YAML voice document.
///
/// # Errors
/// Returns [`TranslateError::InvalidDocument`] for malformed YAML, plus any error
/// from reading the streams or encoding.
pub fn encode_document(yaml: &str) -> Result<String, TranslateError> {
    let job = VoiceDocument::from_yaml(yaml)?.into_job()?;
    to_lilypond(&job.voice, &job.options, job.marks.as_ref())
}

/// Decode notation text into its entries and directives.
///
/// # Example
/// ```rust
/// use lilyvoice::decode;
///
/// let decoded = decode(r"\relative c' { c4 d e f }")?;
/// assert_eq!(decoded.events.len(), 4);
/// assert_eq!(decoded.events[3].pitches()[0].to_string(), "F4");
/// # Ok::<(), lilyvoice::TranslateError>(())
/// ```
pub fn decode(source: &str) -> Result<DecodedVoice, TranslateError> {
    parse(source)
}

/// Decode notation text into a voice, applying `\time` and `\partial`.
pub fn decode_voice(source: &str) -> Result<Voice, TranslateError> {
    parse(source)?.into_voice()
}

/// Decode notation text into a YAML voice document.
pub fn decode_document(source: &str) -> Result<String, TranslateError> {
    VoiceDocument::from_decoded(&parse(source)?)?.to_yaml()
}
