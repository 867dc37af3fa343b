pub mod annotate;
pub mod api;
pub mod codec;
pub mod document;
pub mod error;
pub mod lexer;
pub mod lilypond;
pub mod measure;
pub mod octave;
pub mod parser;
pub mod tables;
pub mod types;

pub use api::{
    decode, decode_document, decode_voice, encode, encode_document, encode_with_errors,
    encode_with_options,
};
pub use codec::chord::{split_progression, ProgressionParts};
pub use document::VoiceDocument;
pub use error::*;
pub use lilypond::{to_lilypond, EncodeOptions, OctaveMode};
pub use octave::RelativeOctaveContext;
pub use parser::parse;
pub use types::*;
