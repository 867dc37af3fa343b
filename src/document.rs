//! # Voice Documents
//!
//! YAML form of a voice: two parallel streams (pitch spellings and duration codes)
//! plus the voice settings. Keys are kebab-case:
//!
//! ```yaml
//! time-signature: 3/4
//! pickup: 4n
//! notes: [G3, C4, [C4, E4, G4], D4]
//! durations: [4n, 2n, 4n, 4r, 2n + 4n]
//! barlines:
//!   2: '\bar "||"'
//! errors:
//!   pitches: [1]
//!   durations: []
//! options:
//!   octave-mode: relative
//!   final-barline: '\bar "|."'
//!   highlight-color: red
//!   reset-color: black
//! ```
//!
//! Each non-rest duration code consumes the next entry of `notes`; a list entry is a
//! chord. The decode direction adds `key`, `tempo` and `comments`.

use crate::error::TranslateError;
use crate::lilypond::{EncodeOptions, OctaveMode};
use crate::tables::duration::{format_code, parse_code, StreamCode};
use crate::types::{
    DecodedVoice, Duration, ErrorMarks, NoteEvent, NoteValue, Pitch, TimeSignature,
    Voice,
};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of the pitch stream: a single spelling or a chord
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum NoteEntry {
    Single(String),
    Chord(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawErrors {
    #[serde(default)]
    pub pitches: Vec<usize>,
    #[serde(default)]
    pub durations: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RawOctaveMode {
    Relative,
    Absolute,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub octave_mode: Option<RawOctaveMode>,
    /// Empty string disables the final barline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_barline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawKey {
    pub tonic: String, // stream spelling without octave: Bb, F#
    pub mode: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RawTempo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beat: Option<String>, // duration code: 4n, d4n
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<u32>,
}

/// Raw voice document for YAML (de)serialization
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct VoiceDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pickup: Option<String>,
    #[serde(default)]
    pub notes: Vec<NoteEntry>,
    #[serde(default)]
    pub durations: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub barlines: BTreeMap<u32, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<RawErrors>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<RawOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<RawKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<RawTempo>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
}

/// Everything the encoder needs, read from a document
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeJob {
    pub voice: Voice,
    pub options: EncodeOptions,
    pub marks: Option<ErrorMarks>,
}

impl VoiceDocument {
    pub fn from_yaml(yaml: &str) -> Result<Self, TranslateError> {
        serde_yaml::from_str(yaml).map_err(|e| TranslateError::InvalidDocument(e.to_string()))
    }

    pub fn to_yaml(&self) -> Result<String, TranslateError> {
        serde_yaml::to_string(self).map_err(|e| TranslateError::InvalidDocument(e.to_string()))
    }

    /// Convert the raw document into a voice and encoder settings
    pub fn into_job(self) -> Result<EncodeJob, TranslateError> {
        let time_signature = match &self.time_signature {
            Some(ts) => ts.parse()?,
            None => TimeSignature::default(),
        };

        let notes = self
            .notes
            .iter()
            .map(parse_entry)
            .collect::<Result<Vec<_>, _>>()?;
        let codes = self
            .durations
            .iter()
            .map(|code| parse_code(code))
            .collect::<Result<Vec<_>, _>>()?;

        let mut voice = Voice::from_streams(notes, codes).with_time_signature(time_signature);
        voice.barlines = self.barlines;
        if let Some(pickup) = &self.pickup {
            voice = voice.with_pickup(parse_pickup(pickup)?)?;
        }

        let raw = self.options.unwrap_or_default();
        let defaults = EncodeOptions::default();
        let options = EncodeOptions {
            octave_mode: match raw.octave_mode {
                Some(RawOctaveMode::Absolute) => OctaveMode::Absolute,
                _ => OctaveMode::Relative,
            },
            final_barline: match raw.final_barline {
                Some(barline) if barline.trim().is_empty() => None,
                Some(barline) => Some(barline),
                None => defaults.final_barline,
            },
            highlight_color: raw.highlight_color.unwrap_or(defaults.highlight_color),
            reset_color: raw.reset_color.unwrap_or(defaults.reset_color),
        };

        let marks = self.errors.map(|e| ErrorMarks {
            pitches: e.pitches,
            durations: e.durations,
        });

        Ok(EncodeJob {
            voice,
            options,
            marks,
        })
    }

    /// Document for a decoded voice: its streams plus the extracted directives
    pub fn from_decoded(decoded: &DecodedVoice) -> Result<Self, TranslateError> {
        let mut notes = Vec::new();
        let mut durations = Vec::with_capacity(decoded.events.len());

        for event in &decoded.events {
            match event {
                NoteEvent::Note { pitch, .. } => notes.push(NoteEntry::Single(pitch.to_string())),
                NoteEvent::Chord { pitches, .. } => notes.push(NoteEntry::Chord(
                    pitches.iter().map(|p| p.to_string()).collect(),
                )),
                NoteEvent::Rest { .. } => {}
            }
            durations.push(format_code(event.duration(), event.is_rest())?);
        }

        let pickup = decoded
            .pickup
            .map(|value| format_code(&Duration::Note { value, tied: Vec::new() }, false))
            .transpose()?;

        let tempo = decoded
            .tempo
            .as_ref()
            .map(|tempo| -> Result<RawTempo, TranslateError> {
                Ok(RawTempo {
                    text: tempo.text.clone(),
                    beat: tempo
                        .beat
                        .map(|value| format_code(&Duration::Note { value, tied: Vec::new() }, false))
                        .transpose()?,
                    bpm: tempo.bpm,
                })
            })
            .transpose()?;

        Ok(Self {
            time_signature: decoded.time_signature.map(|ts| ts.to_string()),
            pickup,
            notes,
            durations,
            options: Some(RawOptions {
                octave_mode: Some(if decoded.relative {
                    RawOctaveMode::Relative
                } else {
                    RawOctaveMode::Absolute
                }),
                ..RawOptions::default()
            }),
            key: decoded.key.as_ref().map(|key| RawKey {
                tonic: format!("{}{}", key.tonic, key.accidental.stream_suffix()),
                mode: key.mode.clone(),
            }),
            tempo,
            comments: decoded.comments.clone(),
            ..Self::default()
        })
    }
}

fn parse_entry(entry: &NoteEntry) -> Result<Vec<Pitch>, TranslateError> {
    match entry {
        NoteEntry::Single(spelling) => Ok(vec![spelling.parse()?]),
        NoteEntry::Chord(spellings) if spellings.is_empty() => Err(TranslateError::InvalidDocument(
            "empty chord in notes".to_string(),
        )),
        NoteEntry::Chord(spellings) => spellings.iter().map(|s| s.parse()).collect(),
    }
}

fn parse_pickup(code: &str) -> Result<NoteValue, TranslateError> {
    match parse_code(code)?.duration {
        Duration::Note { value, tied } if tied.is_empty() => Ok(value),
        _ => Err(TranslateError::InvalidDocument(format!(
            "pickup must be a single note value: {}",
            code
        ))),
    }
}

impl Voice {
    /// Build a voice from parallel pitch and duration streams.
    ///
    /// Every non-rest code takes the next pitch entry. When the pitches run out,
    /// the remaining sounding entries are dropped; inside a triplet run the rest of
    /// the run goes with them.
    pub fn from_streams(notes: Vec<Vec<Pitch>>, codes: Vec<StreamCode>) -> Voice {
        let mut pitches = notes.into_iter();
        let mut events = Vec::with_capacity(codes.len());
        let mut dropping_run = false;

        for (index, code) in codes.into_iter().enumerate() {
            let triplet = code.duration.is_triplet();
            if !triplet {
                dropping_run = false;
            } else if dropping_run {
                continue;
            }

            if code.silent {
                events.push(NoteEvent::rest(code.duration));
                continue;
            }

            match pitches.next() {
                Some(mut tones) if tones.len() == 1 => {
                    events.push(NoteEvent::note(tones.remove(0), code.duration));
                }
                Some(tones) => events.push(NoteEvent::chord(tones, code.duration)),
                None => {
                    warn!("pitch stream exhausted at duration entry {}; entry dropped", index);
                    dropping_run = triplet;
                }
            }
        }

        let unused = pitches.count();
        if unused > 0 {
            warn!("{} pitch entries have no duration and were ignored", unused);
        }
        Voice::new(events)
    }
}

impl std::fmt::Display for RawOctaveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawOctaveMode::Relative => write!(f, "relative"),
            RawOctaveMode::Absolute => write!(f, "absolute"),
        }
    }
}
