//! Directive arguments: `\relative`, `\partial`, `\tempo`, `\time`, `\key`, and the
//! engraving-only commands that are read and dropped.

use super::{describe, DirectiveKind, ParseState, Parser};
use crate::error::TranslateError;
use crate::lexer::{LocatedToken, Token};
use crate::octave::RelativeOctaveContext;
use crate::tables::duration::parse_value;
use crate::tables::pitch::{marks_to_absolute, unspell, UNMARKED_OCTAVE};
use crate::types::{KeySignature, Pitch, Tempo, TimeSignature};
use log::debug;

const MODES: [&str; 9] = [
    "major",
    "minor",
    "ionian",
    "dorian",
    "phrygian",
    "lydian",
    "mixolydian",
    "aeolian",
    "locrian",
];

impl Parser {
    pub(super) fn parse_directive(
        &mut self,
        name: &str,
        at: &LocatedToken,
    ) -> Result<(), TranslateError> {
        let kind = match name {
            "relative" => DirectiveKind::RelativeAnchor,
            "partial" => DirectiveKind::PickupDeclaration,
            "tempo" => DirectiveKind::Tempo,
            "time" => DirectiveKind::TimeSignature,
            "key" => DirectiveKind::KeySignature,
            "bar" => DirectiveKind::Barline,
            "clef" => DirectiveKind::Clef,
            "override" => DirectiveKind::Override,
            _ => {
                return Err(TranslateError::UnknownToken(format!(
                    "'\\{}' at line {}, column {}",
                    name, at.line, at.column
                )))
            }
        };

        self.enter(ParseState::InDirective(kind));
        match kind {
            DirectiveKind::RelativeAnchor => self.parse_relative()?,
            DirectiveKind::PickupDeclaration => {
                let length = parse_value(&self.expect_number("pickup length")?)?;
                debug!("pickup of {:?}", length);
                self.voice.pickup = Some(length);
            }
            DirectiveKind::Tempo => self.parse_tempo(at)?,
            DirectiveKind::TimeSignature => {
                let fraction = self.parse_fraction("time signature")?;
                let time_signature = fraction
                    .split_once('/')
                    .and_then(|(n, d)| TimeSignature::new(n.parse().ok()?, d.parse().ok()?))
                    .ok_or_else(|| TranslateError::UnknownToken(format!("\\time {}", fraction)))?;
                self.voice.time_signature = Some(time_signature);
            }
            DirectiveKind::KeySignature => self.parse_key()?,
            DirectiveKind::Barline => match self.expect_token("barline glyph")?.token {
                Token::Text(_) => {}
                other => return Err(unexpected(&other, "\\bar")),
            },
            DirectiveKind::Clef => match self.expect_token("clef name")?.token {
                Token::Text(_) | Token::Word(_) => {}
                other => return Err(unexpected(&other, "\\clef")),
            },
            DirectiveKind::Override => self.parse_override()?,
            DirectiveKind::CommentBlock => {}
        }
        self.enter(ParseState::Scanning);
        Ok(())
    }

    /// `\relative` with an optional anchor pitch. Without one the first pitch is
    /// placed against C in the unmarked octave.
    fn parse_relative(&mut self) -> Result<(), TranslateError> {
        let anchor = match self.peek_token() {
            Some(Token::Word(word)) => {
                let (letter, accidental) = unspell(word)?;
                self.advance();
                let octave = match self.peek_token() {
                    Some(Token::Marks(marks)) => {
                        let octave = marks_to_absolute(marks)?;
                        self.advance();
                        octave
                    }
                    _ => UNMARKED_OCTAVE,
                };
                Some(Pitch::new(letter, accidental, octave)?)
            }
            _ => None,
        };
        debug!("relative mode anchored on {:?}", anchor);
        self.ctx = RelativeOctaveContext::relative(anchor);
        self.voice.relative = true;
        Ok(())
    }

    /// `\tempo "text"`, `\tempo 4 = 120` or `\tempo "text" 4 = 120`
    fn parse_tempo(&mut self, at: &LocatedToken) -> Result<(), TranslateError> {
        let mut tempo = Tempo::default();

        if let Some(Token::Text(text)) = self.peek_token() {
            tempo.text = Some(text.clone());
            self.advance();
        }

        if let Some(Token::Number(beat)) = self.peek_token() {
            let beat = parse_value(beat)?;
            self.advance();
            match self.expect_token("'=' in \\tempo")?.token {
                Token::Equals => {}
                other => return Err(unexpected(&other, "\\tempo")),
            }
            let bpm = self.expect_number("tempo in beats per minute")?;
            let bpm = bpm
                .parse()
                .map_err(|_| TranslateError::UnknownToken(format!("tempo '{}'", bpm)))?;
            tempo.beat = Some(beat);
            tempo.bpm = Some(bpm);
        }

        if tempo.text.is_none() && tempo.beat.is_none() {
            return Err(match self.current() {
                Some(located) => unexpected(&located.token, "\\tempo"),
                None => TranslateError::UnexpectedEndOfInput {
                    expected: format!(
                        "tempo text or value after \\tempo at line {}, column {}",
                        at.line, at.column
                    ),
                },
            });
        }
        self.voice.tempo = Some(tempo);
        Ok(())
    }

    /// `\key pitch \mode`
    fn parse_key(&mut self) -> Result<(), TranslateError> {
        let (tonic, accidental) = match self.expect_token("key tonic")?.token {
            Token::Word(word) => unspell(&word)?,
            other => return Err(unexpected(&other, "\\key")),
        };
        let mode = match self.expect_token("key mode")?.token {
            Token::Command(mode) if MODES.contains(&mode.as_str()) => mode,
            other => return Err(unexpected(&other, "\\key")),
        };
        self.voice.key = Some(KeySignature {
            tonic,
            accidental,
            mode,
        });
        Ok(())
    }

    /// `\override Grob.property = #value`
    fn parse_override(&mut self) -> Result<(), TranslateError> {
        match self.expect_token("overridden property")?.token {
            Token::Word(_) => {}
            other => return Err(unexpected(&other, "\\override")),
        }
        match self.expect_token("'=' in \\override")?.token {
            Token::Equals => {}
            other => return Err(unexpected(&other, "\\override")),
        }
        match self.expect_token("override value")?.token {
            Token::Scheme(_) | Token::Number(_) | Token::Text(_) => Ok(()),
            other => Err(unexpected(&other, "\\override")),
        }
    }
}

fn unexpected(token: &Token, directive: &str) -> TranslateError {
    TranslateError::UnknownToken(format!("{} after {}", describe(token), directive))
}
