//! # Parser Module
//!
//! Rebuilds the note/duration stream from the tokens of one voice of notation text.
//!
//! ## State Machine
//! ```text
//!              \relative \partial \tempo \time \key %{ %}
//!   Scanning ────────────────────────────────────────────▶ InDirective(kind)
//!      │  ▲                                                      │
//!      │  └──────────────── arguments consumed ◀─────────────────┘
//!      │
//!      ├── '<' ──▶ InChord  ── '>' ──▶ Scanning
//!      └── \tuplet 3/2 '{' ──▶ InTuplet ── '}' ──▶ Scanning
//! ```
//!
//! Every pitch goes through the `RelativeOctaveContext` of the pass, every unmarked
//! duration inherits from the `RunningDuration`, and ties are folded by a `TieJoiner`.
//! Barline commands, clefs, colour overrides, bar checks and plain braces are read
//! and discarded.
//!
//! ## Entry Point
//! `parse(source: &str) -> Result<DecodedVoice, TranslateError>`
//!
//! ## Example
//! ```rust
//! use lilyvoice::parse;
//!
//! let voice = parse(r"\relative c' { \time 3/4 c4 d e2. }").unwrap();
//! assert_eq!(voice.events.len(), 3);
//! assert_eq!(voice.time_signature.map(|t| t.beats), Some(3));
//! ```

mod directive;

use crate::codec::chord::read_chord;
use crate::codec::elision::RunningDuration;
use crate::codec::tie::{Spelling, TieJoiner};
use crate::codec::triplet::{check_ratio, tag_member};
use crate::codec::WrittenPitch;
use crate::error::TranslateError;
use crate::lexer::{Lexer, LocatedToken, Token};
use crate::octave::RelativeOctaveContext;
use crate::tables::duration::parse_value;
use crate::tables::pitch::{marks_to_delta, unspell};
use crate::types::{DecodedVoice, Duration, NoteEvent, NoteValue, Pitch};
use log::{debug, trace};

/// Directive kinds that take arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    RelativeAnchor,
    PickupDeclaration,
    Tempo,
    TimeSignature,
    KeySignature,
    CommentBlock,
    Barline,
    Clef,
    Override,
}

/// Where the parser is within the voice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    Scanning,
    InTuplet,
    InChord,
    InDirective(DirectiveKind),
}

/// Parser for one voice of notation text
pub struct Parser {
    tokens: Vec<LocatedToken>,
    position: usize,
    state: ParseState,
    ctx: RelativeOctaveContext,
    running: RunningDuration,
    voice: DecodedVoice,
}

impl Parser {
    pub fn new(tokens: Vec<LocatedToken>) -> Self {
        Self {
            tokens,
            position: 0,
            state: ParseState::Scanning,
            ctx: RelativeOctaveContext::absolute(),
            running: RunningDuration::default(),
            voice: DecodedVoice::default(),
        }
    }

    fn current(&self) -> Option<&LocatedToken> {
        self.tokens.get(self.position)
    }

    fn peek_token(&self) -> Option<&Token> {
        self.current().map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<LocatedToken> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn enter(&mut self, state: ParseState) {
        trace!("{:?} -> {:?}", self.state, state);
        self.state = state;
    }

    /// Take the next token or fail with what the current state still needs
    fn expect_token(&mut self, expected: &str) -> Result<LocatedToken, TranslateError> {
        self.advance().ok_or_else(|| TranslateError::UnexpectedEndOfInput {
            expected: expected.to_string(),
        })
    }

    pub fn parse_voice(mut self) -> Result<DecodedVoice, TranslateError> {
        while let Some(located) = self.current().cloned() {
            match &located.token {
                Token::Command(name) if name == "tuplet" => {
                    self.advance();
                    let members = self.parse_tuplet(&located)?;
                    self.voice.events.extend(members);
                }
                Token::Command(name) => {
                    self.advance();
                    self.parse_directive(name, &located)?;
                }
                Token::BlockComment(text) => {
                    self.enter(ParseState::InDirective(DirectiveKind::CommentBlock));
                    self.advance();
                    self.voice.comments.push(text.clone());
                    self.enter(ParseState::Scanning);
                }
                Token::GroupOpen | Token::GroupClose | Token::BarCheck => {
                    self.advance();
                }
                Token::Word(_) | Token::ChordOpen => {
                    let event = self.parse_entry()?;
                    self.voice.events.push(event);
                }
                other => {
                    return Err(TranslateError::UnknownToken(format!(
                        "{} at line {}, column {}",
                        describe(other),
                        located.line,
                        located.column
                    )));
                }
            }
        }

        debug!(
            "decoded {} entries ({} comment blocks)",
            self.voice.events.len(),
            self.voice.comments.len()
        );
        Ok(self.voice)
    }

    /// `{ m1 m2 m3 ... }` after `\tuplet 3/2`
    fn parse_tuplet(&mut self, start: &LocatedToken) -> Result<Vec<NoteEvent>, TranslateError> {
        let malformed = |line: usize, column: usize, message: &str| TranslateError::MalformedTuplet {
            line,
            column,
            message: message.to_string(),
        };

        let ratio = self
            .parse_fraction("tuplet ratio")
            .map_err(|e| malformed(start.line, start.column, &e.to_string()))?;
        check_ratio(&ratio, start.line, start.column)?;

        match self.advance() {
            Some(LocatedToken {
                token: Token::GroupOpen,
                ..
            }) => {}
            _ => return Err(malformed(start.line, start.column, "expected '{' after the ratio")),
        }

        self.enter(ParseState::InTuplet);
        let mut members = Vec::new();
        loop {
            let Some(located) = self.current().cloned() else {
                return Err(malformed(start.line, start.column, "unterminated tuplet group"));
            };
            match &located.token {
                Token::GroupClose => {
                    self.advance();
                    break;
                }
                Token::GroupOpen => {
                    return Err(malformed(located.line, located.column, "nested braces in a tuplet group"));
                }
                Token::Command(name) if name == "tuplet" => {
                    return Err(malformed(located.line, located.column, "nested tuplet groups are not supported"));
                }
                Token::Command(name) if name == "override" => {
                    self.advance();
                    self.parse_directive(name, &located)?;
                    self.enter(ParseState::InTuplet);
                }
                Token::BarCheck => {
                    self.advance();
                }
                Token::Word(_) | Token::ChordOpen => {
                    let event = self.parse_entry()?;
                    members.push(tag_triplet(event).map_err(|message| {
                        malformed(located.line, located.column, &message)
                    })?);
                }
                other => {
                    return Err(malformed(
                        located.line,
                        located.column,
                        &format!("{} inside a tuplet group", describe(other)),
                    ));
                }
            }
        }

        if members.is_empty() {
            return Err(malformed(start.line, start.column, "empty tuplet group"));
        }
        self.enter(ParseState::Scanning);
        Ok(members)
    }

    /// `n/d` as text
    fn parse_fraction(&mut self, what: &str) -> Result<String, TranslateError> {
        let numerator = self.expect_number(what)?;
        match self.expect_token(what)?.token {
            Token::Slash => {}
            other => {
                return Err(TranslateError::UnknownToken(format!(
                    "{} in {}",
                    describe(&other),
                    what
                )))
            }
        }
        let denominator = self.expect_number(what)?;
        Ok(format!("{}/{}", numerator, denominator))
    }

    fn expect_number(&mut self, what: &str) -> Result<String, TranslateError> {
        match self.expect_token(what)?.token {
            Token::Number(n) => Ok(n),
            other => Err(TranslateError::UnknownToken(format!(
                "{} in {}",
                describe(&other),
                what
            ))),
        }
    }

    /// Optional duration token after a pitch, chord or rest
    fn parse_written_value(&mut self) -> Result<Option<NoteValue>, TranslateError> {
        match self.peek_token() {
            Some(Token::Number(n)) => {
                let value = parse_value(n)?;
                self.advance();
                Ok(Some(value))
            }
            _ => Ok(None),
        }
    }

    /// Pitch word plus optional marks
    fn parse_written_pitch(&mut self, word: &str) -> Result<WrittenPitch, TranslateError> {
        let (letter, accidental) = unspell(word)?;
        let delta = match self.peek_token() {
            Some(Token::Marks(marks)) => {
                let delta = marks_to_delta(marks)?;
                self.advance();
                delta
            }
            _ => 0,
        };
        Ok(WrittenPitch {
            letter,
            accidental,
            delta,
        })
    }

    /// One note, chord or rest including its tie continuations
    fn parse_entry(&mut self) -> Result<NoteEvent, TranslateError> {
        let located = self.expect_token("a note, chord or rest")?;
        match located.token {
            Token::Word(word) if word == "r" => {
                let written_value = self.parse_written_value()?;
                let value = self.running.observe(written_value);
                if let Some(Token::Tie) = self.peek_token() {
                    return Err(TranslateError::UnknownToken(format!(
                        "'~' after a rest at line {}, column {}",
                        located.line, located.column
                    )));
                }
                Ok(NoteEvent::rest(Duration::Rest { value }))
            }
            Token::Word(word) => {
                let written = self.parse_written_pitch(&word)?;
                let pitch = self
                    .ctx
                    .resolve_next(written.letter, written.accidental, written.delta)?;
                let written_value = self.parse_written_value()?;
                let value = self.running.observe(written_value);
                let (_, duration) = self.parse_ties(TieJoiner::start(vec![pitch], value))?;
                Ok(NoteEvent::note(pitch, duration))
            }
            Token::ChordOpen => {
                let tones = self.parse_chord_tones(located.line, located.column)?;
                let pitches = read_chord(&tones, &mut self.ctx)?;
                let written_value = self.parse_written_value()?;
                let value = self.running.observe(written_value);
                let (pitches, duration) = self.parse_ties(TieJoiner::start(pitches, value))?;
                Ok(NoteEvent::chord(pitches, duration))
            }
            other => Err(TranslateError::UnknownToken(format!(
                "{} at line {}, column {}",
                describe(&other),
                located.line,
                located.column
            ))),
        }
    }

    /// Tones between `<` and `>`; the `<` is already consumed
    fn parse_chord_tones(&mut self, line: usize, column: usize) -> Result<Vec<WrittenPitch>, TranslateError> {
        let previous = self.state;
        self.enter(ParseState::InChord);

        let mut tones = Vec::new();
        loop {
            let Some(located) = self.advance() else {
                return Err(TranslateError::MalformedChord {
                    line,
                    column,
                    message: "unterminated chord".to_string(),
                });
            };
            match located.token {
                Token::ChordClose => break,
                Token::Word(word) if word != "r" => {
                    let tone = self.parse_written_pitch(&word).map_err(|e| match e {
                        TranslateError::UnknownSpelling(_) => TranslateError::MalformedChord {
                            line: located.line,
                            column: located.column,
                            message: format!("'{}' is not a pitch", word),
                        },
                        other => other,
                    })?;
                    tones.push(tone);
                }
                other => {
                    return Err(TranslateError::MalformedChord {
                        line: located.line,
                        column: located.column,
                        message: format!("{} inside a chord", describe(&other)),
                    });
                }
            }
        }

        if tones.is_empty() {
            return Err(TranslateError::MalformedChord {
                line,
                column,
                message: "empty chord".to_string(),
            });
        }
        self.enter(previous);
        Ok(tones)
    }

    /// Fold `~ pitch value` continuations into the joiner
    fn parse_ties(&mut self, mut joiner: TieJoiner) -> Result<(Vec<Pitch>, Duration), TranslateError> {
        while let Some(Token::Tie) = self.peek_token() {
            self.advance();
            let located = self.expect_token("the tied note")?;
            let spelling: Vec<Spelling> = match located.token {
                Token::Word(word) if word != "r" => {
                    let written = self.parse_written_pitch(&word)?;
                    vec![(written.letter, written.accidental)]
                }
                Token::ChordOpen => self
                    .parse_chord_tones(located.line, located.column)?
                    .iter()
                    .map(|tone| (tone.letter, tone.accidental))
                    .collect(),
                other => {
                    return Err(TranslateError::InvalidPitchContext(format!(
                        "tie at line {}, column {} continues into {}",
                        located.line,
                        located.column,
                        describe(&other)
                    )))
                }
            };
            let written_value = self.parse_written_value()?;
            let value = self.running.observe(written_value);
            joiner.join(&spelling, value)?;
        }
        Ok(joiner.finish())
    }
}

fn tag_triplet(event: NoteEvent) -> Result<NoteEvent, String> {
    Ok(match event {
        NoteEvent::Note { pitch, duration } => NoteEvent::note(pitch, tag_member(duration)?),
        NoteEvent::Chord { pitches, duration } => NoteEvent::chord(pitches, tag_member(duration)?),
        NoteEvent::Rest { duration } => NoteEvent::rest(tag_member(duration)?),
    })
}

/// Short description of a token for error messages
fn describe(token: &Token) -> String {
    match token {
        Token::Command(name) => format!("'\\{}'", name),
        Token::Word(word) => format!("'{}'", word),
        Token::Marks(marks) => format!("'{}'", marks),
        Token::Number(n) => format!("'{}'", n),
        Token::Text(text) => format!("\"{}\"", text),
        Token::Scheme(value) => format!("'#{}'", value),
        Token::BlockComment(_) => "comment block".to_string(),
        Token::Slash => "'/'".to_string(),
        Token::Tie => "'~'".to_string(),
        Token::Equals => "'='".to_string(),
        Token::ChordOpen => "'<'".to_string(),
        Token::ChordClose => "'>'".to_string(),
        Token::GroupOpen => "'{'".to_string(),
        Token::GroupClose => "'}'".to_string(),
        Token::BarCheck => "'|'".to_string(),
    }
}

/// Decode one voice of notation text
pub fn parse(source: &str) -> Result<DecodedVoice, TranslateError> {
    let mut lexer = Lexer::new(source);
    let tokens = lexer.tokenize()?;
    Parser::new(tokens).parse_voice()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BaseDuration;

    fn pitch(s: &str) -> Pitch {
        s.parse().unwrap()
    }

    #[test]
    fn test_relative_melody() {
        let voice = parse(r"\relative c' { c4 d e2 }").unwrap();
        assert_eq!(
            voice.events,
            vec![
                NoteEvent::note(pitch("C4"), Duration::note(BaseDuration::Quarter)),
                NoteEvent::note(pitch("D4"), Duration::note(BaseDuration::Quarter)),
                NoteEvent::note(pitch("E4"), Duration::note(BaseDuration::Half)),
            ]
        );
    }

    #[test]
    fn test_unmarked_duration_inherits_from_rest() {
        let voice = parse(r"\relative c' { c8 r4 d }").unwrap();
        assert_eq!(voice.events[1], NoteEvent::rest(Duration::rest(BaseDuration::Quarter)));
        assert_eq!(*voice.events[2].duration(), Duration::note(BaseDuration::Quarter));
    }

    #[test]
    fn test_first_duration_defaults_to_quarter() {
        let voice = parse("{ c' }").unwrap();
        assert!(!voice.relative);
        assert_eq!(
            voice.events,
            vec![NoteEvent::note(pitch("C4"), Duration::note(BaseDuration::Quarter))]
        );
    }

    #[test]
    fn test_ties() {
        let voice = parse(r"\relative c' { g'2~ g8 <c, e>4~ <c e> }").unwrap();
        assert_eq!(voice.events.len(), 2);
        assert_eq!(voice.events[0].pitches(), &[pitch("G4")]);
        assert_eq!(
            *voice.events[0].duration(),
            Duration::tied(
                NoteValue::plain(BaseDuration::Half),
                [NoteValue::plain(BaseDuration::Eighth)]
            )
        );
        assert_eq!(voice.events[1].pitches(), &[pitch("C4"), pitch("E4")]);
        assert!(voice.events[1].duration().is_tied());
    }

    #[test]
    fn test_tie_to_other_pitch_fails() {
        assert!(matches!(
            parse(r"\relative c' { c2~ d2 }"),
            Err(TranslateError::InvalidPitchContext(_))
        ));
        assert!(matches!(
            parse(r"\relative c' { c2~"),
            Err(TranslateError::UnexpectedEndOfInput { .. })
        ));
    }

    #[test]
    fn test_chord_octaves_are_cumulative() {
        let voice = parse(r"\relative c' { <c e g c>2 e }").unwrap();
        assert_eq!(
            voice.events[0].pitches(),
            &[pitch("C4"), pitch("E4"), pitch("G4"), pitch("C5")]
        );
        // the last tone of the chord is the reference for what follows
        assert_eq!(voice.events[1].pitches(), &[pitch("E5")]);
    }

    #[test]
    fn test_malformed_chords() {
        assert!(matches!(
            parse(r"\relative c' { c4 <e g"),
            Err(TranslateError::MalformedChord { line: 1, column: 19, .. })
        ));
        assert!(matches!(parse("{ <>4 }"), Err(TranslateError::MalformedChord { .. })));
        assert!(matches!(parse("{ <c r>4 }"), Err(TranslateError::MalformedChord { .. })));
        assert!(matches!(parse("{ <c xyz>4 }"), Err(TranslateError::MalformedChord { .. })));
    }

    #[test]
    fn test_tuplet_members() {
        let voice = parse(r"\relative c' { \tuplet 3/2 { c8 d r } e4 }").unwrap();
        assert_eq!(voice.events.len(), 4);
        assert_eq!(*voice.events[0].duration(), Duration::triplet(BaseDuration::Eighth));
        assert_eq!(*voice.events[1].duration(), Duration::triplet(BaseDuration::Eighth));
        assert!(voice.events[2].is_rest());
        assert_eq!(*voice.events[2].duration(), Duration::triplet(BaseDuration::Eighth));
        assert_eq!(*voice.events[3].duration(), Duration::note(BaseDuration::Quarter));
    }

    #[test]
    fn test_malformed_tuplets() {
        for source in [
            r"{ \tuplet 5/4 { c8 d e f g } }",
            r"{ \tuplet 3/2 c8 d e }",
            r"{ \tuplet 3/2 { c8 d e",
            r"{ \tuplet 3/2 { c8. d16 e8 } }",
            r"{ \tuplet 3/2 { c8~ c d } }",
            r"{ \tuplet 3/2 { { c8 d e } } }",
            r"{ \tuplet 3/2 { } }",
        ] {
            assert!(
                matches!(parse(source), Err(TranslateError::MalformedTuplet { .. })),
                "{} should be a malformed tuplet",
                source
            );
        }
    }

    #[test]
    fn test_comment_blocks_are_kept() {
        let voice = parse("%{ first %} { c4 %{ second %} d }").unwrap();
        assert_eq!(voice.comments, vec!["first".to_string(), "second".to_string()]);
        assert_eq!(voice.events.len(), 2);
    }

    #[test]
    fn test_unknown_words() {
        assert!(matches!(parse("{ h4 }"), Err(TranslateError::UnknownSpelling(_))));
        assert!(matches!(parse("{ c4 = }"), Err(TranslateError::UnknownToken(_))));
        assert!(matches!(parse("{ r4~ r4 }"), Err(TranslateError::UnknownToken(_))));
        assert!(matches!(parse("{ c3 }"), Err(TranslateError::UnknownToken(_))));
    }
}
