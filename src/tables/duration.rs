//! # Duration Table
//!
//! Maps durations between three spellings:
//!
//! | Duration                          | Notation token | Stream code |
//! |-----------------------------------|----------------|-------------|
//! | quarter note                      | `4`            | `4n`        |
//! | dotted quarter note               | `4.`           | `d4n`       |
//! | double-dotted half note           | `2..`          | `dd2n`      |
//! | half tied to quarter              | `2~4`          | `2n + 4n`   |
//! | quarter rest                      | `r4`           | `4r`, `4nr` |
//! | dotted quarter rest               | `r4.`          | `d4r`       |
//! | eighth triplet member             | `8`            | `8t`        |
//! | eighth triplet rest               | `8`            | `8tr`       |
//!
//! A triplet member maps to the same notation token as its plain value: the group
//! bracket carries the triplet-ness. Weights are integer ticks with
//! `TICKS_PER_WHOLE` to the whole note.

use crate::error::TranslateError;
use crate::types::{BaseDuration, Duration, NoteValue};

/// Highest written denominator. A dotted value whose last dot would need a
/// shorter value than this cannot be written.
const SHORTEST_DENOMINATOR: u32 = 64;
const MAX_DOTS: u8 = 2;

/// A decoded stream code: the duration plus whether the entry is silent.
///
/// Only triplet rests need the flag; a `Duration::Rest` is always silent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamCode {
    pub duration: Duration,
    pub silent: bool,
}

fn check_value(value: NoteValue) -> Result<NoteValue, TranslateError> {
    let span = value.base.denominator() << value.dots.min(MAX_DOTS + 1);
    if value.dots > MAX_DOTS || span > SHORTEST_DENOMINATOR {
        return Err(TranslateError::UnknownDuration(format!(
            "{}{}",
            value.base.denominator(),
            ".".repeat(value.dots as usize)
        )));
    }
    Ok(value)
}

/// Weight of one written value in ticks
pub fn value_weight(value: NoteValue) -> Result<u32, TranslateError> {
    let value = check_value(value)?;
    let base = value.base.ticks();
    let mut weight = base;
    let mut dot = base;
    for _ in 0..value.dots {
        dot /= 2;
        weight += dot;
    }
    Ok(weight)
}

/// Weight of a full duration in ticks: tied values are summed, triplet members
/// take two thirds of their base value.
pub fn duration_weight(duration: &Duration) -> Result<u32, TranslateError> {
    match duration {
        Duration::Note { value, tied } => {
            let mut total = value_weight(*value)?;
            for tail in tied {
                total += value_weight(*tail)?;
            }
            Ok(total)
        }
        Duration::Rest { value } => value_weight(*value),
        Duration::TripletMember { base } => Ok(base.ticks() * 2 / 3),
    }
}

/// Notation token for a single value: `4`, `8.`, `2..`
pub fn value_token(value: NoteValue) -> Result<String, TranslateError> {
    let value = check_value(value)?;
    Ok(format!(
        "{}{}",
        value.base.denominator(),
        ".".repeat(value.dots as usize)
    ))
}

/// Parse a single value token such as `4` or `8.`
pub fn parse_value(token: &str) -> Result<NoteValue, TranslateError> {
    let unknown = || TranslateError::UnknownToken(token.to_string());

    let digits_end = token
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(token.len());
    let (digits, dots) = token.split_at(digits_end);

    if digits.is_empty() || dots.chars().any(|c| c != '.') {
        return Err(unknown());
    }
    let denominator: u32 = digits.parse().map_err(|_| unknown())?;
    let base = BaseDuration::from_denominator(denominator).ok_or_else(unknown)?;
    let dots = u8::try_from(dots.len()).map_err(|_| unknown())?;

    check_value(NoteValue::new(base, dots)).map_err(|_| unknown())
}

/// Notation token for a duration: `4`, `4.`, `2~4`, `r4`, triplet base `8`
pub fn to_notation(duration: &Duration) -> Result<String, TranslateError> {
    match duration {
        Duration::Note { value, tied } => {
            let mut token = value_token(*value)?;
            for tail in tied {
                token.push('~');
                token.push_str(&value_token(*tail)?);
            }
            Ok(token)
        }
        Duration::Rest { value } => Ok(format!("r{}", value_token(*value)?)),
        Duration::TripletMember { base } => value_token(NoteValue::plain(*base)),
    }
}

/// Exact inverse of [`to_notation`] for note and rest tokens.
///
/// Triplet members are never produced here; the triplet codec tags them.
pub fn to_internal(token: &str) -> Result<Duration, TranslateError> {
    if let Some(rest) = token.strip_prefix('r') {
        if rest.contains('~') {
            return Err(TranslateError::UnknownToken(token.to_string()));
        }
        return Ok(Duration::Rest {
            value: parse_value(rest)?,
        });
    }

    let mut parts = token.split('~');
    let value = parse_value(parts.next().unwrap_or_default())?;
    let tied = parts.map(parse_value).collect::<Result<Vec<_>, _>>()?;
    Ok(Duration::Note { value, tied })
}

/// Parse a stream duration code: `4n`, `d8n`, `2n + 8n`, `4r`, `8t`, `8tr`
pub fn parse_code(code: &str) -> Result<StreamCode, TranslateError> {
    let unknown = || TranslateError::UnknownDuration(code.to_string());

    let parts: Vec<&str> = code.split('+').map(str::trim).collect();
    if parts.len() > 1 {
        // '+' always ties note values together
        let values = parts
            .iter()
            .map(|part| match parse_code_part(part) {
                Some((value, CodeKind::Note)) => Ok(value),
                _ => Err(unknown()),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let (head, tail) = values.split_first().ok_or_else(unknown)?;
        return Ok(StreamCode {
            duration: Duration::tied(*head, tail.iter().copied()),
            silent: false,
        });
    }

    let (value, kind) = parse_code_part(parts[0]).ok_or_else(unknown)?;
    check_value(value).map_err(|_| unknown())?;
    let code = match kind {
        CodeKind::Note => StreamCode {
            duration: Duration::Note {
                value,
                tied: Vec::new(),
            },
            silent: false,
        },
        CodeKind::Rest => StreamCode {
            duration: Duration::Rest { value },
            silent: true,
        },
        CodeKind::Triplet | CodeKind::TripletRest if value.dots > 0 => return Err(unknown()),
        CodeKind::Triplet => StreamCode {
            duration: Duration::TripletMember { base: value.base },
            silent: false,
        },
        CodeKind::TripletRest => StreamCode {
            duration: Duration::TripletMember { base: value.base },
            silent: true,
        },
    };
    Ok(code)
}

/// Stream code for a duration. `silent` marks a triplet member as a triplet rest.
pub fn format_code(duration: &Duration, silent: bool) -> Result<String, TranslateError> {
    fn part(value: NoteValue, suffix: &str) -> Result<String, TranslateError> {
        let value = check_value(value)?;
        Ok(format!(
            "{}{}{}",
            "d".repeat(value.dots as usize),
            value.base.denominator(),
            suffix
        ))
    }

    match duration {
        Duration::Note { value, tied } => {
            let mut parts = vec![part(*value, "n")?];
            for tail in tied {
                parts.push(part(*tail, "n")?);
            }
            Ok(parts.join(" + "))
        }
        Duration::Rest { value } => part(*value, "r"),
        Duration::TripletMember { base } => {
            part(NoteValue::plain(*base), if silent { "tr" } else { "t" })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum CodeKind {
    Note,
    Rest,
    Triplet,
    TripletRest,
}

fn parse_code_part(part: &str) -> Option<(NoteValue, CodeKind)> {
    let dots = part.chars().take_while(|&c| c == 'd').count();
    let rest = &part[dots..];
    let digits_end = rest.find(|c: char| !c.is_ascii_digit())?;
    let (digits, suffix) = rest.split_at(digits_end);

    let base = BaseDuration::from_denominator(digits.parse().ok()?)?;
    let kind = match suffix {
        "n" => CodeKind::Note,
        "r" | "nr" => CodeKind::Rest,
        "t" => CodeKind::Triplet,
        "tr" => CodeKind::TripletRest,
        _ => return None,
    };
    Some((NoteValue::new(base, u8::try_from(dots).ok()?), kind))
}
