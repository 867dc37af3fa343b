//! Integration tests for the lilyvoice translator
//!
//! Tests the full pipeline in both directions through the public API.

use lilyvoice::{
    decode, decode_document, decode_voice, encode, encode_document, encode_with_errors,
    encode_with_options, split_progression, BaseDuration, Duration, EncodeOptions, ErrorMarks,
    NoteEvent, NoteValue, OctaveMode, Pitch, TimeSignature, TranslateError, Voice,
    VoiceDocument,
};

fn pitch(s: &str) -> Pitch {
    s.parse().unwrap()
}

fn note(s: &str, duration: Duration) -> NoteEvent {
    NoteEvent::note(pitch(s), duration)
}

fn quarter() -> Duration {
    Duration::note(BaseDuration::Quarter)
}

#[test]
fn test_ascending_second_and_explicit_change() {
    let voice = Voice::new(vec![
        note("C4", quarter()),
        note("D4", quarter()),
        note("E4", Duration::note(BaseDuration::Half)),
    ]);
    let ly = encode(&voice).unwrap();
    assert!(ly.contains("c4 d e2"), "unexpected output: {}", ly);
}

#[test]
fn test_rests_emit_every_token() {
    let voice = Voice::new(vec![
        NoteEvent::rest(Duration::rest(BaseDuration::Quarter)),
        NoteEvent::rest(Duration::rest(BaseDuration::Quarter)),
    ]);
    let ly = encode(&voice).unwrap();
    assert!(ly.contains("r4 r4"));
}

#[test]
fn test_elision_law() {
    let voice = Voice::new(vec![note("C4", quarter()), note("G4", quarter())]);
    let ly = encode(&voice).unwrap();
    assert_eq!(ly.matches('4').count(), 1, "one token across the pair: {}", ly);

    let voice = Voice::new(vec![
        note("C4", quarter()),
        NoteEvent::rest(Duration::rest(BaseDuration::Quarter)),
    ]);
    let ly = encode(&voice).unwrap();
    assert!(ly.contains("c4 r4"));
}

#[test]
fn test_triplet_group_round_trip() {
    let voice = Voice::new(vec![
        note("C4", Duration::triplet(BaseDuration::Eighth)),
        note("D4", Duration::triplet(BaseDuration::Eighth)),
        note("E4", Duration::triplet(BaseDuration::Eighth)),
    ]);
    let ly = encode(&voice).unwrap();
    assert_eq!(ly.matches("\\tuplet").count(), 1);
    assert!(ly.contains("\\tuplet 3/2 { c8 d e }"));

    let decoded = decode(&ly).unwrap();
    assert_eq!(decoded.events, voice.events);
}

#[test]
fn test_chord_law() {
    let chord = vec![pitch("C4"), pitch("E4"), pitch("G4")];
    let voice = Voice::new(vec![
        note("C4", quarter()),
        NoteEvent::chord(chord.clone(), quarter()),
    ]);
    let ly = encode(&voice).unwrap();
    assert!(ly.contains("c4 <c e g>"));
    let decoded = decode(&ly).unwrap();
    assert_eq!(decoded.events[1].pitches(), chord.as_slice());
}

#[test]
fn test_pickup_law() {
    // 8n + 8n = one quarter pickup; the main stream starts at the third entry.
    // The anchor is C3 and G lies a fourth below it, so the first note carries a mark.
    let eighth = Duration::note(BaseDuration::Eighth);
    let voice = Voice::new(vec![
        note("G3", eighth.clone()),
        note("A3", eighth.clone()),
        note("B3", Duration::note(BaseDuration::Whole)),
        note("C4", Duration::note(BaseDuration::Whole)),
    ])
    .with_pickup(NoteValue::plain(BaseDuration::Quarter))
    .unwrap();

    let pickup = voice.pickup.as_ref().unwrap();
    assert_eq!(pickup.events.len(), 2);
    assert_eq!(voice.events[0].pitches()[0], pitch("B3"));

    let ly = encode(&voice).unwrap();
    assert!(ly.contains("\\partial 4 g'8 a"), "unexpected output: {}", ly);
}

#[test]
fn test_pickup_resumes_after_rest() {
    let voice = Voice::new(vec![
        NoteEvent::rest(Duration::rest(BaseDuration::Eighth)),
        note("G3", Duration::note(BaseDuration::Eighth)),
        note("C4", Duration::note(BaseDuration::Whole)),
    ])
    .with_pickup(NoteValue::plain(BaseDuration::Quarter))
    .unwrap();
    assert_eq!(voice.pickup.unwrap().events.len(), 2);
    assert_eq!(voice.events, vec![note("C4", Duration::note(BaseDuration::Whole))]);
}

#[test]
fn test_barline_overrides() {
    let voice = Voice::new(vec![
        note("C4", Duration::note(BaseDuration::Half)),
        note("D4", Duration::note(BaseDuration::Half)),
        note("E4", Duration::note(BaseDuration::Whole)),
    ])
    .with_barline(1, "\\bar \"||\"");
    let ly = encode(&voice).unwrap();
    let lines: Vec<&str> = ly.lines().map(str::trim).collect();
    assert_eq!(lines[1], "c2 d \\bar \"||\"");
    assert_eq!(lines[2], "e1");
    assert_eq!(lines[3], "\\bar \"|.\"");
}

#[test]
fn test_final_barline_options() {
    let voice = Voice::new(vec![note("C4", Duration::note(BaseDuration::Whole))]);
    let options = EncodeOptions {
        final_barline: Some("\\bar \"||\"".to_string()),
        ..EncodeOptions::default()
    };
    assert!(encode_with_options(&voice, &options).unwrap().contains("\\bar \"||\"\n}"));

    let options = EncodeOptions {
        final_barline: None,
        ..EncodeOptions::default()
    };
    assert_eq!(
        encode_with_options(&voice, &options).unwrap(),
        "\\relative c' {\n  c1\n}\n"
    );
}

#[test]
fn test_error_marks_survive_decoding() {
    let voice = Voice::new(vec![
        note("C4", quarter()),
        note("D4", quarter()),
        NoteEvent::rest(Duration::rest(BaseDuration::Quarter)),
        note("F4", quarter()),
    ]);
    let marks = ErrorMarks {
        pitches: vec![1],
        durations: vec![2],
    };
    let ly = encode_with_errors(&voice, &EncodeOptions::default(), &marks).unwrap();
    assert!(ly.contains("\\override NoteHead.color = #red"));
    assert!(ly.contains("\\override Staff.Rest.color = #red"));
    assert!(ly.contains("#black"));

    let decoded = decode(&ly).unwrap();
    assert_eq!(decoded.events, voice.events);
}

#[test]
fn test_custom_highlight_color() {
    let voice = Voice::new(vec![note("C4", quarter()), note("D4", quarter())]);
    let options = EncodeOptions {
        highlight_color: "blue".to_string(),
        reset_color: "darkgrey".to_string(),
        ..EncodeOptions::default()
    };
    let marks = ErrorMarks {
        pitches: vec![0],
        durations: vec![],
    };
    let ly = encode_with_errors(&voice, &options, &marks).unwrap();
    assert!(ly.contains("\\override NoteHead.color = #blue"));
    assert!(ly.contains("\\override NoteHead.color = #darkgrey"));
    assert!(!ly.contains("#red"));
}

#[test]
fn test_absolute_mode() {
    let voice = Voice::new(vec![
        note("C4", quarter()),
        note("G2", quarter()),
        note("A5", Duration::note(BaseDuration::Half)),
    ]);
    let options = EncodeOptions {
        octave_mode: OctaveMode::Absolute,
        ..EncodeOptions::default()
    };
    let ly = encode_with_options(&voice, &options).unwrap();
    assert!(ly.starts_with("{\n  c'4 g, a''2\n"), "unexpected output: {}", ly);

    let decoded = decode(&ly).unwrap();
    assert!(!decoded.relative);
    assert_eq!(decoded.events, voice.events);
}

#[test]
fn test_decode_directives() {
    let source = r#"
%{ Exercise 12 %}
\key d \major
\time 3/4
\tempo "Moderato" 4 = 96
\partial 4
\relative c' {
  a4 | d2 fis4 | a2. \bar "|."
}
"#;
    let decoded = decode(source).unwrap();
    assert_eq!(decoded.comments, vec!["Exercise 12".to_string()]);
    assert_eq!(decoded.time_signature, TimeSignature::new(3, 4));
    assert_eq!(decoded.tempo.as_ref().and_then(|t| t.bpm), Some(96));
    assert_eq!(decoded.pickup, Some(NoteValue::plain(BaseDuration::Quarter)));

    let voice = decode_voice(source).unwrap();
    let pickup = voice.pickup.as_ref().unwrap();
    assert_eq!(pickup.events, vec![note("A3", quarter())]);
    assert_eq!(
        voice.events,
        vec![
            note("D4", Duration::note(BaseDuration::Half)),
            note("F#4", quarter()),
            note("A4", Duration::dotted_note(BaseDuration::Half)),
        ]
    );
}

#[test]
fn test_decode_errors() {
    assert!(matches!(
        decode(r"\relative c' { c4 <e g"),
        Err(TranslateError::MalformedChord { .. })
    ));
    assert!(matches!(
        decode(r"\relative c' { \tuplet 3/2 { c8 d e"),
        Err(TranslateError::MalformedTuplet { .. })
    ));
    assert!(matches!(
        decode(r"\relative c' { c4 h }"),
        Err(TranslateError::UnknownSpelling(_))
    ));
    assert!(matches!(
        decode(r"\relative c' { c4 d7 }"),
        Err(TranslateError::UnknownToken(_))
    ));
    assert!(matches!(
        decode(r"\relative c' { c2~ d2 }"),
        Err(TranslateError::InvalidPitchContext(_))
    ));
    assert!(matches!(
        decode(r"\relative c' { c4~"),
        Err(TranslateError::UnexpectedEndOfInput { .. })
    ));
}

#[test]
fn test_encode_errors() {
    let voice = Voice::new(vec![note(
        "C4",
        Duration::Note {
            value: NoteValue::new(BaseDuration::SixtyFourth, 1),
            tied: Vec::new(),
        },
    )]);
    assert!(matches!(encode(&voice), Err(TranslateError::UnknownDuration(_))));
}

#[test]
fn test_chord_progression_split() {
    let chords = vec![
        vec![pitch("C3"), pitch("E4"), pitch("G4")],
        vec![pitch("G2"), pitch("D4")],
    ];
    let parts = split_progression(&chords, NoteValue::plain(BaseDuration::Half)).unwrap();
    assert_eq!(parts.bass.events.len(), 2);
    assert_eq!(parts.bass.events[0].pitches(), &[pitch("C3")]);
    assert_eq!(parts.treble.events[0].pitches(), &[pitch("E4"), pitch("G4")]);
    assert_eq!(parts.treble.events[1].pitches(), &[pitch("D4")]);

    let bass = encode(&parts.bass).unwrap();
    assert!(bass.starts_with("\\relative c {"), "unexpected output: {}", bass);
}

#[test]
fn test_encode_document() {
    let yaml = r#"
time-signature: 2/4
notes: [C4, D4, [E4, G4], F4]
durations: [4n, 4n, 4r, 2n, 4n]
barlines:
  2: '\bar "||"'
options:
  final-barline: ''
"#;
    let ly = encode_document(yaml).unwrap();
    assert_eq!(
        ly,
        "\\relative c' {\n  c4 d\n  r4 <e g>2 \\bar \"||\"\n  f4\n}\n"
    );
}

#[test]
fn test_invalid_document() {
    assert!(matches!(
        encode_document("durations: {"),
        Err(TranslateError::InvalidDocument(_))
    ));
    assert!(matches!(
        encode_document("time-signature: 5/0\n"),
        Err(TranslateError::InvalidDocument(_))
    ));
}

#[test]
fn test_document_round_trip() {
    let source = r"\time 3/4 \partial 4 \relative c' { g4 | c2 r4 | <c e g>2. }";
    let yaml = decode_document(source).unwrap();
    let document: VoiceDocument = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(document.time_signature.as_deref(), Some("3/4"));
    assert_eq!(document.durations, vec!["4n", "2n", "4r", "d2n"]);

    let ly = encode_document(&yaml).unwrap();
    let original = decode_voice(source).unwrap();
    let restored = decode_voice(&ly).unwrap();
    assert_eq!(restored.events, original.events);
    assert_eq!(restored.pickup, original.pickup);
}

#[test]
fn test_oversized_time_signature_is_rejected() {
    assert!(matches!(
        encode_document("time-signature: 50000000/4\nnotes: [C4]\ndurations: [4n]\n"),
        Err(TranslateError::InvalidDocument(_))
    ));
    assert!(matches!(
        decode_voice(r"\time 50000000/4 \relative c' { c4 }"),
        Err(TranslateError::UnknownToken(_))
    ));
}

#[test]
fn test_pickup_over_triplet_group() {
    let triplet = |p: &str| note(p, Duration::triplet(BaseDuration::Eighth));
    let voice = Voice::new(vec![
        triplet("G3"),
        triplet("A3"),
        triplet("B3"),
        note("C4", Duration::note(BaseDuration::Whole)),
        note("D4", quarter()),
    ])
    .with_pickup(NoteValue::plain(BaseDuration::Eighth))
    .unwrap();
    assert_eq!(voice.pickup.as_ref().unwrap().events.len(), 3);
    assert_eq!(voice.events[0].pitches()[0], pitch("C4"));

    let ly = encode(&voice).unwrap();
    assert!(ly.contains("\\partial 8 \\tuplet 3/2 {"), "unexpected output: {}", ly);

    let restored = decode_voice(&ly).unwrap();
    assert_eq!(restored.pickup, voice.pickup);
    assert_eq!(restored.events, voice.events);
}
