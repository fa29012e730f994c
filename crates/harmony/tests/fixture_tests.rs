//! Fixture-based tests for the full analysis pipeline.
//!
//! Each .json file in tests/fixtures/ is a transcribed lick with its chord
//! chart, in the same format the CLI reads.

use std::fs;
use std::path::Path;

use harmony::{
    analyze, build_pack, transpose, AnalysisParams, BarSpan, KeyMode, Lick, PackRequest,
    PatternKind, PitchClass, Tension, ToneRole,
};
use pretty_assertions::assert_eq;

fn load_fixture(name: &str) -> Lick {
    let fixture_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(format!("{}.json", name));

    let content = fs::read_to_string(&fixture_path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", name, e));

    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Fixture {} did not load: {}", name, e))
}

#[test]
fn test_fixture_two_five_one_in_c() {
    let lick = load_fixture("two_five_one_c");
    let analysis = analyze(&lick.selection(), &AnalysisParams::default());

    assert_eq!(analysis.function_label, "ii-V-I");
    assert_eq!(analysis.key_center, Some(PitchClass::C));
    assert_eq!(analysis.key_mode, Some(KeyMode::Major));
    assert_eq!(analysis.bar_span, Some(BarSpan::new(1, 3)));
    assert_eq!(
        analysis.patterns[0].chords,
        vec!["Dm7".to_string(), "G7(b9,b13)".to_string(), "Cmaj7".to_string()]
    );

    let target = analysis.resolution.expect("resolution target");
    assert_eq!(target.note_index, 8);
    assert_eq!(target.note.midi, 64);
    assert_eq!(target.role, ToneRole::Third);
    assert_eq!(target.score, 8);

    assert_eq!(
        analysis.tensions_used.into_iter().collect::<Vec<_>>(),
        vec![Tension::FlatNine, Tension::Nine, Tension::FlatThirteen]
    );
    assert_eq!(analysis.coverage.chord_tone_notes, 6);
    assert_eq!(analysis.coverage.guide_tone_notes, 5);
    assert_eq!(analysis.coverage.tension_notes, 4);
    assert_eq!(analysis.coverage.other_notes, 0);
    assert_eq!(analysis.chord_tone_coverage, 0.6);
    assert_eq!(analysis.guide_tone_coverage, 0.5);
}

#[test]
fn test_fixture_minor_cadence() {
    let lick = load_fixture("minor_cadence_a");
    let analysis = analyze(&lick.selection(), &AnalysisParams::default());

    assert_eq!(analysis.patterns.len(), 1);
    assert_eq!(analysis.patterns[0].kind, PatternKind::MinorTwoFiveOne);
    assert_eq!(analysis.function_label, "iiø-V-i");
    assert_eq!(analysis.key_center, Some(PitchClass::A));
    assert_eq!(analysis.key_mode, Some(KeyMode::Minor));
    assert_eq!(analysis.key_label.as_deref(), Some("Am"));
    assert_eq!(
        analysis.patterns[0].key_center.relative_major(),
        PitchClass::C
    );

    let target = analysis.resolution.expect("resolution target");
    assert_eq!(target.note_index, 9);
    assert_eq!(analysis.resolution_role, ToneRole::Third);

    assert_eq!(
        analysis.tensions_used.into_iter().collect::<Vec<_>>(),
        vec![Tension::FlatNine, Tension::Nine, Tension::SharpEleven]
    );
    assert_eq!(analysis.coverage.chord_tone_notes, 7);
    assert_eq!(analysis.coverage.guide_tone_notes, 5);
}

#[test]
fn test_fixture_vamp_has_no_cadence() {
    let lick = load_fixture("vamp_f");
    let analysis = analyze(&lick.selection(), &AnalysisParams::default());

    assert_eq!(analysis.patterns.len(), 1);
    assert_eq!(analysis.patterns[0].kind, PatternKind::ResolutionOnly);
    // differing extensions keep the bars as separate segments
    assert_eq!(analysis.patterns[0].bars, BarSpan::single(2));
    assert_eq!(analysis.key_label.as_deref(), Some("F"));

    let target = analysis.resolution.expect("resolution target");
    assert_eq!(target.note_index, 3);
    assert_eq!(target.role, ToneRole::Fifth);
}

#[test]
fn test_fixture_analysis_is_bit_identical() {
    for name in ["two_five_one_c", "minor_cadence_a", "vamp_f"] {
        let lick = load_fixture(name);
        let params = AnalysisParams::default();
        let first = serde_json::to_string(&analyze(&lick.selection(), &params)).unwrap();
        let second = serde_json::to_string(&analyze(&lick.selection(), &params)).unwrap();
        assert_eq!(first, second, "fixture {}", name);
    }
}

#[test]
fn test_fixture_transposed_analysis_moves_key() {
    let lick = load_fixture("two_five_one_c");
    let moved = transpose(&lick.selection(), 3).unwrap();
    let analysis = analyze(&moved.as_selection(), &AnalysisParams::default());

    assert_eq!(analysis.function_label, "ii-V-I");
    assert_eq!(analysis.key_label.as_deref(), Some("Eb"));
    assert_eq!(analysis.resolution.map(|r| r.note_index), Some(8));
    assert_eq!(analysis.resolution_role, ToneRole::Third);
}

#[test]
fn test_fixture_practice_pack() {
    let lick = load_fixture("two_five_one_c");
    let pack = build_pack(&lick.selection(), &PackRequest::default()).unwrap();

    assert_eq!(pack.source_key, "C");
    assert_eq!(pack.keys.len(), 12);
    assert!(pack.failures.is_empty());

    let f_sharp = pack.keys.iter().find(|k| k.key == "F#").unwrap();
    assert_eq!(f_sharp.interval_semitones, 6);
    assert_eq!(f_sharp.file_name, "Fsharp.json");
    assert_eq!(f_sharp.chords[0].symbol, "G#m7");
    assert_eq!(f_sharp.notes[8].name, "A#4");

    let d_flat = pack.keys.iter().find(|k| k.key == "Db").unwrap();
    assert_eq!(d_flat.chords[1].symbol, "Ab7(b9,b13)");
    assert_eq!(d_flat.notes[8].name, "F4");
}
