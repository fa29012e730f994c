//! Functional pattern detection over bar-ordered chord events.
//!
//! Chords are first collapsed into harmonic segments (runs of consecutive
//! bars holding the same chord), then windows of three and two segments
//! are matched against the canonical cadence shapes.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chord::{Chord, ChordQuality};
use crate::events::{chords_by_bar, BarSpan, ChordEvent};
use crate::pitch::{PitchClass, Spelling};

/// Root motion of a fourth up / fifth down.
const FOURTH_UP: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    MajorTwoFiveOne,
    MinorTwoFiveOne,
    FiveOne,
    TwoFive,
    /// No canonical shape matched; the terminal chord stands alone.
    ResolutionOnly,
}

impl PatternKind {
    pub fn label(&self) -> &'static str {
        match self {
            PatternKind::MajorTwoFiveOne => "ii-V-I",
            PatternKind::MinorTwoFiveOne => "iiø-V-i",
            PatternKind::FiveOne => "V-I",
            PatternKind::TwoFive => "ii-V",
            PatternKind::ResolutionOnly => "resolution only",
        }
    }

    /// Number of harmonic segments the shape spans.
    pub fn chord_count(&self) -> usize {
        match self {
            PatternKind::MajorTwoFiveOne | PatternKind::MinorTwoFiveOne => 3,
            PatternKind::FiveOne | PatternKind::TwoFive => 2,
            PatternKind::ResolutionOnly => 1,
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMode {
    Major,
    Minor,
}

impl fmt::Display for KeyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMode::Major => write!(f, "major"),
            KeyMode::Minor => write!(f, "minor"),
        }
    }
}

/// Local key implied by a cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCenter {
    pub tonic: PitchClass,
    pub mode: KeyMode,
}

impl KeyCenter {
    pub fn major(tonic: PitchClass) -> Self {
        KeyCenter {
            tonic,
            mode: KeyMode::Major,
        }
    }

    pub fn minor(tonic: PitchClass) -> Self {
        KeyCenter {
            tonic,
            mode: KeyMode::Minor,
        }
    }

    /// The major key sharing this key's signature.
    pub fn relative_major(&self) -> PitchClass {
        match self.mode {
            KeyMode::Major => self.tonic,
            KeyMode::Minor => self.tonic.transpose(3),
        }
    }

    /// Minor keys spell like their relative major.
    pub fn spelling(&self) -> Spelling {
        Spelling::for_key(self.relative_major())
    }

    /// "C", "Eb", "Am", "F#m".
    pub fn label(&self) -> String {
        let name = self.tonic.name(self.spelling());
        match self.mode {
            KeyMode::Major => name.to_string(),
            KeyMode::Minor => format!("{name}m"),
        }
    }

    pub fn transpose(&self, semitones: i32) -> KeyCenter {
        KeyCenter {
            tonic: self.tonic.transpose(semitones),
            mode: self.mode,
        }
    }

    /// Key a chord implies when it is heard as a tonic.
    fn of_tonic(chord: &Chord) -> Self {
        if chord.quality.is_minor_tonic() {
            KeyCenter::minor(chord.root)
        } else {
            KeyCenter::major(chord.root)
        }
    }
}

impl fmt::Display for KeyCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// One recognized progression shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionalPatternMatch {
    pub kind: PatternKind,
    pub bars: BarSpan,
    pub key_center: KeyCenter,
    /// Symbols of the matched chords, spelled for the key.
    pub chords: Vec<String>,
}

/// A run of consecutive bars holding the same chord.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HarmonicSegment<'a> {
    pub bars: BarSpan,
    pub chord: &'a Chord,
}

/// Collapse the per-bar chord map into harmonic segments.
pub fn segments<'a>(active: &BTreeMap<u32, &'a Chord>) -> Vec<HarmonicSegment<'a>> {
    let mut segments: Vec<HarmonicSegment<'a>> = Vec::new();
    for (&bar, &chord) in active {
        match segments.last_mut() {
            Some(last) if last.chord == chord && last.bars.end + 1 == bar => {
                last.bars.end = bar;
            }
            _ => segments.push(HarmonicSegment {
                bars: BarSpan::single(bar),
                chord,
            }),
        }
    }
    segments
}

/// Detect progression shapes in a chord-event sequence.
pub fn detect(chord_events: &[ChordEvent]) -> Vec<FunctionalPatternMatch> {
    detect_in(&chords_by_bar(chord_events))
}

/// Detect progression shapes over an already-normalized per-bar chord map.
///
/// Always returns at least one match when `active` is non-empty.
pub fn detect_in(active: &BTreeMap<u32, &Chord>) -> Vec<FunctionalPatternMatch> {
    let segs = segments(active);
    let Some(terminal) = segs.last() else {
        return Vec::new();
    };

    let threes: Vec<FunctionalPatternMatch> =
        segs.windows(3).filter_map(match_three).collect();

    let mut twos: Vec<FunctionalPatternMatch> = segs
        .windows(2)
        .enumerate()
        .filter_map(|(i, window)| match_two(window, segs.get(i + 2)))
        .collect();

    // A three-chord match owns the bars it covers.
    twos.retain(|two| {
        !threes
            .iter()
            .any(|three| three.bars.start <= two.bars.start && two.bars.end <= three.bars.end)
    });

    let mut matches = threes;
    matches.extend(twos);
    matches.sort_by_key(|m| (m.bars.start, m.bars.end, m.kind));

    if matches.is_empty() {
        let key_center = KeyCenter::of_tonic(terminal.chord);
        matches.push(build_match(
            PatternKind::ResolutionOnly,
            &[*terminal],
            key_center,
        ));
    }

    for m in &matches {
        debug!(kind = %m.kind, bars = ?m.bars, key = %m.key_center, "functional pattern");
    }

    matches
}

/// The match that labels a selection.
///
/// Longer shapes first; among equal lengths, the one ending closest to
/// `final_bar`.
pub fn primary(
    matches: &[FunctionalPatternMatch],
    final_bar: Option<u32>,
) -> Option<&FunctionalPatternMatch> {
    matches.iter().max_by_key(|m| {
        let distance = final_bar.map(|bar| bar.abs_diff(m.bars.end)).unwrap_or(0);
        (m.kind.chord_count(), Reverse(distance), m.bars.end)
    })
}

fn motion(from: &HarmonicSegment<'_>, to: &HarmonicSegment<'_>) -> u8 {
    from.chord.root.interval_to(to.chord.root)
}

/// `dominant` resolves to `target` by a fourth onto a tonic quality.
fn resolves(dominant: &HarmonicSegment<'_>, target: &HarmonicSegment<'_>) -> bool {
    motion(dominant, target) == FOURTH_UP
        && (target.chord.quality.is_major_tonic() || target.chord.quality.is_minor_tonic())
}

fn match_three(window: &[HarmonicSegment<'_>]) -> Option<FunctionalPatternMatch> {
    let [two, five, one] = window else {
        return None;
    };
    if motion(two, five) != FOURTH_UP || motion(five, one) != FOURTH_UP {
        return None;
    }
    if !five.chord.quality.is_dominant() {
        return None;
    }

    let (kind, key_center) = match (two.chord.quality, one.chord.quality) {
        (ChordQuality::Minor7, q) if q.is_major_tonic() => {
            (PatternKind::MajorTwoFiveOne, KeyCenter::major(one.chord.root))
        }
        (ChordQuality::HalfDiminished7, q) if q.is_minor_tonic() => {
            (PatternKind::MinorTwoFiveOne, KeyCenter::minor(one.chord.root))
        }
        _ => return None,
    };
    Some(build_match(kind, window, key_center))
}

fn match_two(
    window: &[HarmonicSegment<'_>],
    next: Option<&HarmonicSegment<'_>>,
) -> Option<FunctionalPatternMatch> {
    let [first, second] = window else {
        return None;
    };
    if motion(first, second) != FOURTH_UP {
        return None;
    }

    if first.chord.quality.is_dominant() && resolves(first, second) {
        return Some(build_match(
            PatternKind::FiveOne,
            window,
            KeyCenter::of_tonic(second.chord),
        ));
    }

    let unresolved = next.map_or(true, |n| !resolves(second, n));
    if second.chord.quality.is_dominant() && unresolved {
        let implied_tonic = second.chord.root.transpose(FOURTH_UP as i32);
        let key_center = match first.chord.quality {
            ChordQuality::Minor7 => KeyCenter::major(implied_tonic),
            ChordQuality::HalfDiminished7 => KeyCenter::minor(implied_tonic),
            _ => return None,
        };
        return Some(build_match(PatternKind::TwoFive, window, key_center));
    }

    None
}

fn build_match(
    kind: PatternKind,
    window: &[HarmonicSegment<'_>],
    key_center: KeyCenter,
) -> FunctionalPatternMatch {
    let spelling = key_center.spelling();
    let (start, end) = match (window.first(), window.last()) {
        (Some(first), Some(last)) => (first.bars.start, last.bars.end),
        _ => (0, 0),
    };
    FunctionalPatternMatch {
        kind,
        bars: BarSpan::new(start, end),
        key_center,
        chords: window.iter().map(|s| s.chord.symbol(spelling)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::test_support::chord;
    use pretty_assertions::assert_eq;

    fn progression(symbols: &[&str]) -> Vec<ChordEvent> {
        symbols
            .iter()
            .enumerate()
            .map(|(i, s)| chord(i as u32 + 1, s))
            .collect()
    }

    #[test]
    fn test_detects_major_two_five_one() {
        let matches = detect(&progression(&["Dm7", "G7", "Cmaj7"]));
        assert_eq!(
            matches,
            vec![FunctionalPatternMatch {
                kind: PatternKind::MajorTwoFiveOne,
                bars: BarSpan::new(1, 3),
                key_center: KeyCenter::major(PitchClass::C),
                chords: vec!["Dm7".into(), "G7".into(), "Cmaj7".into()],
            }]
        );
    }

    #[test]
    fn test_detects_minor_two_five_one_with_altered_dominant() {
        let matches = detect(&progression(&["Bm7b5", "E7alt", "Am7"]));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].kind, PatternKind::MinorTwoFiveOne);
        assert_eq!(matches[0].key_center, KeyCenter::minor(PitchClass::A));
        assert_eq!(matches[0].key_center.relative_major(), PitchClass::C);
        assert_eq!(matches[0].key_center.label(), "Am");
    }

    #[test]
    fn test_detects_five_one_into_minor() {
        let matches = detect(&progression(&["G7", "Cm7"]));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].kind, PatternKind::FiveOne);
        assert_eq!(matches[0].key_center, KeyCenter::minor(PitchClass::C));
    }

    #[test]
    fn test_detects_unresolved_two_five() {
        let matches = detect(&progression(&["Ebm7", "Ab7"]));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].kind, PatternKind::TwoFive);
        assert_eq!(matches[0].key_center, KeyCenter::major(PitchClass::new(1)));
        assert_eq!(matches[0].chords, vec!["Ebm7".to_string(), "Ab7".to_string()]);
    }

    #[test]
    fn test_two_five_followed_by_deceptive_chord_is_kept() {
        let matches = detect(&progression(&["Dm7", "G7", "Am7"]));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].kind, PatternKind::TwoFive);
        assert_eq!(matches[0].bars, BarSpan::new(1, 2));
    }

    #[test]
    fn test_three_chord_match_absorbs_inner_two_chord_matches() {
        let matches = detect(&progression(&["Dm7", "G7", "Cmaj7"]));
        assert!(matches.iter().all(|m| m.kind != PatternKind::FiveOne));
        assert!(matches.iter().all(|m| m.kind != PatternKind::TwoFive));
    }

    #[test]
    fn test_repeated_bars_merge_into_one_segment() {
        let matches = detect(&progression(&["Dm7", "Dm7", "G7", "Cmaj7", "Cmaj7"]));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].bars, BarSpan::new(1, 5));
    }

    #[test]
    fn test_last_write_wins_before_matching() {
        let mut events = progression(&["Dm7", "G7", "Cmaj7"]);
        events.push(chord(3, "C7"));
        let matches = detect(&events);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].kind, PatternKind::TwoFive);
    }

    #[test]
    fn test_no_shape_yields_resolution_only_on_terminal_chord() {
        let matches = detect(&progression(&["Cmaj7", "Am7", "Fmaj7"]));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].kind, PatternKind::ResolutionOnly);
        assert_eq!(matches[0].bars, BarSpan::single(3));
        assert_eq!(matches[0].key_center, KeyCenter::major(PitchClass::F));
    }

    #[test]
    fn test_single_minor_chord_gives_minor_key() {
        let matches = detect(&progression(&["Dm7"]));
        assert_eq!(matches[0].kind, PatternKind::ResolutionOnly);
        assert_eq!(matches[0].key_center, KeyCenter::minor(PitchClass::D));
    }

    #[test]
    fn test_no_chords_no_matches() {
        assert!(detect(&[]).is_empty());
    }

    #[test]
    fn test_primary_prefers_longer_then_recent() {
        // ii-V-I in F, then a V-I into Bb
        let matches = detect(&progression(&["Gm7", "C7", "Fmaj7", "F7", "Bbmaj7"]));
        let kinds: Vec<_> = matches.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![PatternKind::MajorTwoFiveOne, PatternKind::FiveOne]);

        let best = primary(&matches, Some(5)).unwrap();
        assert_eq!(best.kind, PatternKind::MajorTwoFiveOne);

        // two V-I shapes: the later one wins
        let matches = detect(&progression(&["A7", "Dmaj7", "D7", "Gmaj7"]));
        let best = primary(&matches, Some(4)).unwrap();
        assert_eq!(best.key_center, KeyCenter::major(PitchClass::G));
    }

    #[test]
    fn test_key_labels_follow_spelling_table() {
        assert_eq!(KeyCenter::major(PitchClass::new(10)).label(), "Bb");
        assert_eq!(KeyCenter::major(PitchClass::new(6)).label(), "F#");
        // D minor spells like F major
        assert_eq!(KeyCenter::minor(PitchClass::D).spelling(), Spelling::Flats);
    }
}
