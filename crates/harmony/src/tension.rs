//! Classify notes against the chord active in their bar.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::chord::{Chord, Tension, ToneRole};
use crate::events::NoteEvent;

/// How a note relates to its active chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "label", rename_all = "snake_case")]
pub enum NoteClass {
    ChordTone(ToneRole),
    Tension(Tension),
    /// Passing or otherwise non-harmonic.
    Other,
}

impl NoteClass {
    pub fn is_chord_tone(&self) -> bool {
        matches!(self, NoteClass::ChordTone(_))
    }

    pub fn is_guide_tone(&self) -> bool {
        matches!(self, NoteClass::ChordTone(role) if role.is_guide_tone())
    }

    /// Role for reporting: chord-tone role, tension degree, or none.
    pub fn role(&self) -> ToneRole {
        match self {
            NoteClass::ChordTone(role) => *role,
            NoteClass::Tension(t) => t.role(),
            NoteClass::Other => ToneRole::None,
        }
    }
}

/// Classify one note against one chord.
///
/// Chord tones win over tensions, so a written `#9` over a minor chord
/// still reads as the minor third.
pub fn classify(note: &NoteEvent, chord: &Chord) -> NoteClass {
    let pc = note.pitch_class();
    if let Some(role) = chord.chord_tone_role(pc) {
        return NoteClass::ChordTone(role);
    }
    match chord.tension_for(pc) {
        Some(tension) => NoteClass::Tension(tension),
        None => NoteClass::Other,
    }
}

/// Classify a note against the chord of its own bar; no chord means `Other`.
pub fn classify_in(note: &NoteEvent, active: &BTreeMap<u32, &Chord>) -> NoteClass {
    active
        .get(&note.bar)
        .map(|chord| classify(note, chord))
        .unwrap_or(NoteClass::Other)
}

/// A note's classification, addressed by its position in the swept slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedNote {
    pub index: usize,
    pub bar: u32,
    pub class: NoteClass,
}

/// Classify every note of a span.
///
/// Bars under a dominant-quality chord are visited first: their tension
/// tables are the richest. Each note still maps to exactly one chord, so
/// the visiting order never changes a result.
pub fn sweep(notes: &[NoteEvent], active: &BTreeMap<u32, &Chord>) -> Vec<ClassifiedNote> {
    let mut by_bar: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (index, note) in notes.iter().enumerate() {
        by_bar.entry(note.bar).or_default().push(index);
    }

    let mut bars: Vec<u32> = by_bar.keys().copied().collect();
    bars.sort_by_key(|bar| {
        let dominant = active.get(bar).is_some_and(|c| c.quality.is_dominant());
        (!dominant, *bar)
    });

    let mut classified: Vec<Option<ClassifiedNote>> = vec![None; notes.len()];
    for bar in bars {
        for &index in &by_bar[&bar] {
            classified[index] = Some(ClassifiedNote {
                index,
                bar,
                class: classify_in(&notes[index], active),
            });
        }
    }

    classified.into_iter().flatten().collect()
}

/// Labels of every tension a span actually plays.
pub fn tensions_used(classified: &[ClassifiedNote]) -> BTreeSet<Tension> {
    classified
        .iter()
        .filter_map(|c| match c.class {
            NoteClass::Tension(t) => Some(t),
            _ => None,
        })
        .collect()
}

/// Written alterations that the chords' palettes do not cover.
pub fn unresolved_tensions(active: &BTreeMap<u32, &Chord>) -> BTreeSet<Tension> {
    active
        .values()
        .flat_map(|chord| chord.unresolved_tensions())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::chords_by_bar;
    use crate::events::test_support::{chord, note};

    #[test]
    fn test_classifies_chord_tones_tensions_and_others() {
        let g7alt = Chord::parse("G7alt").unwrap();
        assert_eq!(
            classify(&note(71, 1, 1.0, 1.0), &g7alt),
            NoteClass::ChordTone(ToneRole::Third)
        );
        assert_eq!(
            classify(&note(68, 1, 1.0, 1.0), &g7alt),
            NoteClass::Tension(Tension::FlatNine)
        );
        assert_eq!(
            classify(&note(70, 1, 1.0, 1.0), &g7alt),
            NoteClass::Tension(Tension::SharpNine)
        );
        // natural 9 is not in the altered palette
        assert_eq!(classify(&note(69, 1, 1.0, 1.0), &g7alt), NoteClass::Other);
    }

    #[test]
    fn test_plain_dominant_accepts_natural_and_altered_tensions() {
        let g7 = Chord::parse("G7").unwrap();
        assert_eq!(
            classify(&note(69, 1, 1.0, 1.0), &g7),
            NoteClass::Tension(Tension::Nine)
        );
        assert_eq!(
            classify(&note(73, 1, 1.0, 1.0), &g7),
            NoteClass::Tension(Tension::SharpEleven)
        );
        // C over G7 is the avoid-note 11
        assert_eq!(classify(&note(72, 1, 1.0, 1.0), &g7), NoteClass::Other);
    }

    #[test]
    fn test_note_without_chord_is_other() {
        let chords = vec![chord(1, "Cmaj7")];
        let active = chords_by_bar(&chords);
        assert_eq!(classify_in(&note(64, 2, 1.0, 1.0), &active), NoteClass::Other);
        assert_eq!(
            classify_in(&note(64, 1, 1.0, 1.0), &active),
            NoteClass::ChordTone(ToneRole::Third)
        );
    }

    #[test]
    fn test_sweep_keeps_note_order_regardless_of_visit_order() {
        let chords = vec![chord(1, "Dm7"), chord(2, "G7"), chord(3, "Cmaj7")];
        let active = chords_by_bar(&chords);
        let notes = vec![
            note(65, 1, 1.0, 1.0), // F, 3rd of Dm7
            note(68, 2, 1.0, 1.0), // Ab, b9 of G7
            note(64, 3, 1.0, 1.0), // E, 3rd of Cmaj7
            note(61, 3, 2.0, 1.0), // C#, other
        ];
        let classified = sweep(&notes, &active);

        let indices: Vec<usize> = classified.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert_eq!(classified[1].class, NoteClass::Tension(Tension::FlatNine));
        assert_eq!(classified[3].class, NoteClass::Other);

        let used: Vec<_> = tensions_used(&classified).into_iter().collect();
        assert_eq!(used, vec![Tension::FlatNine]);
    }

    #[test]
    fn test_unresolved_alterations_pass_through() {
        let chords = vec![chord(1, "Cm7b9"), chord(2, "F7alt")];
        let active = chords_by_bar(&chords);
        let unresolved: Vec<_> = unresolved_tensions(&active).into_iter().collect();
        assert_eq!(unresolved, vec![Tension::FlatNine]);

        // Db over Cm7b9 is tagged with what was written
        assert_eq!(
            classify_in(&note(61, 1, 1.0, 1.0), &active),
            NoteClass::Tension(Tension::FlatNine)
        );
    }

    #[test]
    fn test_guide_tone_helpers() {
        assert!(NoteClass::ChordTone(ToneRole::Seventh).is_guide_tone());
        assert!(!NoteClass::ChordTone(ToneRole::Fifth).is_guide_tone());
        assert!(!NoteClass::Tension(Tension::Nine).is_guide_tone());
        assert_eq!(NoteClass::Tension(Tension::SharpEleven).role(), ToneRole::Eleventh);
    }
}
