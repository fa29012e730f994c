//! Chord-tone and guide-tone coverage over a note span.

use serde::{Deserialize, Serialize};

use crate::events::{chords_by_bar, ChordEvent, NoteEvent};
use crate::tension::{sweep, ClassifiedNote, NoteClass};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CoverageMetrics {
    pub total_notes: usize,
    pub chord_tone_notes: usize,
    /// Chord-tone notes that are the 3rd or 7th.
    pub guide_tone_notes: usize,
    pub tension_notes: usize,
    pub other_notes: usize,
    pub chord_tone_pct: f64,
    pub guide_tone_pct: f64,
    pub tension_pct: f64,
}

impl CoverageMetrics {
    /// Aggregate already-classified notes. Zero notes yields all zeros.
    pub fn from_classified(classified: &[ClassifiedNote]) -> Self {
        let mut metrics = CoverageMetrics {
            total_notes: classified.len(),
            ..Default::default()
        };

        for note in classified {
            match note.class {
                NoteClass::ChordTone(role) => {
                    metrics.chord_tone_notes += 1;
                    if role.is_guide_tone() {
                        metrics.guide_tone_notes += 1;
                    }
                }
                NoteClass::Tension(_) => metrics.tension_notes += 1,
                NoteClass::Other => metrics.other_notes += 1,
            }
        }

        metrics.chord_tone_pct = ratio(metrics.chord_tone_notes, metrics.total_notes);
        metrics.guide_tone_pct = ratio(metrics.guide_tone_notes, metrics.total_notes);
        metrics.tension_pct = ratio(metrics.tension_notes, metrics.total_notes);
        metrics
    }
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Coverage of `notes` against the per-bar active chords in `chord_events`.
pub fn coverage(notes: &[NoteEvent], chord_events: &[ChordEvent]) -> CoverageMetrics {
    let active = chords_by_bar(chord_events);
    CoverageMetrics::from_classified(&sweep(notes, &active))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::test_support::{chord, note};

    #[test]
    fn test_empty_span_is_all_zero() {
        let metrics = coverage(&[], &[chord(1, "Cmaj7")]);
        assert_eq!(metrics, CoverageMetrics::default());
        assert_eq!(metrics.chord_tone_pct, 0.0);
        assert_eq!(metrics.guide_tone_pct, 0.0);
    }

    #[test]
    fn test_counts_chord_guide_and_tension_notes() {
        let chords = vec![chord(1, "Dm7"), chord(2, "G7")];
        let notes = vec![
            note(62, 1, 1.0, 1.0), // D  root
            note(65, 1, 2.0, 1.0), // F  3rd
            note(69, 1, 3.0, 1.0), // A  5th
            note(72, 1, 4.0, 1.0), // C  7th
            note(68, 2, 1.0, 1.0), // Ab b9
            note(72, 2, 2.0, 1.0), // C  other
            note(71, 2, 3.0, 1.0), // B  3rd
            note(60, 5, 1.0, 1.0), // no chord
        ];
        let metrics = coverage(&notes, &chords);

        assert_eq!(metrics.total_notes, 8);
        assert_eq!(metrics.chord_tone_notes, 5);
        assert_eq!(metrics.guide_tone_notes, 3);
        assert_eq!(metrics.tension_notes, 1);
        assert_eq!(metrics.other_notes, 2);
        assert_eq!(metrics.chord_tone_pct, 5.0 / 8.0);
        assert_eq!(metrics.guide_tone_pct, 3.0 / 8.0);
        assert_eq!(metrics.tension_pct, 1.0 / 8.0);
    }

    #[test]
    fn test_percentages_stay_in_unit_range_and_ordered() {
        let chords = vec![chord(1, "Cmaj7"), chord(2, "Am7"), chord(3, "Bm7b5")];
        for start in 48u8..84 {
            let notes: Vec<_> = (0..7u8)
                .map(|i| note(start + i * 3, 1 + (i as u32 % 3), 1.0 + i as f64 % 4.0, 0.5))
                .collect();
            let m = coverage(&notes, &chords);
            assert!((0.0..=1.0).contains(&m.chord_tone_pct));
            assert!((0.0..=1.0).contains(&m.guide_tone_pct));
            assert!(m.chord_tone_pct >= m.guide_tone_pct);
            assert_eq!(
                m.chord_tone_notes + m.tension_notes + m.other_notes,
                m.total_notes
            );
        }
    }
}
