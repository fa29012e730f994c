//! Pick the note a line resolves to over its final chord.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::chord::{Chord, ToneRole};
use crate::events::{BarSpan, NoteEvent};

const CHORD_TONE_POINTS: u8 = 3;
const GUIDE_TONE_POINTS: u8 = 2;
const LONGEST_POINTS: u8 = 2;
const STRONG_BEAT_POINTS: u8 = 1;

/// Metric parameters the resolution scoring depends on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParams {
    pub beats_per_bar: u32,
    /// How far from a beat an onset may land and still count as on it.
    pub strong_beat_tolerance: f64,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        AnalysisParams {
            beats_per_bar: 4,
            strong_beat_tolerance: 0.05,
        }
    }
}

impl AnalysisParams {
    /// Beat 1, plus the bar midpoint in even meters.
    pub fn is_strong_beat(&self, beat: f64) -> bool {
        let near = |target: f64| (beat - target).abs() <= self.strong_beat_tolerance;
        if near(1.0) {
            return true;
        }
        self.beats_per_bar >= 2
            && self.beats_per_bar % 2 == 0
            && near((self.beats_per_bar / 2 + 1) as f64)
    }
}

/// The chosen resolution note.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolutionTarget {
    /// Index into the caller's full note sequence.
    pub note_index: usize,
    pub note: NoteEvent,
    pub role: ToneRole,
    pub score: u8,
}

/// Indexed notes whose onset bar falls inside `bars`. A note tied over
/// the barline into `bars` is not a candidate.
pub fn candidates_in(
    notes: &[NoteEvent],
    index_offset: usize,
    bars: BarSpan,
) -> Vec<(usize, &NoteEvent)> {
    notes
        .iter()
        .enumerate()
        .filter(|(_, n)| bars.contains(n.bar))
        .map(|(i, n)| (index_offset + i, n))
        .collect()
}

/// Score every candidate against `chord` and keep the best.
///
/// Ties go to the earliest onset, then the lowest index. `None` only when
/// there are no candidates.
pub fn select_target(
    candidates: &[(usize, &NoteEvent)],
    chord: &Chord,
    params: &AnalysisParams,
) -> Option<ResolutionTarget> {
    let longest = candidates
        .iter()
        .min_by(|(ia, a), (ib, b)| {
            b.duration_sec()
                .total_cmp(&a.duration_sec())
                .then(a.start_sec.total_cmp(&b.start_sec))
                .then(ia.cmp(ib))
        })
        .map(|(i, _)| *i);

    let scored = candidates.iter().map(|&(index, note)| {
        let pc = note.pitch_class();
        let mut score = 0;
        if let Some(role) = chord.chord_tone_role(pc) {
            score += CHORD_TONE_POINTS;
            if role.is_guide_tone() {
                score += GUIDE_TONE_POINTS;
            }
        }
        if longest == Some(index) {
            score += LONGEST_POINTS;
        }
        if params.is_strong_beat(note.beat) {
            score += STRONG_BEAT_POINTS;
        }
        trace!(index, midi = note.midi, score, "resolution candidate");
        ResolutionTarget {
            note_index: index,
            note: *note,
            role: chord.role_of(pc),
            score,
        }
    });

    scored.min_by(rank)
}

/// Best first: higher score, then earlier onset, then lower index.
fn rank(a: &ResolutionTarget, b: &ResolutionTarget) -> Ordering {
    b.score
        .cmp(&a.score)
        .then(a.note.start_sec.total_cmp(&b.note.start_sec))
        .then(a.note_index.cmp(&b.note_index))
}
