//! Note and chord events, and the selection view over them.
//!
//! Events are produced upstream (transcription plus user editing) and are
//! read-only here. A [`Selection`] borrows the caller's sequences and never
//! copies them.

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::chord::Chord;
use crate::error::SelectionError;
use crate::pitch::{midi_name, PitchClass, Spelling};

/// A single transcribed note, aligned to bars and beats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub start_sec: f64,
    pub end_sec: f64,
    pub midi: u8,
    #[serde(default = "NoteEvent::default_velocity")]
    pub velocity: u8,
    /// 1-based bar number.
    pub bar: u32,
    /// 1-based beat within the bar.
    pub beat: f64,
}

impl NoteEvent {
    fn default_velocity() -> u8 {
        80
    }

    pub fn duration_sec(&self) -> f64 {
        (self.end_sec - self.start_sec).max(0.0)
    }

    pub fn pitch_class(&self) -> PitchClass {
        PitchClass::from_midi(self.midi)
    }

    pub fn spelled(&self, spelling: Spelling) -> String {
        midi_name(self.midi, spelling)
    }

    /// Check the invariants alignment is supposed to guarantee.
    pub fn validate(&self) -> Result<(), String> {
        if self.midi > 127 {
            return Err(format!("midi {} is outside 0-127", self.midi));
        }
        if self.bar == 0 {
            return Err("bars start at 1".to_string());
        }
        if self.beat < 1.0 {
            return Err(format!("beat {} is before beat 1", self.beat));
        }
        if !(self.start_sec.is_finite() && self.end_sec.is_finite()) {
            return Err("onset and offset must be finite".to_string());
        }
        if self.end_sec < self.start_sec {
            return Err(format!(
                "ends at {}s before it starts at {}s",
                self.end_sec, self.start_sec
            ));
        }
        Ok(())
    }
}

/// The chord active for one bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordEvent {
    pub bar: u32,
    #[serde(rename = "symbol")]
    pub chord: Chord,
}

impl ChordEvent {
    pub fn new(bar: u32, chord: Chord) -> Self {
        ChordEvent { bar, chord }
    }
}

/// Inclusive range of bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BarSpan {
    pub start: u32,
    pub end: u32,
}

impl BarSpan {
    pub fn new(start: u32, end: u32) -> Self {
        BarSpan { start, end }
    }

    pub fn single(bar: u32) -> Self {
        BarSpan {
            start: bar,
            end: bar,
        }
    }

    pub fn contains(&self, bar: u32) -> bool {
        self.start <= bar && bar <= self.end
    }
}

/// A transcribed lick as it is stored on disk: notes ordered by onset plus
/// the chord chart, e.g. `{"notes": [...], "chords": [{"bar": 1, "symbol": "Dm7"}]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lick {
    #[serde(default)]
    pub notes: Vec<NoteEvent>,
    #[serde(default)]
    pub chords: Vec<ChordEvent>,
}

impl Lick {
    /// The whole lick as one selection.
    pub fn selection(&self) -> Selection<'_> {
        Selection::all(&self.notes, &self.chords)
    }
}

/// One chord per bar, last write wins, ordered by bar.
pub fn chords_by_bar<'a, I>(events: I) -> BTreeMap<u32, &'a Chord>
where
    I: IntoIterator<Item = &'a ChordEvent>,
{
    let mut by_bar = BTreeMap::new();
    for event in events {
        by_bar.insert(event.bar, &event.chord);
    }
    by_bar
}

/// A contiguous run of notes plus the chords whose bars they cover.
///
/// This is a view: indices into caller-owned slices.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    notes: &'a [NoteEvent],
    chords: &'a [ChordEvent],
    range: (usize, usize),
    bars: Option<BarSpan>,
}

impl<'a> Selection<'a> {
    /// Select `range` of `notes`; the bar span is taken from those notes.
    pub fn new(
        notes: &'a [NoteEvent],
        chords: &'a [ChordEvent],
        range: Range<usize>,
    ) -> Result<Self, SelectionError> {
        check_range(notes, &range)?;
        let selected = &notes[range.clone()];
        let bars = match (
            selected.iter().map(|n| n.bar).min(),
            selected.iter().map(|n| n.bar).max(),
        ) {
            (Some(start), Some(end)) => Some(BarSpan::new(start, end)),
            _ => None,
        };
        Ok(Selection {
            notes,
            chords,
            range: (range.start, range.end),
            bars,
        })
    }

    /// Select `range` of `notes` over an explicit bar span.
    ///
    /// Lets a selection cover bars where nothing is played, including a
    /// selection with no notes at all.
    pub fn with_bars(
        notes: &'a [NoteEvent],
        chords: &'a [ChordEvent],
        range: Range<usize>,
        bars: BarSpan,
    ) -> Result<Self, SelectionError> {
        check_range(notes, &range)?;
        if bars.start == 0 || bars.end < bars.start {
            return Err(SelectionError::InvalidBars {
                start: bars.start,
                end: bars.end,
            });
        }
        Ok(Selection {
            notes,
            chords,
            range: (range.start, range.end),
            bars: Some(bars),
        })
    }

    /// Select the notes whose onset lies in `[start_sec, end_sec)`.
    ///
    /// `notes` must be ordered by onset so the match is contiguous.
    pub fn from_time_window(
        notes: &'a [NoteEvent],
        chords: &'a [ChordEvent],
        start_sec: f64,
        end_sec: f64,
    ) -> Result<Self, SelectionError> {
        if end_sec < start_sec {
            return Err(SelectionError::InvertedWindow { start_sec, end_sec });
        }
        let first = notes.partition_point(|n| n.start_sec < start_sec);
        let last = notes.partition_point(|n| n.start_sec < end_sec);
        Selection::new(notes, chords, first..last.max(first))
    }

    /// The whole of both sequences.
    pub fn all(notes: &'a [NoteEvent], chords: &'a [ChordEvent]) -> Self {
        let mut selection = Selection {
            notes,
            chords,
            range: (0, notes.len()),
            bars: None,
        };
        let note_bars = notes.iter().map(|n| n.bar);
        let chord_bars = chords.iter().map(|c| c.bar);
        let all_bars: Vec<u32> = note_bars.chain(chord_bars).collect();
        if let (Some(start), Some(end)) = (all_bars.iter().min(), all_bars.iter().max()) {
            selection.bars = Some(BarSpan::new(*start, *end));
        }
        selection
    }

    /// Whole-sequence view with a known bar span; the caller vouches for it.
    pub(crate) fn from_parts(
        notes: &'a [NoteEvent],
        chords: &'a [ChordEvent],
        bars: Option<BarSpan>,
    ) -> Self {
        Selection {
            notes,
            chords,
            range: (0, notes.len()),
            bars,
        }
    }

    pub fn notes(&self) -> &'a [NoteEvent] {
        &self.notes[self.range.0..self.range.1]
    }

    /// Index of the first selected note in the caller's sequence.
    pub fn note_offset(&self) -> usize {
        self.range.0
    }

    pub fn range(&self) -> Range<usize> {
        self.range.0..self.range.1
    }

    pub fn bars(&self) -> Option<BarSpan> {
        self.bars
    }

    pub fn is_empty(&self) -> bool {
        self.range.0 == self.range.1
    }

    /// Chord events whose bar lies in the selection's bar span, in the
    /// caller's order.
    pub fn chord_events(&self) -> impl Iterator<Item = &'a ChordEvent> + '_ {
        let bars = self.bars;
        self.chords
            .iter()
            .filter(move |c| bars.is_some_and(|span| span.contains(c.bar)))
    }

    /// Active chord per bar for the selected span.
    pub fn active_chords(&self) -> BTreeMap<u32, &'a Chord> {
        chords_by_bar(self.chord_events())
    }

    /// Validate every selected note and every chord event.
    pub fn validate(&self) -> Result<(), SelectionError> {
        for (i, note) in self.notes().iter().enumerate() {
            note.validate().map_err(|reason| SelectionError::InvalidNote {
                index: self.range.0 + i,
                reason,
            })?;
        }
        if let Some(index) = self.chords.iter().position(|c| c.bar == 0) {
            return Err(SelectionError::InvalidChordBar { index });
        }
        Ok(())
    }
}

fn check_range(notes: &[NoteEvent], range: &Range<usize>) -> Result<(), SelectionError> {
    if range.start > range.end {
        return Err(SelectionError::InvertedRange {
            start: range.start,
            end: range.end,
        });
    }
    if range.end > notes.len() {
        return Err(SelectionError::OutOfBounds {
            start: range.start,
            end: range.end,
            len: notes.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A note on `bar`/`beat` lasting `beats` beats at 120 bpm in 4/4.
    pub fn note(midi: u8, bar: u32, beat: f64, beats: f64) -> NoteEvent {
        let start_sec = ((bar - 1) as f64 * 4.0 + (beat - 1.0)) * 0.5;
        NoteEvent {
            start_sec,
            end_sec: start_sec + beats * 0.5,
            midi,
            velocity: 80,
            bar,
            beat,
        }
    }

    pub fn chord(bar: u32, symbol: &str) -> ChordEvent {
        ChordEvent::new(bar, Chord::parse(symbol).unwrap())
    }
}
