//! Shift a selection's notes and chords by a semitone offset.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TranspositionRangeError;
use crate::events::{BarSpan, ChordEvent, NoteEvent, Selection};

/// Owned result of a transposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransposedSelection {
    pub offset: i32,
    pub notes: Vec<NoteEvent>,
    pub chords: Vec<ChordEvent>,
    pub bars: Option<BarSpan>,
}

impl TransposedSelection {
    /// View the transposed material as a selection, so it can be analyzed
    /// or transposed again.
    pub fn as_selection(&self) -> Selection<'_> {
        Selection::from_parts(&self.notes, &self.chords, self.bars)
    }
}

/// Shift every selected note by `offset` semitones and every covered chord
/// root by `offset` mod 12.
///
/// A note pushed outside MIDI 0-127 fails the whole call; nothing is
/// clamped.
pub fn transpose(
    selection: &Selection<'_>,
    offset: i32,
) -> Result<TransposedSelection, TranspositionRangeError> {
    let notes = selection
        .notes()
        .iter()
        .enumerate()
        .map(|(i, note)| {
            let result = i64::from(note.midi) + i64::from(offset);
            match u8::try_from(result) {
                Ok(midi) if midi <= 127 => Ok(NoteEvent { midi, ..*note }),
                _ => Err(TranspositionRangeError {
                    note_index: selection.note_offset() + i,
                    midi: note.midi,
                    offset,
                    result,
                }),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    let chords = selection
        .chord_events()
        .map(|event| ChordEvent::new(event.bar, event.chord.transpose(offset)))
        .collect();

    debug!(offset, notes = notes.len(), "transposed selection");

    Ok(TransposedSelection {
        offset,
        notes,
        chords,
        bars: selection.bars(),
    })
}

/// Transpose once per offset. A failing offset does not stop the others.
pub fn transpose_all(
    selection: &Selection<'_>,
    offsets: &[i32],
) -> Vec<(i32, Result<TransposedSelection, TranspositionRangeError>)> {
    offsets
        .iter()
        .map(|&offset| (offset, transpose(selection, offset)))
        .collect()
}
