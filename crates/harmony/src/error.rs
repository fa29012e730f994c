//! Error types surfaced by the engine.
//!
//! Soft outcomes (no pattern match, no resolution target, zero-note
//! coverage) are ordinary values, not errors.

use thiserror::Error;

/// A chord symbol outside the supported grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChordParseError {
    #[error("empty chord symbol")]
    Empty,

    #[error("chord symbol {symbol:?} must start with a root A-G")]
    UnknownRoot { symbol: String },

    #[error("unsupported token {token:?} at byte {offset} of chord symbol {symbol:?}")]
    UnsupportedToken {
        symbol: String,
        token: String,
        offset: usize,
    },

    #[error("chord symbol {symbol:?} combines {first} with {second}")]
    ConflictingTension {
        symbol: String,
        first: String,
        second: String,
    },
}

/// A transposed note left the MIDI range. Aborts that key only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("note {note_index} (midi {midi}) shifted by {offset} semitones lands on {result}, outside 0-127")]
pub struct TranspositionRangeError {
    pub note_index: usize,
    pub midi: u8,
    pub offset: i32,
    pub result: i64,
}

/// A selection that cannot be built over the supplied sequences.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    #[error("note range {start}..{end} is outside 0..{len}")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("note range {start}..{end} is inverted")]
    InvertedRange { start: usize, end: usize },

    #[error("time window {start_sec}..{end_sec} is inverted")]
    InvertedWindow { start_sec: f64, end_sec: f64 },

    #[error("bar span {start}..={end} is invalid; bars start at 1")]
    InvalidBars { start: u32, end: u32 },

    #[error("note {index} is invalid: {reason}")]
    InvalidNote { index: usize, reason: String },

    #[error("chord event {index} is in bar 0; bars start at 1")]
    InvalidChordBar { index: usize },
}

/// A key name outside the note-name table, e.g. in a practice-pack request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown key name {name:?}; expected a note name such as Eb or F#")]
pub struct UnknownKeyError {
    pub name: String,
}
