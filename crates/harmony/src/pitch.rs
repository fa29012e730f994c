//! Pitch-class arithmetic and enharmonic spelling.

use serde::{Deserialize, Serialize};
use std::fmt;

const NOTE_NAMES_SHARP: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const NOTE_NAMES_FLAT: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];

/// Key roots conventionally spelled with flats: F, Bb, Eb, Ab, Db.
pub static FLAT_KEY_ROOTS: [u8; 5] = [5, 10, 3, 8, 1];

/// A pitch class, 0–11 with C = 0. Always normalized mod 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);
    pub const D: PitchClass = PitchClass(2);
    pub const E: PitchClass = PitchClass(4);
    pub const F: PitchClass = PitchClass(5);
    pub const G: PitchClass = PitchClass(7);
    pub const A: PitchClass = PitchClass(9);
    pub const B: PitchClass = PitchClass(11);

    /// Build from any integer, wrapping into 0–11.
    pub fn new(value: i32) -> Self {
        PitchClass(value.rem_euclid(12) as u8)
    }

    pub fn from_midi(midi: u8) -> Self {
        PitchClass(midi % 12)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn transpose(self, semitones: i32) -> Self {
        PitchClass::new(self.0 as i32 + semitones.rem_euclid(12))
    }

    /// Ascending interval in semitones (0–11) from `self` up to `other`.
    pub fn interval_to(self, other: PitchClass) -> u8 {
        (other.0 + 12 - self.0) % 12
    }

    pub fn name(self, spelling: Spelling) -> &'static str {
        match spelling {
            Spelling::Sharps => NOTE_NAMES_SHARP[self.0 as usize],
            Spelling::Flats => NOTE_NAMES_FLAT[self.0 as usize],
        }
    }

    /// Parse a note name like "C", "F#", "Bb", "Cb" or "E#".
    ///
    /// Letter plus at most one accidental; anything else is rejected.
    pub fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.trim().chars();
        let letter = NoteLetter::from_char(chars.next()?)?;
        let accidental = match chars.next() {
            None => None,
            Some('#') => Some(Accidental::Sharp),
            Some('b') => Some(Accidental::Flat),
            Some(_) => return None,
        };
        if chars.next().is_some() {
            return None;
        }
        Some(letter.with_accidental(accidental))
    }
}

impl From<u8> for PitchClass {
    fn from(value: u8) -> Self {
        PitchClass(value % 12)
    }
}

impl From<PitchClass> for u8 {
    fn from(pc: PitchClass) -> Self {
        pc.0
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name(Spelling::for_key(*self)))
    }
}

/// Natural note letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteLetter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteLetter {
    /// Semitone offset from C.
    pub fn semitone(self) -> u8 {
        match self {
            NoteLetter::C => 0,
            NoteLetter::D => 2,
            NoteLetter::E => 4,
            NoteLetter::F => 5,
            NoteLetter::G => 7,
            NoteLetter::A => 9,
            NoteLetter::B => 11,
        }
    }

    /// Uppercase letters only; chord symbols never use lowercase roots.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'C' => Some(NoteLetter::C),
            'D' => Some(NoteLetter::D),
            'E' => Some(NoteLetter::E),
            'F' => Some(NoteLetter::F),
            'G' => Some(NoteLetter::G),
            'A' => Some(NoteLetter::A),
            'B' => Some(NoteLetter::B),
            _ => None,
        }
    }

    pub fn with_accidental(self, accidental: Option<Accidental>) -> PitchClass {
        let adjust = match accidental {
            Some(Accidental::Sharp) => 1,
            Some(Accidental::Flat) => -1,
            None => 0,
        };
        PitchClass::new(self.semitone() as i32 + adjust)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accidental {
    Sharp,
    Flat,
}

/// Enharmonic spelling preference for one key's material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spelling {
    Sharps,
    Flats,
}

impl Spelling {
    /// Flats for F, Bb, Eb, Ab, Db; sharps everywhere else.
    pub fn for_key(root: PitchClass) -> Self {
        if FLAT_KEY_ROOTS.contains(&root.value()) {
            Spelling::Flats
        } else {
            Spelling::Sharps
        }
    }
}

/// Spell a MIDI note number with octave, MIDI 60 = C4.
pub fn midi_name(midi: u8, spelling: Spelling) -> String {
    let octave = (midi / 12) as i32 - 1;
    format!("{}{}", PitchClass::from_midi(midi).name(spelling), octave)
}
