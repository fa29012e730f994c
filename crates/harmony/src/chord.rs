//! Chord value type and its quality-driven taxonomy tables.
//!
//! A [`Chord`] stores only what the user wrote: root, quality, extensions
//! and alterations. Chord tones and the available-tension palette are
//! derived on demand from static tables keyed by [`ChordQuality`].

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChordParseError;
use crate::pitch::{PitchClass, Spelling};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Major,
    Minor,
    Diminished,
    Major7,
    Minor7,
    Dominant7,
    HalfDiminished7,
    Diminished7,
    Major6,
    Minor6,
    Sus2,
    Sus4,
    Dominant7Sus4,
}

impl ChordQuality {
    /// Canonical suffix used when rendering a symbol.
    pub fn suffix(&self) -> &'static str {
        match self {
            ChordQuality::Major => "",
            ChordQuality::Minor => "m",
            ChordQuality::Diminished => "dim",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Minor7 => "m7",
            ChordQuality::Dominant7 => "7",
            ChordQuality::HalfDiminished7 => "m7b5",
            ChordQuality::Diminished7 => "dim7",
            ChordQuality::Major6 => "6",
            ChordQuality::Minor6 => "m6",
            ChordQuality::Sus2 => "sus2",
            ChordQuality::Sus4 => "sus4",
            ChordQuality::Dominant7Sus4 => "7sus4",
        }
    }

    /// Chord tones as (semitones above root, role).
    pub fn chord_tones(&self) -> &'static [(u8, ToneRole)] {
        use ToneRole::*;
        match self {
            ChordQuality::Major | ChordQuality::Major6 => &[(0, Root), (4, Third), (7, Fifth)],
            ChordQuality::Minor | ChordQuality::Minor6 => &[(0, Root), (3, Third), (7, Fifth)],
            ChordQuality::Diminished => &[(0, Root), (3, Third), (6, Fifth)],
            ChordQuality::Major7 => &[(0, Root), (4, Third), (7, Fifth), (11, Seventh)],
            ChordQuality::Minor7 => &[(0, Root), (3, Third), (7, Fifth), (10, Seventh)],
            ChordQuality::Dominant7 => &[(0, Root), (4, Third), (7, Fifth), (10, Seventh)],
            ChordQuality::HalfDiminished7 => &[(0, Root), (3, Third), (6, Fifth), (10, Seventh)],
            ChordQuality::Diminished7 => &[(0, Root), (3, Third), (6, Fifth), (9, Seventh)],
            ChordQuality::Sus2 => &[(0, Root), (2, Ninth), (7, Fifth)],
            ChordQuality::Sus4 => &[(0, Root), (5, Eleventh), (7, Fifth)],
            ChordQuality::Dominant7Sus4 => &[(0, Root), (5, Eleventh), (7, Fifth), (10, Seventh)],
        }
    }

    /// Legal tensions for the quality before anything the user wrote.
    pub fn base_palette(&self) -> &'static [Tension] {
        use Tension::*;
        match self {
            ChordQuality::Major | ChordQuality::Major7 | ChordQuality::Major6 => {
                &[Nine, SharpEleven, Thirteen]
            }
            ChordQuality::Minor | ChordQuality::Minor7 | ChordQuality::Minor6 => {
                &[Nine, Eleven, Thirteen]
            }
            ChordQuality::Dominant7 => {
                &[FlatNine, Nine, SharpNine, SharpEleven, FlatThirteen, Thirteen]
            }
            ChordQuality::Dominant7Sus4 => &[FlatNine, Nine, Thirteen],
            ChordQuality::HalfDiminished7
            | ChordQuality::Diminished
            | ChordQuality::Diminished7 => &[Nine, Eleven, FlatThirteen],
            ChordQuality::Sus2 => &[Eleven, Thirteen],
            ChordQuality::Sus4 => &[Nine, Thirteen],
        }
    }

    pub fn is_dominant(&self) -> bool {
        matches!(self, ChordQuality::Dominant7 | ChordQuality::Dominant7Sus4)
    }

    pub fn is_seventh(&self) -> bool {
        self.chord_tones().len() == 4
    }

    /// Qualities that can act as a major-key tonic (I).
    pub fn is_major_tonic(&self) -> bool {
        matches!(
            self,
            ChordQuality::Major7 | ChordQuality::Major6 | ChordQuality::Major
        )
    }

    /// Qualities that can act as a minor-key tonic (i).
    pub fn is_minor_tonic(&self) -> bool {
        matches!(
            self,
            ChordQuality::Minor7 | ChordQuality::Minor6 | ChordQuality::Minor
        )
    }
}

/// Role a pitch plays relative to a chord root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ToneRole {
    #[serde(rename = "root")]
    Root,
    #[serde(rename = "3rd")]
    Third,
    #[serde(rename = "5th")]
    Fifth,
    #[serde(rename = "7th")]
    Seventh,
    #[serde(rename = "9")]
    Ninth,
    #[serde(rename = "11")]
    Eleventh,
    #[serde(rename = "13")]
    Thirteenth,
    #[serde(rename = "none")]
    None,
}

impl ToneRole {
    /// Guide tones are the 3rd and 7th.
    pub fn is_guide_tone(&self) -> bool {
        matches!(self, ToneRole::Third | ToneRole::Seventh)
    }
}

/// Tension labels. Each label sits at a unique interval above the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tension {
    #[serde(rename = "b9")]
    FlatNine,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "#9")]
    SharpNine,
    #[serde(rename = "11")]
    Eleven,
    #[serde(rename = "#11")]
    SharpEleven,
    #[serde(rename = "b13")]
    FlatThirteen,
    #[serde(rename = "13")]
    Thirteen,
}

impl Tension {
    pub const ALL: [Tension; 7] = [
        Tension::FlatNine,
        Tension::Nine,
        Tension::SharpNine,
        Tension::Eleven,
        Tension::SharpEleven,
        Tension::FlatThirteen,
        Tension::Thirteen,
    ];

    pub fn interval(&self) -> u8 {
        match self {
            Tension::FlatNine => 1,
            Tension::Nine => 2,
            Tension::SharpNine => 3,
            Tension::Eleven => 5,
            Tension::SharpEleven => 6,
            Tension::FlatThirteen => 8,
            Tension::Thirteen => 9,
        }
    }

    pub fn from_interval(interval: u8) -> Option<Tension> {
        Tension::ALL.into_iter().find(|t| t.interval() == interval % 12)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tension::FlatNine => "b9",
            Tension::Nine => "9",
            Tension::SharpNine => "#9",
            Tension::Eleven => "11",
            Tension::SharpEleven => "#11",
            Tension::FlatThirteen => "b13",
            Tension::Thirteen => "13",
        }
    }

    /// Scale degree the tension colours: 9, 11 or 13.
    pub fn role(&self) -> ToneRole {
        match self {
            Tension::FlatNine | Tension::Nine | Tension::SharpNine => ToneRole::Ninth,
            Tension::Eleven | Tension::SharpEleven => ToneRole::Eleventh,
            Tension::FlatThirteen | Tension::Thirteen => ToneRole::Thirteenth,
        }
    }
}

impl fmt::Display for Tension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Natural extensions a symbol may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Extension {
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "11")]
    Eleven,
    #[serde(rename = "13")]
    Thirteen,
}

impl Extension {
    pub fn tension(&self) -> Tension {
        match self {
            Extension::Nine => Tension::Nine,
            Extension::Eleven => Tension::Eleven,
            Extension::Thirteen => Tension::Thirteen,
        }
    }
}

/// Altered tensions a symbol may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Alteration {
    #[serde(rename = "b9")]
    FlatNine,
    #[serde(rename = "#9")]
    SharpNine,
    #[serde(rename = "#11")]
    SharpEleven,
    #[serde(rename = "b13")]
    FlatThirteen,
}

impl Alteration {
    /// What `alt` expands to.
    pub const ALT: [Alteration; 4] = [
        Alteration::FlatNine,
        Alteration::SharpNine,
        Alteration::SharpEleven,
        Alteration::FlatThirteen,
    ];

    pub fn tension(&self) -> Tension {
        match self {
            Alteration::FlatNine => Tension::FlatNine,
            Alteration::SharpNine => Tension::SharpNine,
            Alteration::SharpEleven => Tension::SharpEleven,
            Alteration::FlatThirteen => Tension::FlatThirteen,
        }
    }
}

/// A chord tone resolved to an absolute pitch class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordTone {
    pub pitch_class: PitchClass,
    pub role: ToneRole,
}

/// A parsed chord symbol. Immutable once parsed.
///
/// Serializes as its canonical symbol and deserializes through the parser,
/// so a bad symbol in a document surfaces as a [`ChordParseError`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Chord {
    pub root: PitchClass,
    pub quality: ChordQuality,
    pub extensions: BTreeSet<Extension>,
    pub alterations: BTreeSet<Alteration>,
    /// The symbol was written with `alt`.
    pub altered: bool,
}

impl Chord {
    /// A chord with no extensions or alterations.
    pub fn new(root: PitchClass, quality: ChordQuality) -> Self {
        Chord {
            root,
            quality,
            extensions: BTreeSet::new(),
            alterations: BTreeSet::new(),
            altered: false,
        }
    }

    pub fn parse(symbol: &str) -> Result<Self, ChordParseError> {
        crate::parser::parse(symbol)
    }

    pub fn chord_tones(&self) -> Vec<ChordTone> {
        self.quality
            .chord_tones()
            .iter()
            .map(|&(interval, role)| ChordTone {
                pitch_class: self.root.transpose(interval as i32),
                role,
            })
            .collect()
    }

    pub fn chord_tone_set(&self) -> BTreeSet<PitchClass> {
        self.chord_tones().into_iter().map(|t| t.pitch_class).collect()
    }

    /// Role of `pc` if it is a chord tone.
    pub fn chord_tone_role(&self, pc: PitchClass) -> Option<ToneRole> {
        let interval = self.root.interval_to(pc);
        self.quality
            .chord_tones()
            .iter()
            .find(|(i, _)| *i == interval)
            .map(|(_, role)| *role)
    }

    pub fn is_guide_tone(&self, pc: PitchClass) -> bool {
        self.chord_tone_role(pc)
            .is_some_and(|role| role.is_guide_tone())
    }

    /// Quality-dependent legal tensions, with `alt` dominants special-cased.
    pub fn available_tensions(&self) -> BTreeSet<Tension> {
        if self.quality.is_dominant() && self.altered {
            return Alteration::ALT.iter().map(Alteration::tension).collect();
        }

        let mut tensions: BTreeSet<Tension> =
            self.quality.base_palette().iter().copied().collect();
        tensions.extend(self.extensions.iter().map(Extension::tension));
        if self.quality.is_dominant() {
            tensions.extend(self.alterations.iter().map(Alteration::tension));
        }
        tensions
    }

    /// Written alterations the quality's palette does not cover.
    ///
    /// Only non-dominant chords can have these; they are kept rather than
    /// rejected so the analysis never drops what the user wrote.
    pub fn unresolved_tensions(&self) -> BTreeSet<Tension> {
        if self.quality.is_dominant() {
            return BTreeSet::new();
        }
        let palette = self.quality.base_palette();
        self.alterations
            .iter()
            .map(Alteration::tension)
            .filter(|t| !palette.contains(t))
            .collect()
    }

    /// Tension label `pc` takes over this chord, if it is legal or written.
    pub fn tension_for(&self, pc: PitchClass) -> Option<Tension> {
        let tension = Tension::from_interval(self.root.interval_to(pc))?;
        if self.available_tensions().contains(&tension)
            || self.unresolved_tensions().contains(&tension)
        {
            Some(tension)
        } else {
            None
        }
    }

    /// Role of `pc` against this chord: chord-tone role, tension degree, or none.
    pub fn role_of(&self, pc: PitchClass) -> ToneRole {
        if let Some(role) = self.chord_tone_role(pc) {
            return role;
        }
        self.tension_for(pc)
            .map(|t| t.role())
            .unwrap_or(ToneRole::None)
    }

    /// Move the root; quality, extensions and alterations are untouched.
    pub fn transpose(&self, semitones: i32) -> Chord {
        Chord {
            root: self.root.transpose(semitones),
            ..self.clone()
        }
    }

    /// Canonical symbol, e.g. `G7alt`, `C7(b9,#11)`, `Ebmaj7`.
    ///
    /// The result parses back to an equal chord.
    pub fn symbol(&self, spelling: Spelling) -> String {
        let mut out = String::from(self.root.name(spelling));
        out.push_str(self.quality.suffix());

        let mut modifiers: Vec<Tension> = self
            .extensions
            .iter()
            .map(Extension::tension)
            .collect();
        if self.altered {
            out.push_str("alt");
        } else {
            modifiers.extend(self.alterations.iter().map(Alteration::tension));
        }
        modifiers.sort();

        if !modifiers.is_empty() {
            let labels: Vec<&str> = modifiers.iter().map(Tension::label).collect();
            out.push('(');
            out.push_str(&labels.join(","));
            out.push(')');
        }
        out
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol(Spelling::for_key(self.root)))
    }
}

impl FromStr for Chord {
    type Err = ChordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Chord::parse(s)
    }
}

impl TryFrom<String> for Chord {
    type Error = ChordParseError;

    fn try_from(symbol: String) -> Result<Self, Self::Error> {
        Chord::parse(&symbol)
    }
}

impl From<Chord> for String {
    fn from(chord: Chord) -> Self {
        chord.to_string()
    }
}
