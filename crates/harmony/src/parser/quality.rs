//! The versioned quality-token table.
//!
//! Tokens are matched longest-first. The table is kept sorted by byte
//! length (descending) so a token is always tried before any of its
//! prefixes; a unit test guards that ordering.

use crate::chord::{ChordQuality, Extension};

/// Bump whenever a token is added, removed, or remapped.
pub const GRAMMAR_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityToken {
    pub token: &'static str,
    pub quality: ChordQuality,
    /// Extension implied by the token itself (`9` = dominant seventh with a 9).
    pub implies: Option<Extension>,
}

impl QualityToken {
    const fn new(token: &'static str, quality: ChordQuality, implies: Option<Extension>) -> Self {
        Self {
            token,
            quality,
            implies,
        }
    }
}

/// Bare root with no quality token.
pub const BARE_TRIAD: QualityToken = QualityToken::new("", ChordQuality::Major, None);

use ChordQuality::*;
use Extension::*;

pub static QUALITY_TOKENS: &[QualityToken] = &[
    QualityToken::new("maj13", Major7, Some(Thirteen)),
    QualityToken::new("maj11", Major7, Some(Eleven)),
    QualityToken::new("7sus4", Dominant7Sus4, None),
    QualityToken::new("maj9", Major7, Some(Nine)),
    QualityToken::new("maj7", Major7, None),
    QualityToken::new("m7b5", HalfDiminished7, None),
    QualityToken::new("dim7", Diminished7, None),
    QualityToken::new("min7", Minor7, None),
    QualityToken::new("add9", Major, Some(Nine)),
    QualityToken::new("sus2", Sus2, None),
    QualityToken::new("sus4", Sus4, None),
    QualityToken::new("maj", Major7, None),
    QualityToken::new("m13", Minor7, Some(Thirteen)),
    QualityToken::new("m11", Minor7, Some(Eleven)),
    QualityToken::new("dim", Diminished, None),
    QualityToken::new("min", Minor, None),
    QualityToken::new("Δ7", Major7, None),
    QualityToken::new("ø7", HalfDiminished7, None),
    QualityToken::new("°7", Diminished7, None),
    QualityToken::new("m9", Minor7, Some(Nine)),
    QualityToken::new("m7", Minor7, None),
    QualityToken::new("m6", Minor6, None),
    QualityToken::new("M7", Major7, None),
    QualityToken::new("-7", Minor7, None),
    QualityToken::new("13", Dominant7, Some(Thirteen)),
    QualityToken::new("11", Dominant7, Some(Eleven)),
    QualityToken::new("ø", HalfDiminished7, None),
    QualityToken::new("°", Diminished, None),
    QualityToken::new("Δ", Major7, None),
    QualityToken::new("9", Dominant7, Some(Nine)),
    QualityToken::new("7", Dominant7, None),
    QualityToken::new("6", Major6, None),
    QualityToken::new("m", Minor, None),
    QualityToken::new("-", Minor, None),
];

/// Consume the longest quality token at the front of `input`.
///
/// Never fails: no token means a bare major triad.
pub fn quality_token(input: &mut &str) -> QualityToken {
    for entry in QUALITY_TOKENS {
        if let Some(rest) = input.strip_prefix(entry.token) {
            *input = rest;
            return *entry;
        }
    }
    BARE_TRIAD
}
