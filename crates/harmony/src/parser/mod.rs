//! Chord-symbol parser.
//!
//! Grammar, in matching priority order:
//! 1. root letter `A`-`G` with at most one `#` or `b`
//! 2. longest-match quality token from [`quality::QUALITY_TOKENS`]
//! 3. zero or more extension/alteration tokens, bare or parenthesized
//!
//! Unlike the ABC parser this is strict: anything outside the grammar is a
//! [`ChordParseError`] so the caller can show it at the point of entry.

mod modifier;
pub mod quality;

use std::collections::BTreeSet;

use crate::chord::{Alteration, Chord};
use crate::error::ChordParseError;

pub use modifier::Modifier;
pub use quality::{QualityToken, GRAMMAR_VERSION, QUALITY_TOKENS};

/// Parse a chord symbol such as `Dm7`, `G7alt`, `Bbmaj7(#11)` or `F#m7b5`.
pub fn parse(symbol: &str) -> Result<Chord, ChordParseError> {
    let trimmed = symbol.trim();
    if trimmed.is_empty() {
        return Err(ChordParseError::Empty);
    }

    let mut input = trimmed;

    let root = modifier::parse_root(&mut input).map_err(|_| ChordParseError::UnknownRoot {
        symbol: trimmed.to_string(),
    })?;

    let quality = quality::quality_token(&mut input);

    let modifiers = modifier::parse_modifiers(&mut input).map_err(|_| {
        ChordParseError::UnsupportedToken {
            symbol: trimmed.to_string(),
            token: input.to_string(),
            offset: trimmed.len() - input.len(),
        }
    })?;

    if !input.is_empty() {
        return Err(ChordParseError::UnsupportedToken {
            symbol: trimmed.to_string(),
            token: input.to_string(),
            offset: trimmed.len() - input.len(),
        });
    }

    build_chord(trimmed, root, quality, &modifiers)
}

fn build_chord(
    symbol: &str,
    root: crate::pitch::PitchClass,
    quality: QualityToken,
    modifiers: &[Modifier],
) -> Result<Chord, ChordParseError> {
    let mut chord = Chord::new(root, quality.quality);
    chord.extensions.extend(quality.implies);

    for modifier in modifiers {
        match modifier {
            Modifier::Extension(ext) => {
                chord.extensions.insert(*ext);
            }
            Modifier::Alteration(alteration) => {
                chord.alterations.insert(*alteration);
            }
            Modifier::Alt => {
                chord.altered = true;
                chord.alterations.extend(Alteration::ALT);
            }
        }
    }

    check_conflicts(symbol, &chord)?;
    Ok(chord)
}

/// Reject a natural and an altered form of the same degree (`9` with `b9`),
/// and `alt` alongside any natural extension.
fn check_conflicts(symbol: &str, chord: &Chord) -> Result<(), ChordParseError> {
    let conflict = |first: &str, second: &str| ChordParseError::ConflictingTension {
        symbol: symbol.to_string(),
        first: first.to_string(),
        second: second.to_string(),
    };

    if chord.altered {
        if let Some(ext) = chord.extensions.iter().next() {
            return Err(conflict("alt", ext.tension().label()));
        }
    }

    let altered_degrees: BTreeSet<_> = chord
        .alterations
        .iter()
        .map(|a| (a.tension().role(), a.tension()))
        .collect();

    for ext in &chord.extensions {
        let natural = ext.tension();
        if let Some((_, altered)) = altered_degrees
            .iter()
            .find(|(role, _)| *role == natural.role())
        {
            return Err(conflict(natural.label(), altered.label()));
        }
    }

    Ok(())
}
