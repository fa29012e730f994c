//! Root and extension/alteration parsing using winnow combinators.

use winnow::combinator::{alt, delimited, opt, repeat, terminated};
use winnow::prelude::*;
use winnow::token::{any, take_while};

use crate::chord::{Alteration, Extension};
use crate::pitch::{Accidental, NoteLetter, PitchClass};

type PResult<T> = winnow::ModalResult<T>;

/// One token after the quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Extension(Extension),
    Alteration(Alteration),
    Alt,
}

/// Parse a root letter with at most one accidental.
pub fn parse_root(input: &mut &str) -> PResult<PitchClass> {
    let letter = any.verify_map(NoteLetter::from_char).parse_next(input)?;
    let accidental = opt(alt((
        '#'.value(Accidental::Sharp),
        'b'.value(Accidental::Flat),
    )))
    .parse_next(input)?;
    Ok(letter.with_accidental(accidental))
}

/// Parse a single extension/alteration token.
pub fn parse_modifier(input: &mut &str) -> PResult<Modifier> {
    alt((
        "alt".value(Modifier::Alt),
        "b13".value(Modifier::Alteration(Alteration::FlatThirteen)),
        "b9".value(Modifier::Alteration(Alteration::FlatNine)),
        "#11".value(Modifier::Alteration(Alteration::SharpEleven)),
        "#9".value(Modifier::Alteration(Alteration::SharpNine)),
        "13".value(Modifier::Extension(Extension::Thirteen)),
        "11".value(Modifier::Extension(Extension::Eleven)),
        "9".value(Modifier::Extension(Extension::Nine)),
    ))
    .parse_next(input)
}

/// Parse a parenthesized list: `(b9,#11)`, `(b9 13)`, `(9)`.
fn parse_modifier_list(input: &mut &str) -> PResult<Vec<Modifier>> {
    delimited(
        ('(', take_while(0.., ' ')),
        repeat(
            1..,
            terminated(parse_modifier, take_while(0.., [',', ' '])),
        ),
        ')',
    )
    .parse_next(input)
}

fn parse_modifier_group(input: &mut &str) -> PResult<Vec<Modifier>> {
    alt((parse_modifier_list, parse_modifier.map(|m| vec![m]))).parse_next(input)
}

/// Parse every modifier group up to the first unrecognized input.
pub fn parse_modifiers(input: &mut &str) -> PResult<Vec<Modifier>> {
    let groups: Vec<Vec<Modifier>> = repeat(0.., parse_modifier_group).parse_next(input)?;
    Ok(groups.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root_natural() {
        let mut input = "G7";
        assert_eq!(parse_root(&mut input).unwrap(), PitchClass::G);
        assert_eq!(input, "7");
    }

    #[test]
    fn test_parse_root_accidentals() {
        let mut input = "Bbmaj7";
        assert_eq!(parse_root(&mut input).unwrap(), PitchClass::new(10));
        assert_eq!(input, "maj7");

        let mut input = "F#m7";
        assert_eq!(parse_root(&mut input).unwrap(), PitchClass::new(6));
        assert_eq!(input, "m7");
    }

    #[test]
    fn test_parse_root_rejects_lowercase() {
        let mut input = "dm7";
        assert!(parse_root(&mut input).is_err());
    }

    #[test]
    fn test_parse_modifier_prefers_longer_tokens() {
        let mut input = "b13";
        assert_eq!(
            parse_modifier(&mut input).unwrap(),
            Modifier::Alteration(Alteration::FlatThirteen)
        );
        assert_eq!(input, "");
    }

    #[test]
    fn test_parse_modifier_list_with_separators() {
        let mut input = "(b9, #11)";
        let mods = parse_modifier_list(&mut input).unwrap();
        assert_eq!(
            mods,
            vec![
                Modifier::Alteration(Alteration::FlatNine),
                Modifier::Alteration(Alteration::SharpEleven),
            ]
        );
        assert_eq!(input, "");
    }

    #[test]
    fn test_parse_modifiers_mixed_groups() {
        let mut input = "b9(13)#11";
        let mods = parse_modifiers(&mut input).unwrap();
        assert_eq!(mods.len(), 3);
        assert_eq!(mods[1], Modifier::Extension(Extension::Thirteen));
        assert_eq!(input, "");
    }

    #[test]
    fn test_parse_modifiers_stops_at_unknown_token() {
        let mut input = "#9b5";
        let mods = parse_modifiers(&mut input).unwrap();
        assert_eq!(mods, vec![Modifier::Alteration(Alteration::SharpNine)]);
        assert_eq!(input, "b5");
    }

    #[test]
    fn test_unclosed_list_is_left_unconsumed() {
        let mut input = "(b9";
        let mods = parse_modifiers(&mut input).unwrap();
        assert!(mods.is_empty());
        assert_eq!(input, "(b9");
    }
}
