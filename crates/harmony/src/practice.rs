//! Practice packs: one selection rendered in many keys.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::UnknownKeyError;
use crate::events::{NoteEvent, Selection};
use crate::pattern::{self, KeyCenter, KeyMode};
use crate::pitch::{PitchClass, Spelling};
use crate::transpose::transpose;

/// Which keys to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackRequest {
    /// Key names such as `Eb` or `F#`; `None` renders all twelve.
    pub target_keys: Option<Vec<String>>,
    /// Put the source key first when the targets leave it out.
    pub include_original: bool,
}

impl Default for PackRequest {
    fn default() -> Self {
        PackRequest {
            target_keys: None,
            include_original: true,
        }
    }
}

/// A transposed note with its spelled name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackNote {
    #[serde(flatten)]
    pub note: NoteEvent,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackChord {
    pub bar: u32,
    pub symbol: String,
}

/// The selection rendered in one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyEntry {
    pub key: String,
    pub interval_semitones: u8,
    pub notes: Vec<PackNote>,
    pub chords: Vec<PackChord>,
    pub file_name: String,
}

/// A key that could not be rendered because a note left the MIDI range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFailure {
    pub key: String,
    pub interval_semitones: u8,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticePack {
    pub source_key: String,
    pub keys: Vec<KeyEntry>,
    pub failures: Vec<KeyFailure>,
}

impl PracticePack {
    pub fn keys_included(&self) -> Vec<&str> {
        self.keys.iter().map(|k| k.key.as_str()).collect()
    }

    /// Summary written next to the per-key files.
    pub fn manifest(&self) -> serde_json::Value {
        serde_json::json!({
            "source_key": self.source_key,
            "keys_included": self.keys_included(),
            "files": self.keys.iter().map(|k| k.file_name.as_str()).collect::<Vec<_>>(),
            "failures": self.failures,
        })
    }
}

/// A requested target key: tonic plus the spelling the name asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TargetKey {
    tonic: PitchClass,
    name: String,
    spelling: Spelling,
}

/// Parse a key name. A trailing `m` is accepted; the mode always follows
/// the source key.
fn parse_target(name: &str, mode: KeyMode) -> Result<TargetKey, UnknownKeyError> {
    let trimmed = name.trim();
    let tonic_name = trimmed.strip_suffix('m').unwrap_or(trimmed);
    let tonic = PitchClass::from_name(tonic_name).ok_or_else(|| UnknownKeyError {
        name: name.to_string(),
    })?;
    let spelling = if tonic_name.ends_with('#') {
        Spelling::Sharps
    } else if tonic_name.len() > 1 && tonic_name.ends_with('b') {
        Spelling::Flats
    } else {
        KeyCenter { tonic, mode }.spelling()
    };
    Ok(TargetKey {
        tonic,
        name: tonic_name.to_string(),
        spelling,
    })
}

fn default_target(center: KeyCenter) -> TargetKey {
    let spelling = center.spelling();
    TargetKey {
        tonic: center.tonic,
        name: center.tonic.name(spelling).to_string(),
        spelling,
    }
}

/// `#` becomes `sharp` and `b` becomes `flat`, so `Bb` writes `Bflat.json`.
pub fn file_name_for(key: &str) -> String {
    format!("{}.json", key.replace('#', "sharp").replace('b', "flat"))
}

/// Render `selection` in every requested key.
///
/// The source key is the selection's primary key center, or C major when
/// it has no chords. A key whose transposition leaves the MIDI range is
/// reported in `failures` and the rest are still rendered.
pub fn build_pack(
    selection: &Selection<'_>,
    request: &PackRequest,
) -> Result<PracticePack, UnknownKeyError> {
    let patterns = pattern::detect_in(&selection.active_chords());
    let source = pattern::primary(&patterns, selection.bars().map(|b| b.end))
        .map(|m| m.key_center)
        .unwrap_or(KeyCenter::major(PitchClass::C));

    let mut targets: Vec<TargetKey> = match &request.target_keys {
        Some(names) => names
            .iter()
            .map(|name| parse_target(name, source.mode))
            .collect::<Result<_, _>>()?,
        None => (0..12)
            .map(|semitone| default_target(source.transpose(semitone)))
            .collect(),
    };

    if request.include_original && !targets.iter().any(|t| t.tonic == source.tonic) {
        targets.insert(0, default_target(source));
    }

    let mut pack = PracticePack {
        source_key: source.label(),
        keys: Vec::with_capacity(targets.len()),
        failures: Vec::new(),
    };

    for target in targets {
        let interval = source.tonic.interval_to(target.tonic);
        let key = match source.mode {
            KeyMode::Major => target.name.clone(),
            KeyMode::Minor => format!("{}m", target.name),
        };

        match transpose(selection, interval as i32) {
            Ok(moved) => {
                let notes = moved
                    .notes
                    .iter()
                    .map(|note| PackNote {
                        note: *note,
                        name: note.spelled(target.spelling),
                    })
                    .collect();
                let chords = moved
                    .chords
                    .iter()
                    .map(|event| PackChord {
                        bar: event.bar,
                        symbol: event.chord.symbol(target.spelling),
                    })
                    .collect();
                debug!(key = %key, interval, "rendered key");
                pack.keys.push(KeyEntry {
                    file_name: file_name_for(&key),
                    key,
                    interval_semitones: interval,
                    notes,
                    chords,
                });
            }
            Err(err) => {
                warn!(key = %key, interval, error = %err, "skipping key");
                pack.failures.push(KeyFailure {
                    key,
                    interval_semitones: interval,
                    reason: err.to_string(),
                });
            }
        }
    }

    Ok(pack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::test_support::{chord, note};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_file_names() {
        assert_eq!(file_name_for("Bb"), "Bflat.json");
        assert_eq!(file_name_for("F#"), "Fsharp.json");
        assert_eq!(file_name_for("C"), "C.json");
        assert_eq!(file_name_for("Ebm"), "Eflatm.json");
    }

    #[test]
    fn test_all_twelve_keys_from_source() {
        let notes = vec![note(62, 1, 1.0, 1.0), note(64, 3, 1.0, 2.0)];
        let chords = vec![chord(1, "Dm7"), chord(2, "G7"), chord(3, "Cmaj7")];
        let selection = Selection::all(&notes, &chords);
        let pack = build_pack(&selection, &PackRequest::default()).unwrap();

        assert_eq!(pack.source_key, "C");
        assert_eq!(
            pack.keys_included(),
            vec!["C", "Db", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B"]
        );
        assert!(pack.failures.is_empty());

        let eb = &pack.keys[3];
        assert_eq!(eb.interval_semitones, 3);
        assert_eq!(eb.file_name, "Eflat.json");
        assert_eq!(eb.notes[0].name, "F4");
        assert_eq!(eb.notes[1].name, "G4");
        let symbols: Vec<&str> = eb.chords.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["Fm7", "Bb7", "Ebmaj7"]);
    }

    #[test]
    fn test_include_original_inserts_source_first() {
        let notes = vec![note(65, 1, 1.0, 1.0)];
        let chords = vec![chord(1, "C7"), chord(2, "Fmaj7")];
        let selection = Selection::all(&notes, &chords);

        let request = PackRequest {
            target_keys: Some(vec!["G".into(), "A#".into()]),
            include_original: true,
        };
        let pack = build_pack(&selection, &request).unwrap();
        assert_eq!(pack.source_key, "F");
        assert_eq!(pack.keys_included(), vec!["F", "G", "A#"]);
        // an explicit sharp name keeps sharps
        assert_eq!(pack.keys[2].notes[0].name, "A#4");
        assert_eq!(pack.keys[2].file_name, "Asharp.json");

        let request = PackRequest {
            include_original: false,
            ..request
        };
        let pack = build_pack(&selection, &request).unwrap();
        assert_eq!(pack.keys_included(), vec!["G", "A#"]);
    }

    #[test]
    fn test_no_chords_defaults_to_c() {
        let notes = vec![note(60, 1, 1.0, 1.0)];
        let selection = Selection::all(&notes, &[]);
        let request = PackRequest {
            target_keys: Some(vec!["D".into()]),
            include_original: true,
        };
        let pack = build_pack(&selection, &request).unwrap();
        assert_eq!(pack.source_key, "C");
        assert_eq!(pack.keys_included(), vec!["C", "D"]);
        assert_eq!(pack.keys[1].notes[0].note.midi, 62);
    }

    #[test]
    fn test_minor_source_keeps_mode() {
        let notes = vec![note(69, 3, 1.0, 1.0)];
        let chords = vec![chord(1, "Bm7b5"), chord(2, "E7alt"), chord(3, "Am7")];
        let selection = Selection::all(&notes, &chords);
        let request = PackRequest {
            target_keys: Some(vec!["Dm".into()]),
            include_original: false,
        };
        let pack = build_pack(&selection, &request).unwrap();
        assert_eq!(pack.source_key, "Am");
        assert_eq!(pack.keys_included(), vec!["Dm"]);
        // D minor spells like F major
        let symbols: Vec<&str> = pack.keys[0].chords.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["Em7b5", "A7alt", "Dm7"]);
    }

    #[test]
    fn test_out_of_range_keys_are_collected() {
        let notes = vec![note(120, 1, 1.0, 1.0)];
        let chords = vec![chord(1, "Cmaj7")];
        let selection = Selection::all(&notes, &chords);
        let pack = build_pack(&selection, &PackRequest::default()).unwrap();

        // 120 + 8 leaves the range; everything above G fails
        assert_eq!(pack.keys.len(), 8);
        assert_eq!(pack.failures.len(), 4);
        assert_eq!(pack.failures[0].key, "Ab");
        assert_eq!(pack.failures[0].interval_semitones, 8);
    }

    #[test]
    fn test_unknown_key_name() {
        let notes = vec![note(60, 1, 1.0, 1.0)];
        let selection = Selection::all(&notes, &[]);
        let request = PackRequest {
            target_keys: Some(vec!["H".into()]),
            include_original: true,
        };
        assert_eq!(
            build_pack(&selection, &request).unwrap_err(),
            UnknownKeyError { name: "H".into() }
        );
    }

    #[test]
    fn test_manifest_lists_files() {
        let notes = vec![note(60, 1, 1.0, 1.0)];
        let selection = Selection::all(&notes, &[]);
        let request = PackRequest {
            target_keys: Some(vec!["Bb".into()]),
            include_original: false,
        };
        let pack = build_pack(&selection, &request).unwrap();
        let manifest = pack.manifest();
        assert_eq!(manifest["source_key"], "C");
        assert_eq!(manifest["files"][0], "Bflat.json");
    }
}
