//! CLI command implementations

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use harmony::{
    AnalysisParams, Chord, HarmonyEngine, Lick, PackRequest, Selection, Spelling, Tension,
    ToneRole,
};
use lickconf::{ConfigSources, LickConfig};
use serde::Serialize;
use tracing::info;

use crate::SelectArgs;

/// Load a lick file; every chord symbol is parsed on the way in.
fn load_lick(path: &Path) -> Result<Lick> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading lick file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parsing lick file {}", path.display()))
}

fn select<'a>(lick: &'a Lick, args: &SelectArgs) -> Result<Selection<'a>> {
    let selection = match (&args.notes, args.from, args.to) {
        (Some(range), _, _) => Selection::new(&lick.notes, &lick.chords, range.clone())?,
        (None, Some(from), Some(to)) => {
            if lick.notes.windows(2).any(|w| w[1].start_sec < w[0].start_sec) {
                bail!("--from/--to needs notes ordered by onset");
            }
            Selection::from_time_window(&lick.notes, &lick.chords, from, to)?
        }
        _ => lick.selection(),
    };
    selection.validate()?;
    Ok(selection)
}

fn engine(config: &LickConfig) -> HarmonyEngine {
    HarmonyEngine::new(AnalysisParams {
        beats_per_bar: config.analysis.beats_per_bar,
        strong_beat_tolerance: config.analysis.strong_beat_tolerance,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value)?;
    println!("{}", output);
    Ok(())
}

#[derive(Serialize)]
struct ToneReport {
    name: &'static str,
    role: ToneRole,
}

#[derive(Serialize)]
struct ChordReport {
    input: String,
    symbol: String,
    root: &'static str,
    quality: harmony::ChordQuality,
    chord_tones: Vec<ToneReport>,
    available_tensions: Vec<Tension>,
    unresolved_tensions: Vec<Tension>,
}

impl ChordReport {
    fn new(input: &str, chord: &Chord) -> Self {
        let spelling = Spelling::for_key(chord.root);
        Self {
            input: input.to_string(),
            symbol: chord.symbol(spelling),
            root: chord.root.name(spelling),
            quality: chord.quality,
            chord_tones: chord
                .chord_tones()
                .into_iter()
                .map(|tone| ToneReport {
                    name: tone.pitch_class.name(spelling),
                    role: tone.role,
                })
                .collect(),
            available_tensions: chord.available_tensions().into_iter().collect(),
            unresolved_tensions: chord.unresolved_tensions().into_iter().collect(),
        }
    }
}

/// Parse each symbol and print its tones and tensions.
pub fn chord(symbols: &[String]) -> Result<()> {
    let reports = symbols
        .iter()
        .map(|symbol| {
            let chord = Chord::parse(symbol)
                .with_context(|| format!("parsing chord symbol '{}'", symbol))?;
            Ok(ChordReport::new(symbol, &chord))
        })
        .collect::<Result<Vec<_>>>()?;
    print_json(&reports)
}

pub fn analyze(config: &LickConfig, input: &Path, args: &SelectArgs) -> Result<()> {
    let lick = load_lick(input)?;
    let selection = select(&lick, args)?;
    let analysis = engine(config).analyze(&selection);
    print_json(&analysis)
}

pub fn transpose(input: &Path, offset: i32, args: &SelectArgs) -> Result<()> {
    let lick = load_lick(input)?;
    let selection = select(&lick, args)?;
    let moved = harmony::transpose(&selection, offset)
        .with_context(|| format!("transposing by {} semitones", offset))?;
    print_json(&moved)
}

/// Write `<key>.json` per key plus `manifest.json`, then print the manifest.
pub fn pack(
    config: &LickConfig,
    input: &Path,
    out: Option<PathBuf>,
    keys: Option<Vec<String>>,
    no_original: bool,
    args: &SelectArgs,
) -> Result<()> {
    let lick = load_lick(input)?;
    let selection = select(&lick, args)?;

    let request = PackRequest {
        target_keys: keys,
        include_original: config.practice.include_original && !no_original,
    };
    let pack = engine(config).practice_pack(&selection, &request)?;

    let out_dir = out.unwrap_or_else(|| config.practice.output_dir.clone());
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating pack directory {}", out_dir.display()))?;

    for entry in &pack.keys {
        let path = out_dir.join(&entry.file_name);
        let json = serde_json::to_string_pretty(entry)?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    }

    let manifest = pack.manifest();
    let manifest_path = out_dir.join("manifest.json");
    fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)
        .with_context(|| format!("writing {}", manifest_path.display()))?;

    info!(
        dir = %out_dir.display(),
        keys = pack.keys.len(),
        failures = pack.failures.len(),
        source = %pack.source_key,
        "practice pack written"
    );

    print_json(&manifest)
}

pub fn print_config(config: &LickConfig, sources: &ConfigSources) {
    for file in &sources.files {
        println!("# from {}", file.display());
    }
    for var in &sources.env_overrides {
        println!("# env {}", var);
    }
    print!("{}", config.to_toml());
}
