//! licklab - functional harmony analysis for transcribed licks
//!
//! Subcommands:
//! - `licklab chord <SYMBOL>...` - Parse chord symbols and show their tones
//! - `licklab analyze <INPUT>` - Analyze a lick or a part of it
//! - `licklab transpose <INPUT> --offset N` - Shift a lick by N semitones
//! - `licklab pack <INPUT>` - Write a twelve-key practice pack
//! - `licklab config` - Print the effective configuration

use std::ops::Range;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lickconf::LickConfig;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "licklab")]
#[command(about = "Analyze transcribed licks and build twelve-key practice packs")]
#[command(version)]
struct Cli {
    /// Config file to use instead of ./licklab.toml
    #[arg(long, global = true, env = "LICKLAB_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Which notes of the input to analyze.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SelectArgs {
    /// Note index range, e.g. 4..9 (end exclusive)
    #[arg(long, value_parser = parse_note_range, conflicts_with_all = ["from", "to"])]
    notes: Option<Range<usize>>,

    /// Select notes starting at or after this many seconds
    #[arg(long, requires = "to")]
    from: Option<f64>,

    /// Select notes starting before this many seconds
    #[arg(long, requires = "from")]
    to: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse chord symbols and print tones and tensions as JSON
    Chord {
        /// Chord symbols, e.g. Dm7 G7alt Cmaj7(#11)
        #[arg(required = true)]
        symbols: Vec<String>,
    },

    /// Analyze a lick and print the analysis as JSON
    Analyze {
        /// Lick file (JSON with notes and chords)
        input: PathBuf,

        #[command(flatten)]
        select: SelectArgs,
    },

    /// Transpose a lick and print the result as JSON
    Transpose {
        /// Lick file (JSON with notes and chords)
        input: PathBuf,

        /// Semitones to shift by; negative moves down
        #[arg(short, long, allow_hyphen_values = true)]
        offset: i32,

        #[command(flatten)]
        select: SelectArgs,
    },

    /// Write the lick in every key as a practice pack
    Pack {
        /// Lick file (JSON with notes and chords)
        input: PathBuf,

        /// Output directory (default: practice.output_dir from config)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Only these keys, comma separated, e.g. Eb,F#,Bb
        #[arg(short, long, value_delimiter = ',')]
        keys: Vec<String>,

        /// Do not add the source key when --keys leaves it out
        #[arg(long)]
        no_original: bool,

        #[command(flatten)]
        select: SelectArgs,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn parse_note_range(s: &str) -> Result<Range<usize>, String> {
    let (start, end) = s
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got '{}'", s))?;
    let start: usize = start
        .trim()
        .parse()
        .map_err(|_| format!("bad range start '{}'", start))?;
    let end: usize = end
        .trim()
        .parse()
        .map_err(|_| format!("bad range end '{}'", end))?;
    Ok(start..end)
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    // stdout carries JSON; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, sources) = LickConfig::load_with_sources_from(cli.config.as_deref())
        .context("loading configuration")?;
    init_tracing(&config.logging.level);
    tracing::debug!(files = ?sources.files, env = ?sources.env_overrides, "configuration loaded");

    match cli.command {
        Commands::Chord { symbols } => commands::chord(&symbols)?,
        Commands::Analyze { input, select } => commands::analyze(&config, &input, &select)?,
        Commands::Transpose {
            input,
            offset,
            select,
        } => commands::transpose(&input, offset, &select)?,
        Commands::Pack {
            input,
            out,
            keys,
            no_original,
            select,
        } => {
            let keys = (!keys.is_empty()).then_some(keys);
            commands::pack(&config, &input, out, keys, no_original, &select)?
        }
        Commands::Config => commands::print_config(&config, &sources),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_note_range() {
        assert_eq!(parse_note_range("4..9"), Ok(4..9));
        assert_eq!(parse_note_range(" 0 .. 3 "), Ok(0..3));
        assert!(parse_note_range("4-9").is_err());
        assert!(parse_note_range("a..3").is_err());
    }
}
