//! The full analysis of one selection.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chord::{Tension, ToneRole};
use crate::coverage::CoverageMetrics;
use crate::events::{BarSpan, Selection};
use crate::pattern::{self, FunctionalPatternMatch, KeyMode};
use crate::pitch::PitchClass;
use crate::resolution::{candidates_in, select_target, AnalysisParams, ResolutionTarget};
use crate::tension::{self, sweep};

/// Current algorithm version; bump when any analysis result can change.
pub const CURRENT_VERSION: u32 = 1;

/// Everything the engine derives from a selection.
///
/// Consumers treat this as read-only grounding and never re-derive fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalAnalysis {
    pub version: u32,
    /// Label of the primary pattern, e.g. `ii-V-I`; `none` without chords.
    pub function_label: String,
    pub key_center: Option<PitchClass>,
    pub key_mode: Option<KeyMode>,
    /// Key name spelled for the key, e.g. `Eb` or `F#m`.
    pub key_label: Option<String>,
    pub resolution: Option<ResolutionTarget>,
    pub resolution_role: ToneRole,
    pub tensions_used: BTreeSet<Tension>,
    pub unresolved_tensions: BTreeSet<Tension>,
    pub chord_tone_coverage: f64,
    pub guide_tone_coverage: f64,
    pub coverage: CoverageMetrics,
    pub bar_span: Option<BarSpan>,
    pub patterns: Vec<FunctionalPatternMatch>,
}

/// Analyze a selection.
///
/// Pattern detection runs first; the resolution target is scored against
/// the terminal chord segment it leaves behind.
pub fn analyze(selection: &Selection<'_>, params: &AnalysisParams) -> FunctionalAnalysis {
    let active = selection.active_chords();
    let notes = selection.notes();

    let patterns = pattern::detect_in(&active);
    let primary = pattern::primary(&patterns, selection.bars().map(|b| b.end));
    let key = primary.map(|m| m.key_center);

    let resolution = pattern::segments(&active).last().and_then(|terminal| {
        let candidates = candidates_in(notes, selection.note_offset(), terminal.bars);
        select_target(&candidates, terminal.chord, params)
    });

    let classified = sweep(notes, &active);
    let coverage = CoverageMetrics::from_classified(&classified);

    let analysis = FunctionalAnalysis {
        version: CURRENT_VERSION,
        function_label: primary
            .map(|m| m.kind.label())
            .unwrap_or("none")
            .to_string(),
        key_center: key.map(|k| k.tonic),
        key_mode: key.map(|k| k.mode),
        key_label: key.map(|k| k.label()),
        resolution_role: resolution.map(|r| r.role).unwrap_or(ToneRole::None),
        resolution,
        tensions_used: tension::tensions_used(&classified),
        unresolved_tensions: tension::unresolved_tensions(&active),
        chord_tone_coverage: coverage.chord_tone_pct,
        guide_tone_coverage: coverage.guide_tone_pct,
        coverage,
        bar_span: selection.bars(),
        patterns,
    };

    debug!(
        function = %analysis.function_label,
        key = ?analysis.key_label,
        notes = coverage.total_notes,
        "analyzed selection"
    );

    analysis
}
