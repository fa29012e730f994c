//! Functional harmony for transcribed licks.
//!
//! Parses chord symbols, finds the cadence a selection outlines, scores the
//! note it resolves to, classifies every note against its bar's chord and
//! transposes the whole selection into other keys. Everything here is pure
//! and synchronous: the same selection always yields the same analysis.
//!
//! ```
//! use harmony::{analyze, AnalysisParams, Chord, ChordEvent, Selection};
//!
//! let chords: Vec<ChordEvent> = ["Dm7", "G7", "Cmaj7"]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, s)| ChordEvent::new(i as u32 + 1, Chord::parse(s).unwrap()))
//!     .collect();
//! let analysis = analyze(&Selection::all(&[], &chords), &AnalysisParams::default());
//! assert_eq!(analysis.function_label, "ii-V-I");
//! assert_eq!(analysis.key_label.as_deref(), Some("C"));
//! ```

pub mod analysis;
pub mod chord;
pub mod coverage;
pub mod error;
pub mod events;
pub mod parser;
pub mod pattern;
pub mod pitch;
pub mod practice;
pub mod resolution;
pub mod tension;
pub mod transpose;

pub use analysis::{analyze, FunctionalAnalysis, CURRENT_VERSION};
pub use chord::{Alteration, Chord, ChordQuality, ChordTone, Extension, Tension, ToneRole};
pub use coverage::{coverage, CoverageMetrics};
pub use error::{ChordParseError, SelectionError, TranspositionRangeError, UnknownKeyError};
pub use events::{BarSpan, ChordEvent, Lick, NoteEvent, Selection};
pub use pattern::{detect, FunctionalPatternMatch, KeyCenter, KeyMode, PatternKind};
pub use pitch::{PitchClass, Spelling};
pub use practice::{build_pack, KeyEntry, KeyFailure, PackRequest, PracticePack};
pub use resolution::{select_target, AnalysisParams, ResolutionTarget};
pub use tension::{classify, NoteClass};
pub use transpose::{transpose, transpose_all, TransposedSelection};

/// Analysis entry point bound to one set of metric parameters.
///
/// Holds no state beyond the parameters, so one engine can serve any
/// number of selections from any thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct HarmonyEngine {
    params: AnalysisParams,
}

impl HarmonyEngine {
    pub fn new(params: AnalysisParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AnalysisParams {
        &self.params
    }

    pub fn analyze(&self, selection: &Selection<'_>) -> FunctionalAnalysis {
        analysis::analyze(selection, &self.params)
    }

    /// The selection in all twelve keys, offsets 0 through 11.
    pub fn all_keys(
        &self,
        selection: &Selection<'_>,
    ) -> Vec<(i32, Result<TransposedSelection, TranspositionRangeError>)> {
        let offsets: Vec<i32> = (0..12).collect();
        transpose::transpose_all(selection, &offsets)
    }

    pub fn practice_pack(
        &self,
        selection: &Selection<'_>,
        request: &PackRequest,
    ) -> Result<PracticePack, UnknownKeyError> {
        practice::build_pack(selection, request)
    }
}
