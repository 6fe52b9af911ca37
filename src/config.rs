//! Run options for the morph test harness.
//!
//! [`MorphOptions`] enumerates every recognised option. The CLI fills it
//! once at startup; after that it is only read.

use std::path::PathBuf;

/// Section used when the caller does not pick one.
pub const DEFAULT_SECTION: &str = "hfst";

/// Program used when a section does not name one.
pub const DEFAULT_APP: &str = "hfst-lookup";

/// Statistics file written by `--statistics` without an argument.
pub const DEFAULT_STATISTICS_FILE: &str = "quality-stats.json";

/// Options controlling a single morph test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorphOptions {
    /// Render one summary line per group-direction instead of every result.
    pub compact: bool,
    /// Do not penalise missing forms for keys that got at least one hit.
    pub ignore_extra_analyses: bool,
    /// Run surface/analysis tests only.
    pub surface_only: bool,
    /// Run lexical/generation tests only.
    pub lexical_only: bool,
    /// Suppress pass events in the report.
    pub hide_passes: bool,
    /// Suppress fail events in the report.
    pub hide_fails: bool,
    /// Name of the `Config` section to use.
    pub section: String,
    /// Run only the test group with this name.
    pub test: Option<String>,
    /// Log progress while running.
    pub verbose: bool,
    /// Colour the report with ANSI escapes.
    pub colour: bool,
    /// Overrides the section's `App`.
    pub app: Option<String>,
    /// Overrides the section's `Gen`.
    pub gen: Option<PathBuf>,
    /// Overrides the section's `Morph`.
    pub morph: Option<PathBuf>,
    /// Statistics file to merge the run's record into.
    pub statistics: Option<PathBuf>,
}

impl Default for MorphOptions {
    fn default() -> Self {
        Self {
            compact: false,
            ignore_extra_analyses: false,
            surface_only: false,
            lexical_only: false,
            hide_passes: false,
            hide_fails: false,
            section: DEFAULT_SECTION.to_string(),
            test: None,
            verbose: false,
            colour: false,
            app: None,
            gen: None,
            morph: None,
            statistics: None,
        }
    }
}

impl MorphOptions {
    /// Whether lexical/generation tests run.
    ///
    /// Asking for neither direction means both.
    pub fn runs_lexical(&self) -> bool {
        self.lexical_only || !self.surface_only
    }

    /// Whether surface/analysis tests run.
    pub fn runs_surface(&self) -> bool {
        self.surface_only || !self.lexical_only
    }
}
