//! End-to-end morph test runs.
//!
//! [`MorphHarness`] ties the pieces together: it holds a loaded
//! specification and resolved section, sends the pooled queries of the
//! selected groups through both transducers concurrently, checks the
//! answers and renders the report.

use crate::checker::{check, CheckOptions, CheckReport};
use crate::config::MorphOptions;
use crate::error::{MorphError, MorphResult};
use crate::report::{colorizer, render, ReportStyle};
use crate::spec::{Section, SpecDocument, TestGroup};
use crate::stats::{svn_revision, MorphRecord};
use crate::transducer::{lookup_both, BatchRequest, Direction, Lookup, ProcessLookup};
use std::collections::HashSet;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct MorphRun {
    /// Events and counts.
    pub report: CheckReport,
    /// Wall-clock time from the start of lookups to the end of checking.
    pub elapsed: Duration,
}

/// A morph test run ready to execute.
pub struct MorphHarness<L: Lookup = ProcessLookup> {
    document: SpecDocument,
    section: Section,
    options: MorphOptions,
    lookup: L,
}

impl MorphHarness<ProcessLookup> {
    /// Load the specification at `path` and resolve the section named in
    /// `options`. Fails if the section, program or transducers are missing.
    pub fn load<P: AsRef<Path>>(path: P, options: MorphOptions) -> MorphResult<Self> {
        let document = SpecDocument::load(path)?;
        let section = document.section(&options)?;
        let lookup = ProcessLookup::new(section.command.clone());
        Ok(Self::with_lookup(document, section, options, lookup))
    }
}

impl<L: Lookup> MorphHarness<L> {
    /// Assemble a harness around an arbitrary lookup backend.
    pub fn with_lookup(
        document: SpecDocument,
        section: Section,
        options: MorphOptions,
        lookup: L,
    ) -> Self {
        Self {
            document,
            section,
            options,
            lookup,
        }
    }

    /// The loaded specification.
    pub fn document(&self) -> &SpecDocument {
        &self.document
    }

    /// The resolved section.
    pub fn section(&self) -> &Section {
        &self.section
    }

    /// The run options.
    pub fn options(&self) -> &MorphOptions {
        &self.options
    }

    /// Directions to evaluate: those the options ask for whose transducer
    /// is configured.
    pub fn directions(&self) -> MorphResult<Vec<Direction>> {
        let mut directions = Vec::with_capacity(2);
        for (wanted, configured, direction) in [
            (
                self.options.runs_lexical(),
                self.section.gen.is_some(),
                Direction::Generation,
            ),
            (
                self.options.runs_surface(),
                self.section.morph.is_some(),
                Direction::Analysis,
            ),
        ] {
            match (wanted, configured) {
                (true, true) => directions.push(direction),
                (true, false) => warn!(
                    %direction,
                    section = %self.section.name,
                    "no transducer configured, skipping direction"
                ),
                _ => {}
            }
        }

        if directions.is_empty() {
            return Err(MorphError::config(format!(
                "Nothing to test: section '{}' has no transducer for the requested direction.",
                self.section.name
            )));
        }
        Ok(directions)
    }

    /// Lookup batches for `groups`: their lexical keys for generation and
    /// their surface forms for analysis, each pooled without duplicates in
    /// order of first appearance.
    pub fn requests(
        &self,
        groups: &[&TestGroup],
        directions: &[Direction],
    ) -> (Option<BatchRequest>, Option<BatchRequest>) {
        let mut gen = None;
        let mut morph = None;

        for &direction in directions {
            match direction {
                Direction::Generation => {
                    gen = self.section.gen.as_ref().map(|file| BatchRequest {
                        transducer: file.clone(),
                        queries: pool(groups.iter().flat_map(|g| g.iter().map(|(k, _)| k.clone()))),
                    });
                }
                Direction::Analysis => {
                    morph = self.section.morph.as_ref().map(|file| BatchRequest {
                        transducer: file.clone(),
                        queries: pool(
                            groups
                                .iter()
                                .flat_map(|g| g.inverted().into_iter().map(|(k, _)| k)),
                        ),
                    });
                }
            }
        }

        (gen, morph)
    }

    /// Run the lookups and check every selected group.
    pub fn run(&self) -> MorphResult<MorphRun> {
        let groups = self.document.tests.select(self.options.test.as_deref())?;
        let directions = self.directions()?;
        info!(
            program = %self.section.command,
            groups = groups.len(),
            "`{}` will be used for parsing dictionaries",
            self.section.command
        );

        let started = Instant::now();
        let (gen, morph) = self.requests(&groups, &directions);
        let results = lookup_both(&self.lookup, gen, morph)?;
        let report = check(
            &groups,
            &directions,
            &results,
            CheckOptions::from(&self.options),
        )?;
        let elapsed = started.elapsed();

        info!(
            passes = report.totals.passes,
            fails = report.totals.fails,
            elapsed_ms = elapsed.as_millis() as u64,
            "run finished"
        );
        Ok(MorphRun { report, elapsed })
    }

    /// Render a run's report according to the options.
    pub fn render(&self, run: &MorphRun) -> String {
        let colors = colorizer(self.options.colour);
        render(
            &run.report.events,
            ReportStyle::from_compact(self.options.compact),
            colors.as_ref(),
        )
    }

    /// Build the statistics record for a run.
    pub fn record(&self, run: &MorphRun) -> MorphResult<MorphRecord> {
        let spec_dir = match self.document.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        MorphRecord::from_run(
            &self.document.path,
            &self.section,
            &run.report,
            run.elapsed,
            svn_revision(spec_dir),
        )
    }
}

fn pool(keys: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.filter(|k| seen.insert(k.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::ToolCommand;
    use crate::transducer::TransducerResult;
    use std::collections::BTreeSet;
    use std::path::PathBuf;

    const DOC: &str = r#"
Config:
  hfst:
    Gen: gen.hfst
    Morph: morph.hfst
Tests:
  Noun:
    cat<n><sg>: cat
    cat<n><pl>: cats
  More nouns:
    cat<n><pl>: cats
    sheep<n><pl>: [sheep]
    sheep<n><sg>: sheep
"#;

    const GEN_TABLE: &[(&str, &[&str])] = &[
        ("cat<n><sg>", &["cat"]),
        ("cat<n><pl>", &["cats"]),
        ("sheep<n><pl>", &["sheep"]),
        ("sheep<n><sg>", &["sheep"]),
    ];

    const MORPH_TABLE: &[(&str, &[&str])] = &[
        ("cat", &["cat<n><sg>"]),
        ("cats", &["cat<n><pl>"]),
        ("sheep", &["sheep<n><sg>", "sheep<n><pl>"]),
    ];

    /// Answers from fixed tables, picked by transducer file name.
    struct TableLookup;

    impl Lookup for TableLookup {
        fn lookup(&self, transducer: &Path, queries: &[String]) -> MorphResult<TransducerResult> {
            let table = if transducer == Path::new("gen.hfst") {
                GEN_TABLE
            } else {
                MORPH_TABLE
            };
            Ok(queries
                .iter()
                .filter_map(|q| {
                    table.iter().find(|entry| entry.0 == q.as_str()).map(|entry| {
                        let forms: BTreeSet<String> = entry.1.iter().map(|f| f.to_string()).collect();
                        (entry.0.to_string(), forms)
                    })
                })
                .collect())
        }

        fn name(&self) -> &str {
            "table"
        }
    }

    fn harness(options: MorphOptions) -> MorphHarness<TableLookup> {
        let document = SpecDocument::from_yaml_str("tests.yaml", DOC).unwrap();
        let section = Section {
            name: "hfst".to_string(),
            command: ToolCommand {
                line: "table".to_string(),
                program: PathBuf::from("table"),
                args: Vec::new(),
            },
            gen: Some(PathBuf::from("gen.hfst")),
            morph: Some(PathBuf::from("morph.hfst")),
        };
        MorphHarness::with_lookup(document, section, options, TableLookup)
    }

    #[test]
    fn test_requests_pool_keys() {
        let h = harness(MorphOptions::default());
        let groups = h.document().tests.select(None).unwrap();
        let (gen, morph) = h.requests(&groups, &[Direction::Generation, Direction::Analysis]);

        assert_eq!(
            gen.unwrap().queries,
            ["cat<n><sg>", "cat<n><pl>", "sheep<n><pl>", "sheep<n><sg>"]
        );
        assert_eq!(morph.unwrap().queries, ["cat", "cats", "sheep"]);
    }

    #[test]
    fn test_run_all_groups_pass() {
        let h = harness(MorphOptions::default());
        let run = h.run().unwrap();
        assert_eq!(run.report.totals.fails, 0);
        assert_eq!(run.report.tallies.len(), 4);
        assert_eq!(run.report.totals.passes, 2 + 2 + 3 + 3);
    }

    #[test]
    fn test_run_single_group_single_direction() {
        let h = harness(MorphOptions {
            test: Some("More nouns".to_string()),
            surface_only: true,
            compact: true,
            ..MorphOptions::default()
        });
        let run = h.run().unwrap();
        assert_eq!(run.report.tallies.len(), 1);
        assert_eq!(
            h.render(&run),
            "[PASS] Test 0: More nouns (Surface/Analysis) 3/0/3\n\
             Total passes: 3, Total fails: 0, Total: 3"
        );
    }

    #[test]
    fn test_unknown_test_filter() {
        let h = harness(MorphOptions {
            test: Some("Adverb".to_string()),
            ..MorphOptions::default()
        });
        assert!(matches!(h.run(), Err(MorphError::Config(_))));
    }

    #[test]
    fn test_directions_skip_unconfigured() {
        let mut h = harness(MorphOptions::default());
        h.section.morph = None;
        assert_eq!(h.directions().unwrap(), [Direction::Generation]);

        h.options.surface_only = true;
        assert!(h.directions().is_err());
    }
}
