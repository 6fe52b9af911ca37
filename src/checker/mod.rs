//! Consistency checking of transducer answers against a test specification.
//!
//! Every test group is checked in up to two directions:
//!
//! - **Lexical/Generation**: each lexical key must generate exactly its
//!   expected surface forms.
//! - **Surface/Analysis**: the group is inverted and each surface form must
//!   analyse to exactly the lexical keys that produce it.
//!
//! Counting is per form, not per key. For one key with expected set `E` and
//! actual set `A`, every form of `A ∩ E` is a pass, every form of `A − E` a
//! fail, and every form of `E − A` a fail unless `ignore_extra_analyses` is
//! set and at least one form passed.

use crate::config::MorphOptions;
use crate::error::{MorphError, MorphResult};
use crate::report::{FailureKind, ReportEvent};
use crate::spec::TestGroup;
use crate::transducer::{Direction, LookupResults, TransducerResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::AddAssign;
use tracing::debug;

/// Pass and fail counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    /// Forms that matched.
    pub passes: usize,
    /// Forms that were unexpected or missing.
    pub fails: usize,
}

impl Counts {
    /// Passes plus fails.
    pub fn total(&self) -> usize {
        self.passes + self.fails
    }
}

impl AddAssign for Counts {
    fn add_assign(&mut self, rhs: Self) {
        self.passes += rhs.passes;
        self.fails += rhs.fails;
    }
}

/// The subset of [`MorphOptions`] the checker looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckOptions {
    /// Keys with at least one passing form are not failed for missing forms.
    pub ignore_extra_analyses: bool,
    /// Do not emit success events.
    pub hide_passes: bool,
    /// Do not emit failure events.
    pub hide_fails: bool,
}

impl From<&MorphOptions> for CheckOptions {
    fn from(opts: &MorphOptions) -> Self {
        Self {
            ignore_extra_analyses: opts.ignore_extra_analyses,
            hide_passes: opts.hide_passes,
            hide_fails: opts.hide_fails,
        }
    }
}

/// Classification of one key's answers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyOutcome {
    /// Forms both expected and produced.
    pub passed: Vec<String>,
    /// Forms produced but not expected.
    pub unexpected: Vec<String>,
    /// Expected forms never produced that count as fails.
    pub missing: Vec<String>,
}

impl KeyOutcome {
    /// Counts contributed by this key.
    pub fn counts(&self) -> Counts {
        Counts {
            passes: self.passed.len(),
            fails: self.unexpected.len() + self.missing.len(),
        }
    }
}

/// Compare the expected and actual forms of a single key.
pub fn check_key(
    expected: &BTreeSet<String>,
    actual: &BTreeSet<String>,
    ignore_extra_analyses: bool,
) -> KeyOutcome {
    let passed: Vec<String> = actual.intersection(expected).cloned().collect();
    let unexpected: Vec<String> = actual.difference(expected).cloned().collect();
    let missing: Vec<String> = if ignore_extra_analyses && !passed.is_empty() {
        Vec::new()
    } else {
        expected.difference(actual).cloned().collect()
    };

    KeyOutcome {
        passed,
        unexpected,
        missing,
    }
}

/// Counts for one evaluated group-direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTally {
    /// `<group> (<direction description>)`.
    pub name: String,
    /// Passes and fails.
    #[serde(flatten)]
    pub counts: Counts,
}

/// Everything a finished check produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Ordered event log.
    pub events: Vec<ReportEvent>,
    /// Per group-direction counts, in evaluation order.
    pub tallies: Vec<GroupTally>,
    /// Sum over all tallies.
    pub totals: Counts,
}

/// Accumulates events and counts over a run.
#[derive(Debug, Default)]
pub struct MorphChecker {
    options: CheckOptions,
    report: CheckReport,
}

impl MorphChecker {
    /// Create a checker.
    pub fn new(options: CheckOptions) -> Self {
        Self {
            options,
            report: CheckReport::default(),
        }
    }

    /// Evaluate one group in one direction against the answers for that
    /// direction, and return the group-direction's counts.
    pub fn check_group(
        &mut self,
        group: &TestGroup,
        direction: Direction,
        answers: &TransducerResult,
    ) -> Counts {
        let index = self.report.tallies.len();
        let name = format!("{} ({})", group.name, direction.description());
        let title = format!("Test {}: {}", index, name);
        self.report.events.push(ReportEvent::Title {
            index,
            title: title.clone(),
        });

        let tests: Vec<(String, BTreeSet<String>)> = if direction.is_lexical() {
            group
                .iter()
                .map(|(key, forms)| (key.clone(), forms.iter().cloned().collect()))
                .collect()
        } else {
            group.inverted()
        };

        let empty = BTreeSet::new();
        let mut counts = Counts::default();
        for (key, expected) in &tests {
            let actual = answers.get(key).unwrap_or(&empty);
            let outcome = check_key(expected, actual, self.options.ignore_extra_analyses);
            counts += outcome.counts();
            self.emit(key, outcome);
        }

        debug!(
            group = %group.name,
            %direction,
            passes = counts.passes,
            fails = counts.fails,
            "group checked"
        );

        self.report.events.push(ReportEvent::GroupResult {
            index,
            title,
            counts,
        });
        self.report.tallies.push(GroupTally { name, counts });
        self.report.totals += counts;
        counts
    }

    fn emit(&mut self, key: &str, outcome: KeyOutcome) {
        if !self.options.hide_passes {
            for form in outcome.passed {
                self.report.events.push(ReportEvent::Success {
                    key: key.to_string(),
                    form,
                });
            }
        }
        if self.options.hide_fails {
            return;
        }
        for (kind, forms) in [
            (FailureKind::Unexpected, outcome.unexpected),
            (FailureKind::Missing, outcome.missing),
        ] {
            if !forms.is_empty() {
                self.report.events.push(ReportEvent::Failure {
                    key: key.to_string(),
                    kind,
                    forms,
                });
            }
        }
    }

    /// Close the run with a final-result event.
    pub fn finish(mut self) -> CheckReport {
        self.report.events.push(ReportEvent::FinalResult {
            totals: self.report.totals,
        });
        self.report
    }
}

/// Check `groups` in each of `directions`, groups in the outer loop.
///
/// Fails before evaluating anything if a requested direction has no
/// answers.
pub fn check(
    groups: &[&TestGroup],
    directions: &[Direction],
    results: &LookupResults,
    options: CheckOptions,
) -> MorphResult<CheckReport> {
    let mut answers = Vec::with_capacity(directions.len());
    for &direction in directions {
        let result = results.get(direction).ok_or_else(|| MorphError::Lookup {
            program: direction.as_str().to_string(),
            detail: format!("no {} results available", direction),
        })?;
        answers.push((direction, result));
    }

    let mut checker = MorphChecker::new(options);
    for group in groups {
        for &(direction, result) in &answers {
            checker.check_group(group, direction, result);
        }
    }
    Ok(checker.finish())
}
