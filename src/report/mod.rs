//! Textual reports.
//!
//! The checker emits an ordered log of [`ReportEvent`]s. Rendering that log
//! is a pure function of the events, the [`ReportStyle`] and a
//! [`Colorizer`]; the same log always yields the same text.
//!
//! - [`colour`] - plain and ANSI colour strategies

pub mod colour;

pub use colour::{colorizer, AnsiColorizer, Colorizer, PlainColorizer, Role};

use crate::checker::Counts;
use std::fmt::Write;

/// Why a key failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The transducer produced forms that were not expected.
    Unexpected,
    /// Expected forms never came out of the transducer.
    Missing,
}

impl FailureKind {
    /// Reason text shown in the report.
    pub fn reason(self) -> &'static str {
        match self {
            Self::Unexpected => "unexpected results",
            Self::Missing => "missing results",
        }
    }
}

/// One step of a morph test run, in the order the checker produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    /// A group-direction is about to be evaluated.
    Title {
        /// Running index of the group-direction.
        index: usize,
        /// Full title, e.g. `Test 0: Noun (Lexical/Generation)`.
        title: String,
    },
    /// `form` was both expected and produced for `key`.
    Success {
        /// Query key.
        key: String,
        /// Matching form.
        form: String,
    },
    /// Some forms for `key` were unexpected or missing.
    Failure {
        /// Query key.
        key: String,
        /// Unexpected or missing.
        kind: FailureKind,
        /// The offending forms, sorted.
        forms: Vec<String>,
    },
    /// Counts for one finished group-direction.
    GroupResult {
        /// Running index of the group-direction.
        index: usize,
        /// Same title as the matching [`ReportEvent::Title`].
        title: String,
        /// Passes and fails of this group-direction.
        counts: Counts,
    },
    /// Totals over the whole run.
    FinalResult {
        /// Sum of all group-direction counts.
        totals: Counts,
    },
}

/// How much of the event log ends up in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportStyle {
    /// Every event.
    #[default]
    Verbose,
    /// One line per group-direction plus the totals.
    Compact,
}

impl ReportStyle {
    /// Style for the `compact` option.
    pub fn from_compact(compact: bool) -> Self {
        if compact {
            Self::Compact
        } else {
            Self::Verbose
        }
    }
}

/// Render `events` in the given style.
pub fn render(events: &[ReportEvent], style: ReportStyle, colors: &dyn Colorizer) -> String {
    match style {
        ReportStyle::Verbose => render_verbose(events, colors),
        ReportStyle::Compact => render_compact(events, colors),
    }
}

/// Render every event as human-readable lines.
pub fn render_verbose(events: &[ReportEvent], colors: &dyn Colorizer) -> String {
    let mut out = String::new();
    for event in events {
        match event {
            ReportEvent::Title { title, .. } => {
                let rule = "-".repeat(title.chars().count());
                for line in [rule.as_str(), title.as_str(), rule.as_str()] {
                    let _ = writeln!(out, "{}", colors.wrap(line, Role::Title));
                }
            }
            ReportEvent::Success { key, form } => {
                let _ = writeln!(
                    out,
                    "{} {} {} {}",
                    colors.wrap("[PASS]", Role::Pass),
                    key,
                    colors.wrap("=>", Role::Arrow),
                    form
                );
            }
            ReportEvent::Failure { key, kind, forms } => {
                let _ = writeln!(
                    out,
                    "{} {} {} {}{} {}",
                    colors.wrap("[FAIL]", Role::Fail),
                    key,
                    colors.wrap("=>", Role::Arrow),
                    kind.reason(),
                    colors.wrap(":", Role::Colon),
                    forms.join(", ")
                );
            }
            ReportEvent::GroupResult { index, counts, .. } => {
                let _ = writeln!(
                    out,
                    "Test {} - {}\n",
                    index,
                    tally_line("Passes", "Fails", counts, colors)
                );
            }
            ReportEvent::FinalResult { totals } => {
                let _ = writeln!(
                    out,
                    "{}",
                    tally_line("Total passes", "Total fails", totals, colors)
                );
            }
        }
    }
    out.trim().to_string()
}

/// Render one line per group-direction and the final totals.
pub fn render_compact(events: &[ReportEvent], colors: &dyn Colorizer) -> String {
    let mut out = String::new();
    for event in events {
        match event {
            ReportEvent::GroupResult { title, counts, .. } => {
                let marker = if counts.fails > 0 {
                    colors.wrap("[FAIL]", Role::Fail)
                } else {
                    colors.wrap("[PASS]", Role::Pass)
                };
                let _ = writeln!(
                    out,
                    "{} {} {}/{}/{}",
                    marker,
                    title,
                    counts.passes,
                    counts.fails,
                    counts.total()
                );
            }
            ReportEvent::FinalResult { totals } => {
                let _ = writeln!(
                    out,
                    "{}",
                    tally_line("Total passes", "Total fails", totals, colors)
                );
            }
            ReportEvent::Title { .. } | ReportEvent::Success { .. } | ReportEvent::Failure { .. } => {}
        }
    }
    out.trim().to_string()
}

fn tally_line(passes: &str, fails: &str, counts: &Counts, colors: &dyn Colorizer) -> String {
    format!(
        "{}: {}, {}: {}, Total: {}",
        passes,
        colors.wrap(&counts.passes.to_string(), Role::Passes),
        fails,
        colors.wrap(&counts.fails.to_string(), Role::Fails),
        colors.wrap(&counts.total().to_string(), Role::Total),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ReportEvent> {
        vec![
            ReportEvent::Title {
                index: 0,
                title: "Test 0: Noun (Lexical/Generation)".to_string(),
            },
            ReportEvent::Success {
                key: "cat<n><pl>".to_string(),
                form: "cats".to_string(),
            },
            ReportEvent::Failure {
                key: "mouse<n><pl>".to_string(),
                kind: FailureKind::Unexpected,
                forms: vec!["mouses".to_string()],
            },
            ReportEvent::Failure {
                key: "mouse<n><pl>".to_string(),
                kind: FailureKind::Missing,
                forms: vec!["mice".to_string()],
            },
            ReportEvent::GroupResult {
                index: 0,
                title: "Test 0: Noun (Lexical/Generation)".to_string(),
                counts: Counts {
                    passes: 1,
                    fails: 2,
                },
            },
            ReportEvent::FinalResult {
                totals: Counts {
                    passes: 1,
                    fails: 2,
                },
            },
        ]
    }

    #[test]
    fn test_verbose_plain() {
        let text = render_verbose(&sample(), &PlainColorizer);
        let expected = "\
---------------------------------
Test 0: Noun (Lexical/Generation)
---------------------------------
[PASS] cat<n><pl> => cats
[FAIL] mouse<n><pl> => unexpected results: mouses
[FAIL] mouse<n><pl> => missing results: mice
Test 0 - Passes: 1, Fails: 2, Total: 3

Total passes: 1, Total fails: 2, Total: 3";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_compact_plain() {
        let text = render_compact(&sample(), &PlainColorizer);
        assert_eq!(
            text,
            "[FAIL] Test 0: Noun (Lexical/Generation) 1/2/3\n\
             Total passes: 1, Total fails: 2, Total: 3"
        );
    }

    #[test]
    fn test_compact_pass_marker() {
        let events = vec![ReportEvent::GroupResult {
            index: 3,
            title: "Test 3: Verb (Surface/Analysis)".to_string(),
            counts: Counts {
                passes: 4,
                fails: 0,
            },
        }];
        assert_eq!(
            render_compact(&events, &PlainColorizer),
            "[PASS] Test 3: Verb (Surface/Analysis) 4/0/4"
        );
    }

    #[test]
    fn test_verbose_ansi_marks_pass() {
        let text = render(&sample(), ReportStyle::Verbose, &AnsiColorizer);
        assert!(text.contains("\x1b[0;32m[PASS]\x1b[m"));
        assert!(text.contains("\x1b[1;31m[FAIL]\x1b[m"));
    }

    #[test]
    fn test_title_rule_counts_chars() {
        let events = vec![ReportEvent::Title {
            index: 0,
            title: "gåetie".to_string(),
        }];
        assert_eq!(
            render_verbose(&events, &PlainColorizer),
            "------\ngåetie\n------"
        );
    }
}
