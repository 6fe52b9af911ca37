//! Apertium quality - morphological transducer consistency testing.
//!
//! Checks a pair of finite-state transducers (a generator and an analyser)
//! against a YAML test specification, in both directions, using an
//! external lookup program such as `hfst-lookup`.
//!
//! # Architecture
//!
//! - [`spec`] - test specification loading, section resolution, inversion
//! - [`transducer`] - lookup output parsing and the concurrent subprocess runs
//! - [`checker`] - expected vs. actual comparison, counters, event log
//! - [`report`] - verbose and compact rendering of the event log
//! - [`stats`] - result records and the statistics file
//! - [`harness`] - a whole run, from specification file to report
//! - [`config`] - run options
//! - [`error`] - error taxonomy
//!
//! # Example
//!
//! ```no_run
//! use apertium_quality::{MorphHarness, MorphOptions};
//!
//! let harness = MorphHarness::load("tests/sme-nouns.yaml", MorphOptions::default())?;
//! let run = harness.run()?;
//! println!("{}", harness.render(&run));
//! # Ok::<(), apertium_quality::MorphError>(())
//! ```

// Library code must propagate errors rather than abort the run.
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

pub mod checker;
pub mod config;
pub mod error;
pub mod harness;
pub mod report;
pub mod spec;
pub mod stats;
pub mod transducer;

// Re-export commonly used types
pub use checker::{check, check_key, CheckOptions, CheckReport, Counts, GroupTally, MorphChecker};
pub use config::MorphOptions;
pub use error::{MorphError, MorphResult};
pub use harness::{MorphHarness, MorphRun};
pub use report::{render, ReportEvent, ReportStyle};
pub use spec::{invert, SpecDocument, TestGroup, TestSpec};
pub use stats::{MorphRecord, StatisticsStore};
pub use transducer::{lookup_both, parse_output, Direction, Lookup, LookupResults, TransducerResult};
