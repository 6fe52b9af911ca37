//! Talking to external lookup programs.
//!
//! - [`parser`] - decoding of lookup output into [`TransducerResult`]s
//! - [`runner`] - subprocess invocation and the two-direction batch run

pub mod parser;
pub mod runner;

pub use parser::parse_output;
pub use runner::{lookup_both, BatchRequest, Lookup, LookupResults, ProcessLookup};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Query key → every result the transducer produced for it.
pub type TransducerResult = BTreeMap<String, BTreeSet<String>>;

/// Which way a batch of queries goes through the transducers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Lexical forms in, surface forms out.
    Generation,
    /// Surface forms in, lexical forms out.
    Analysis,
}

impl Direction {
    /// Short name used in logs and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generation => "gen",
            Self::Analysis => "morph",
        }
    }

    /// Label used in report titles.
    pub fn description(self) -> &'static str {
        match self {
            Self::Generation => "Lexical/Generation",
            Self::Analysis => "Surface/Analysis",
        }
    }

    /// True for the lexical (generation) direction.
    pub fn is_lexical(self) -> bool {
        matches!(self, Self::Generation)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
