//! Error handling for the morph test harness.
//!
//! Every failure that stops a run is a [`MorphError`]. Individual test
//! mismatches are never errors; they are counted by the checker.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type MorphResult<T> = Result<T, MorphError>;

/// All fatal errors a morph test run can raise.
#[derive(Debug, Error)]
pub enum MorphError {
    /// The test specification or the selected section is unusable.
    #[error("{0}")]
    Config(String),

    /// The configured external program is not on the search path.
    #[error("Cannot find `{0}`. Check $PATH.")]
    ToolNotFound(String),

    /// A configured transducer file does not exist.
    #[error("File {} does not exist.", .0.display())]
    FileNotFound(PathBuf),

    /// The external program exited non-zero.
    #[error("`{program}` had an error:\n{detail}")]
    Lookup {
        /// Program that failed, as configured.
        program: String,
        /// First output block, captured stderr and the exit code.
        detail: String,
    },

    /// The external program could not be started or talked to.
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        /// Program that could not be run.
        program: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The test specification is not valid YAML of the expected shape.
    #[error("Failed to parse {}: {source}", path.display())]
    Yaml {
        /// Path of the offending document.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_yaml::Error,
    },

    /// Reading an input file failed.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The statistics file could not be read, parsed or written.
    #[error("statistics: {0}")]
    Statistics(String),
}

impl MorphError {
    /// Shorthand for a [`MorphError::Config`] with a formatted message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true for errors raised while talking to the external program.
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::Lookup { .. } | Self::Spawn { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_display() {
        let err = MorphError::Lookup {
            program: "hfst-lookup".to_string(),
            detail: "bad file\n(Error code: 1)".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "`hfst-lookup` had an error:\nbad file\n(Error code: 1)"
        );
        assert!(err.is_lookup());
    }

    #[test]
    fn test_file_not_found_display() {
        let err = MorphError::FileNotFound(PathBuf::from("sme.gen.hfst"));
        assert_eq!(err.to_string(), "File sme.gen.hfst does not exist.");
        assert!(!err.is_lookup());
    }
}
