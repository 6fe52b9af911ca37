//! The per-run result record.

use crate::checker::{CheckReport, GroupTally};
use crate::error::{MorphError, MorphResult};
use crate::spec::Section;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fs;
use std::path::Path;
use std::process::Command;
use std::time::Duration;
use tracing::debug;

/// A file the run depended on, identified by path and content hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIdentity {
    /// Path as configured.
    pub value: String,
    /// SHA-1 of the file contents, lowercase hex.
    pub checksum: String,
}

impl FileIdentity {
    /// Hash the file at `path`.
    pub fn of(path: &Path) -> MorphResult<Self> {
        Ok(Self {
            value: path.display().to_string(),
            checksum: checksum(path)?,
        })
    }
}

/// When, and against which working-copy revision, the run happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Working-copy revision of the specification's directory, if known.
    pub value: Option<String>,
    /// UTC time of the run, RFC 3339.
    pub timestamp: String,
}

/// Host-side measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Wall-clock seconds from lookup start to the end of checking.
    pub speed: f64,
}

/// Everything the statistics store keeps about one morph test run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MorphRecord {
    /// The specification file.
    pub config: FileIdentity,
    /// Revision and timestamp.
    pub revision: Revision,
    /// Generator transducer, if one was used.
    pub gen: Option<FileIdentity>,
    /// Analyser transducer, if one was used.
    pub morph: Option<FileIdentity>,
    /// Passes plus fails.
    pub total: usize,
    /// Total passes.
    pub passes: usize,
    /// Total fails.
    pub fails: usize,
    /// Per group-direction breakdown.
    pub tests: Vec<GroupTally>,
    /// Timing.
    pub system: SystemInfo,
}

impl MorphRecord {
    /// Build the record for a finished run. Reads the specification and
    /// transducer files to checksum them.
    pub fn from_run(
        spec_path: &Path,
        section: &Section,
        report: &CheckReport,
        elapsed: Duration,
        revision: Option<String>,
    ) -> MorphResult<Self> {
        Ok(Self {
            config: FileIdentity::of(spec_path)?,
            revision: Revision {
                value: revision,
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            },
            gen: section.gen.as_deref().map(FileIdentity::of).transpose()?,
            morph: section.morph.as_deref().map(FileIdentity::of).transpose()?,
            total: report.totals.total(),
            passes: report.totals.passes,
            fails: report.totals.fails,
            tests: report.tallies.clone(),
            system: SystemInfo {
                speed: elapsed.as_secs_f64(),
            },
        })
    }
}

/// SHA-1 of a file's contents as lowercase hex.
pub fn checksum(path: &Path) -> MorphResult<String> {
    let bytes = fs::read(path).map_err(|source| MorphError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(hex::encode(Sha1::digest(&bytes)))
}

/// Ask `svnversion` for the revision of `dir`.
///
/// Returns `None` unless it prints a single clean revision number, which
/// also covers svn not being installed and unversioned directories.
pub fn svn_revision(dir: &Path) -> Option<String> {
    let output = Command::new("svnversion").current_dir(dir).output().ok()?;
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if output.status.success() && !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        Some(text)
    } else {
        debug!(dir = %dir.display(), output = %text, "no clean svn revision");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::Counts;
    use crate::spec::ToolCommand;
    use std::path::PathBuf;

    #[test]
    fn test_checksum_known_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.txt");
        fs::write(&path, b"abc").unwrap();
        assert_eq!(
            checksum(&path).unwrap(),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
    }

    #[test]
    fn test_checksum_missing_file() {
        let err = checksum(Path::new("/nonexistent/definitely/missing.hfst")).unwrap_err();
        assert!(matches!(err, MorphError::Io { .. }));
    }

    #[test]
    fn test_record_from_run() {
        let dir = tempfile::tempdir().unwrap();
        let spec = dir.path().join("tests.yaml");
        let gen = dir.path().join("gen.hfst");
        fs::write(&spec, "Config: {}\nTests: {}\n").unwrap();
        fs::write(&gen, b"abc").unwrap();

        let section = Section {
            name: "hfst".to_string(),
            command: ToolCommand {
                line: "hfst-lookup".to_string(),
                program: PathBuf::from("/usr/bin/hfst-lookup"),
                args: Vec::new(),
            },
            gen: Some(gen.clone()),
            morph: None,
        };
        let report = CheckReport {
            events: Vec::new(),
            tallies: vec![GroupTally {
                name: "Noun (Lexical/Generation)".to_string(),
                counts: Counts {
                    passes: 3,
                    fails: 1,
                },
            }],
            totals: Counts {
                passes: 3,
                fails: 1,
            },
        };

        let record = MorphRecord::from_run(
            &spec,
            &section,
            &report,
            Duration::from_millis(1500),
            Some("1234".to_string()),
        )
        .unwrap();

        assert_eq!(record.total, 4);
        assert_eq!(record.passes, 3);
        assert_eq!(record.fails, 1);
        assert_eq!(record.revision.value.as_deref(), Some("1234"));
        assert!(record.morph.is_none());
        let gen_id = record.gen.as_ref().unwrap();
        assert_eq!(gen_id.checksum, "a9993e364706816aba3e25717850c26c9cd0d89d");
        assert!((record.system.speed - 1.5).abs() < f64::EPSILON);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["tests"][0]["name"], "Noun (Lexical/Generation)");
        assert_eq!(json["tests"][0]["passes"], 3);
        assert_eq!(json["tests"][0]["fails"], 1);
    }
}
