//! Versioned statistics file.
//!
//! Runs accumulate into one JSON document, grouped by specification file:
//!
//! ```json
//! {"type":"apertium","version":"0.1","morph":[
//!   {"config":"tests.yaml","revisions":[{...record...}]}
//! ]}
//! ```

use super::MorphRecord;
use crate::error::{MorphError, MorphResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

/// Document type tag.
pub const STATISTICS_TYPE: &str = "apertium";

/// Document format version.
pub const STATISTICS_VERSION: &str = "0.1";

/// All recorded runs of one specification file, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigHistory {
    /// Specification file path.
    pub config: String,
    /// Recorded runs.
    pub revisions: Vec<MorphRecord>,
}

/// On-disk statistics document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsDocument {
    /// Always [`STATISTICS_TYPE`].
    #[serde(rename = "type")]
    pub kind: String,
    /// Format version.
    pub version: String,
    /// Morph test history.
    #[serde(default)]
    pub morph: Vec<ConfigHistory>,
}

impl Default for StatisticsDocument {
    fn default() -> Self {
        Self {
            kind: STATISTICS_TYPE.to_string(),
            version: STATISTICS_VERSION.to_string(),
            morph: Vec::new(),
        }
    }
}

/// A statistics file opened for updating.
#[derive(Debug)]
pub struct StatisticsStore {
    path: PathBuf,
    document: StatisticsDocument,
}

impl StatisticsStore {
    /// Open `path`, starting an empty document if it does not exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> MorphResult<Self> {
        let path = path.as_ref().to_path_buf();
        let document = match fs::read_to_string(&path) {
            Ok(text) => {
                let document: StatisticsDocument = serde_json::from_str(&text).map_err(|e| {
                    MorphError::Statistics(format!("{} is not a statistics file: {}", path.display(), e))
                })?;
                if document.kind != STATISTICS_TYPE {
                    return Err(MorphError::Statistics(format!(
                        "{} is not a statistics file (type `{}`)",
                        path.display(),
                        document.kind
                    )));
                }
                document
            }
            Err(e) if e.kind() == ErrorKind::NotFound => StatisticsDocument::default(),
            Err(e) => {
                return Err(MorphError::Statistics(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )))
            }
        };
        Ok(Self { path, document })
    }

    /// The document as currently held in memory.
    pub fn document(&self) -> &StatisticsDocument {
        &self.document
    }

    /// History of one specification file.
    pub fn history(&self, config: &str) -> Option<&ConfigHistory> {
        self.document.morph.iter().find(|h| h.config == config)
    }

    /// Merge a record. A record for a revision that is already present
    /// replaces it; anything else is appended.
    pub fn add(&mut self, record: MorphRecord) {
        let config = record.config.value.clone();
        let index = match self.document.morph.iter().position(|h| h.config == config) {
            Some(i) => i,
            None => {
                self.document.morph.push(ConfigHistory {
                    config,
                    revisions: Vec::new(),
                });
                self.document.morph.len() - 1
            }
        };
        let revisions = &mut self.document.morph[index].revisions;

        let same_revision = record.revision.value.as_ref().and_then(|rev| {
            revisions
                .iter()
                .position(|r| r.revision.value.as_ref() == Some(rev))
        });
        match same_revision {
            Some(i) => revisions[i] = record,
            None => revisions.push(record),
        }
    }

    /// Write the document back to its file.
    pub fn write(&self) -> MorphResult<()> {
        let text = serde_json::to_string_pretty(&self.document)
            .map_err(|e| MorphError::Statistics(e.to_string()))?;
        fs::write(&self.path, text + "\n").map_err(|e| {
            MorphError::Statistics(format!("cannot write {}: {}", self.path.display(), e))
        })?;
        info!(path = %self.path.display(), "statistics written");
        Ok(())
    }
}
