//! Run statistics.
//!
//! - [`record`] - the structured record of one run
//! - [`store`] - the versioned statistics file runs are merged into

pub mod record;
pub mod store;

pub use record::{checksum, svn_revision, FileIdentity, MorphRecord, Revision, SystemInfo};
pub use store::{ConfigHistory, StatisticsDocument, StatisticsStore};
