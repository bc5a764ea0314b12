mod race_table;
mod snapshot;

pub use race_table::{RaceRow, RaceTable};
pub use snapshot::{HiscoreEntry, SkillName, SkillRecord, Snapshot, SnapshotFile};

/// Timestamp layout used by scraped files and settings.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
