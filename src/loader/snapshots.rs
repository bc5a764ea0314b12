//! Reads scraped hiscores files from disk and normalizes them into
//! [`Snapshot`]s.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use log::{debug, info};
use rustc_hash::FxHashSet;

use crate::models::{HiscoreEntry, Snapshot, SnapshotFile, TIMESTAMP_FORMAT};

/// Whether a directory entry should be treated as a scraped snapshot.
pub fn is_snapshot_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.contains(".json"))
}

/// Read and normalize a single file.
///
/// Returns `Ok(None)` for files that are not JSON snapshots. A JSON file
/// that fails to parse is an error.
pub fn read_snapshot_file(path: &Path) -> Result<Option<Snapshot>> {
    if !is_snapshot_file(path) {
        return Ok(None);
    }

    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let raw: SnapshotFile = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let snapshot =
        normalize_snapshot(raw).with_context(|| format!("Invalid snapshot {}", path.display()))?;

    Ok(Some(snapshot))
}

/// Turn the on-disk layout into a skill → entries mapping.
///
/// Each skill's `skill_data` string is decoded as its own JSON document. An
/// empty `data` list produces a snapshot with no skills.
pub fn normalize_snapshot(raw: SnapshotFile) -> Result<Snapshot> {
    let timestamp = NaiveDateTime::parse_from_str(&raw.timestamp, TIMESTAMP_FORMAT)
        .with_context(|| format!("Bad timestamp {:?}", raw.timestamp))?;

    let mut hiscores = BTreeMap::new();
    for record in raw.data {
        let entries: Vec<HiscoreEntry> = serde_json::from_str(&record.skill_data)
            .with_context(|| format!("Bad skill_data for {}", record.skill.skill))?;
        hiscores.insert(record.skill.skill, entries);
    }

    Ok(Snapshot {
        timestamp,
        hiscores,
    })
}

/// Load every snapshot in `dir`, in no particular time order.
pub fn load_snapshots(dir: &Path) -> Result<Vec<Snapshot>> {
    let mut paths = fs::read_dir(dir)
        .with_context(|| format!("Failed to read snapshot directory {}", dir.display()))?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to list {}", dir.display()))?;
    paths.sort();

    let mut snapshots = Vec::with_capacity(paths.len());
    for path in &paths {
        if !path.is_file() {
            continue;
        }
        match read_snapshot_file(path)? {
            Some(snapshot) => snapshots.push(snapshot),
            None => debug!("Skipping non-snapshot file {}", path.display()),
        }
    }

    info!("Loaded {} snapshots from {}", snapshots.len(), dir.display());
    Ok(snapshots)
}

/// Stable chronological sort.
pub fn sort_by_timestamp(snapshots: &mut [Snapshot]) {
    snapshots.sort_by_key(|s| s.timestamp);
}

/// Every player seen for each skill, in first-seen order.
///
/// Snapshots that lack a skill simply contribute nothing to it.
pub fn unique_players_per_skill<'a>(
    snapshots: impl IntoIterator<Item = &'a Snapshot>,
) -> BTreeMap<String, Vec<String>> {
    let mut seen: BTreeMap<&str, FxHashSet<&str>> = BTreeMap::new();
    let mut players: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for snapshot in snapshots {
        for (skill, entries) in &snapshot.hiscores {
            let seen = seen.entry(skill.as_str()).or_default();
            let list = players.entry(skill.clone()).or_default();
            for entry in entries {
                if seen.insert(entry.name.as_str()) {
                    list.push(entry.name.clone());
                }
            }
        }
    }

    for (skill, list) in &players {
        debug!("{}: {} unique players", skill, list.len());
    }

    players
}
