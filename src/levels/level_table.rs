//! Level ↔ xp thresholds.
//!
//! The table ships as a static CSV (`Level`,`XP`) with comma-formatted xp
//! values, sometimes saved with a UTF-8 BOM.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use log::info;
use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::utils::parse_thousands;

static SHARED: OnceCell<LevelTable> = OnceCell::new();

#[derive(Debug, Deserialize)]
struct LevelRow {
    #[serde(rename = "Level")]
    level: String,
    #[serde(rename = "XP")]
    xp: String,
}

/// Minimum xp for each level, ascending in both level and xp.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelTable {
    thresholds: Vec<(u32, i64)>,
}

impl LevelTable {
    /// Build from `(level, min_xp)` pairs in any order.
    ///
    /// Fails if the table is empty, a level is below 1, or xp does not
    /// strictly increase with level.
    pub fn new(mut thresholds: Vec<(u32, i64)>) -> Result<Self> {
        if thresholds.is_empty() {
            bail!("Level table is empty");
        }
        thresholds.sort_by_key(|(level, _)| *level);

        if thresholds[0].0 < 1 {
            bail!("Level table starts at level {}", thresholds[0].0);
        }
        for pair in thresholds.windows(2) {
            let ((level_a, xp_a), (level_b, xp_b)) = (pair[0], pair[1]);
            if level_a == level_b {
                bail!("Level {} appears more than once", level_a);
            }
            if xp_b <= xp_a {
                bail!(
                    "XP for level {} ({}) is not above level {} ({})",
                    level_b,
                    xp_b,
                    level_a,
                    xp_a
                );
            }
        }

        Ok(Self { thresholds })
    }

    /// Parse a `Level`,`XP` CSV document.
    pub fn from_csv(content: &str) -> Result<Self> {
        let content = content.trim_start_matches('\u{feff}');
        let mut reader = csv::Reader::from_reader(content.as_bytes());

        let mut thresholds = Vec::new();
        for (line, record) in reader.deserialize::<LevelRow>().enumerate() {
            let row = record.with_context(|| format!("Bad level table row {}", line + 1))?;
            let level = parse_thousands(&row.level)
                .and_then(|l| u32::try_from(l).ok())
                .ok_or_else(|| anyhow!("Bad level {:?}", row.level))?;
            let xp = parse_thousands(&row.xp).ok_or_else(|| anyhow!("Bad xp {:?}", row.xp))?;
            thresholds.push((level, xp));
        }

        Self::new(thresholds)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read level table {}", path.display()))?;
        let table = Self::from_csv(&content)
            .with_context(|| format!("Malformed level table {}", path.display()))?;

        info!(
            "Loaded {} levels from {}",
            table.thresholds.len(),
            path.display()
        );
        Ok(table)
    }

    /// Process-wide table, parsed on first use.
    ///
    /// Later calls return the first table regardless of `path`.
    pub fn shared(path: &Path) -> Result<&'static LevelTable> {
        SHARED.get_or_try_init(|| Self::load(path))
    }

    /// Highest level whose threshold is at or below `xp`. Values below the
    /// first threshold map to level 1.
    pub fn xp_to_level(&self, xp: i64) -> u32 {
        let reached = self.thresholds.partition_point(|(_, min_xp)| *min_xp <= xp);
        match reached {
            0 => 1,
            n => self.thresholds[n - 1].0,
        }
    }

    pub fn max_level(&self) -> u32 {
        self.thresholds.last().map(|(level, _)| *level).unwrap_or(1)
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }
}
