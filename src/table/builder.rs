//! Builds the dense per-skill [`RaceTable`] that drives a bar chart race.
//!
//! Players that drop off the scraped hiscores page have no value for that
//! snapshot. Instead of zero (which would make their bar collapse and then
//! jump back), they are given one less than the previous frame's visible
//! floor: the xp of the player sitting just below the last visible bar.

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use rustc_hash::FxHashMap;

use crate::loader::unique_players_per_skill;
use crate::models::{RaceRow, RaceTable, Snapshot};

/// Added to every cell so bars keep creeping between identical scrapes.
pub const BAR_NUDGE: i64 = 137;

/// Floor before any frame has been built; its sentinel is 0.
const INITIAL_FLOOR: i64 = 1;

/// Decides which snapshots become table rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FramePolicy {
    use_each_n: Option<usize>,
}

impl FramePolicy {
    /// `None` keeps every snapshot. A stride of 0 is treated as 1.
    pub fn new(use_each_n: Option<usize>) -> Self {
        Self {
            use_each_n: use_each_n.map(|n| n.max(1)),
        }
    }

    /// Whether snapshot `index` out of `total` is sampled. The last snapshot
    /// is always kept so the race ends on the final state.
    pub fn keeps(&self, index: usize, total: usize) -> bool {
        match self.use_each_n {
            None => true,
            Some(n) => index % n == 0 || index + 1 == total,
        }
    }
}

/// Options for [`build_race_table`].
#[derive(Debug, Clone)]
pub struct TableOptions {
    pub skill: String,
    pub use_each_n: Option<usize>,
    /// Number of bars treated as on screen when tracking the floor.
    pub bars_visible: usize,
}

/// Build the race table for one skill.
///
/// Snapshots may be given in any order; rows come out time-ascending.
/// Snapshots without the skill are sampled like any other but yield no row.
pub fn build_race_table(snapshots: &[Snapshot], options: &TableOptions) -> Result<RaceTable> {
    let mut ordered: Vec<&Snapshot> = snapshots.iter().collect();
    ordered.sort_by_key(|s| s.timestamp);

    let players = unique_players_per_skill(ordered.iter().copied())
        .remove(&options.skill)
        .unwrap_or_default();
    info!(
        "{} unique players for {} across {} snapshots",
        players.len(),
        options.skill,
        ordered.len()
    );

    let columns: FxHashMap<&str, usize> = players
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();

    let policy = FramePolicy::new(options.use_each_n);
    let total = ordered.len();
    let mut floor = INITIAL_FLOOR;
    let mut rows = Vec::new();

    for (index, snapshot) in ordered.into_iter().enumerate() {
        if !policy.keeps(index, total) {
            continue;
        }

        let Some(entries) = snapshot.skill(&options.skill) else {
            continue;
        };

        let mut values = vec![floor - 1; players.len()];
        for entry in entries {
            let xp = entry.xp().ok_or_else(|| {
                anyhow!("Unparseable score {:?} for {}", entry.score, entry.name)
            })?;
            let column = columns
                .get(entry.name.as_str())
                .with_context(|| format!("Player {} missing from columns", entry.name))?;
            values[*column] = xp;
        }

        for value in values.iter_mut() {
            *value += BAR_NUDGE;
        }

        floor = next_floor(&values, options.bars_visible).unwrap_or(floor);

        debug!("{}", snapshot.timestamp);
        rows.push(RaceRow {
            timestamp: snapshot.timestamp,
            values,
        });
    }

    info!("Built {} rows for {}", rows.len(), options.skill);

    Ok(RaceTable {
        skill: options.skill.clone(),
        players,
        rows,
    })
}

/// Value at position `bars_visible` (0-indexed) in descending order, i.e.
/// the best value that is no longer on screen. `None` when every player fits.
fn next_floor(values: &[i64], bars_visible: usize) -> Option<i64> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.get(bars_visible).copied()
}
