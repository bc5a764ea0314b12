//! Per-frame summary text: time since release, top level, combined xp.

use chrono::NaiveDateTime;

use crate::config::TextAnchor;
use crate::levels::LevelTable;
use crate::models::RaceTable;
use crate::render::Frame;
use crate::utils::format_thousands_f64;

const SECONDS_PER_DAY: i64 = 24 * 3600;

/// A block of text placed on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryText {
    pub anchor: TextAnchor,
    pub text: String,
}

/// Produces the summary block drawn on each frame.
pub trait PeriodSummary {
    fn summarize(&self, frame: &Frame) -> SummaryText;
}

/// "1 Day & 3 Hours Since Release" style label.
///
/// Days and hours come from floor division, so a time before `start`
/// drops the days clause and counts hours within the preceding day.
pub fn format_since_release(start: NaiveDateTime, current: NaiveDateTime) -> String {
    let seconds = (current - start).num_seconds();
    let days = seconds.div_euclid(SECONDS_PER_DAY);
    let hours = seconds.rem_euclid(SECONDS_PER_DAY) / 3600;

    let days_str = match days {
        1 => "1 Day & ".to_string(),
        d if d > 1 => format!("{d} Days & "),
        _ => String::new(),
    };
    let hours_str = match hours {
        1 => "1 Hour ".to_string(),
        h => format!("{h} Hours "),
    };

    format!("{days_str}{hours_str}Since Release")
}

/// Elapsed-time label for every table row, looked up by row index.
#[derive(Debug, Clone, PartialEq)]
pub struct ElapsedLabels {
    labels: Vec<String>,
}

impl ElapsedLabels {
    pub fn new(table: &RaceTable, started_at: NaiveDateTime) -> Self {
        Self {
            labels: table
                .timestamps()
                .map(|ts| format_since_release(started_at, ts))
                .collect(),
        }
    }

    /// Label for `row`; rows past the end reuse the last label.
    pub fn get(&self, row: usize) -> &str {
        self.labels
            .get(row)
            .or_else(|| self.labels.last())
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Standard hiscores race summary.
pub struct RaceSummary<'a> {
    labels: ElapsedLabels,
    levels: &'a LevelTable,
    bars_visible: usize,
    anchor: TextAnchor,
}

impl<'a> RaceSummary<'a> {
    pub fn new(
        table: &RaceTable,
        started_at: NaiveDateTime,
        levels: &'a LevelTable,
        bars_visible: usize,
        anchor: TextAnchor,
    ) -> Self {
        Self {
            labels: ElapsedLabels::new(table, started_at),
            levels,
            bars_visible,
            anchor,
        }
    }

    pub fn text_for(&self, frame: &Frame) -> String {
        let highest_level = self.levels.xp_to_level(frame.highest().floor() as i64);
        let combined = format_thousands_f64(frame.top_sum(self.bars_visible));

        format!(
            "{}\nHighest Level: {}\nTop {} Combined XP: {}",
            self.labels.get(frame.row_index),
            highest_level,
            self.bars_visible,
            combined
        )
    }
}

impl PeriodSummary for RaceSummary<'_> {
    fn summarize(&self, frame: &Frame) -> SummaryText {
        SummaryText {
            anchor: self.anchor,
            text: self.text_for(frame),
        }
    }
}
