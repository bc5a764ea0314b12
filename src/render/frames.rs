//! Expands table rows into interpolated animation frames.
//!
//! Between two consecutive rows, `steps_per_period` frames are emitted with
//! values, bar positions and the period timestamp moving linearly from one
//! row to the next. The last row is emitted once at the end, so a table of
//! `r` rows yields `(r - 1) * steps_per_period + 1` frames.

use chrono::{Duration, NaiveDateTime};

use crate::models::RaceTable;

/// One rendered picture.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub index: usize,
    /// Table row this frame starts from.
    pub row_index: usize,
    pub timestamp: NaiveDateTime,
    /// Interpolated value per player column.
    pub values: Vec<f64>,
    /// Interpolated bar slot per player column. 0 is the top bar; values at
    /// or beyond `n_bars` are off screen.
    pub ranks: Vec<f64>,
}

impl Frame {
    /// Largest value in the frame.
    pub fn highest(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Sum of the `n` largest values.
    pub fn top_sum(&self, n: usize) -> f64 {
        let mut sorted = self.values.clone();
        sorted.sort_unstable_by(|a, b| b.total_cmp(a));
        sorted.iter().take(n).sum()
    }

    /// Columns currently on screen, top bar first.
    pub fn visible(&self, n_bars: usize) -> Vec<usize> {
        let limit = n_bars as f64;
        let mut columns: Vec<usize> = (0..self.ranks.len())
            .filter(|&j| self.ranks[j] < limit)
            .collect();
        columns.sort_by(|&a, &b| self.ranks[a].total_cmp(&self.ranks[b]));
        columns
    }
}

/// Number of frames produced for `rows` table rows.
pub fn frame_count(rows: usize, steps_per_period: usize) -> usize {
    match rows {
        0 => 0,
        r => (r - 1) * steps_per_period.max(1) + 1,
    }
}

/// Row each frame belongs to, for `frame_index < frame_count(..)`.
pub fn row_for_frame(frame_index: usize, steps_per_period: usize) -> usize {
    frame_index / steps_per_period.max(1)
}

/// Bar slot of every column in a row: descending by value, ties broken by
/// column order, capped at `n_bars`.
pub fn row_slots(values: &[i64], n_bars: usize) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].cmp(&values[a]));

    let mut slots = vec![n_bars as f64; values.len()];
    for (position, column) in order.into_iter().enumerate().take(n_bars) {
        slots[column] = position as f64;
    }
    slots
}

/// Iterator over every frame of a table.
pub struct Frames<'a> {
    table: &'a RaceTable,
    slots: Vec<Vec<f64>>,
    steps: usize,
    next: usize,
    total: usize,
}

impl<'a> Frames<'a> {
    pub fn new(table: &'a RaceTable, steps_per_period: usize, n_bars: usize) -> Self {
        let steps = steps_per_period.max(1);
        let slots = table
            .rows
            .iter()
            .map(|row| row_slots(&row.values, n_bars))
            .collect();

        Self {
            table,
            slots,
            steps,
            next: 0,
            total: frame_count(table.len(), steps),
        }
    }

    fn build(&self, index: usize) -> Frame {
        let row_index = row_for_frame(index, self.steps);
        let step = index % self.steps;
        let current = &self.table.rows[row_index];

        let Some(upcoming) = self.table.rows.get(row_index + 1) else {
            return Frame {
                index,
                row_index,
                timestamp: current.timestamp,
                values: current.values.iter().map(|v| *v as f64).collect(),
                ranks: self.slots[row_index].clone(),
            };
        };

        let t = step as f64 / self.steps as f64;
        let values = current
            .values
            .iter()
            .zip(&upcoming.values)
            .map(|(a, b)| lerp(*a as f64, *b as f64, t))
            .collect();
        let ranks = self.slots[row_index]
            .iter()
            .zip(&self.slots[row_index + 1])
            .map(|(a, b)| lerp(*a, *b, t))
            .collect();

        let span = (upcoming.timestamp - current.timestamp).num_milliseconds() as f64;
        let timestamp = current.timestamp + Duration::milliseconds((span * t).round() as i64);

        Frame {
            index,
            row_index,
            timestamp,
            values,
            ranks,
        }
    }
}

impl Iterator for Frames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.next >= self.total {
            return None;
        }
        let frame = self.build(self.next);
        self.next += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Frames<'_> {}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
