//! Turning a [`RaceTable`] into an animation.
//!
//! - [`frames`] - interpolated frames between table rows
//! - [`summary`] - per-frame summary text and the elapsed-time labels
//! - [`gif`] - the `plotters` GIF renderer

use std::path::Path;

use anyhow::Result;

use crate::models::RaceTable;

mod frames;
mod gif;
mod summary;

pub use frames::{frame_count, row_for_frame, row_slots, Frame, Frames};
pub use gif::{register_font_file, GifRenderer};
pub use summary::{format_since_release, ElapsedLabels, PeriodSummary, RaceSummary, SummaryText};

/// Writes a rendered race to `output`.
pub trait RaceRenderer {
    fn render(&self, table: &RaceTable, summary: &dyn PeriodSummary, output: &Path) -> Result<()>;
}
