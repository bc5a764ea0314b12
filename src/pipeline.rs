//! End-to-end run: snapshots → table → animation file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use log::info;

use crate::config::Settings;
use crate::levels::LevelTable;
use crate::loader::{load_snapshots, sort_by_timestamp};
use crate::models::RaceTable;
use crate::render::{register_font_file, GifRenderer, RaceRenderer, RaceSummary};
use crate::table::{build_race_table, TableOptions};

/// Output file name for a race rendered at `now`.
pub fn output_file_name(now: NaiveDateTime) -> String {
    format!("bar_race_{}.gif", now.format("%Y-%m-%d_%H_%M_%S"))
}

/// Load every snapshot from the configured data directory and build the
/// table for the configured skill.
pub fn build_table(settings: &Settings) -> Result<RaceTable> {
    let data_dir = settings.paths.raw_data_path();
    let mut snapshots = load_snapshots(&data_dir)?;
    sort_by_timestamp(&mut snapshots);

    build_race_table(
        &snapshots,
        &TableOptions {
            skill: settings.race.skill.clone(),
            use_each_n: settings.race.use_each_n,
            bars_visible: settings.race.bars_visible,
        },
    )
}

/// Run the whole job with the given renderer, writing into `videos_dir`.
pub fn run_with(
    settings: &Settings,
    levels: &LevelTable,
    renderer: &dyn RaceRenderer,
    videos_dir: &Path,
    now: NaiveDateTime,
) -> Result<PathBuf> {
    let start = Instant::now();

    let table = build_table(settings)?;
    if table.is_empty() {
        bail!(
            "No snapshots contain data for skill {:?}",
            settings.race.skill
        );
    }

    let summary = RaceSummary::new(
        &table,
        settings.race.started_at,
        levels,
        settings.race.bars_visible,
        settings.render.summary_label,
    );

    fs::create_dir_all(videos_dir)
        .with_context(|| format!("Failed to create {}", videos_dir.display()))?;
    let output = videos_dir.join(output_file_name(now));

    renderer.render(&table, &summary, &output)?;

    info!(
        "Rendered {} rows of {} to {} in {:?}",
        table.len(),
        table.skill,
        output.display(),
        start.elapsed()
    );
    Ok(output)
}

/// Production entry point: shared level table, registered font, GIF output
/// named by local time.
pub fn run(settings: &Settings) -> Result<PathBuf> {
    settings.validate()?;

    let levels = LevelTable::shared(&settings.paths.level_table_path())?;
    register_font_file(&settings.render.font_family, &settings.paths.font_path())?;
    let renderer = GifRenderer::new(settings.render.clone(), settings.race.steps_per_period);
    let now = chrono::Local::now().naive_local();

    run_with(
        settings,
        levels,
        &renderer,
        &settings.paths.videos_path(),
        now,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TIMESTAMP_FORMAT;

    #[test]
    fn test_output_file_name() {
        let now = NaiveDateTime::parse_from_str("2023-08-09 07:05:03", TIMESTAMP_FORMAT).unwrap();
        assert_eq!(output_file_name(now), "bar_race_2023-08-09_07_05_03.gif");
    }
}
