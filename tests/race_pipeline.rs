use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::NaiveDateTime;
use hiscores_race::config::RunMode;
use hiscores_race::models::{RaceTable, TIMESTAMP_FORMAT};
use hiscores_race::pipeline::{build_table, run, run_with};
use hiscores_race::render::{frame_count, Frames, PeriodSummary, RaceRenderer};
use hiscores_race::table::BAR_NUDGE;
use hiscores_race::{LevelTable, Settings};
use serde_json::json;
use tempfile::TempDir;

const LEVELS_CSV: &str = "\u{feff}Level,XP\n1,0\n2,83\n3,174\n4,276\n5,388\n6,512\n7,650\n8,801\n9,969\n10,\"1,154\"\n";

fn write_snapshot(dir: &Path, file_name: &str, timestamp: &str, skills: &[(&str, serde_json::Value)]) {
    let data: Vec<serde_json::Value> = skills
        .iter()
        .map(|(skill, entries)| {
            json!({
                "skill": { "skill": skill },
                "skill_data": entries.to_string(),
            })
        })
        .collect();
    let body = json!({ "timestamp": timestamp, "data": data });
    fs::write(dir.join(file_name), body.to_string()).expect("write snapshot");
}

fn create_workspace() -> (TempDir, Settings) {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let raw = temp_dir.path().join("raw");
    let helpers = temp_dir.path().join("helpers");
    fs::create_dir_all(&raw).expect("create raw dir");
    fs::create_dir_all(&helpers).expect("create helper dir");
    fs::write(helpers.join("xp_per_level.csv"), LEVELS_CSV).expect("write level table");

    // Written out of order on purpose
    write_snapshot(
        &raw,
        "c.json",
        "2023-08-08 14:00:00",
        &[(
            "necromancy",
            json!([
                {"name": "Ghost", "score": "1,100", "rank": "1"},
                {"name": "Glue", "score": "900", "rank": "2"}
            ]),
        )],
    );
    write_snapshot(
        &raw,
        "a.json",
        "2023-08-07 13:00:00",
        &[(
            "necromancy",
            json!([{"name": "Glue", "score": "100", "rank": "1"}]),
        )],
    );
    write_snapshot(
        &raw,
        "b.json",
        "2023-08-07 20:00:00",
        &[(
            "archaeology",
            json!([{"name": "Digger", "score": "50", "rank": "1"}]),
        )],
    );
    write_snapshot(&raw, "empty.json", "2023-08-07 21:00:00", &[]);
    fs::write(raw.join("README.md"), "scrape notes").expect("write readme");

    let mut settings = Settings::default();
    settings.paths.mode = RunMode::Production;
    settings.paths.raw_data_dir = raw.to_string_lossy().to_string();
    settings.paths.helper_files_dir = helpers.to_string_lossy().to_string();
    settings.race.bars_visible = 1;
    settings.race.steps_per_period = 4;

    (temp_dir, settings)
}

#[derive(Default)]
struct RecordingRenderer {
    frames: RefCell<usize>,
    texts: RefCell<Vec<String>>,
    outputs: RefCell<Vec<PathBuf>>,
}

impl RaceRenderer for RecordingRenderer {
    fn render(&self, table: &RaceTable, summary: &dyn PeriodSummary, output: &Path) -> Result<()> {
        for frame in Frames::new(table, 4, 10) {
            *self.frames.borrow_mut() += 1;
            self.texts.borrow_mut().push(summary.summarize(&frame).text);
        }
        fs::write(output, b"GIF89a")?;
        self.outputs.borrow_mut().push(output.to_path_buf());
        Ok(())
    }
}

#[test]
fn build_table_sorts_skips_and_fills_absent_players() {
    let (_tmp, settings) = create_workspace();

    let table = build_table(&settings).expect("build table");

    assert_eq!(table.skill, "necromancy");
    assert_eq!(table.len(), 2);
    assert_eq!(table.players, vec!["Glue", "Ghost"]);

    let times: Vec<String> = table
        .timestamps()
        .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .collect();
    assert_eq!(times, vec!["2023-08-07 13:00:00", "2023-08-08 14:00:00"]);

    assert_eq!(table.value(0, "Glue"), Some(100 + BAR_NUDGE));
    assert_eq!(table.value(0, "Ghost"), Some(BAR_NUDGE));
    assert_eq!(table.value(1, "Ghost"), Some(1100 + BAR_NUDGE));
}

#[test]
fn stride_always_keeps_final_snapshot() {
    let (_tmp, mut settings) = create_workspace();
    settings.race.use_each_n = Some(3);

    // Sorted: a(0) b(1) empty(2) c(3). Index 0 and 3 are kept.
    let table = build_table(&settings).expect("build table");
    assert_eq!(table.len(), 2);

    settings.race.use_each_n = Some(2);
    // Index 0, 2 (no skill data, skipped) and 3 (last)
    let table = build_table(&settings).expect("build table");
    assert_eq!(table.len(), 2);
}

#[test]
fn run_with_renders_summary_per_frame() {
    let (tmp, settings) = create_workspace();
    let levels = LevelTable::load(&settings.paths.level_table_path()).expect("load levels");
    let renderer = RecordingRenderer::default();
    let videos = tmp.path().join("videos");
    let now = NaiveDateTime::parse_from_str("2024-01-02 03:04:05", TIMESTAMP_FORMAT).unwrap();

    let output = run_with(&settings, &levels, &renderer, &videos, now).expect("run pipeline");

    assert_eq!(output, videos.join("bar_race_2024-01-02_03_04_05.gif"));
    assert!(output.exists());
    assert_eq!(*renderer.frames.borrow(), frame_count(2, 4));

    let texts = renderer.texts.borrow();
    assert_eq!(
        texts[0],
        "1 Hour Since Release\nHighest Level: 3\nTop 1 Combined XP: 237"
    );
    assert_eq!(
        texts.last().unwrap(),
        "1 Day & 2 Hours Since Release\nHighest Level: 10\nTop 1 Combined XP: 1,237"
    );
}

#[test]
fn run_with_unknown_skill_is_error() {
    let (tmp, mut settings) = create_workspace();
    settings.race.skill = "invention".to_string();
    let levels = LevelTable::load(&settings.paths.level_table_path()).expect("load levels");
    let now = NaiveDateTime::parse_from_str("2024-01-02 03:04:05", TIMESTAMP_FORMAT).unwrap();

    let result = run_with(
        &settings,
        &levels,
        &RecordingRenderer::default(),
        &tmp.path().join("videos"),
        now,
    );
    assert!(result.is_err());
}

#[test]
fn malformed_snapshot_fails_the_run() {
    let (_tmp, settings) = create_workspace();
    fs::write(settings.paths.raw_data_path().join("bad.json"), "{\"timestamp\": ").expect("write");

    assert!(build_table(&settings).is_err());
}

#[test]
fn shipped_level_table_covers_levels_1_to_120() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("helper_files/xp_per_level.csv");
    let levels = LevelTable::load(&path).expect("load shipped level table");

    assert_eq!(levels.len(), 120);
    assert_eq!(levels.max_level(), 120);
    assert_eq!(levels.xp_to_level(13_034_430), 98);
    assert_eq!(levels.xp_to_level(13_034_431), 99);
    assert_eq!(levels.xp_to_level(200_000_000), 120);
}

fn shrink_canvas(settings: &mut Settings, videos: &Path) {
    settings.paths.videos_dir = videos.to_string_lossy().to_string();
    settings.render.width = 160;
    settings.render.height = 90;
    settings.render.n_bars = 2;
    settings.race.steps_per_period = 2;
}

fn rendered_gifs(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .expect("read videos dir")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "gif"))
        .collect()
}

#[test]
fn run_renders_gif_with_shipped_helper_files() {
    let (tmp, mut settings) = create_workspace();
    settings.paths.helper_files_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("helper_files")
        .to_string_lossy()
        .to_string();
    let videos = tmp.path().join("videos");
    shrink_canvas(&mut settings, &videos);

    let output = run(&settings).expect("run with default font and level table");

    assert_eq!(rendered_gifs(&videos), vec![output.clone()]);
    assert!(fs::read(&output).expect("read gif").starts_with(b"GIF89a"));
}

#[test]
fn run_falls_back_to_bundled_font() {
    let (tmp, mut settings) = create_workspace();
    let videos = tmp.path().join("videos");
    shrink_canvas(&mut settings, &videos);
    assert!(!settings.paths.font_path().exists());

    let output = run(&settings).expect("run without a font file");

    assert!(fs::read(&output).expect("read gif").starts_with(b"GIF89a"));
}
