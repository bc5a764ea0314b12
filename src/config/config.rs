use std::fmt::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use chrono::NaiveDateTime;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Deserializer};

use crate::models::TIMESTAMP_FORMAT;

/// Which set of data and output directories a run works against.
///
/// Test runs read and write `TEST_`-prefixed directories so that experiments
/// never touch the production scrape or its rendered races.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Production,
    #[default]
    Test,
}

impl RunMode {
    /// Directory prefix applied to raw data and output directories.
    pub fn prefix(self) -> &'static str {
        match self {
            RunMode::Production => "",
            RunMode::Test => "TEST_",
        }
    }
}

/// Filesystem layout for inputs and outputs.
#[derive(Debug, Deserialize, Clone)]
pub struct PathSettings {
    #[serde(default)]
    pub mode: RunMode,
    #[serde(default = "default_raw_data_dir")]
    pub raw_data_dir: String,
    #[serde(default = "default_videos_dir")]
    pub videos_dir: String,
    /// Static helper files (level table). Never mode-prefixed.
    #[serde(default = "default_helper_files_dir")]
    pub helper_files_dir: String,
    #[serde(default = "default_level_table_file")]
    pub level_table_file: String,
    /// TrueType font used for every label. Lives with the helper files;
    /// the bundled DejaVu Sans Bold is used when it is missing.
    #[serde(default = "default_font_file")]
    pub font_file: String,
}

fn default_raw_data_dir() -> String {
    "raw_scraped_data2".to_string()
}

fn default_videos_dir() -> String {
    "bar_races".to_string()
}

fn default_helper_files_dir() -> String {
    "helper_files".to_string()
}

fn default_level_table_file() -> String {
    "xp_per_level.csv".to_string()
}

fn default_font_file() -> String {
    "DejaVuSans-Bold.ttf".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            raw_data_dir: default_raw_data_dir(),
            videos_dir: default_videos_dir(),
            helper_files_dir: default_helper_files_dir(),
            level_table_file: default_level_table_file(),
            font_file: default_font_file(),
        }
    }
}

impl PathSettings {
    pub fn raw_data_path(&self) -> PathBuf {
        PathBuf::from(format!("{}{}", self.mode.prefix(), self.raw_data_dir))
    }

    pub fn videos_path(&self) -> PathBuf {
        PathBuf::from(format!("{}{}", self.mode.prefix(), self.videos_dir))
    }

    pub fn level_table_path(&self) -> PathBuf {
        Path::new(&self.helper_files_dir).join(&self.level_table_file)
    }

    pub fn font_path(&self) -> PathBuf {
        Path::new(&self.helper_files_dir).join(&self.font_file)
    }
}

/// What to race and how the table is sampled.
#[derive(Debug, Deserialize, Clone)]
pub struct RaceSettings {
    #[serde(default = "default_skill")]
    pub skill: String,
    /// Keep every n-th snapshot (plus the last one). `None` keeps all.
    #[serde(default)]
    pub use_each_n: Option<usize>,
    /// Bars considered "on screen" for floor tracking and the summary.
    #[serde(default = "default_bars_visible")]
    pub bars_visible: usize,
    /// Interpolated frames rendered between two consecutive rows.
    #[serde(default = "default_steps_per_period")]
    pub steps_per_period: usize,
    /// Reference point for the "Since Release" label.
    #[serde(
        default = "default_started_at",
        deserialize_with = "deserialize_timestamp"
    )]
    pub started_at: NaiveDateTime,
}

fn default_skill() -> String {
    "necromancy".to_string()
}

fn default_bars_visible() -> usize {
    10
}

fn default_steps_per_period() -> usize {
    6
}

fn default_started_at() -> NaiveDateTime {
    // Necromancy release
    NaiveDateTime::parse_from_str("2023-08-07 12:00:00", TIMESTAMP_FORMAT).unwrap_or_default()
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self {
            skill: default_skill(),
            use_each_n: None,
            bars_visible: default_bars_visible(),
            steps_per_period: default_steps_per_period(),
            started_at: default_started_at(),
        }
    }
}

/// Position of a text block, in fractions of the canvas (0,0 = bottom left).
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct TextAnchor {
    pub x: f64,
    pub y: f64,
    pub size: u32,
}

/// Canvas and typography for the rendered race.
#[derive(Debug, Deserialize, Clone)]
pub struct RenderSettings {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Bars actually drawn per frame.
    #[serde(default = "default_n_bars")]
    pub n_bars: usize,
    /// Wall-clock length of one row-to-row period.
    #[serde(default = "default_period_length_ms")]
    pub period_length_ms: u32,
    /// Name the font file is registered under.
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_bar_label_size")]
    pub bar_label_size: u32,
    #[serde(default = "default_tick_label_size")]
    pub tick_label_size: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_period_fmt")]
    pub period_fmt: String,
    #[serde(default = "default_period_label")]
    pub period_label: TextAnchor,
    #[serde(default = "default_summary_label")]
    pub summary_label: TextAnchor,
}

fn default_width() -> u32 {
    1920 // 16in @ 120dpi
}

fn default_height() -> u32 {
    1080 // 9in @ 120dpi
}

fn default_n_bars() -> usize {
    10
}

fn default_period_length_ms() -> u32 {
    200
}

fn default_font_family() -> String {
    "DejaVu Sans".to_string()
}

fn default_bar_label_size() -> u32 {
    24
}

fn default_tick_label_size() -> u32 {
    18
}

fn default_period_fmt() -> String {
    "%Y-%m-%d -- %H:%I %p".to_string()
}

fn default_period_label() -> TextAnchor {
    TextAnchor {
        x: 0.70,
        y: 0.25,
        size: 30,
    }
}

fn default_summary_label() -> TextAnchor {
    TextAnchor {
        x: 0.98,
        y: 0.12,
        size: 30,
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            n_bars: default_n_bars(),
            period_length_ms: default_period_length_ms(),
            font_family: default_font_family(),
            bar_label_size: default_bar_label_size(),
            tick_label_size: default_tick_label_size(),
            title: None,
            period_fmt: default_period_fmt(),
            period_label: default_period_label(),
            summary_label: default_summary_label(),
        }
    }
}

impl RenderSettings {
    /// Delay between two emitted frames.
    pub fn frame_delay_ms(&self, steps_per_period: usize) -> u32 {
        let steps = steps_per_period.max(1) as u32;
        (self.period_length_ms / steps).max(1)
    }
}

/// Root application configuration.
///
/// Loaded from an optional `config` file in the working directory and
/// `HISCORES_RACE__<SECTION>__<KEY>` environment variables. Every field has
/// a default, so a bare checkout runs without any file.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub race: RaceSettings,
    #[serde(default)]
    pub render: RenderSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::build(File::with_name("config").required(false))
    }

    /// Load from an explicit file. The file must exist.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::build(File::from(path).required(true))
    }

    fn build<S>(file: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let s = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("HISCORES_RACE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }

    /// Reject combinations that would make the race impossible to render.
    pub fn validate(&self) -> Result<()> {
        if self.race.steps_per_period == 0 {
            bail!("race.steps_per_period must be at least 1");
        }
        if self.race.use_each_n == Some(0) {
            bail!("race.use_each_n must be at least 1 when set");
        }
        if self.render.n_bars == 0 {
            bail!("render.n_bars must be at least 1");
        }
        if self.render.width == 0 || self.render.height == 0 {
            bail!("render canvas must have a non-zero size");
        }
        let mut sample = String::new();
        if write!(sample, "{}", NaiveDateTime::default().format(&self.render.period_fmt)).is_err() {
            bail!("render.period_fmt {:?} is not a valid format", self.render.period_fmt);
        }
        Ok(())
    }
}
