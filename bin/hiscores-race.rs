use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use jemallocator::Jemalloc;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use hiscores_race::{config::RunMode, pipeline, Settings};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Real scrape and output directories
    Production,
    /// TEST_-prefixed directories
    Test,
}

impl From<Mode> for RunMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Production => RunMode::Production,
            Mode::Test => RunMode::Test,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "hiscores-race", version)]
#[command(about = "Render a bar chart race from scraped hiscores snapshots")]
struct Args {
    /// Settings file (defaults to ./config.* if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skill to race
    #[arg(long)]
    skill: Option<String>,

    /// Keep every n-th snapshot (the last one is always kept)
    #[arg(long)]
    every_n: Option<usize>,

    /// Bars treated as visible for the floor and the summary
    #[arg(long)]
    bars_visible: Option<usize>,

    /// Interpolated frames between two snapshots
    #[arg(long)]
    steps_per_period: Option<usize>,

    /// Directory set to read from and write to
    #[arg(long, value_enum)]
    mode: Option<Mode>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    SimpleLogger::new()
        .with_level(if args.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init()
        .unwrap();

    let mut settings = match &args.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Settings::new().context("Failed to load config")?,
    };

    if let Some(skill) = args.skill {
        settings.race.skill = skill;
    }
    if let Some(n) = args.every_n {
        settings.race.use_each_n = Some(n);
    }
    if let Some(k) = args.bars_visible {
        settings.race.bars_visible = k;
    }
    if let Some(steps) = args.steps_per_period {
        settings.race.steps_per_period = steps;
    }
    if let Some(mode) = args.mode {
        settings.paths.mode = mode.into();
    }

    info!(
        "Racing {} from {} ({:?} mode)",
        settings.race.skill,
        settings.paths.raw_data_path().display(),
        settings.paths.mode
    );

    let output = pipeline::run(&settings)?;
    info!("Bar race written to {}", output.display());

    Ok(())
}
