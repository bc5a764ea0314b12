//! Animated GIF output via `plotters`' bitmap backend.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::config::{RenderSettings, TextAnchor};
use crate::models::RaceTable;
use crate::utils::format_thousands_f64;

use super::{Frame, Frames, PeriodSummary, RaceRenderer};

const SUMMARY_COLOR: RGBColor = RGBColor(0, 0, 205);
const PERIOD_COLOR: RGBColor = RGBColor(105, 105, 105);
const GRID_COLOR: RGBColor = RGBColor(225, 225, 225);

/// Share of the canvas width reserved for player names.
const NAME_AREA: f64 = 0.16;
/// Share of the canvas width reserved after the longest bar for its label.
const VALUE_AREA: f64 = 0.12;
/// Fraction of a bar slot filled by the bar itself.
const BAR_THICKNESS: f64 = 0.8;

/// DejaVu Sans Bold, shipped in `helper_files/` with its license.
static BUNDLED_FONT: &[u8] = include_bytes!("../../helper_files/DejaVuSans-Bold.ttf");

/// Register the TrueType font at `path` under `family`, for both the
/// regular and bold styles used by the renderer. Falls back to the bundled
/// font when `path` does not exist.
pub fn register_font_file(family: &str, path: &Path) -> Result<()> {
    if !path.exists() {
        warn!(
            "Font {} not found, using bundled DejaVu Sans Bold",
            path.display()
        );
        return register_font_bytes(family, BUNDLED_FONT)
            .context("Bundled font rejected by plotters");
    }

    let bytes = fs::read(path).with_context(|| format!("Failed to read font {}", path.display()))?;
    // plotters keeps registered fonts for the rest of the process
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());

    register_font_bytes(family, bytes)
        .with_context(|| format!("Invalid font {}", path.display()))?;

    info!("Registered font {} from {}", family, path.display());
    Ok(())
}

fn register_font_bytes(family: &str, bytes: &'static [u8]) -> Result<()> {
    for style in [FontStyle::Normal, FontStyle::Bold] {
        plotters::style::register_font(family, style, bytes)
            .map_err(|_| anyhow!("Not a usable TrueType font"))?;
    }
    Ok(())
}

/// Renders a race table to an animated GIF.
pub struct GifRenderer {
    settings: RenderSettings,
    steps_per_period: usize,
}

impl GifRenderer {
    pub fn new(settings: RenderSettings, steps_per_period: usize) -> Self {
        Self {
            settings,
            steps_per_period: steps_per_period.max(1),
        }
    }

    fn draw_frame<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        table: &RaceTable,
        frame: &Frame,
        summary: &dyn PeriodSummary,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let width = self.settings.width as f64;
        let height = self.settings.height as f64;
        let n_bars = self.settings.n_bars;
        let family = self.settings.font_family.as_str();

        let top = height * if self.settings.title.is_some() { 0.10 } else { 0.04 };
        let bottom = height * 0.96;
        let slot_height = (bottom - top) / n_bars as f64;
        let bar_left = width * NAME_AREA;
        let bar_span = width * (1.0 - NAME_AREA - VALUE_AREA);

        if let Some(title) = &self.settings.title {
            root.draw(&Text::new(
                title.as_str(),
                ((width / 2.0) as i32, (top / 2.0) as i32),
                (family, 36.0, FontStyle::Bold)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Center)),
            ))?;
        }

        let visible = frame.visible(n_bars);
        let max_value = visible
            .iter()
            .map(|&j| frame.values[j])
            .fold(0.0, f64::max)
            .max(1.0);

        for tick in 1..5 {
            let x = (bar_left + bar_span * tick as f64 / 4.0) as i32;
            root.draw(&PathElement::new(
                vec![(x, top as i32), (x, bottom as i32)],
                GRID_COLOR.stroke_width(1),
            ))?;
        }

        let name_style = (family, self.settings.tick_label_size as f64, FontStyle::Bold)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Right, VPos::Center));
        let value_style = (family, self.settings.bar_label_size as f64, FontStyle::Bold)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Center));

        for column in visible {
            let value = frame.values[column];
            let center = top + (frame.ranks[column] + 0.5) * slot_height;
            let half = slot_height * BAR_THICKNESS / 2.0;
            let bar_right = bar_left + bar_span * (value / max_value).clamp(0.0, 1.0);

            root.draw(&Rectangle::new(
                [
                    (bar_left as i32, (center - half) as i32),
                    (bar_right as i32, (center + half) as i32),
                ],
                Palette99::pick(column).filled(),
            ))?;
            root.draw(&Text::new(
                table.players[column].as_str(),
                ((bar_left - 10.0) as i32, center as i32),
                name_style.clone(),
            ))?;
            root.draw(&Text::new(
                format_thousands_f64(value),
                ((bar_right + 8.0) as i32, center as i32),
                value_style.clone(),
            ))?;
        }

        let period = frame.timestamp.format(&self.settings.period_fmt).to_string();
        self.draw_block(root, &period, self.settings.period_label, &PERIOD_COLOR)?;

        let block = summary.summarize(frame);
        self.draw_block(root, &block.text, block.anchor, &SUMMARY_COLOR)?;

        Ok(())
    }

    /// Right-aligned, vertically centred multi-line text at a fractional
    /// canvas position.
    fn draw_block<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        text: &str,
        anchor: TextAnchor,
        color: &RGBColor,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        let line_height = anchor.size as f64 * 1.3;
        let x = anchor.x * self.settings.width as f64;
        let center = (1.0 - anchor.y) * self.settings.height as f64;
        let first = center - line_height * (lines.len().saturating_sub(1)) as f64 / 2.0;

        let style = (self.settings.font_family.as_str(), anchor.size as f64)
            .into_font()
            .color(color)
            .pos(Pos::new(HPos::Right, VPos::Center));

        for (i, line) in lines.into_iter().enumerate() {
            let y = first + line_height * i as f64;
            root.draw(&Text::new(line, (x as i32, y as i32), style.clone()))?;
        }
        Ok(())
    }
}

impl RaceRenderer for GifRenderer {
    fn render(&self, table: &RaceTable, summary: &dyn PeriodSummary, output: &Path) -> Result<()> {
        let delay = self.settings.frame_delay_ms(self.steps_per_period);
        let root = BitMapBackend::gif(
            output,
            (self.settings.width, self.settings.height),
            delay,
        )
        .with_context(|| format!("Failed to create {}", output.display()))?
        .into_drawing_area();

        let frames = Frames::new(table, self.steps_per_period, self.settings.n_bars);
        let total = frames.len();
        info!(
            "Rendering {} frames ({}ms each) to {}",
            total,
            delay,
            output.display()
        );

        for frame in frames {
            root.fill(&WHITE)?;
            self.draw_frame(&root, table, &frame, summary)?;
            root.present()
                .with_context(|| format!("Failed to write frame {}", frame.index))?;

            if frame.index % 100 == 0 {
                debug!("Frame {}/{}", frame.index + 1, total);
            }
        }

        Ok(())
    }
}
