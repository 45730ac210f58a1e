//! PNG output of the bar chart
//!
//! Text is drawn with a bundled DejaVu Sans face registered with plotters at
//! first use, so saving a chart needs no system fonts.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::register_font;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{format_value, BarChartModel};
use crate::error::{CurrencyError, Result};

/// Default output file for saved charts
pub const DEFAULT_IMAGE_PATH: &str = "currency_values.png";

/// Default image size in pixels (width, height)
pub const DEFAULT_IMAGE_SIZE: (u32, u32) = (1500, 800);

static FONT_DATA: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Share of each bar slot filled by the bar
const BAR_FILL: f64 = 0.8;

/// Pixels between the x-axis and the top of each rotated name
const LABEL_GAP: i32 = 6;

/// Number of intervals on the value scale
const TICKS: u32 = 4;

/// Plot area in pixel coordinates
///
/// The left margin holds the value scale and its caption, the top margin the
/// title, and the band under `bottom` the rotated currency names.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PlotArea {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl PlotArea {
    fn for_size((width, height): (u32, u32)) -> Self {
        let (width, height) = (width as i32, height as i32);
        Self {
            left: (width / 12).clamp(24, 120),
            top: (height / 12).clamp(16, 72),
            right: width - (width / 50).clamp(8, 30),
            bottom: height - height * 3 / 10,
        }
    }

    fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Corners of each bar, left to right
fn bar_rects(model: &BarChartModel, area: PlotArea) -> Vec<[(i32, i32); 2]> {
    if model.is_empty() {
        return Vec::new();
    }
    let max = model.max_value();
    let slot = f64::from(area.right - area.left) / model.len() as f64;

    model
        .bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let x0 = area.left as f64 + slot * i as f64 + slot * (1.0 - BAR_FILL) / 2.0;
            let x1 = x0 + slot * BAR_FILL;
            [
                (x0.round() as i32, area.bottom - value_height(bar.value, max, area)),
                (x1.round() as i32, area.bottom),
            ]
        })
        .collect()
}

fn value_height(value: f64, max: f64, area: PlotArea) -> i32 {
    if max > 0.0 {
        (value.max(0.0) / max * f64::from(area.height())).round() as i32
    } else {
        0
    }
}

/// Where each currency name starts: under the centre of its bar
fn label_anchors(model: &BarChartModel, area: PlotArea) -> Vec<(i32, i32)> {
    bar_rects(model, area)
        .iter()
        .map(|[(x0, _), (x1, _)]| ((x0 + x1) / 2, area.bottom + LABEL_GAP))
        .collect()
}

/// Scale values from zero to the largest bar
fn tick_values(max: f64) -> Vec<f64> {
    if max <= 0.0 {
        return vec![0.0];
    }
    (0..=TICKS)
        .map(|i| max * f64::from(i) / f64::from(TICKS))
        .collect()
}

fn chart_error<E: std::fmt::Display>(err: E) -> CurrencyError {
    CurrencyError::Chart(err.to_string())
}

/// Registers the bundled face as plotters' sans-serif family, once
fn ensure_font() -> Result<()> {
    static REGISTERED: OnceLock<bool> = OnceLock::new();
    let ok = *REGISTERED
        .get_or_init(|| register_font("sans-serif", FontStyle::Normal, FONT_DATA).is_ok());
    if ok {
        Ok(())
    } else {
        Err(CurrencyError::Chart("bundled font could not be loaded".to_string()))
    }
}

/// Draws the whole chart onto `root`: title, value scale, bars and names
fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    model: &BarChartModel,
    size: (u32, u32),
) -> Result<()> {
    ensure_font()?;
    let area = PlotArea::for_size(size);
    let max = model.max_value();

    root.fill(&WHITE).map_err(chart_error)?;

    // Title, centred in the top margin
    let title_style = (FontFamily::SansSerif, f64::from(area.top) * 0.5)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    root.draw_text(&model.title, &title_style, (size.0 as i32 / 2, area.top / 2))
        .map_err(chart_error)?;

    // Value caption, reading bottom to top along the left edge
    let scale_size = (f64::from(size.1) / 50.0).clamp(8.0, 16.0);
    let caption_style = (FontFamily::SansSerif, scale_size)
        .into_font()
        .transform(FontTransform::Rotate270)
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    root.draw_text(
        &model.y_label,
        &caption_style,
        (2, (area.top + area.bottom) / 2),
    )
    .map_err(chart_error)?;

    let tick_style = (FontFamily::SansSerif, scale_size)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Right, VPos::Center));
    for value in tick_values(max) {
        let y = area.bottom - value_height(value, max, area);
        root.draw(&PathElement::new(
            vec![(area.left - 4, y), (area.left, y)],
            BLACK.stroke_width(1),
        ))
        .map_err(chart_error)?;
        root.draw_text(&format_value(value), &tick_style, (area.left - 6, y))
            .map_err(chart_error)?;
    }

    for rect in bar_rects(model, area) {
        root.draw(&Rectangle::new(rect, BLUE.filled()))
            .map_err(chart_error)?;
    }

    root.draw(&PathElement::new(
        vec![
            (area.left, area.top),
            (area.left, area.bottom),
            (area.right, area.bottom),
        ],
        BLACK.stroke_width(2),
    ))
    .map_err(chart_error)?;

    // Names turned a quarter clockwise so long ones fit under narrow bars
    if !model.is_empty() {
        let slot = f64::from(area.right - area.left) / model.len() as f64;
        let label_style = (FontFamily::SansSerif, (slot * 0.7).clamp(6.0, 18.0))
            .into_font()
            .transform(FontTransform::Rotate90)
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Center));
        for (bar, anchor) in model.bars.iter().zip(label_anchors(model, area)) {
            root.draw_text(&bar.label, &label_style, anchor)
                .map_err(chart_error)?;
        }
    }

    Ok(())
}

/// Writes the chart as a PNG: titled, blue bars over a white background,
/// value scale on the left and rotated currency names under the bars
///
/// Creates the parent directory if needed. The format follows the file
/// extension.
pub fn save_png(model: &BarChartModel, path: &Path, size: (u32, u32)) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CurrencyError::io(parent, e))?;
    }

    let root = BitMapBackend::new(path, size).into_drawing_area();
    draw_chart(&root, model, size)?;
    root.present().map_err(chart_error)?;
    Ok(())
}
