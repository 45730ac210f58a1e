//! Bar-chart visualization of per-unit exchange rates
//!
//! A snapshot is first turned into a [`BarChartModel`] (one bar per record,
//! height = value of a single unit in roubles). The model can then be drawn in
//! the terminal with [`RateBarChart`] or written to a PNG with [`save_png`].

mod raster;
mod terminal;
mod widget;

pub use raster::{save_png, DEFAULT_IMAGE_PATH, DEFAULT_IMAGE_SIZE};
pub use terminal::show;
pub use widget::RateBarChart;

use std::path::PathBuf;

use rust_decimal::prelude::ToPrimitive;
use tracing::info;

use crate::data::CurrencySnapshot;
use crate::error::{CurrencyError, Result};

pub const CHART_TITLE: &str = "Currency Values";
pub const X_LABEL: &str = "Currency";
pub const Y_LABEL: &str = "Value in RUB";

/// A single bar: the currency name and its per-unit value
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

impl Bar {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Everything needed to draw the chart, independent of the output
#[derive(Debug, Clone, PartialEq)]
pub struct BarChartModel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub bars: Vec<Bar>,
}

impl BarChartModel {
    /// Builds one bar per record, in snapshot order
    ///
    /// An empty snapshot gives an empty chart. A record whose value cannot be
    /// normalized fails the whole chart.
    pub fn from_snapshot(snapshot: &CurrencySnapshot) -> Result<Self> {
        let bars = snapshot
            .records
            .iter()
            .map(|record| {
                let per_unit = record.per_unit_value()?;
                let value = per_unit.to_f64().ok_or_else(|| CurrencyError::InvalidNumber {
                    code: record.code.clone(),
                    value: per_unit.to_string(),
                })?;
                Ok(Bar::new(record.name.clone(), value))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            title: CHART_TITLE.to_string(),
            x_label: X_LABEL.to_string(),
            y_label: Y_LABEL.to_string(),
            bars,
        })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Largest bar value, or 0.0 for an empty chart
    pub fn max_value(&self) -> f64 {
        self.bars.iter().map(|b| b.value).fold(0.0, f64::max)
    }
}

/// How a chart should be delivered
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Write the chart to `file_path`
    pub save_to_file: bool,
    /// Target of the PNG output
    pub file_path: PathBuf,
    /// Pixel size of the PNG output
    pub image_size: (u32, u32),
    /// Display the chart full-screen in the terminal until a key is pressed
    pub show: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            save_to_file: false,
            file_path: PathBuf::from(DEFAULT_IMAGE_PATH),
            image_size: DEFAULT_IMAGE_SIZE,
            show: true,
        }
    }
}

/// Renders a snapshot: saves the image first when asked, then shows it
///
/// Returns the model that was drawn.
pub fn render(snapshot: &CurrencySnapshot, options: &RenderOptions) -> Result<BarChartModel> {
    let model = BarChartModel::from_snapshot(snapshot)?;

    if options.save_to_file {
        save_png(&model, &options.file_path, options.image_size)?;
        info!(path = %options.file_path.display(), bars = model.len(), "saved chart image");
    }

    if options.show {
        show(&model)?;
    }

    Ok(model)
}

/// Formats an axis value with two decimals
pub(crate) fn format_value(value: f64) -> String {
    format!("{:.2}", value)
}
