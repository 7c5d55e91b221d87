//! Plot rendering for training diagnostics.
//!
//! Figures are drawn with `plotters`. Raster output is PNG; vector output is
//! SVG. Every renderer writes into a caller-supplied directory and fails if
//! the directory is missing; nothing here creates directories.

mod confusion;
mod performance;
mod probability;

pub use confusion::{ConfusionPlotOptions, plot_confusion_matrix};
pub use performance::plot_performance;
pub use probability::{ProbabilitySeries, plot_probabilities, probability_plot_paths};

use plotters::drawing::DrawingAreaErrorKind;
use plotters::style::RGBColor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("draw error: {0}")]
    Draw(String),
    #[error("unsupported plot format: {0}")]
    UnsupportedFormat(String),
    #[error("class/label count mismatch: {labels} labels for {classes} classes")]
    LabelMismatch { labels: usize, classes: usize },
}

impl<E: std::error::Error + Send + Sync> From<DrawingAreaErrorKind<E>> for PlotError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        PlotError::Draw(err.to_string())
    }
}

/// Series color, matching the default matplotlib cycle the collaboration's
/// older plots used.
pub const TAB_BLUE: RGBColor = RGBColor(31, 119, 180);
pub const TAB_ORANGE: RGBColor = RGBColor(255, 127, 14);
pub const TAB_GREEN: RGBColor = RGBColor(44, 160, 44);
pub const TAB_RED: RGBColor = RGBColor(214, 39, 40);
pub const TAB_PURPLE: RGBColor = RGBColor(148, 103, 189);
pub const TAB_CYAN: RGBColor = RGBColor(23, 190, 207);

/// Sequential colormap for heatmap cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMap {
    /// White through dark blue.
    #[default]
    Blues,
    /// White through dark red.
    Reds,
}

impl ColorMap {
    /// Color for a value scaled into `[0, 1]`. Out-of-range and NaN inputs
    /// clamp to the endpoints.
    pub fn sample(&self, t: f64) -> RGBColor {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let (lo, hi) = match self {
            ColorMap::Blues => ((247u8, 251u8, 255u8), (8u8, 48u8, 107u8)),
            ColorMap::Reds => ((255u8, 245u8, 240u8), (103u8, 0u8, 13u8)),
        };
        let mix = |a: u8, b: u8| -> u8 { (f64::from(a) + (f64::from(b) - f64::from(a)) * t) as u8 };
        RGBColor(mix(lo.0, hi.0), mix(lo.1, hi.1), mix(lo.2, hi.2))
    }
}
