use std::path::Path;

use ndarray::Array2;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{ColorMap, PlotError};
use crate::ml::metrics::ConfusionMatrix;

const FIGURE_SIZE: (u32, u32) = (720, 600);
const COLORBAR_WIDTH: i32 = 90;

/// Rendering options for [`plot_confusion_matrix`].
#[derive(Debug, Clone)]
pub struct ConfusionPlotOptions {
    /// Divide each row by its sum before drawing.
    pub normalize: bool,
    pub title: String,
    pub cmap: ColorMap,
}

impl Default for ConfusionPlotOptions {
    fn default() -> Self {
        Self {
            normalize: false,
            title: "Confusion matrix".to_string(),
            cmap: ColorMap::default(),
        }
    }
}

/// Render a confusion matrix as an annotated heatmap.
///
/// The matrix (normalized if requested) is printed to the console either way.
/// Cells are annotated with their value, two decimals when normalized and
/// integer counts otherwise; annotation text flips from black to white above
/// half the matrix maximum so it stays legible against the colormap. Rows are
/// true labels, columns predicted labels. The output format follows the file
/// extension (`png` or `svg`). A class with no true examples normalizes to a
/// NaN row, which draws as the colormap floor and annotates as `NaN`.
pub fn plot_confusion_matrix(
    cm: &ConfusionMatrix,
    classes: &[String],
    options: &ConfusionPlotOptions,
    out_path: &Path,
) -> Result<(), PlotError> {
    if classes.len() != cm.n_classes {
        return Err(PlotError::LabelMismatch {
            labels: classes.len(),
            classes: cm.n_classes,
        });
    }
    let values = if options.normalize {
        cm.normalized()
    } else {
        cm.to_array()
    };
    print_matrix(&values, options.normalize);
    if classes.is_empty() {
        return Ok(());
    }

    let extension = out_path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    match extension {
        "png" => {
            let root = BitMapBackend::new(out_path, FIGURE_SIZE).into_drawing_area();
            draw(&root, &values, classes, options)?;
            root.present()?;
        }
        "svg" => {
            let root = SVGBackend::new(out_path, FIGURE_SIZE).into_drawing_area();
            draw(&root, &values, classes, options)?;
            root.present()?;
        }
        other => return Err(PlotError::UnsupportedFormat(other.to_string())),
    }
    Ok(())
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    values: &Array2<f64>,
    classes: &[String],
    options: &ConfusionPlotOptions,
) -> Result<(), PlotError> {
    root.fill(&WHITE)?;
    let k = classes.len();
    let (width, _) = root.dim_in_pixel();
    let (main, bar) = root.split_horizontally(width as i32 - COLORBAR_WIDTH);

    let max = values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(0.0f64, f64::max);
    let threshold = max / 2.0;
    let span = -0.5f64..(k as f64 - 0.5);

    let mut chart = ChartBuilder::on(&main)
        .caption(&options.title, ("sans-serif", 26))
        .margin(10)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(span.clone(), span)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(k)
        .y_labels(k)
        .x_label_formatter(&|v| tick_name(classes, *v, false))
        .y_label_formatter(&|v| tick_name(classes, *v, true))
        .x_desc("Predicted label")
        .y_desc("True label")
        .draw()?;

    // Row 0 at the top, like the printed matrix.
    let cell_center = |truth: usize, predicted: usize| -> (f64, f64) {
        (predicted as f64, (k - 1 - truth) as f64)
    };

    chart.draw_series((0..k).flat_map(|truth| {
        (0..k).map(move |predicted| {
            let (x, y) = cell_center(truth, predicted);
            let v = values[[truth, predicted]];
            let t = if max > 0.0 { v / max } else { 0.0 };
            Rectangle::new(
                [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)],
                options.cmap.sample(t).filled(),
            )
        })
    }))?;

    let mut annotations = Vec::with_capacity(k * k);
    for truth in 0..k {
        for predicted in 0..k {
            let (x, y) = cell_center(truth, predicted);
            let v = values[[truth, predicted]];
            let color = if v > threshold { &WHITE } else { &BLACK };
            let style = ("sans-serif", 16)
                .into_font()
                .color(color)
                .pos(Pos::new(HPos::Center, VPos::Center));
            annotations.push(Text::new(format_cell(v, options.normalize), (x, y), style));
        }
    }
    chart.draw_series(annotations)?;

    draw_colorbar(&bar, max, options.cmap)?;
    Ok(())
}

fn draw_colorbar<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    max: f64,
    cmap: ColorMap,
) -> Result<(), PlotError> {
    let top = if max > 0.0 { max } else { 1.0 };
    let mut chart = ChartBuilder::on(area)
        .margin(12)
        .y_label_area_size(44)
        .build_cartesian_2d(0.0f64..1.0, 0.0f64..top)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(0)
        .y_labels(6)
        .draw()?;

    let steps = 64;
    chart.draw_series((0..steps).map(|step| {
        let lo = top * f64::from(step) / f64::from(steps);
        let hi = top * f64::from(step + 1) / f64::from(steps);
        let t = (f64::from(step) + 0.5) / f64::from(steps);
        Rectangle::new([(0.0, lo), (1.0, hi)], cmap.sample(t).filled())
    }))?;
    Ok(())
}

fn tick_name(classes: &[String], v: f64, flip: bool) -> String {
    let idx = v.round();
    if (v - idx).abs() > 0.25 || idx < 0.0 {
        return String::new();
    }
    let mut idx = idx as usize;
    if idx >= classes.len() {
        return String::new();
    }
    if flip {
        idx = classes.len() - 1 - idx;
    }
    classes[idx].clone()
}

fn format_cell(v: f64, normalized: bool) -> String {
    if normalized {
        format!("{v:.2}")
    } else {
        format!("{}", v as i64)
    }
}

fn print_matrix(values: &Array2<f64>, normalized: bool) {
    if normalized {
        println!("Normalized confusion matrix");
    } else {
        println!("Confusion matrix, without normalization");
    }
    for row in values.rows() {
        let mut line = String::new();
        for v in row {
            if normalized {
                line.push_str(&format!("{v:8.2}"));
            } else {
                line.push_str(&format!("{:8}", *v as i64));
            }
        }
        println!("{line}");
    }
}
