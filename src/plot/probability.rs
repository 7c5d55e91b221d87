use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::info;

use super::PlotError;

const FIGURE_SIZE: (u32, u32) = (640, 480);
const N_BINS: usize = 20;
/// Density floor so empty bins stay drawable on the log axis.
const LOG_FLOOR: f64 = 1e-2;

/// Predicted class probabilities for the events of one true class.
#[derive(Debug, Clone)]
pub struct ProbabilitySeries {
    /// One row per event, one probability per class.
    pub probabilities: Vec<Vec<f32>>,
    /// Class name, used in titles, legends, and file names.
    pub label: String,
    pub color: RGBColor,
}

/// Render per-class probability histograms.
///
/// For each class `i` one figure is produced, overlaying for every class `j` a
/// density-normalized step histogram (20 bins over `[0, 1]`, log-scaled y) of
/// the probability the classifier assigns to class `i` for events truly of
/// class `j`. Good separation shows as the `i == j` distribution piling up
/// near 1 while the others pile up near 0. Each figure is saved to
/// `prob_<label_i>.svg` in `out_dir` and closed. N classes give N figures of
/// N series each.
pub fn plot_probabilities(bundle: &[ProbabilitySeries], out_dir: &Path) -> Result<(), PlotError> {
    for (class_idx, series) in bundle.iter().enumerate() {
        let path = out_dir.join(format!("prob_{}.svg", series.label));
        render_one(bundle, class_idx, &path)?;
        info!(class = %series.label, path = %path.display(), "probability histogram written");
    }
    Ok(())
}

/// Output paths [`plot_probabilities`] will write for a bundle.
pub fn probability_plot_paths(bundle: &[ProbabilitySeries], out_dir: &Path) -> Vec<PathBuf> {
    bundle
        .iter()
        .map(|series| out_dir.join(format!("prob_{}.svg", series.label)))
        .collect()
}

fn render_one(
    bundle: &[ProbabilitySeries],
    class_idx: usize,
    out_path: &Path,
) -> Result<(), PlotError> {
    let root = SVGBackend::new(out_path, FIGURE_SIZE).into_drawing_area();
    draw(&root, bundle, class_idx)?;
    root.present()?;
    Ok(())
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    bundle: &[ProbabilitySeries],
    class_idx: usize,
) -> Result<(), PlotError> {
    root.fill(&WHITE)?;

    let histograms: Vec<Vec<f64>> = bundle
        .iter()
        .map(|series| histogram_density(&series.probabilities, class_idx))
        .collect();
    let y_max = histograms
        .iter()
        .flatten()
        .copied()
        .fold(LOG_FLOOR, f64::max);

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(0.0f64..1.0, (LOG_FLOOR..y_max * 2.0).log_scale())?;

    chart
        .configure_mesh()
        .x_desc(format!(
            "Probability for {} Classification",
            bundle[class_idx].label
        ))
        .y_desc("density")
        .draw()?;

    for (series, histogram) in bundle.iter().zip(&histograms) {
        let color = series.color;
        chart
            .draw_series(LineSeries::new(
                step_points(histogram),
                color.stroke_width(2),
            ))?
            .label(series.label.clone())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperMiddle)
        .background_style(WHITE.mix(0.8).filled())
        .border_style(BLACK.stroke_width(1))
        .draw()?;
    Ok(())
}

/// Density-normalized histogram of column `class_idx` over `[0, 1]`.
fn histogram_density(rows: &[Vec<f32>], class_idx: usize) -> Vec<f64> {
    let mut counts = vec![0usize; N_BINS];
    let mut total = 0usize;
    for row in rows {
        let Some(&p) = row.get(class_idx) else {
            continue;
        };
        let bin = ((f64::from(p) * N_BINS as f64) as usize).min(N_BINS - 1);
        counts[bin] += 1;
        total += 1;
    }
    let bin_width = 1.0 / N_BINS as f64;
    counts
        .into_iter()
        .map(|count| {
            if total == 0 {
                0.0
            } else {
                count as f64 / (total as f64 * bin_width)
            }
        })
        .collect()
}

/// Step-outline points for a histogram, floored for the log axis.
fn step_points(histogram: &[f64]) -> impl Iterator<Item = (f64, f64)> + '_ {
    let bin_width = 1.0 / N_BINS as f64;
    histogram.iter().enumerate().flat_map(move |(bin, &v)| {
        let v = v.max(LOG_FLOOR);
        let left = bin as f64 * bin_width;
        let right = left + bin_width;
        [(left, v), (right, v)]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{TAB_BLUE, TAB_ORANGE};
    use tempfile::tempdir;

    fn bundle() -> Vec<ProbabilitySeries> {
        let qcd_rows = vec![vec![0.9, 0.1], vec![0.8, 0.2], vec![0.7, 0.3]];
        let higgs_rows = vec![vec![0.2, 0.8], vec![0.1, 0.9]];
        vec![
            ProbabilitySeries {
                probabilities: qcd_rows,
                label: "QCD".to_string(),
                color: TAB_BLUE,
            },
            ProbabilitySeries {
                probabilities: higgs_rows,
                label: "Higgs".to_string(),
                color: TAB_ORANGE,
            },
        ]
    }

    #[test]
    fn writes_one_figure_per_class() {
        let dir = tempdir().unwrap();
        plot_probabilities(&bundle(), dir.path()).unwrap();
        let paths = probability_plot_paths(&bundle(), dir.path());
        assert_eq!(paths.len(), 2);
        for path in paths {
            assert!(std::fs::metadata(&path).unwrap().len() > 0);
        }
    }

    #[test]
    fn density_integrates_to_one() {
        let rows = vec![vec![0.05f32], vec![0.5], vec![0.5], vec![0.95]];
        let histogram = histogram_density(&rows, 0);
        let bin_width = 1.0 / N_BINS as f64;
        let integral: f64 = histogram.iter().map(|v| v * bin_width).sum();
        assert!((integral - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unit_probability_lands_in_last_bin() {
        let histogram = histogram_density(&[vec![1.0f32]], 0);
        assert!(histogram[N_BINS - 1] > 0.0);
    }

    #[test]
    fn empty_bundle_writes_nothing() {
        let dir = tempdir().unwrap();
        plot_probabilities(&[], dir.path()).unwrap();
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn step_outline_has_two_points_per_bin() {
        let histogram = vec![0.0; N_BINS];
        assert_eq!(step_points(&histogram).count(), 2 * N_BINS);
    }
}
