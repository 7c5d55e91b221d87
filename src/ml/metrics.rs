//! Evaluation metrics for classification models.

use ndarray::Array2;

#[derive(Debug, Clone)]
/// Confusion matrix for a `K`-class classifier.
pub struct ConfusionMatrix {
    /// Number of classes.
    pub n_classes: usize,
    /// Row-major `KxK` counts (`truth * K + predicted`).
    pub counts: Vec<u32>,
}

impl ConfusionMatrix {
    /// Create an empty `KxK` confusion matrix.
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_classes,
            counts: vec![0; n_classes * n_classes],
        }
    }

    /// Tally positionally paired truth/prediction label sequences.
    pub fn from_predictions(n_classes: usize, truth: &[usize], predicted: &[usize]) -> Self {
        let mut cm = Self::new(n_classes);
        for (&t, &p) in truth.iter().zip(predicted) {
            cm.add(t, p);
        }
        cm
    }

    pub fn add(&mut self, truth: usize, predicted: usize) {
        if truth >= self.n_classes || predicted >= self.n_classes {
            return;
        }
        let idx = truth * self.n_classes + predicted;
        self.counts[idx] = self.counts[idx].saturating_add(1);
    }

    pub fn get(&self, truth: usize, predicted: usize) -> u32 {
        self.counts[truth * self.n_classes + predicted]
    }

    /// Counts as a `KxK` float matrix (rows = truth, columns = predicted).
    pub fn to_array(&self) -> Array2<f64> {
        let k = self.n_classes;
        Array2::from_shape_fn((k, k), |(truth, predicted)| {
            f64::from(self.get(truth, predicted))
        })
    }

    /// Row-stochastic view: each row divided by its sum.
    ///
    /// A class with no true examples divides zero by zero and yields a NaN
    /// row; that is surfaced to the caller unchanged.
    pub fn normalized(&self) -> Array2<f64> {
        let mut rows = self.to_array();
        for mut row in rows.rows_mut() {
            let sum = row.sum();
            row.mapv_inplace(|v| v / sum);
        }
        rows
    }
}

#[derive(Debug, Clone)]
/// Precision/recall statistics for a single class.
pub struct PerClassStats {
    /// `TP / (TP + FP)`.
    pub precision: f64,
    /// `TP / (TP + FN)`.
    pub recall: f64,
    /// Total number of true examples for the class.
    pub support: u32,
}

/// Compute per-class precision and recall from a confusion matrix.
pub fn precision_recall_by_class(cm: &ConfusionMatrix) -> Vec<PerClassStats> {
    let k = cm.n_classes;
    let mut stats = Vec::with_capacity(k);
    for class_idx in 0..k {
        let tp = f64::from(cm.get(class_idx, class_idx));
        let mut fp = 0f64;
        let mut fn_ = 0f64;
        let mut support = 0u32;
        for j in 0..k {
            let v = cm.get(class_idx, j);
            support = support.saturating_add(v);
            if j != class_idx {
                fn_ += f64::from(v);
            }
        }
        for i in 0..k {
            if i != class_idx {
                fp += f64::from(cm.get(i, class_idx));
            }
        }
        let precision = if tp + fp == 0.0 { 0.0 } else { tp / (tp + fp) };
        let recall = if tp + fn_ == 0.0 { 0.0 } else { tp / (tp + fn_) };
        stats.push(PerClassStats {
            precision,
            recall,
            support,
        });
    }
    stats
}

/// Compute overall accuracy from a confusion matrix.
pub fn accuracy(cm: &ConfusionMatrix) -> f64 {
    let mut correct = 0u64;
    let mut total = 0u64;
    for truth in 0..cm.n_classes {
        for predicted in 0..cm.n_classes {
            let v = u64::from(cm.get(truth, predicted));
            total += v;
            if truth == predicted {
                correct += v;
            }
        }
    }
    if total == 0 {
        0.0
    } else {
        (correct as f64) / (total as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_class() -> ConfusionMatrix {
        let mut cm = ConfusionMatrix::new(2);
        for _ in 0..8 {
            cm.add(0, 0);
        }
        for _ in 0..2 {
            cm.add(0, 1);
        }
        for _ in 0..3 {
            cm.add(1, 0);
        }
        for _ in 0..7 {
            cm.add(1, 1);
        }
        cm
    }

    #[test]
    fn normalized_rows_sum_to_one() {
        let norm = two_class().normalized();
        assert_eq!(norm[[0, 0]], 0.8);
        assert_eq!(norm[[0, 1]], 0.2);
        assert_eq!(norm[[1, 0]], 0.3);
        assert_eq!(norm[[1, 1]], 0.7);
    }

    #[test]
    fn to_array_leaves_counts_unchanged() {
        let raw = two_class().to_array();
        assert_eq!(raw[[0, 0]], 8.0);
        assert_eq!(raw[[1, 1]], 7.0);
    }

    #[test]
    fn empty_truth_row_normalizes_to_nan() {
        let mut cm = ConfusionMatrix::new(2);
        cm.add(0, 0);
        let norm = cm.normalized();
        assert!(norm[[1, 0]].is_nan());
        assert!(norm[[1, 1]].is_nan());
    }

    #[test]
    fn accuracy_counts_diagonal_mass() {
        assert!((accuracy(&two_class()) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn from_predictions_tallies_pairs() {
        let cm = ConfusionMatrix::from_predictions(2, &[0, 0, 1, 1], &[0, 1, 1, 1]);
        assert_eq!(cm.get(0, 0), 1);
        assert_eq!(cm.get(0, 1), 1);
        assert_eq!(cm.get(1, 1), 2);
    }

    #[test]
    fn per_class_stats_use_support() {
        let stats = precision_recall_by_class(&two_class());
        assert_eq!(stats[0].support, 10);
        assert!((stats[0].recall - 0.8).abs() < 1e-12);
        assert!((stats[1].precision - 7.0 / 9.0).abs() < 1e-12);
    }
}
