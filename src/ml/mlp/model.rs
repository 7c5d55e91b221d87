use serde::{Deserialize, Serialize};

/// One-hidden-layer softmax classifier over standardized event rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MlpModel {
    pub model_version: i64,
    /// Input width in `f32` values (number of training branches).
    pub n_inputs: usize,
    /// Class names, index-aligned with the label encoding.
    pub classes: Vec<String>,
    pub hidden_size: usize,
    /// Row-major `hidden x input` weights.
    pub weights1: Vec<f32>,
    pub bias1: Vec<f32>,
    /// Row-major `class x hidden` weights.
    pub weights2: Vec<f32>,
    pub bias2: Vec<f32>,
    /// Per-input standardization mean.
    pub feature_mean: Vec<f32>,
    /// Per-input standardization deviation.
    pub feature_std: Vec<f32>,
}

impl MlpModel {
    pub fn validate(&self) -> Result<(), String> {
        let input = self.n_inputs;
        let hidden = self.hidden_size;
        let classes = self.classes.len();
        if classes < 2 {
            return Err("Need at least 2 classes".to_string());
        }
        if self.weights1.len() != hidden * input || self.bias1.len() != hidden {
            return Err(format!(
                "Hidden layer shape mismatch (input={input}, hidden={hidden})"
            ));
        }
        if self.weights2.len() != classes * hidden || self.bias2.len() != classes {
            return Err(format!(
                "Output layer shape mismatch (hidden={hidden}, classes={classes})"
            ));
        }
        if self.feature_mean.len() != input || self.feature_std.len() != input {
            return Err("Standardization vectors do not match input width".to_string());
        }
        Ok(())
    }

    /// Per-class probabilities for one event row.
    pub fn predict_proba(&self, row: &[f32]) -> Vec<f32> {
        let d = self.n_inputs.min(row.len());
        let mut x_norm = vec![0.0f32; self.n_inputs];
        for i in 0..d {
            let denom = self.feature_std[i].max(1e-6);
            x_norm[i] = (row[i] - self.feature_mean[i]) / denom;
        }

        let mut hidden = vec![0.0f32; self.hidden_size];
        for (h, act) in hidden.iter_mut().enumerate() {
            let mut sum = self.bias1[h];
            let base = h * self.n_inputs;
            for i in 0..self.n_inputs {
                sum += self.weights1[base + i] * x_norm[i];
            }
            *act = sum.max(0.0);
        }

        let n_classes = self.classes.len();
        let mut logits = vec![0.0f32; n_classes];
        for (c, logit) in logits.iter_mut().enumerate() {
            let mut sum = self.bias2[c];
            let base = c * self.hidden_size;
            for (h, act) in hidden.iter().enumerate() {
                sum += self.weights2[base + h] * act;
            }
            *logit = sum;
        }

        let mut probs = vec![0.0f32; n_classes];
        softmax_inplace(&logits, &mut probs);
        probs
    }

    /// Index of the highest-probability class for one event row.
    pub fn predict(&self, row: &[f32]) -> usize {
        let probs = self.predict_proba(row);
        let mut best_idx = 0usize;
        let mut best_val = f32::NEG_INFINITY;
        for (idx, &value) in probs.iter().enumerate() {
            if value > best_val {
                best_val = value;
                best_idx = idx;
            }
        }
        best_idx
    }
}

pub(super) fn softmax_inplace(raw: &[f32], out: &mut [f32]) {
    if raw.is_empty() || out.is_empty() {
        return;
    }
    let max = raw.iter().copied().fold(f32::NEG_INFINITY, |a, b| a.max(b));
    let mut sum = 0.0f32;
    for (i, &v) in raw.iter().enumerate() {
        let e = (v - max).exp();
        out[i] = e;
        sum += e;
    }
    if sum == 0.0 {
        let uniform = 1.0 / (raw.len() as f32);
        for v in out.iter_mut() {
            *v = uniform;
        }
        return;
    }
    for v in out.iter_mut() {
        *v /= sum;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_model() -> MlpModel {
        MlpModel {
            model_version: 1,
            n_inputs: 2,
            classes: vec!["QCD".to_string(), "Higgs".to_string()],
            hidden_size: 2,
            weights1: vec![1.0, 0.0, 0.0, 1.0],
            bias1: vec![0.0, 0.0],
            weights2: vec![2.0, 0.0, 0.0, 2.0],
            bias2: vec![0.0, 0.0],
            feature_mean: vec![0.0, 0.0],
            feature_std: vec![1.0, 1.0],
        }
    }

    #[test]
    fn probabilities_sum_to_one() {
        let probs = tiny_model().predict_proba(&[0.3, -0.7]);
        assert_eq!(probs.len(), 2);
        let total: f32 = probs.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn predict_tracks_dominant_input() {
        let model = tiny_model();
        assert_eq!(model.predict(&[5.0, 0.0]), 0);
        assert_eq!(model.predict(&[0.0, 5.0]), 1);
    }

    #[test]
    fn validate_rejects_shape_mismatch() {
        let mut model = tiny_model();
        model.weights2.pop();
        assert!(model.validate().is_err());
    }

    #[test]
    fn softmax_handles_underflow() {
        let mut out = vec![0.0f32; 2];
        softmax_inplace(&[-1e30, -1e30], &mut out);
        assert!((out[0] - 0.5).abs() < 1e-6);
    }
}
