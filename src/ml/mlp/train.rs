use rand::rngs::StdRng;
use rand::{Rng, SeedableRng, seq::SliceRandom};
use tracing::info;

use super::MlpModel;
use super::model::softmax_inplace;

#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub hidden_size: usize,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f32,
    pub l2_penalty: f32,
    /// Fraction of the input held out (from the tail) for validation.
    pub validation_fraction: f32,
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            hidden_size: 40,
            epochs: 30,
            batch_size: 128,
            learning_rate: 0.01,
            l2_penalty: 1e-4,
            validation_fraction: 0.2,
            seed: 42,
        }
    }
}

/// Per-epoch curves recorded during training, for the performance plots.
#[derive(Debug, Clone, Default)]
pub struct TrainingHistory {
    pub loss: Vec<f32>,
    pub val_loss: Vec<f32>,
    pub acc: Vec<f32>,
    pub val_acc: Vec<f32>,
}

/// Train the classifier with minibatch SGD.
///
/// `rows` and `labels` are positionally paired; labels index into `classes`.
/// The input is expected to be pre-shuffled, so the validation split is simply
/// the tail `validation_fraction` of the rows.
pub fn train_mlp(
    rows: &[Vec<f32>],
    labels: &[usize],
    classes: &[String],
    options: &TrainOptions,
) -> Result<(MlpModel, TrainingHistory), String> {
    if rows.len() != labels.len() {
        return Err("Mismatched row/label lengths".to_string());
    }
    if rows.is_empty() {
        return Err("Empty dataset".to_string());
    }
    let n_classes = classes.len();
    if n_classes < 2 {
        return Err("Need at least 2 classes".to_string());
    }
    let d = rows[0].len();
    if rows.iter().any(|row| row.len() != d) {
        return Err("Ragged feature rows".to_string());
    }

    let val_fraction = options.validation_fraction.clamp(0.0, 0.5);
    let n_val = ((rows.len() as f32) * val_fraction) as usize;
    let n_train = rows.len() - n_val;
    if n_train == 0 {
        return Err("Validation split leaves no training rows".to_string());
    }
    let (train_rows, val_rows) = rows.split_at(n_train);
    let (train_labels, val_labels) = labels.split_at(n_train);

    let hidden = options.hidden_size.max(1);
    let batch_size = options.batch_size.max(1);
    let (mean, std) = feature_mean_std(train_rows, d);
    let mut rng = StdRng::seed_from_u64(options.seed);

    let mut model = MlpModel {
        model_version: 1,
        n_inputs: d,
        classes: classes.to_vec(),
        hidden_size: hidden,
        weights1: vec![0.0f32; hidden * d],
        bias1: vec![0.0f32; hidden],
        weights2: vec![0.0f32; n_classes * hidden],
        bias2: vec![0.0f32; n_classes],
        feature_mean: mean,
        feature_std: std,
    };
    for w in &mut model.weights1 {
        *w = (rng.random::<f32>() - 0.5) * 0.1;
    }
    for w in &mut model.weights2 {
        *w = (rng.random::<f32>() - 0.5) * 0.1;
    }

    let mut history = TrainingHistory::default();
    let mut indices: Vec<usize> = (0..n_train).collect();
    let mut hidden_act = vec![0.0f32; hidden];
    let mut hidden_pre = vec![0.0f32; hidden];
    let mut logits = vec![0.0f32; n_classes];
    let mut probs = vec![0.0f32; n_classes];

    for epoch in 0..options.epochs {
        indices.shuffle(&mut rng);
        for batch in indices.chunks(batch_size) {
            let mut d_w1 = vec![0.0f32; model.weights1.len()];
            let mut d_b1 = vec![0.0f32; model.bias1.len()];
            let mut d_w2 = vec![0.0f32; model.weights2.len()];
            let mut d_b2 = vec![0.0f32; model.bias2.len()];
            let mut batch_count = 0usize;

            for &idx in batch {
                let y = train_labels[idx];
                if y >= n_classes {
                    continue;
                }
                let x = &train_rows[idx];
                let mut x_norm = vec![0.0f32; d];
                for i in 0..d {
                    let denom = model.feature_std[i].max(1e-6);
                    x_norm[i] = (x[i] - model.feature_mean[i]) / denom;
                }

                for h in 0..hidden {
                    let mut sum = model.bias1[h];
                    let base = h * d;
                    for i in 0..d {
                        sum += model.weights1[base + i] * x_norm[i];
                    }
                    hidden_pre[h] = sum;
                    hidden_act[h] = sum.max(0.0);
                }
                for c in 0..n_classes {
                    let mut sum = model.bias2[c];
                    let base = c * hidden;
                    for h in 0..hidden {
                        sum += model.weights2[base + h] * hidden_act[h];
                    }
                    logits[c] = sum;
                }
                softmax_inplace(&logits, &mut probs);

                let mut d_hidden = vec![0.0f32; hidden];
                for c in 0..n_classes {
                    let target = if c == y { 1.0 } else { 0.0 };
                    let dz2 = probs[c] - target;
                    d_b2[c] += dz2;
                    let base = c * hidden;
                    for h in 0..hidden {
                        d_w2[base + h] += dz2 * hidden_act[h];
                        d_hidden[h] += dz2 * model.weights2[base + h];
                    }
                }
                for h in 0..hidden {
                    if hidden_pre[h] <= 0.0 {
                        d_hidden[h] = 0.0;
                    }
                    d_b1[h] += d_hidden[h];
                    let base = h * d;
                    for i in 0..d {
                        d_w1[base + i] += d_hidden[h] * x_norm[i];
                    }
                }
                batch_count += 1;
            }

            if batch_count == 0 {
                continue;
            }
            let scale = options.learning_rate / batch_count as f32;
            let l2 = options.l2_penalty;
            for i in 0..model.weights1.len() {
                model.weights1[i] -= scale * (d_w1[i] + l2 * model.weights1[i]);
            }
            for i in 0..model.bias1.len() {
                model.bias1[i] -= scale * d_b1[i];
            }
            for i in 0..model.weights2.len() {
                model.weights2[i] -= scale * (d_w2[i] + l2 * model.weights2[i]);
            }
            for i in 0..model.bias2.len() {
                model.bias2[i] -= scale * d_b2[i];
            }
        }

        let (train_loss, train_acc) = evaluate(&model, train_rows, train_labels);
        let (val_loss, val_acc) = if val_rows.is_empty() {
            (train_loss, train_acc)
        } else {
            evaluate(&model, val_rows, val_labels)
        };
        history.loss.push(train_loss);
        history.acc.push(train_acc);
        history.val_loss.push(val_loss);
        history.val_acc.push(val_acc);
        info!(
            epoch,
            loss = train_loss,
            val_loss,
            acc = train_acc,
            val_acc,
            "epoch finished"
        );
    }

    Ok((model, history))
}

/// Mean cross-entropy and accuracy of the current weights over a split.
fn evaluate(model: &MlpModel, rows: &[Vec<f32>], labels: &[usize]) -> (f32, f32) {
    let n_classes = model.classes.len();
    let mut loss = 0.0f32;
    let mut correct = 0usize;
    let mut counted = 0usize;
    for (row, &y) in rows.iter().zip(labels) {
        if y >= n_classes {
            continue;
        }
        let probs = model.predict_proba(row);
        loss -= probs[y].max(1e-12).ln();
        let predicted = model.predict(row);
        if predicted == y {
            correct += 1;
        }
        counted += 1;
    }
    if counted == 0 {
        return (0.0, 0.0);
    }
    (loss / counted as f32, correct as f32 / counted as f32)
}

fn feature_mean_std(rows: &[Vec<f32>], d: usize) -> (Vec<f32>, Vec<f32>) {
    let mut mean = vec![0.0f32; d];
    for row in rows {
        for i in 0..d {
            mean[i] += row[i];
        }
    }
    let n = rows.len().max(1) as f32;
    for v in &mut mean {
        *v /= n;
    }

    let mut var = vec![0.0f32; d];
    for row in rows {
        for i in 0..d {
            let diff = row[i] - mean[i];
            var[i] += diff * diff;
        }
    }
    for v in &mut var {
        *v = (*v / n).sqrt();
    }
    (mean, var)
}
