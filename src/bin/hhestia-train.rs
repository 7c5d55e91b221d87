//! Developer driver: train the classifier on synthetic event pools and write
//! the full set of diagnostic plots plus a model snapshot.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use hhestia::dataset::{DrawStrategy, randomize_and_label};
use hhestia::ml::metrics::{ConfusionMatrix, accuracy, precision_recall_by_class};
use hhestia::ml::mlp::{TrainOptions, train_mlp};
use hhestia::ml::snapshot::{Pickled, capture};
use hhestia::plot::{
    ColorMap, ConfusionPlotOptions, ProbabilitySeries, TAB_BLUE, TAB_GREEN, TAB_ORANGE, TAB_RED,
    plot_confusion_matrix, plot_performance, plot_probabilities,
};
use hhestia::tree::TreeSchema;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[derive(Debug, Clone)]
struct CliOptions {
    out_dir: PathBuf,
    events_per_class: usize,
    epochs: usize,
    seed: u64,
    weighted_draws: bool,
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    hhestia::logging::init().map_err(|err| err.to_string())?;
    std::fs::create_dir_all(&options.out_dir).map_err(|err| err.to_string())?;

    let schema = TreeSchema::new(
        [
            "jetAK8_tau21",
            "jetAK8_tau32",
            "FoxWolfH1",
            "FoxWolfH2",
            "sumJetE",
            "aplanarity",
            "jetAK8_pt",
            "jetAK8_SoftDropMass",
            "nJets",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
    );
    let variables = schema.training_branches();
    println!("training variables: {variables:?}");

    let classes: Vec<String> = ["QCD", "Higgs", "Top", "W"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let colors = [TAB_BLUE, TAB_ORANGE, TAB_GREEN, TAB_RED];

    let mut rng = StdRng::seed_from_u64(options.seed);
    let pools: Vec<Vec<Vec<f32>>> = (0..classes.len())
        .map(|class_idx| {
            synthetic_pool(
                class_idx,
                variables.len(),
                options.events_per_class,
                &mut rng,
            )
        })
        .collect();
    let per_class_rows = pools.clone();

    let strategy = if options.weighted_draws {
        DrawStrategy::WeightedByRemaining
    } else {
        DrawStrategy::UniformPoolIndex
    };
    let set = randomize_and_label(pools, strategy, &mut rng);
    println!("shuffled {} events across {} classes", set.rows.len(), classes.len());

    let train_options = TrainOptions {
        epochs: options.epochs,
        seed: options.seed,
        ..TrainOptions::default()
    };
    let (model, history) = train_mlp(&set.rows, &set.labels, &classes, &train_options)?;

    let predicted: Vec<usize> = set.rows.iter().map(|row| model.predict(row)).collect();
    let cm = ConfusionMatrix::from_predictions(classes.len(), &set.labels, &predicted);
    println!("accuracy: {:.4}", accuracy(&cm));
    for (idx, stats) in precision_recall_by_class(&cm).iter().enumerate() {
        println!(
            "class {:>2} {:<8}  precision={:.3}  recall={:.3}  support={}",
            idx, classes[idx], stats.precision, stats.recall, stats.support
        );
    }

    plot_performance(&history, &options.out_dir).map_err(|err| err.to_string())?;
    for (name, normalize) in [("confusion.png", false), ("confusion_norm.png", true)] {
        let plot_options = ConfusionPlotOptions {
            normalize,
            title: "HHESTIA confusion matrix".to_string(),
            cmap: ColorMap::Blues,
        };
        plot_confusion_matrix(&cm, &classes, &plot_options, &options.out_dir.join(name))
            .map_err(|err| err.to_string())?;
    }

    let bundle: Vec<ProbabilitySeries> = per_class_rows
        .iter()
        .zip(&classes)
        .zip(&colors)
        .map(|((rows, label), &color)| ProbabilitySeries {
            probabilities: rows.iter().map(|row| model.predict_proba(row)).collect(),
            label: label.clone(),
            color,
        })
        .collect();
    plot_probabilities(&bundle, &options.out_dir).map_err(|err| err.to_string())?;

    let blob = capture(&model).map_err(|err| err.to_string())?;
    std::fs::write(options.out_dir.join("model.bin"), &blob.bytes)
        .map_err(|err| err.to_string())?;

    #[derive(Serialize)]
    struct TrainingRun {
        classes: Vec<String>,
        variables: Vec<String>,
        model: Pickled<hhestia::ml::mlp::MlpModel>,
    }
    let envelope = TrainingRun {
        classes: classes.clone(),
        variables,
        model: Pickled(model),
    };
    let json = serde_json::to_string(&envelope).map_err(|err| err.to_string())?;
    std::fs::write(options.out_dir.join("model.json"), json).map_err(|err| err.to_string())?;

    println!("outputs written to {}", options.out_dir.display());
    Ok(())
}

/// Overlapping Gaussian-ish blobs, one mean shift per class.
fn synthetic_pool(
    class_idx: usize,
    n_vars: usize,
    n_events: usize,
    rng: &mut StdRng,
) -> Vec<Vec<f32>> {
    (0..n_events)
        .map(|_| {
            (0..n_vars)
                .map(|var| {
                    let center = if var % (class_idx + 1) == 0 { 1.0 } else { -0.5 };
                    let noise: f32 =
                        (0..4).map(|_| rng.random::<f32>() - 0.5).sum::<f32>() * 0.5;
                    center + noise
                })
                .collect()
        })
        .collect()
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut out_dir = PathBuf::from("plots");
    let mut events_per_class = 2000usize;
    let mut epochs = 30usize;
    let mut seed = 42u64;
    let mut weighted_draws = false;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--out" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--out requires a value".to_string())?;
                out_dir = PathBuf::from(value);
            }
            "--events" => {
                idx += 1;
                let value =
                    args.get(idx).ok_or_else(|| "--events requires a value".to_string())?;
                events_per_class = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid --events value: {value}"))?;
            }
            "--epochs" => {
                idx += 1;
                let value =
                    args.get(idx).ok_or_else(|| "--epochs requires a value".to_string())?;
                epochs = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid --epochs value: {value}"))?;
            }
            "--seed" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--seed requires a value".to_string())?;
                seed = value
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid --seed value: {value}"))?;
            }
            "--weighted" => weighted_draws = true,
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    Ok(CliOptions {
        out_dir,
        events_per_class,
        epochs,
        seed,
        weighted_draws,
    })
}

fn help_text() -> String {
    [
        "hhestia-train",
        "",
        "Usage:",
        "  hhestia-train [options]",
        "",
        "Options:",
        "  --out <dir>      Output directory for plots and snapshots (default: plots).",
        "  --events <n>     Synthetic events per class (default: 2000).",
        "  --epochs <n>     Training epochs (default: 30).",
        "  --seed <n>       RNG seed (default: 42).",
        "  --weighted       Draw pools weighted by remaining size instead of uniformly.",
    ]
    .join("\n")
}
