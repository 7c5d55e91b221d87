//! End-to-end run over synthetic events: filter branches, flatten tables,
//! shuffle pools, train, evaluate, plot, and snapshot.

use rand::SeedableRng;
use rand::rngs::StdRng;

use hhestia::dataset::{DrawStrategy, randomize_and_label};
use hhestia::ml::metrics::{ConfusionMatrix, accuracy};
use hhestia::ml::mlp::{MlpModel, TrainOptions, train_mlp};
use hhestia::ml::snapshot::{capture, restore};
use hhestia::plot::{
    ConfusionPlotOptions, ProbabilitySeries, TAB_BLUE, TAB_ORANGE, plot_confusion_matrix,
    plot_performance, plot_probabilities,
};
use hhestia::tree::{BranchTable, TreeSchema};

fn class_table(offset: f32, n_events: usize, branches: &[String]) -> BranchTable {
    let columns = branches
        .iter()
        .enumerate()
        .map(|(var, _)| {
            (0..n_events)
                .map(|event| offset + 0.05 * ((event + var) % 10) as f32)
                .collect()
        })
        .collect();
    BranchTable::new(branches.to_vec(), columns).unwrap()
}

#[test]
fn synthetic_training_round_trip() {
    let schema = TreeSchema::new(
        ["jetAK8_tau21", "FoxWolfH1", "sumJetE", "jetAK8_pt", "nJets"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    );
    let variables = schema.training_branches();
    assert_eq!(variables.len(), 3);

    let qcd = class_table(1.0, 120, &variables);
    let higgs = class_table(-1.0, 80, &variables);
    let pools = vec![qcd.to_rows(), higgs.to_rows()];
    let total = pools.iter().map(Vec::len).sum::<usize>();

    let mut rng = StdRng::seed_from_u64(7);
    let set = randomize_and_label(pools, DrawStrategy::UniformPoolIndex, &mut rng);
    assert_eq!(set.rows.len(), total);
    assert_eq!(set.labels.len(), total);

    let classes = vec!["QCD".to_string(), "Higgs".to_string()];
    let options = TrainOptions {
        hidden_size: 8,
        epochs: 60,
        batch_size: 32,
        ..TrainOptions::default()
    };
    let (model, history) = train_mlp(&set.rows, &set.labels, &classes, &options).unwrap();
    assert_eq!(history.loss.len(), 60);

    let predicted: Vec<usize> = set.rows.iter().map(|row| model.predict(row)).collect();
    let cm = ConfusionMatrix::from_predictions(2, &set.labels, &predicted);
    // Widely separated pools; the classifier should get nearly everything.
    assert!(accuracy(&cm) > 0.95);

    let out = tempfile::tempdir().unwrap();
    plot_performance(&history, out.path()).unwrap();
    plot_confusion_matrix(
        &cm,
        &classes,
        &ConfusionPlotOptions {
            normalize: true,
            ..ConfusionPlotOptions::default()
        },
        &out.path().join("confusion.png"),
    )
    .unwrap();
    let bundle = vec![
        ProbabilitySeries {
            probabilities: qcd.to_rows().iter().map(|r| model.predict_proba(r)).collect(),
            label: "QCD".to_string(),
            color: TAB_BLUE,
        },
        ProbabilitySeries {
            probabilities: higgs
                .to_rows()
                .iter()
                .map(|r| model.predict_proba(r))
                .collect(),
            label: "Higgs".to_string(),
            color: TAB_ORANGE,
        },
    ];
    plot_probabilities(&bundle, out.path()).unwrap();

    for name in [
        "loss.png",
        "loss.svg",
        "acc.png",
        "acc.svg",
        "confusion.png",
        "prob_QCD.svg",
        "prob_Higgs.svg",
    ] {
        assert!(out.path().join(name).exists(), "{name} missing");
    }

    let blob = capture(&model).unwrap();
    let restored: MlpModel = restore(&blob).unwrap();
    assert_eq!(restored, model);
    for row in set.rows.iter().take(10) {
        assert_eq!(restored.predict(row), model.predict(row));
    }
}
