//! End-to-end training scenarios: learn, evaluate, checkpoints.

use std::io::Cursor;

use solin::data::Dataset;
use solin::model::Model;
use solin::training::{RegType, Strategy, Trainer, TrainerParams, Verbosity};

fn dataset(text: &str) -> Dataset {
    Dataset::from_reader(Cursor::new(text), 0).unwrap()
}

fn silent_learn(num_iterations: u32) -> TrainerParams {
    TrainerParams {
        learn: true,
        initial_learning_rate: 0.1,
        reg_type: RegType::None,
        num_iterations,
        verbosity: Verbosity::Silent,
        ..TrainerParams::default()
    }
}

#[test]
fn binary_end_to_end() {
    let data = dataset("1 1:1\n-1 1:-1\n");
    let params = TrainerParams {
        evaluate: true,
        ..silent_learn(200)
    };
    let mut trainer = Trainer::new(Strategy::Binary, params).unwrap();
    let report = trainer.run(&data).unwrap();

    let evaluation = report.evaluation.unwrap();
    assert_eq!(evaluation.positive, 2);
    assert_eq!(evaluation.negative, 0);
    assert_eq!(evaluation.accuracy(), 1.0);

    // sign(w·x + b) flips with the instance.
    let model = &report.model;
    assert!(model[0].inner_product(&data[0]) + model[0].bias() > 0.0);
    assert!(model[0].inner_product(&data[1]) + model[0].bias() < 0.0);
}

#[test]
fn multi_class_end_to_end() {
    // Three well-separated classes on disjoint features.
    let data = dataset("0 1:1\n1 2:1\n2 3:1\n");
    let params = TrainerParams {
        evaluate: true,
        ..silent_learn(600)
    };
    let mut trainer = Trainer::new(Strategy::MultiClass { num_classes: 3 }, params).unwrap();
    let report = trainer.run(&data).unwrap();

    let evaluation = report.evaluation.unwrap();
    assert_eq!(evaluation.positive, 3);
    assert_eq!(evaluation.negative, 0);
}

#[test]
fn multi_label_end_to_end() {
    // Two labels on disjoint features; targets are bit-packed.
    let data = dataset("3 1:1 2:1\n1 1:1\n2 2:1\n0 3:1\n");
    let params = TrainerParams {
        evaluate: true,
        print_predictions: true,
        initial_learning_rate: 0.5,
        ..silent_learn(800)
    };
    let mut trainer = Trainer::new(Strategy::MultiLabel { num_labels: 2 }, params).unwrap();
    let report = trainer.run(&data).unwrap();

    let evaluation = report.evaluation.unwrap();
    assert_eq!(evaluation.positive + evaluation.negative, 4);
    assert_eq!(evaluation.negative, 0, "all label sets should be recovered");
    assert_eq!(
        evaluation.predictions,
        Some(vec![3.0, 1.0, 2.0, 0.0])
    );
}

#[test]
fn evaluate_only_run_with_loaded_model() {
    let data = dataset("1 1:1\n-1 1:-1\n");

    // Train once and persist.
    let model_path = std::env::temp_dir().join("solin_test_eval_only_model.txt");
    let params = TrainerParams {
        model_out: Some(model_path.clone()),
        ..silent_learn(200)
    };
    let mut trainer = Trainer::new(Strategy::Binary, params).unwrap();
    trainer.run(&data).unwrap();

    // Fresh trainer, no learn phase, model loaded from disk.
    let params = TrainerParams {
        evaluate: true,
        model_in: Some(model_path.clone()),
        verbosity: Verbosity::Silent,
        ..TrainerParams::default()
    };
    let mut trainer = Trainer::new(Strategy::Binary, params).unwrap();
    let report = trainer.run(&data).unwrap();

    std::fs::remove_file(&model_path).ok();

    let evaluation = report.evaluation.unwrap();
    assert_eq!(evaluation.accuracy(), 1.0);
}

#[test]
fn intermediate_checkpoints_use_hex_suffixes() {
    let data = dataset("1 1:1\n-1 1:-1\n");
    let base = std::env::temp_dir().join("solin_test_checkpoint_model.txt");
    let params = TrainerParams {
        model_out: Some(base.clone()),
        write_intermediate_models: true,
        ..silent_learn(3)
    };
    let mut trainer = Trainer::new(Strategy::Binary, params).unwrap();
    trainer.run(&data).unwrap();

    // Every early iteration updates the fresh model, so all three
    // checkpoints exist, named <base>.<8 hex digits>.
    for i in 0..3u32 {
        let path = std::path::PathBuf::from(format!("{}.{i:08x}", base.display()));
        assert!(path.is_file(), "missing checkpoint {}", path.display());

        let mut restored = Model::new(1, 2);
        restored.read(&path).expect("checkpoint must parse");
        std::fs::remove_file(&path).ok();
    }
    std::fs::remove_file(&base).ok();
}

#[test]
fn zero_iteration_learn_leaves_model_zeroed() {
    let data = dataset("1 1:1\n");
    let mut trainer = Trainer::new(Strategy::Binary, silent_learn(0)).unwrap();
    let report = trainer.run(&data).unwrap();
    assert_eq!(report.model[0].squared_norm(), 0.0);
    assert_eq!(report.model[0].bias(), 0.0);
}

#[test]
fn l1_training_produces_sparse_weights() {
    // Feature 9 never appears in the data, so whatever the updates do, L1
    // keeps it at exactly zero; active features survive.
    let data = dataset("1 1:1 9:0\n-1 1:-1\n");
    let params = TrainerParams {
        reg_type: RegType::L1,
        reg_param: 0.01,
        reg_interval: 10,
        ..silent_learn(300)
    };
    let mut trainer = Trainer::new(Strategy::Binary, params).unwrap();
    let report = trainer.run(&data).unwrap();

    assert_eq!(report.model[0].get_weight(9), 0.0);
    assert!(report.model[0].get_weight(1) > 0.0);
}
