//! End-to-end training, prediction, and persistence tests
//!
//! Uses a small synthetic corpus where every category has its own
//! vocabulary, with the rare-term filter loosened so it survives fitting.

use mindscan_classifiers::features::FeatureConfig;
use mindscan_classifiers::linear::LinearConfig;
use mindscan_classifiers::training::{train, TrainingConfig, TrainingOutcome};
use mindscan_classifiers::{ClassifierModel, TrainingCorpus};
use mindscan_core::{Error, LabeledExample};

const VOCABULARY: &[(&str, [&str; 6])] = &[
    ("Normal", ["sunny", "picnic", "friends", "laughing", "garden", "music"]),
    ("Depression", ["hopeless", "worthless", "crying", "numb", "exhausted", "lonely"]),
    ("Anxiety", ["panic", "racing", "worried", "nervous", "trembling", "dread"]),
];

fn synthetic_corpus(per_class: usize) -> TrainingCorpus {
    let mut examples = Vec::new();
    for i in 0..per_class {
        for (label, words) in VOCABULARY {
            let text = format!(
                "Today I feel {} and {}, so {}! @someone http://t.co/{}",
                words[i % 6],
                words[(i + 1) % 6],
                words[(i + 3) % 6],
                i
            );
            examples.push(LabeledExample::new(text, *label));
        }
    }
    TrainingCorpus::new(examples)
}

fn loose_config() -> TrainingConfig {
    TrainingConfig {
        features: FeatureConfig {
            min_df: 1,
            ..Default::default()
        },
        classifier: LinearConfig {
            c: 10.0,
            max_epochs: 200,
            batch_size: 8,
            tolerance: 1e-6,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn trained() -> TrainingOutcome {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    train(&synthetic_corpus(20), &loose_config()).unwrap()
}

#[test]
fn test_train_and_predict() {
    let outcome = trained();
    let model = &outcome.model;

    assert_eq!(model.classes(), ["Anxiety", "Depression", "Normal"]);
    assert_eq!(outcome.train_size, 48);
    assert_eq!(outcome.test_size, 12);
    assert!(outcome.report.accuracy > 0.9, "report:\n{}", outcome.report);

    assert_eq!(model.predict("i feel hopeless and worthless"), "Depression");
    assert_eq!(model.predict("panic and dread all day"), "Anxiety");
    assert_eq!(model.predict("picnic with friends and music"), "Normal");
}

#[test]
fn test_label_distribution_reported() {
    let outcome = trained();
    assert_eq!(outcome.label_distribution.len(), 3);
    assert!(outcome.label_distribution.values().all(|&count| count == 20));
}

#[test]
fn test_training_is_deterministic() {
    let a = trained().model;
    let b = trained().model;

    for text in ["hopeless music", "nervous garden", "zebra"] {
        assert_eq!(a.predict_proba(text), b.predict_proba(text));
    }
}

#[test]
fn test_out_of_vocabulary_text() {
    let model = trained().model;
    let probs = model.predict_proba("zebra quantum banjo");

    assert_eq!(probs.iter().count(), 3);
    assert!((probs.total() - 1.0).abs() < 1e-6);
    assert!(probs.iter().all(|(_, p)| (0.0..=1.0).contains(&p)));
}

#[test]
fn test_save_load_round_trip() {
    let model = trained().model;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("models").join("classifier.json");

    model.save(&path).unwrap();
    let loaded = ClassifierModel::load(&path).unwrap();

    assert_eq!(loaded.classes(), model.classes());
    assert_eq!(loaded.vocabulary_size(), model.vocabulary_size());
    assert_eq!(loaded.feature_config(), model.feature_config());
    for text in ["crying in the garden", "racing heart", "unknown words"] {
        assert_eq!(loaded.predict_proba(text), model.predict_proba(text));
    }
}

#[test]
fn test_tampered_artifact_rejected() {
    let model = trained().model;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("classifier.json");
    model.save(&path).unwrap();

    let mut artifact: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    artifact["intercepts"][0] = serde_json::json!(42.0);
    std::fs::write(&path, serde_json::to_vec(&artifact).unwrap()).unwrap();

    let err = ClassifierModel::load(&path).unwrap_err();
    assert!(matches!(err, Error::Model(_)));
    assert!(err.to_string().contains("checksum"));
}

#[test]
fn test_missing_model_file() {
    let err = ClassifierModel::load("/nonexistent/model.json").unwrap_err();
    assert!(matches!(err, Error::Model(_)));
}

#[test]
fn test_single_class_corpus_rejected() {
    let corpus = TrainingCorpus::new(
        (0..10)
            .map(|i| LabeledExample::new(format!("sunny day number {}", i), "Normal"))
            .collect(),
    );
    let err = train(&corpus, &loose_config()).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_corpus_from_csv_file() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, ",statement,status").unwrap();
    for (row, (label, words)) in VOCABULARY.iter().cycle().take(30).enumerate() {
        writeln!(file, "{},\"{} {}\",{}", row, words[row % 6], words[(row + 2) % 6], label).unwrap();
    }
    writeln!(file, "30,,Normal").unwrap();

    let corpus = TrainingCorpus::from_path(file.path()).unwrap();
    assert_eq!(corpus.len(), 30);

    let outcome = train(&corpus, &loose_config()).unwrap();
    assert_eq!(outcome.model.classes().len(), 3);
}
