//! Subcommand implementations
//!
//! Each command writes its report to the given writer so the output can be
//! captured in tests.

use crate::config::AppConfig;
use anyhow::{Context, Result};
use mindscan_classifiers::{
    load_posts, parse_pasted, train, ClassifierModel, ProfileAnalyzer, TrainingCorpus,
};
use mindscan_core::{PostPrediction, RawPost};
use mindscan_policy::{Aggregator, ProfileVerdict};
use serde::Serialize;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

/// Characters of post text shown per table row
const PREVIEW_CHARS: usize = 60;

/// Train, report, and save
pub fn run_train(config: &AppConfig, out: &mut impl Write) -> Result<()> {
    let corpus = TrainingCorpus::load(&config.corpus)
        .with_context(|| format!("Failed to load corpus {}", config.corpus.path.display()))?;

    let outcome = train(&corpus, &config.training).context("Training failed")?;

    writeln!(out, "Label distribution:")?;
    for (label, count) in &outcome.label_distribution {
        writeln!(out, "  {:<24} {}", label, count)?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "Trained on {} examples, evaluated on {} ({} features)",
        outcome.train_size,
        outcome.test_size,
        outcome.model.vocabulary_size()
    )?;
    writeln!(out)?;
    write!(out, "{}", outcome.report)?;

    outcome
        .model
        .save(&config.model_path)
        .with_context(|| format!("Failed to save model {}", config.model_path.display()))?;
    writeln!(out)?;
    writeln!(out, "Model saved to {}", config.model_path.display())?;
    Ok(())
}

#[derive(Serialize)]
struct PhraseReport<'a> {
    label: &'a str,
    confidence: f64,
    probabilities: Vec<ClassShare>,
}

#[derive(Serialize)]
struct ClassShare {
    label: String,
    probability: f64,
}

/// Single-phrase mode
pub fn run_predict(config: &AppConfig, text: &str, json: bool, out: &mut impl Write) -> Result<()> {
    let model = load_model(&config.model_path)?;
    let analyzer = ProfileAnalyzer::without_translation(&model);
    let result = analyzer
        .classify_text(text)
        .context("Could not classify the given text")?;

    let probabilities: Vec<ClassShare> = result
        .probabilities
        .ranked()
        .into_iter()
        .map(|(label, probability)| ClassShare { label, probability })
        .collect();

    if json {
        let report = PhraseReport {
            label: &result.label,
            confidence: result.score,
            probabilities,
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "Prediction: {} ({:.1}%)", result.label, result.score * 100.0)?;
    writeln!(out)?;
    for share in &probabilities {
        writeln!(out, "  {:<24} {:>6.1}%", share.label, share.probability * 100.0)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct ProfileReport<'a> {
    predictions: &'a [PostPrediction],
    verdict: &'a ProfileVerdict,
}

/// Batch mode: classify posts and aggregate a verdict
pub fn run_analyze(
    config: &AppConfig,
    posts: Option<&Path>,
    json: bool,
    input: &mut impl Read,
    out: &mut impl Write,
) -> Result<()> {
    let model = load_model(&config.model_path)?;
    config
        .rules
        .validate_labels(model.classes())
        .context("Rule set does not match the model")?;
    let aggregator = Aggregator::new(config.rules.clone())?;

    let posts = read_posts(posts, input)?;
    info!(posts = posts.len(), "Analyzing profile");

    let analyzer = ProfileAnalyzer::without_translation(&model);
    let predictions = analyzer.analyze(&posts).context("No post could be analyzed")?;
    let verdict = aggregator.aggregate(&predictions)?;

    if json {
        let report = ProfileReport {
            predictions: &predictions,
            verdict: &verdict,
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
        return Ok(());
    }

    write_profile(&predictions, &verdict, out)
}

fn read_posts(path: Option<&Path>, input: &mut impl Read) -> Result<Vec<RawPost>> {
    match path {
        Some(path) => {
            load_posts(path).with_context(|| format!("Failed to load posts {}", path.display()))
        }
        None => {
            let mut pasted = String::new();
            input
                .read_to_string(&mut pasted)
                .context("Failed to read posts from stdin")?;
            Ok(parse_pasted(&pasted))
        }
    }
}

fn load_model(path: &Path) -> Result<ClassifierModel> {
    ClassifierModel::load(path).with_context(|| {
        format!(
            "Failed to load model {} (run `mindscan train` first)",
            path.display()
        )
    })
}

fn write_profile(
    predictions: &[PostPrediction],
    verdict: &ProfileVerdict,
    out: &mut impl Write,
) -> Result<()> {
    writeln!(out, "Posts analyzed:   {}", verdict.total)?;
    writeln!(out, "Profile verdict:  {} [{}]", verdict.verdict, verdict.severity)?;
    writeln!(out, "Mean confidence:  {:.1}%", verdict.average_confidence * 100.0)?;
    writeln!(out)?;

    writeln!(out, "Distribution:")?;
    for entry in &verdict.per_label_counts {
        writeln!(
            out,
            "  {:<24} {:>4} ({:.1}%)",
            entry.label,
            entry.count,
            verdict.share(&entry.label) * 100.0
        )?;
    }
    writeln!(out)?;

    writeln!(out, "{:<24} {:>6}  Text", "Prediction", "Conf")?;
    for prediction in predictions {
        writeln!(
            out,
            "{:<24} {:>5.1}%  {}",
            prediction.predicted_label,
            prediction.confidence * 100.0,
            preview(&prediction.original_text)
        )?;
    }
    Ok(())
}

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= PREVIEW_CHARS {
        return flat;
    }
    let mut short: String = flat.chars().take(PREVIEW_CHARS - 3).collect();
    short.push_str("...");
    short
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindscan_classifiers::features::FeatureConfig;
    use mindscan_classifiers::linear::LinearConfig;
    use std::fmt::Write as _;

    fn write_corpus(dir: &Path) -> std::path::PathBuf {
        let rows = [
            ("Normal", ["sunny", "picnic", "friends", "music"]),
            ("Depression", ["hopeless", "worthless", "crying", "numb"]),
            ("Anxiety", ["panic", "racing", "worried", "dread"]),
            ("Suicidal", ["goodbye", "overdose", "ending", "funeral"]),
        ];
        let mut csv = String::from("statement,status\n");
        for i in 0..12 {
            for (label, words) in &rows {
                writeln!(csv, "\"{} {} today\",{}", words[i % 4], words[(i + 1) % 4], label).unwrap();
            }
        }
        let path = dir.join("corpus.csv");
        std::fs::write(&path, csv).unwrap();
        path
    }

    fn test_config(dir: &Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.corpus.path = write_corpus(dir);
        config.model_path = dir.join("model.json");
        config.training.features = FeatureConfig {
            min_df: 1,
            ..Default::default()
        };
        config.training.classifier = LinearConfig {
            c: 10.0,
            max_epochs: 200,
            batch_size: 8,
            tolerance: 1e-6,
            ..Default::default()
        };
        config
    }

    fn trained_config(dir: &Path) -> AppConfig {
        let config = test_config(dir);
        run_train(&config, &mut Vec::new()).unwrap();
        config
    }

    #[test]
    fn test_train_writes_report_and_model() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let mut out = Vec::new();
        run_train(&config, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("weighted avg"));
        assert!(text.contains("Suicidal"));
        assert!(config.model_path.exists());
    }

    #[test]
    fn test_predict_json() {
        let dir = tempfile::tempdir().unwrap();
        let config = trained_config(dir.path());

        let mut out = Vec::new();
        run_predict(&config, "So HOPELESS and worthless!!", true, &mut out).unwrap();
        let report: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(report["label"], "Depression");
        assert_eq!(report["probabilities"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_predict_blank_text_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = trained_config(dir.path());
        assert!(run_predict(&config, "1234 !!!", false, &mut Vec::new()).is_err());
    }

    #[test]
    fn test_analyze_from_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let config = trained_config(dir.path());

        let mut input = "sunny picnic\nfriends music\n\npanic and dread\ngoodbye funeral\n".as_bytes();
        let mut out = Vec::new();
        run_analyze(&config, None, false, &mut input, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Posts analyzed:   4"));
        assert!(text.contains("Suicidal risk detected"));
    }

    #[test]
    fn test_analyze_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = trained_config(dir.path());
        let posts = dir.path().join("posts.json");
        std::fs::write(
            &posts,
            r#"[{"text": "sunny picnic"}, {"text": "hopeless crying", "id": "2"}, {"text": null}]"#,
        )
        .unwrap();

        let mut out = Vec::new();
        run_analyze(&config, Some(&posts), true, &mut std::io::empty(), &mut out).unwrap();
        let report: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(report["predictions"].as_array().unwrap().len(), 2);
        assert_eq!(report["verdict"]["verdict"], "Depression (dominant)");
    }

    #[test]
    fn test_analyze_without_model() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let err = run_analyze(&config, None, false, &mut "hi".as_bytes(), &mut Vec::new())
            .unwrap_err();
        assert!(err.to_string().contains("mindscan train"));
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("short\n text"), "short text");
        let long = "x".repeat(100);
        assert_eq!(preview(&long).chars().count(), PREVIEW_CHARS);
    }
}
