use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "mindscan")]
#[command(
    author,
    version,
    about = "Train a mental-health text classifier and assess social profiles"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "mindscan.yaml", env = "MINDSCAN_CONFIG")]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a model from a labeled CSV corpus and save it
    Train {
        /// Corpus CSV path
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// Where to write the model artifact
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Classify a single phrase and show the full class distribution
    Predict {
        /// Model artifact path
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Text to classify
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Classify a batch of posts and aggregate a profile verdict
    Analyze {
        /// Model artifact path
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Posts file (.json export or one post per line); stdin when absent
        #[arg(short, long)]
        posts: Option<PathBuf>,

        /// Rule cascade YAML
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}
