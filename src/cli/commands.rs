// ============================================================
// Layer 1: CLI Commands and Arguments
// ============================================================
// Defines the `train` subcommand and its flags.
//
// Every default matches TrainConfig::default(), so running
// `train --data step1.csv` with no other flag reproduces the
// reference configuration.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the classifier, evaluate it on the held-out year and rank features
    Train(TrainArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// CSV file with the feature columns, `cause_code_individual` and `year`
    #[arg(long, default_value = "step1.csv")]
    pub data: String,

    /// Directory for metrics.csv, confusion_matrix.csv, feature_importance.csv
    /// and report.json. Nothing is written when omitted.
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 15)]
    pub epochs: usize,

    /// Samples per mini-batch, for training and evaluation
    #[arg(long, default_value_t = 100)]
    pub batch_size: usize,

    /// Initial Adam learning rate; divided by 10 every 3 epochs
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Hidden layer widths, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = [512, 256, 128])]
    pub hidden_sizes: Vec<usize>,

    /// Dropout probability of the (unused) dropout module
    #[arg(long, default_value_t = 0.5)]
    pub dropout: f64,

    /// Shuffles per feature for permutation importance
    #[arg(long, default_value_t = 30)]
    pub importance_repeats: usize,

    /// Seed for weight init, batch shuffling and permutations
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// How many top features to print
    #[arg(long, default_value_t = 20)]
    pub top_k: usize,

    /// Skip permutation importance (it is the slowest step)
    #[arg(long)]
    pub skip_importance: bool,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_path:          a.data,
            output_dir:         a.output_dir,
            epochs:             a.epochs,
            batch_size:         a.batch_size,
            lr:                 a.lr,
            hidden_sizes:       a.hidden_sizes,
            dropout:            a.dropout,
            importance_repeats: a.importance_repeats,
            seed:               a.seed,
            top_k:              a.top_k,
            skip_importance:    a.skip_importance,
        }
    }
}
