// ============================================================
// Layer 1: CLI / Presentation Layer
// ============================================================
// Parses arguments with clap, hands off to the use case, and
// prints the final summary. No computation happens here.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, TrainArgs};

use crate::application::train_use_case::{RunReport, TrainUseCase};
use crate::infra::report::importance_table;

#[derive(Parser, Debug)]
#[command(
    name = "crash-cause",
    version,
    about = "Train a feed-forward accident-cause classifier and explain it with permutation importance."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => run_train(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    tracing::info!("Starting training on '{}'", args.data);

    let use_case = TrainUseCase::new(args.into());
    let report   = use_case.execute()?;

    print_summary(&report, use_case.config().top_k);
    Ok(())
}

fn print_summary(report: &RunReport, top_k: usize) {
    println!(
        "\n{} train rows, {} test rows, {} classes, {} of {} test rows correct",
        report.train_size,
        report.test_size,
        report.num_classes(),
        report.confusion.correct(),
        report.confusion.total(),
    );

    if report.importances.is_empty() || top_k == 0 {
        return;
    }
    println!("\nTop {} features by permutation importance:", top_k.min(report.importances.len()));
    println!("{}", importance_table(&report.ranked_importances(), top_k));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_train_config() {
        let cli = Cli::try_parse_from(["crash-cause", "train"]).unwrap();
        let Commands::Train(args) = cli.command;
        let cfg: crate::application::train_use_case::TrainConfig = args.into();
        let def = crate::application::train_use_case::TrainConfig::default();

        assert_eq!(cfg.data_path, def.data_path);
        assert_eq!(cfg.epochs, def.epochs);
        assert_eq!(cfg.batch_size, def.batch_size);
        assert_eq!(cfg.lr, def.lr);
        assert_eq!(cfg.hidden_sizes, def.hidden_sizes);
        assert_eq!(cfg.importance_repeats, def.importance_repeats);
        assert_eq!(cfg.seed, def.seed);
        assert!(cfg.output_dir.is_none());
    }

    #[test]
    fn test_hidden_sizes_parse_comma_list() {
        let cli = Cli::try_parse_from([
            "crash-cause", "train", "--data", "x.csv", "--hidden-sizes", "64,32", "--skip-importance",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command;
        assert_eq!(args.hidden_sizes, vec![64, 32]);
        assert!(args.skip_importance);
        assert_eq!(args.data, "x.csv");
    }
}
