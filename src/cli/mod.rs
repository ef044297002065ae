// ============================================================
// Layer 1: CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and delegates all work to the
// application layer. Printing of final reports happens here.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "motion-cnn",
    version,
    about = "Train a CNN on 128x3 motion windows from .npy files and export a lite model.",
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub train: TrainArgs,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Some(Commands::Evaluate(args)) => run_evaluate(args),
            None => run_train(self.train),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    let report = TrainUseCase::new(args.into()).execute()?;

    println!(
        "\nTest: loss={:.4} accuracy={:.4}",
        report.test.loss,
        report.test.accuracy()
    );
    println!("{}", report.test.confusion);
    println!("Full model: {}", report.full_model.display());
    println!(
        "Lite model: {} ({}/{} test predictions match)",
        report.lite_model.display(),
        report.lite_agreement.0,
        report.lite_agreement.1
    );
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let matrix = EvaluateUseCase::new(args.data_dir, args.model_dir).execute()?;
    println!("{matrix}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainConfig;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_two_positionals_start_training() {
        let cli = Cli::try_parse_from(["motion-cnn", "data", "out"]).unwrap();
        assert!(cli.command.is_none());

        let cfg: TrainConfig = cli.train.into();
        assert_eq!(cfg.data_dir, "data");
        assert_eq!(cfg.model_output, "out");
        assert_eq!(cfg.epochs, 170);
        assert_eq!(cfg.full_model_dir, "lite_models");
        assert_eq!(cfg.shuffle_seed, None);
    }

    #[test]
    fn test_missing_output_is_a_usage_error() {
        assert!(Cli::try_parse_from(["motion-cnn", "data"]).is_err());
    }

    #[test]
    fn test_out_of_range_flags_are_rejected() {
        let parse = |extra: &[&str]| {
            let mut argv = vec!["motion-cnn", "data", "out"];
            argv.extend_from_slice(extra);
            Cli::try_parse_from(argv)
        };
        assert!(parse(&["--batch-size", "0"]).is_err());
        assert!(parse(&["--epochs", "0"]).is_err());
        assert!(parse(&["--test-fraction", "1.0"]).is_err());
        assert!(parse(&["--val-fraction", "1.5"]).is_err());
        assert!(parse(&["--test-fraction", "abc"]).is_err());

        let cfg: TrainConfig = parse(&["--batch-size", "8", "--test-fraction", "0.3"]).unwrap().train.into();
        assert_eq!(cfg.batch_size, 8);
        assert_eq!(cfg.test_fraction, 0.3);
    }

    #[test]
    fn test_evaluate_subcommand() {
        let cli = Cli::try_parse_from(["motion-cnn", "evaluate", "data", "models"]).unwrap();
        match cli.command {
            Some(Commands::Evaluate(args)) => {
                assert_eq!(args.data_dir, "data");
                assert_eq!(args.model_dir, "models");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
