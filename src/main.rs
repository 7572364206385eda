use clap::{Parser, Subcommand};
use env_logger::Builder;
use sketch_plots::tasks::{
    bars::{self, BarsArgs},
    beta::{self, BetaArgs},
    summary::{self, SummaryArgs},
};

#[derive(Parser)]
#[command(about = "Plot count-min-sketch backup and recovery experiments")]
struct Cli {
    // The name of the task to execute
    #[clap(subcommand)]
    task: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plot the mean relative error of the backup and recovery estimates of
    /// every (trace, batch) pair as grouped bar charts
    Bars(BarsArgs),
    /// Plot the beta percentiles of every trace across batch sizes, against
    /// the traffic, space, and average baselines
    Beta(BetaArgs),
    /// Print the beta summary table of every trace, without plotting
    Summary(SummaryArgs),
}

fn main() -> anyhow::Result<()> {
    // Initialize the logger.
    let env = env_logger::Env::default().filter_or("RUST_LOG", "info");
    let mut builder = Builder::from_env(env);
    builder.init();

    let cli = Cli::parse();
    match &cli.task {
        Command::Bars(args) => {
            bars::plot_bars(args)?;
        }
        Command::Beta(args) => {
            beta::plot_beta(args)?;
        }
        Command::Summary(args) => {
            summary::print_summary(args)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use sketch_plots::{
        env::{BETA_BATCHES, ERROR_BATCHES, ERROR_TRACES},
        tasks::canvas::ImageFormat,
    };

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bars_defaults() {
        let cli = Cli::try_parse_from(["sketch-plots", "bars"]).unwrap();
        let Command::Bars(args) = cli.task else {
            panic!("expected bars command");
        };

        assert_eq!(args.traces, ERROR_TRACES.to_vec());
        assert_eq!(args.batches, ERROR_BATCHES.to_vec());
        assert_eq!(args.output.format, ImageFormat::Png);
        assert!(args.input.data_dir.is_none());
    }

    #[test]
    fn test_beta_requires_alpha() {
        let err = match Cli::try_parse_from(["sketch-plots", "beta"]) {
            Ok(_) => panic!("beta without alpha must fail"),
            Err(e) => e,
        };
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
        assert_ne!(err.exit_code(), 0);
    }

    #[test]
    fn test_beta_rejects_non_positive_alpha() {
        assert!(Cli::try_parse_from(["sketch-plots", "beta", "0"]).is_err());
        assert!(Cli::try_parse_from(["sketch-plots", "beta", "-1.5"]).is_err());
    }

    #[test]
    fn test_beta_overrides() {
        let cli = Cli::try_parse_from([
            "sketch-plots",
            "beta",
            "2",
            "--traces",
            "ny19A,ny19B",
            "--batches",
            "100,500",
            "--plots-dir",
            "/tmp/plots",
            "--format",
            "svg",
        ])
        .unwrap();
        let Command::Beta(args) = cli.task else {
            panic!("expected beta command");
        };

        assert_eq!(args.summary.alpha, 2.0);
        assert_eq!(args.summary.traces, vec!["ny19A", "ny19B"]);
        assert_eq!(args.summary.batches, vec![100, 500]);
        assert_eq!(args.output.format, ImageFormat::Svg);
        assert_eq!(
            args.output.plots_dir.as_deref(),
            Some(std::path::Path::new("/tmp/plots"))
        );
    }

    #[test]
    fn test_summary_defaults() {
        let cli = Cli::try_parse_from(["sketch-plots", "summary", "1.5"]).unwrap();
        let Command::Summary(args) = cli.task else {
            panic!("expected summary command");
        };
        assert_eq!(args.batches, BETA_BATCHES.to_vec());
        assert_eq!(args.traces.len(), 5);
    }
}
