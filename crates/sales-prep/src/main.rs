//! CLI entry point for sales preprocessing and EDA.

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use sales_prep::{PreprocessConfig, Preprocessor, ZeroVariancePolicy, logging, run_eda};
use std::path::PathBuf;
use tracing::{debug, info};

/// CLI-compatible zero-variance policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliZeroVariance {
    /// Constant columns never flag a row
    NotOutlier,
    /// Constant columns flag every row
    AlwaysOutlier,
    /// Constant columns abort the run
    Error,
}

impl From<CliZeroVariance> for ZeroVariancePolicy {
    fn from(cli: CliZeroVariance) -> Self {
        match cli {
            CliZeroVariance::NotOutlier => ZeroVariancePolicy::NotOutlier,
            CliZeroVariance::AlwaysOutlier => ZeroVariancePolicy::AlwaysOutlier,
            CliZeroVariance::Error => ZeroVariancePolicy::Error,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Preprocessing and exploratory analysis for tabular sales data",
    long_about = "Cleans a sales CSV (median/mode imputation, Z-score outlier removal, \
                  calendar features) or prints an exploratory summary with charts.\n\n\
                  EXAMPLES:\n  \
                  # Preprocess and show the first rows\n  \
                  sales-prep preprocess -i data/sales.csv --head 10\n\n  \
                  # Stricter outlier filter\n  \
                  sales-prep preprocess -i data/sales.csv --z-threshold 2.5\n\n  \
                  # Summary statistics plus SVG charts\n  \
                  sales-prep eda -i data/sales.csv --plot-dir plots/"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load, impute, filter outliers and derive date features
    Preprocess {
        /// Path to the CSV file to process
        #[arg(short, long)]
        input: PathBuf,

        /// Absolute Z-score at which a row counts as an outlier
        #[arg(long, default_value = "3.0")]
        z_threshold: f64,

        /// How constant numeric columns are treated
        #[arg(long, value_enum, default_value = "not-outlier")]
        zero_variance: CliZeroVariance,

        /// Name of the date column to derive Year/Month/Day from
        #[arg(long, default_value = "Date")]
        date_column: String,

        /// Number of rows to print from the result
        #[arg(long, default_value = "5")]
        head: usize,
    },

    /// Print descriptive statistics and render charts
    Eda {
        /// Path to the CSV file to analyse
        #[arg(short, long)]
        input: PathBuf,

        /// Directory to write the SVG charts into
        #[arg(long)]
        plot_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let dispatch = logging::cli_dispatch(&args.log_level, args.quiet);
    tracing::dispatcher::set_global_default(dispatch.clone())
        .map_err(|e| anyhow!("Failed to install logger: {e}"))?;

    match args.command {
        Command::Preprocess {
            input,
            z_threshold,
            zero_variance,
            date_column,
            head,
        } => {
            let config = PreprocessConfig::builder()
                .z_threshold(z_threshold)
                .zero_variance_policy(zero_variance.into())
                .date_column(date_column)
                .build()?;
            debug!("Running with {:?}", config);

            let pipeline = Preprocessor::builder()
                .config(config)
                .dispatch(dispatch)
                .build()?;
            let df = pipeline
                .preprocess_data(&input)
                .with_context(|| format!("Preprocessing {} failed", input.display()))?;

            println!("Shape: {:?}", df.shape());
            println!("{}", df.head(Some(head)));
        }
        Command::Eda { input, plot_dir } => {
            if let Some(dir) = &plot_dir
                && !dir.exists()
            {
                std::fs::create_dir_all(dir)?;
                info!("Created plot directory: {}", dir.display());
            }

            run_eda(&input, plot_dir.as_deref())
                .with_context(|| format!("EDA on {} failed", input.display()))?;
        }
    }

    Ok(())
}
