use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use tracing::debug;

use rechner_cli::{
    OutputFormat, append_snapshot, default_tax_year, init_logging, load_input, load_year_table,
    render_result, render_svs, render_tips, render_years, resolve_level, write_snapshot,
};
use rechner_core::calculations::{
    FounderContext, SvsCalculator, SvsOptions, TipContext, TipGenerator,
};
use rechner_core::{CalculationSnapshot, InsuranceCategory, YearConfigRegistry, calculate_all_with};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// SVS contribution and income tax calculator for Austrian self-employed.
#[derive(Debug, Parser)]
#[command(name = "svs-rechner", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML file with `[[year]]` tables replacing or adding tax years.
    #[arg(long, global = true)]
    year_table: Option<PathBuf>,

    /// Log level used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Shorthand for `--log-level debug`.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the full calculation for an input file.
    Calculate {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Summary)]
        format: OutputFormat,
    },
    /// SVS contributions for a profit figure.
    Svs(SvsArgs),
    /// Tax-saving tips for a profit and its SVS contributions.
    Tips {
        #[arg(long)]
        profit: Decimal,

        #[arg(long)]
        final_svs: Decimal,

        #[arg(long)]
        year: Option<i32>,
    },
    /// Append a snapshot row of an input file's result to a CSV file.
    Snapshot {
        #[arg(short, long)]
        input: PathBuf,

        /// CSV file to append to. Prints to stdout when omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List supported tax years.
    Years,
}

#[derive(Debug, Args)]
struct SvsArgs {
    #[arg(long)]
    profit: Decimal,

    /// Provisional monthly contribution already prescribed.
    #[arg(long, default_value_t = Decimal::ZERO)]
    provisional_monthly: Decimal,

    #[arg(long)]
    year: Option<i32>,

    #[arg(long, value_enum, default_value_t = CategoryArg::Nsv)]
    category: CategoryArg,

    #[arg(long)]
    founding_year: Option<i32>,

    #[arg(long, default_value_t = 1)]
    founding_month: u32,

    /// Claim the founder health rate.
    #[arg(long)]
    founder_discount: bool,

    /// Gross employment income counted against the maximum base.
    #[arg(long, default_value_t = Decimal::ZERO)]
    other_employment_income: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CategoryArg {
    /// Neue Selbständige.
    Nsv,
    /// Gewerbetreibende.
    Gsvg,
}

impl From<CategoryArg> for InsuranceCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Nsv => Self::NeueSelbstaendige,
            CategoryArg::Gsvg => Self::Gewerbetreibende,
        }
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(resolve_level(&cli.log_level, cli.verbose));

    let registry = match &cli.year_table {
        Some(path) => load_year_table(path, YearConfigRegistry::builtin())
            .with_context(|| format!("loading year table {}", path.display()))?,
        None => YearConfigRegistry::builtin().clone(),
    };
    let default_year = default_tax_year(&registry, Local::now().year())?;
    debug!(default_year, years = ?registry.supported_years(), "registry ready");

    match cli.command {
        Commands::Calculate { input, format } => {
            let input = load_input(&input, default_year)?;
            let config = registry.get(input.tax_year)?;
            let result = calculate_all_with(&input, config);
            print!("{}", render_result(&result, format).context("rendering result")?);
        }
        Commands::Svs(args) => {
            let config = registry.get(args.year.unwrap_or(default_year))?;
            let options = SvsOptions {
                founder: args.founding_year.map(|founding_year| FounderContext {
                    founding_year,
                    founding_month: args.founding_month,
                    discount_eligible: args.founder_discount,
                }),
                insurance_category: args.category.into(),
                other_employment_income: args.other_employment_income,
            };
            let svs = SvsCalculator::calculate(args.profit, args.provisional_monthly, config, &options);
            print!("{}", render_svs(&svs));
        }
        Commands::Tips {
            profit,
            final_svs,
            year,
        } => {
            let config = registry.get(year.unwrap_or(default_year))?;
            let tips = TipGenerator::generate(&TipContext::business_only(profit, final_svs, config));
            print!("{}", render_tips(&tips));
        }
        Commands::Snapshot { input, output } => {
            let input = load_input(&input, default_year)?;
            let config = registry.get(input.tax_year)?;
            let snapshot = CalculationSnapshot::from_result(&calculate_all_with(&input, config), Utc::now());
            match output {
                Some(path) => append_snapshot(&path, &snapshot)
                    .with_context(|| format!("writing snapshot to {}", path.display()))?,
                None => write_snapshot(std::io::stdout().lock(), &snapshot, true)
                    .context("writing snapshot to stdout")?,
            }
        }
        Commands::Years => print!("{}", render_years(&registry)),
    }

    Ok(())
}
