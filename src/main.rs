use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{error, info};

use aptinfo::{
    config::{self, Config, FailurePolicy},
    data_portal::data_portal::DataPortal,
    logger::setup_logger,
    report::{self, FilterChoices, Filters, SummaryOptions},
    DetailCollector, ListCollector,
};

#[derive(Parser)]
#[command(
    name = "aptinfo",
    version,
    about = "Collects apartment complex data from the public data portal"
)]
struct Cli {
    /// Log debug output, including every state transition
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Collect the complex list of every configured region into the list table
    List {
        /// Region code to collect instead of the configured ones (repeatable)
        #[arg(long = "region", value_name = "CODE")]
        regions: Vec<String>,
    },
    /// Fetch the detail of every complex in the list table
    Detail {
        /// Only fetch the first N complexes
        #[arg(long)]
        limit: Option<usize>,
        /// Abort on the first failed complex instead of logging it and continuing
        #[arg(long)]
        fail_fast: bool,
    },
    /// Print the dashboard aggregates over the detail table
    Summary {
        /// Keep only these districts (repeatable)
        #[arg(long = "district", value_name = "NAME")]
        districts: Vec<String>,
        #[arg(long)]
        from_year: Option<i32>,
        #[arg(long)]
        to_year: Option<i32>,
        /// Number of builders to list
        #[arg(long, default_value_t = 20)]
        top: usize,
    },
}

async fn run(cli: Cli) -> Result<()> {
    let config: Config = config::read_config()?;

    match cli.command {
        Command::List { regions } => {
            let regions = config.regions(&regions)?;
            let portal = DataPortal::new(&config, &config::read_service_key()?)?;

            let summary = ListCollector::new(&portal, &config).run(&regions).await?;
            if summary.duplicates > 0 {
                info!("Dropped {} duplicate rows", summary.duplicates);
            }
        }
        Command::Detail { limit, fail_fast } => {
            let portal = DataPortal::new(&config, &config::read_service_key()?)?;
            let policy = if fail_fast {
                FailurePolicy::Abort
            } else {
                config.detail_failure_policy
            };

            DetailCollector::new(&portal, &config)
                .with_policy(policy)
                .run(limit)
                .await?;
        }
        Command::Summary {
            districts,
            from_year,
            to_year,
            top,
        } => {
            let rows = report::load_rows(&config.detail_table, Some(&config.list_table))?;
            let choices = FilterChoices::from_rows(&rows);
            info!(
                "{} complexes in {} districts, built {:?}",
                rows.len(),
                choices.districts.len(),
                choices.years
            );

            let filters = Filters {
                districts,
                from_year,
                to_year,
            };
            let options = SummaryOptions {
                top_builders: top,
                ..SummaryOptions::default()
            };
            let summary = report::summarize(&filters.apply(&rows), options);
            print!("{summary}");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logger
    if let Err(err) = setup_logger(cli.verbose) {
        eprintln!("failed to initialize logger: {err}");
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Error: {:?}", err);
            ExitCode::FAILURE
        }
    }
}
