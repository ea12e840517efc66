use clap::Parser;
use restock_engine::io::reporting;
use restock_engine::{RestockError, ScenarioConfig, StrategyConfig, Warehouse};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "restock-engine")]
#[command(about = "Simulate warehouse replenishment under EOQ, LP and heuristic reorder policies")]
struct Cli {
    /// Scenario file (TOML). Uses the built-in FMCG demo when omitted.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Run all three strategies side by side instead of the configured one
    #[arg(long)]
    compare: bool,

    /// Override the horizon in days
    #[arg(short, long)]
    days: Option<u32>,

    /// Override the random seed
    #[arg(short, long)]
    seed: Option<u64>,

    /// Directory for CSV output; nothing is written when omitted
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,
}

fn main() -> Result<(), RestockError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    // 1. SETUP CONFIGURATION
    let mut base = match &cli.config {
        Some(path) => ScenarioConfig::load(path)?,
        None => ScenarioConfig::demo(),
    };
    if let Some(days) = cli.days {
        base.simulation.horizon_days = days;
    }
    if let Some(seed) = cli.seed {
        base.simulation.seed = seed;
    }

    // 2. PICK STRATEGIES
    let strategies = if cli.compare || cli.config.is_none() {
        StrategyConfig::defaults()
    } else {
        vec![base.strategy.clone()]
    };

    if let Some(dir) = &cli.output {
        std::fs::create_dir_all(dir)?;
    }

    // 3. RUN EACH ON THE SAME SEED
    for strategy in strategies {
        let scenario = base.clone().with_strategy(strategy);
        let mut warehouse = Warehouse::from_config(&scenario)?;
        warehouse.run()?;

        let summary = warehouse.summary();
        println!(
            "{}",
            reporting::format_summary_table(
                warehouse.strategy_name(),
                &summary,
                warehouse.service_level()
            )
        );

        // 4. EXPORT RESULTS
        if let Some(dir) = &cli.output {
            let name = warehouse.strategy_name();
            reporting::write_simulation_log(dir.join(format!("{}_daily.csv", name)), warehouse.history())?;
            reporting::write_summary(dir.join(format!("{}_summary.csv", name)), &summary)?;
        }
    }

    info!("done");
    Ok(())
}
