//! Investment Simulator CLI
//!
//! Command-line interface comparing CDI, LCI, IPCA+ and crypto projections

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use log::warn;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use investment_simulator::projection::{ProjectionConfig, ProjectionEngine, MAX_HORIZON_MONTHS};
use investment_simulator::rates::{
    HttpMarketData, MarketDataConfig, MarketDataSource, OfflineMarketData, RateProvider,
    RateSnapshot,
};
use investment_simulator::report::{
    export_workbook, format_brl, render_summary, render_table, summary_rows,
};
use investment_simulator::scenario::{Comparison, ComparisonInputs, ComparisonRunner};
use investment_simulator::stochastic::{
    run_monte_carlo, AssetId, AssetSamples, MonteCarloSummary, RandomWalkSimulator,
};
use investment_simulator::{Instrument, TaxSelection};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "investment_simulator", version, about = "Compare CDI, LCI, IPCA+ and crypto projections")]
struct Cli {
    /// Initial principal (R$)
    #[arg(long, default_value_t = 10_000.0, env = "INVSIM_PRINCIPAL")]
    principal: f64,

    /// Monthly contribution (R$)
    #[arg(long, default_value_t = 1_000.0, env = "INVSIM_CONTRIBUTION")]
    contribution: f64,

    /// Horizon in years
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=30))]
    years: u32,

    /// Horizon in months, at most 360; overrides --years, negative values mean no months
    #[arg(long, allow_negative_numbers = true)]
    months: Option<i64>,

    /// CDI income tax: 22.5, 17.5, 15.0, 12.5 or "auto" for the regressive schedule
    #[arg(long, default_value = "17.5")]
    cdi_tax: TaxSelection,

    /// IPCA+ income tax: 22.5, 17.5, 15.0, 12.5 or "auto"
    #[arg(long, default_value = "15.0")]
    ipca_tax: TaxSelection,

    /// IPCA+ real spread (% a year)
    #[arg(long, default_value_t = 10.0)]
    spread: f64,

    /// Volatile assets to simulate
    #[arg(long, value_delimiter = ',', default_values = ["bitcoin", "ethereum", "solana"])]
    assets: Vec<String>,

    /// CSV file of `asset,return` rows replacing the built-in samples
    #[arg(long, env = "INVSIM_SAMPLES")]
    samples: Option<PathBuf>,

    /// Seed for the random walk (random when omitted)
    #[arg(long, env = "INVSIM_SEED")]
    seed: Option<u64>,

    /// Monte Carlo paths per volatile asset (0 disables)
    #[arg(long, default_value_t = 0)]
    runs: u32,

    /// Skip all network lookups and use fallback rates
    #[arg(long, env = "INVSIM_OFFLINE")]
    offline: bool,

    /// Daily CDI rate in percent, as published (skips the lookup)
    #[arg(long)]
    daily_rate: Option<f64>,

    /// Monthly IPCA rate in percent, as published (skips the lookup)
    #[arg(long)]
    index_rate: Option<f64>,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 10, env = "INVSIM_TIMEOUT")]
    timeout: u64,

    /// Start date for calendar labels (YYYY-MM-DD, default today)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Directory to write one CSV sheet per instrument plus summary.csv
    #[arg(long)]
    export: Option<PathBuf>,

    /// Months shown in the monthly table
    #[arg(long, default_value_t = 12)]
    show_months: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

impl Cli {
    fn horizon_months(&self) -> u32 {
        match self.months {
            Some(m) => m.clamp(0, MAX_HORIZON_MONTHS as i64) as u32,
            None => self.years * 12,
        }
    }

    /// Requested assets in first-seen order, without repeats
    ///
    /// Unknown ids simulate with the default sample.
    fn asset_ids(&self) -> Vec<AssetId> {
        let mut ids: Vec<AssetId> = Vec::with_capacity(self.assets.len());
        for id in self.assets.iter().filter(|a| !a.trim().is_empty()).map(AssetId::new) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    warnings: &'a [String],
    comparison: &'a Comparison,
    monte_carlo: &'a [MonteCarloSummary],
    spot_prices: Vec<(String, f64)>,
}

fn market_source(cli: &Cli) -> Box<dyn MarketDataSource> {
    if cli.offline {
        return Box::new(OfflineMarketData);
    }
    let config = MarketDataConfig {
        timeout: Duration::from_secs(cli.timeout),
        ..Default::default()
    };
    match HttpMarketData::new(config) {
        Ok(client) => Box::new(client),
        Err(e) => {
            warn!("HTTP client unavailable ({e}); using fallback rates");
            Box::new(OfflineMarketData)
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let assets = cli.asset_ids();
    let horizon_months = cli.horizon_months();

    // One provider per run; every instrument shares its snapshot
    let provider = RateProvider::new(market_source(&cli))
        .with_daily_override(cli.daily_rate.map(|r| r / 100.0))
        .with_index_override(cli.index_rate.map(|r| r / 100.0));
    let snapshot: RateSnapshot = provider.snapshot();

    let spot = if cli.offline || assets.is_empty() {
        None
    } else {
        let ids: Vec<&str> = assets.iter().map(AssetId::as_str).collect();
        Some(provider.spot_prices(&ids).clone())
    };
    let warnings = provider.warnings();

    let samples = match &cli.samples {
        Some(path) => AssetSamples::from_csv_path(path)
            .with_context(|| format!("loading return samples from {}", path.display()))?,
        None => AssetSamples::builtin(),
    };
    let simulator = RandomWalkSimulator::new(samples);
    let runner = ComparisonRunner::new(
        ProjectionEngine::new(snapshot, ProjectionConfig::default()),
        simulator,
    );

    let inputs = ComparisonInputs {
        initial_principal: cli.principal,
        monthly_contribution: cli.contribution,
        horizon_months,
        cdi_tax: cli.cdi_tax,
        ipca_tax: cli.ipca_tax,
        real_spread_percent: cli.spread,
        start_date: cli.start.unwrap_or_else(|| Local::now().date_naive()),
        assets,
    };

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let comparison = runner.run(&inputs, &mut rng).context("running projections")?;

    let mut monte_carlo = Vec::new();
    if cli.runs > 0 {
        let seed = cli.seed.unwrap_or_else(rand::random);
        for asset in &inputs.assets {
            let params = inputs.parameters(Instrument::Volatile(asset.clone()));
            monte_carlo.push(run_monte_carlo(runner.simulator(), &params, cli.runs, seed)?);
        }
    }

    let mut spot_prices: Vec<(String, f64)> = spot
        .map(|s| s.prices.into_iter().collect())
        .unwrap_or_default();
    spot_prices.sort_by(|a, b| a.0.cmp(&b.0));

    match cli.format {
        OutputFormat::Json => {
            let report = JsonReport {
                warnings: &warnings,
                comparison: &comparison,
                monte_carlo: &monte_carlo,
                spot_prices,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            print_report(&cli, &comparison, &warnings, &monte_carlo, &spot_prices);
        }
    }

    if let Some(dir) = &cli.export {
        let written = export_workbook(dir, &comparison)
            .with_context(|| format!("exporting workbook to {}", dir.display()))?;
        eprintln!("Wrote {} sheets to {}", written.len(), dir.display());
    }

    Ok(())
}

fn print_report(
    cli: &Cli,
    comparison: &Comparison,
    warnings: &[String],
    monte_carlo: &[MonteCarloSummary],
    spot_prices: &[(String, f64)],
) {
    for warning in warnings {
        eprintln!("warning: {warning}");
    }

    println!("Investment Simulator v{}", env!("CARGO_PKG_VERSION"));
    println!("==========================\n");
    println!(
        "CDI (daily): {:.4}%   IPCA (monthly): {:.2}%   Horizon: {} months\n",
        comparison.snapshot.daily_reference_rate * 100.0,
        comparison.snapshot.monthly_index_rate * 100.0,
        comparison.inputs.horizon_months
    );

    // Monthly balances, instruments side by side
    let mut headers = vec!["Month", "Date"];
    headers.extend(comparison.outcomes.iter().map(|o| o.label.as_str()));

    let shown = cli.show_months.min(comparison.inputs.horizon_months as usize);
    let rows: Vec<Vec<String>> = (0..shown)
        .map(|i| {
            let first = comparison.outcomes.first().and_then(|o| o.result.series.get(i));
            let mut row = vec![
                first.map(|r| r.month.to_string()).unwrap_or_default(),
                first.map(|r| r.label.clone()).unwrap_or_default(),
            ];
            row.extend(comparison.outcomes.iter().map(|o| {
                o.result
                    .series
                    .get(i)
                    .map(|r| format_brl(r.balance))
                    .unwrap_or_default()
            }));
            row
        })
        .collect();

    println!("Monthly balances (R$):");
    print!("{}", render_table(&headers, &rows));
    if comparison.inputs.horizon_months as usize > shown {
        println!("... ({} more months)", comparison.inputs.horizon_months as usize - shown);
    }

    println!("\nSummary (R$):");
    print!("{}", render_summary(&summary_rows(comparison)));

    if !monte_carlo.is_empty() {
        let rows: Vec<Vec<String>> = monte_carlo
            .iter()
            .map(|s| {
                vec![
                    s.instrument.clone(),
                    s.runs.to_string(),
                    format_brl(s.mean_final_balance),
                    format_brl(s.p5),
                    format_brl(s.p50),
                    format_brl(s.p95),
                    format!("{:.1}%", s.probability_of_loss * 100.0),
                    format_brl(s.mean_path_final_balance),
                ]
            })
            .collect();
        println!("\nMonte Carlo final balances (R$):");
        print!(
            "{}",
            render_table(
                &["Asset", "Runs", "Mean", "P5", "P50", "P95", "P(loss)", "Mean-return path"],
                &rows
            )
        );
    }

    if !spot_prices.is_empty() {
        println!("\nSpot prices (R$):");
        for (id, price) in spot_prices {
            println!("  {:<10} {:>16}", AssetId::new(id).display_name(), format_brl(*price));
        }
    }
}
