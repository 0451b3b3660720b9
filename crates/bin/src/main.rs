//! intrinsic CLI binary.
//!
//! Values a list of tickers from stored statement snapshots and writes the
//! scenario tables.

mod logging;
mod settings;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use intrinsic::model::{FinancialsNormalizer, ForecastAssumptions, ScenarioForecaster};
use intrinsic::{
    BatchRunner, DcfPipeline, ExportFormat, FinancialsProvider, JsonDirectoryProvider,
    ResultTable, ScenarioKind, clean_ticker, read_tickers,
};
use settings::{Overrides, default_data_dir, load_config};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "intrinsic")]
#[command(about = "intrinsic: batch DCF equity valuation", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ModelArgs {
    /// Directory of <TICKER>.json statement snapshots
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// JSON file overriding the valuation config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Market region (AU, US, other)
    #[arg(long)]
    region: Option<String>,

    /// Risk-free rate, e.g. 0.043
    #[arg(long)]
    risk_free_rate: Option<f64>,

    /// Terminal growth rate, e.g. 0.015
    #[arg(long)]
    terminal_growth: Option<f64>,
}

impl ModelArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            region: self.region.clone(),
            risk_free_rate: self.risk_free_rate,
            terminal_growth: self.terminal_growth,
        }
    }

    fn provider(&self) -> JsonDirectoryProvider {
        JsonDirectoryProvider::new(self.data_dir.clone().unwrap_or_else(default_data_dir))
    }

    fn pipeline(&self) -> Result<DcfPipeline, Box<dyn std::error::Error>> {
        let config = load_config(self.config.as_deref(), &self.overrides())?;
        Ok(DcfPipeline::new(config)?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Value every ticker in a CSV list
    Value {
        /// CSV file with a Ticker column
        #[arg(long, default_value = "input/tickers.csv")]
        tickers: PathBuf,

        /// Output directory
        #[arg(long, default_value = "output")]
        out: PathBuf,

        /// Output format (csv, json or pretty-json)
        #[arg(long, default_value = "csv")]
        format: String,

        /// Hide the progress bar
        #[arg(long)]
        quiet: bool,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Show the valuation and base forecast for one ticker
    Show {
        /// Ticker symbol
        symbol: String,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Print the effective valuation config as JSON
    Config {
        #[command(flatten)]
        model: ModelArgs,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(&cli.log_level);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Value {
            tickers,
            out,
            format,
            quiet,
            model,
        } => {
            let format: ExportFormat = format.parse()?;
            value_tickers(&tickers, &out, format, quiet, &model)?;
        }
        Commands::Show { symbol, model } => show_symbol(&symbol, &model)?,
        Commands::Config { model } => {
            let config = load_config(model.config.as_deref(), &model.overrides())?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn value_tickers(
    tickers_path: &Path,
    out: &Path,
    format: ExportFormat,
    quiet: bool,
    model: &ModelArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let tickers = read_tickers(tickers_path)?;
    let provider = model.provider();
    tracing::info!(
        tickers = tickers.len(),
        data_dir = %provider.root().display(),
        "starting batch"
    );

    let runner = BatchRunner::new(provider, model.pipeline()?);

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(tickers.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let outcome = runner.run_with_progress(&tickers, Some(&pb));
    pb.finish_with_message(format!(
        "Valued {} of {} tickers",
        outcome.results.len(),
        outcome.attempted()
    ));

    let table: ResultTable = outcome.into_table();
    let written = table.write_all(out, format)?;

    println!("{}", table.to_ascii_table());
    println!("Saved:");
    for path in written {
        println!("- {}", path.display());
    }

    Ok(())
}

fn show_symbol(symbol: &str, model: &ModelArgs) -> Result<(), Box<dyn std::error::Error>> {
    let symbol = clean_ticker(symbol).ok_or("empty ticker symbol")?;
    let pipeline = model.pipeline()?;
    let config = pipeline.config().clone();

    let raw = model.provider().fetch_financials(symbol)?;
    let normalizer = FinancialsNormalizer::new(config.clone());
    let financials = normalizer.normalize(&raw)?;
    let result = pipeline.value_financials(&financials)?;
    let d = &result.details;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", format!("DCF VALUATION: {}", result.symbol));
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Name:                {}", result.name);
    println!("Current Price:       {:.2}", result.current_price);
    println!("History:             {} fiscal year(s)", d.years_used);
    println!();
    println!("Discount Rate:");
    println!("  Risk-free rate:    {:.2}%", d.risk_free_rate * 100.0);
    println!("  Market premium:    {:.2}%", d.market_risk_premium * 100.0);
    println!("  Cost of equity:    {:.2}%", d.cost_of_equity * 100.0);
    println!("  Cost of debt:      {:.2}% pretax", d.pretax_cost_of_debt * 100.0);
    println!("  Tax rate:          {:.2}%", d.tax_rate * 100.0);
    println!("  WACC:              {:.2}%", d.wacc * 100.0);
    println!();
    println!("Operating Assumptions:");
    println!("  Historical growth: {:.2}%", d.historical_growth * 100.0);
    println!("  EBIT margin:       {:.2}%", d.ebit_margin * 100.0);
    println!("  D&A / revenue:     {:.2}%", d.da_ratio * 100.0);
    println!("  WC / revenue:      {:.2}%", d.wc_ratio * 100.0);
    println!("  Terminal growth:   {:.2}%", config.terminal_growth * 100.0);

    let metrics = normalizer.metrics(&financials);
    let assumptions = ForecastAssumptions::from_metrics(&financials, &metrics);
    let paths = ScenarioForecaster::new(config).forecast_all(&assumptions)?;
    let base = &paths[1];

    println!("\nBase Forecast:");
    println!("{}", "-".repeat(72));
    println!(
        "{:>4} {:>8} {:>14} {:>14} {:>14} {:>14}",
        "Year", "Growth", "Revenue", "EBIT", "CapEx", "FCF"
    );
    println!("{}", "-".repeat(72));
    for year in base.years() {
        println!(
            "{:>4} {:>7.2}% {:>14.1} {:>14.1} {:>14.1} {:>14.1}",
            year.year,
            year.growth * 100.0,
            year.revenue,
            year.ebit,
            year.capex,
            year.free_cash_flow
        );
    }

    println!("\nIntrinsic Value per Share:");
    for (kind, price) in result.prices.iter() {
        let marker = if kind == ScenarioKind::Base { " *" } else { "" };
        println!(
            "  {:<14} {:>10.2}  ({:+.1}% vs market){}",
            kind,
            price,
            result.upside(kind) * 100.0,
            marker
        );
    }
    println!(
        "\nEnterprise value {:.1}, net debt {:.1}, equity value {:.1}",
        d.enterprise_value, d.net_debt, d.equity_value
    );

    Ok(())
}
