mod config;
mod render;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use callintel_core::{
    call_purpose_report, call_trend_report, call_volume_report, list_locations, list_months,
    open_store, parse_bound, Bound, CallQuery, CallStore, DateRange, ReportStore,
};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;

use config::CliConfig;
use render::{format_count, grid_table, write_grid_csv, OutputFormat};

#[derive(Parser)]
#[command(name = "callintel")]
#[command(author, version, about = "Call volume, purpose and trend reporting")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, help = "Call data file (.json, .db, .sqlite, .sqlite3)")]
    data: Option<PathBuf>,

    #[arg(long, global = true, help = "Config file (defaults to ~/.callintel)")]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Show call volume by call type and location")]
    Volume {
        #[command(flatten)]
        report: ReportArgs,
    },
    #[command(about = "Show completed calls by purpose and location")]
    Purpose {
        #[command(flatten)]
        report: ReportArgs,
    },
    #[command(about = "Show monthly call trend for one location")]
    Trend {
        #[arg(long, help = "Location to report on")]
        location: String,
        #[command(flatten)]
        report: ReportArgs,
    },
    #[command(about = "List known locations")]
    Locations {
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
    #[command(about = "List month labels between two dates")]
    Months {
        #[arg(long, help = "Start date (YYYY-MM-DD)")]
        since: String,
        #[arg(long, help = "End date (YYYY-MM-DD)")]
        until: String,
        #[arg(long, help = "Output as JSON")]
        json: bool,
    },
}

#[derive(Args)]
struct ReportArgs {
    #[arg(long, help = "Start date (YYYY-MM-DD or ISO-8601 date-time)")]
    since: Option<String>,

    #[arg(long, help = "End date (YYYY-MM-DD or ISO-8601 date-time)")]
    until: Option<String>,

    #[arg(long, help = "Output as JSON")]
    json: bool,

    #[arg(long, conflicts_with = "json", help = "Output as CSV")]
    csv: bool,

    #[arg(long, help = "Show processing time")]
    benchmark: bool,
}

impl ReportArgs {
    fn format(&self) -> OutputFormat {
        OutputFormat::from_flags(self.json, self.csv)
    }

    fn range(&self, config: &CliConfig) -> Result<DateRange> {
        let from = self
            .since
            .as_deref()
            .map(|s| parse_bound(s, Bound::Start))
            .transpose()?;
        let to = self
            .until
            .as_deref()
            .map(|s| parse_bound(s, Bound::End))
            .transpose()?;
        let now = chrono::Local::now().naive_local();
        Ok(DateRange::resolve(from, to, config.default_report_from_days, now)?)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Volume { report } => {
            let store = open_data(cli.data.as_deref(), &config)?;
            run_volume_report(store.as_ref(), &report, &config)
        }
        Commands::Purpose { report } => {
            let store = open_data(cli.data.as_deref(), &config)?;
            run_purpose_report(store.as_ref(), &report, &config)
        }
        Commands::Trend { location, report } => {
            let store = open_data(cli.data.as_deref(), &config)?;
            run_trend_report(store.as_ref(), &location, &report, &config)
        }
        Commands::Locations { json } => {
            let store = open_data(cli.data.as_deref(), &config)?;
            run_locations(store.as_ref(), json)
        }
        Commands::Months { since, until, json } => run_months(&since, &until, json),
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn open_data(explicit: Option<&Path>, config: &CliConfig) -> Result<Box<dyn ReportStore>> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| config.data_path.clone())
        .context("No call data file. Pass --data or set data_path in ~/.callintel")?;
    let store = open_store(&path)
        .with_context(|| format!("Could not open call data {}", path.display()))?;
    Ok(store)
}

fn print_heading(title: &str, range: &DateRange) {
    println!(
        "\n  {}  {}\n",
        title.cyan().bold(),
        format!(
            "{} to {}",
            range.from().format("%Y-%m-%d %H:%M"),
            range.to().format("%Y-%m-%d %H:%M")
        )
        .bright_black()
    );
}

fn print_benchmark(benchmark: bool, start: Instant) {
    if benchmark {
        let processing_time_ms = start.elapsed().as_millis();
        println!(
            "{}",
            format!("  Processing time: {}ms", processing_time_ms).bright_black()
        );
    }
}

fn run_volume_report(store: &dyn ReportStore, args: &ReportArgs, config: &CliConfig) -> Result<()> {
    let range = args.range(config)?;
    let start = Instant::now();
    let report = call_volume_report(store, &range)?;

    match args.format() {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Csv => write_grid_csv(std::io::stdout(), "Call type", &report.volume_data)?,
        OutputFormat::Table => {
            print_heading("Call volume", &range);
            println!("{}", grid_table("Call type", &report.volume_data, None));
            println!("\nTotal calls: {}", format_count(report.volume_data.total()));
            print_benchmark(args.benchmark, start);
        }
    }

    Ok(())
}

fn run_purpose_report(
    store: &dyn ReportStore,
    args: &ReportArgs,
    config: &CliConfig,
) -> Result<()> {
    let range = args.range(config)?;
    let start = Instant::now();
    let report = call_purpose_report(store, &range)?;

    match args.format() {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Csv => write_grid_csv(std::io::stdout(), "Purpose", &report.purpose_data)?,
        OutputFormat::Table => {
            print_heading("Call purpose", &range);
            if report.purposes.is_empty() {
                println!("{}", "  No call purposes configured".bright_black());
            } else {
                println!(
                    "{}",
                    grid_table("Purpose", &report.purpose_data, Some(&report.sum_data))
                );
                println!(
                    "\nTotal completed calls: {}",
                    format_count(report.purpose_data.total())
                );
            }
            print_benchmark(args.benchmark, start);
        }
    }

    Ok(())
}

fn run_trend_report(
    store: &dyn ReportStore,
    location: &str,
    args: &ReportArgs,
    config: &CliConfig,
) -> Result<()> {
    let range = args.range(config)?;
    let start = Instant::now();
    let report = call_trend_report(store, location, &range)?;

    match args.format() {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Csv => write_grid_csv(std::io::stdout(), "Month", &report.trend_data)?,
        OutputFormat::Table => {
            print_heading(&format!("Call trend for {}", report.location_name), &range);
            println!("{}", grid_table("Month", &report.trend_data, None));
            println!("\nTotal calls: {}", format_count(report.trend_data.total()));
            print_benchmark(args.benchmark, start);
        }
    }

    Ok(())
}

fn run_locations(store: &dyn ReportStore, json: bool) -> Result<()> {
    let snapshot = store.snapshot(&CallQuery::all())?;
    let locations = list_locations(snapshot.location_names.iter().map(String::as_str));

    if json {
        println!("{}", serde_json::to_string_pretty(&locations)?);
    } else {
        for location in &locations {
            println!("{}", location);
        }
    }

    Ok(())
}

fn run_months(since: &str, until: &str, json: bool) -> Result<()> {
    let from = parse_bound(since, Bound::Start)?;
    let to = parse_bound(until, Bound::End)?;
    let months = list_months(from, to);

    if json {
        println!("{}", serde_json::to_string_pretty(&months)?);
    } else {
        for month in &months {
            println!("{}", month);
        }
    }

    Ok(())
}
