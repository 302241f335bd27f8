use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use lavapop_metrics::config::get_config;
use lavapop_metrics::display::ReportRenderer;
use lavapop_metrics::logging::init_logging;
use lavapop_metrics::models::WindowKind;
use lavapop_metrics::normalizer::parse_br_datetime;
use lavapop_metrics::MetricsEngine;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "lavapop-metrics")]
#[command(about = "Laundromat dashboard metrics from a POS sales export")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ReportArgs {
    /// Path to the sales CSV export
    file: PathBuf,
    /// Reporting window: current-week, last-week, two-weeks-ago,
    /// trailing-4-weeks, previous-4-weeks, or all-time
    #[arg(long, default_value = "current-week")]
    window: String,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
    /// Reference instant (DD/MM/YYYY HH:MM:SS), defaults to now
    #[arg(long)]
    reference: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show weighted utilization with peak/off-peak splits
    Utilization {
        #[command(flatten)]
        args: ReportArgs,
    },
    /// Show hourly patterns and busiest/quietest hours
    Hourly {
        #[command(flatten)]
        args: ReportArgs,
    },
    /// Show day-of-week patterns
    Weekday {
        #[command(flatten)]
        args: ReportArgs,
    },
    /// Show per-machine use counts and attributed revenue
    Machines {
        #[command(flatten)]
        args: ReportArgs,
        /// Show only the top N machines
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show the machine vs. credit top-up revenue breakdown
    Revenue {
        #[command(flatten)]
        args: ReportArgs,
    },
    /// Show every report for one window
    Summary {
        #[command(flatten)]
        args: ReportArgs,
    },
}

fn main() -> Result<()> {
    // Held until exit so buffered file-log lines are flushed.
    let _guard = init_logging();
    let cli = Cli::parse();

    let (args, limit) = match &cli.command {
        Commands::Utilization { args }
        | Commands::Hourly { args }
        | Commands::Weekday { args }
        | Commands::Revenue { args }
        | Commands::Summary { args } => (args, None),
        Commands::Machines { args, limit } => (args, *limit),
    };

    if let Err(e) = run(&cli.command, args, limit) {
        handle_error(e, args.json);
    }

    Ok(())
}

fn run(command: &Commands, args: &ReportArgs, limit: Option<usize>) -> Result<()> {
    let config = get_config();
    let engine = MetricsEngine::new(config);
    let renderer = ReportRenderer::new();

    let reference = match &args.reference {
        Some(value) => parse_br_datetime(value).ok_or_else(|| {
            anyhow::anyhow!("Invalid reference instant: {}. Use DD/MM/YYYY HH:MM:SS", value)
        })?,
        None => chrono::Local::now().naive_local(),
    };

    let kind = WindowKind::parse(&args.window);
    let window = engine.resolve_window(kind, reference);
    let (records, summary) = engine.load_records(&args.file)?;

    if !args.json {
        renderer.display_ingest_summary(&summary);
    }

    match command {
        Commands::Utilization { .. } => {
            let metric = engine.utilization(&records, &window);
            renderer.display_utilization(&metric, &window, args.json);
        }
        Commands::Hourly { .. } => {
            let patterns = engine.hourly_patterns(&records, &window);
            let peaks = engine.peak_hours(&records, &window);
            renderer.display_hourly(&patterns, &peaks, &window, args.json);
        }
        Commands::Weekday { .. } => {
            let patterns = engine.weekday_patterns(&records, &window);
            renderer.display_weekday(&patterns, &window, args.json);
        }
        Commands::Machines { .. } => {
            let performance = engine.machine_performance(&records, &window);
            renderer.display_machines(&performance, &window, limit, args.json);
        }
        Commands::Revenue { .. } => {
            let breakdown = engine.revenue(&records, &window);
            renderer.display_revenue(&breakdown, &window, args.json);
        }
        Commands::Summary { .. } => {
            let report = engine.dashboard(&records, &window);
            renderer.display_summary(&report, args.json);
        }
    }

    Ok(())
}

fn handle_error(e: anyhow::Error, json: bool) -> ! {
    if json {
        println!("{}", serde_json::json!({ "error": e.to_string() }));
    } else {
        eprintln!("Error: {}", e);
    }
    process::exit(1);
}
