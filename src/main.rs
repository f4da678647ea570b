// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use healthcare_eda::{load_data, resolve_data_path, AppConfig, Report};

#[derive(Parser, Debug)]
#[command(name = "healthcare-eda")]
#[command(version)]
#[command(about = "Terminal dashboard for exploratory analysis of a healthcare dataset")]
struct Args {
    /// CSV file with patient records
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Logs go to stderr so they stay off the alternate screen
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?.with_data_path(args.data);

    run_ui_mode(&config)
}

fn build_report(config: &AppConfig) -> Result<Report> {
    let data_path = resolve_data_path(&config.data_path);

    let dataset = load_data(&data_path)
        .with_context(|| format!("Failed to load dataset from {}", data_path.display()))?;

    let report = Report::build(&dataset, &config.report_options())
        .context("Failed to compute dashboard statistics")?;

    Ok(report)
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &AppConfig) -> Result<()> {
    println!("🏥 Loading Healthcare EDA Dashboard...\n");

    let report = build_report(config)?;
    println!(
        "✓ Loaded {} records with {} features\n",
        report.overview.total_records, report.overview.total_features
    );
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(report);
    ui::run_ui(&mut app)?;

    println!("\n✅ Dashboard closed");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(config: &AppConfig) -> Result<()> {
    // Without the terminal UI, print the Overview metrics
    let report = build_report(config)?;
    for tile in &report.overview.metrics {
        println!("{}: {}", tile.label, tile.value);
    }

    eprintln!("\nTUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use web UI: cargo run --bin healthcare-server --features server");

    Ok(())
}
