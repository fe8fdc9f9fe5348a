mod aggregate;
mod error;
mod model;
mod parser;
mod period;
mod render;
mod scan;
mod settings;
mod source;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};

use period::Period;
use source::{HttpSource, SnapshotSource};

#[derive(Parser)]
#[command(
    name = "mail_time_check",
    about = "Classify reservation mail notices by contact time and build a report"
)]
struct Cli {
    /// First year of the 3-month window. Used only together with START_MONTH,
    /// otherwise the current month in JST is the start
    start_year: Option<i32>,
    /// First month of the window, 1-12
    start_month: Option<u32>,
    /// Read saved pages from this directory instead of the live site
    #[arg(long)]
    snapshot: Option<PathBuf>,
    /// Report path (default: index.html, or public/index.html on CI)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Also write the grouped records as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    info!("=== mail_time_check start ===");
    let result = run(cli).await;
    if let Err(e) = &result {
        error!("Run failed: {:#}", e);
    }
    info!("=== mail_time_check end ===");

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = settings::load().context("Failed to load configuration")?;

    let start = start_period(&cli)?;
    println!("Scanning {} to {}", start, start.end_of_window());

    let agg = match &cli.snapshot {
        Some(dir) => {
            info!("Reading saved pages from {}", dir.display());
            let mut src = SnapshotSource::new(dir);
            scan::scan_window(&mut src, start).await
        }
        None => {
            let mut src = HttpSource::connect(&settings)
                .await
                .context("Failed to open calendar session")?;
            scan::scan_window(&mut src, start).await
        }
    };

    println!(
        "Found {} records: normal={}, numbered={}, follow-up={}, no-action={}",
        agg.total(),
        agg.normal_count(),
        agg.numeric_count(),
        agg.flagged_count(),
        agg.zero_only_count()
    );
    let months: Vec<String> = agg.scanned().iter().map(Period::to_string).collect();
    info!("Months with records: [{}]", months.join(", "));
    if agg.total() == 0 {
        warn!("No records found in the whole window, no report written");
        return Ok(());
    }

    let now = Utc::now().with_timezone(&period::jst());
    let report = render::build_report(
        agg.finish(),
        start,
        now.date_naive(),
        now.format("%Y-%m-%d %H:%M:%S").to_string(),
    );

    let out = settings::output_path(&settings, cli.output.as_deref(), settings::is_github_actions());
    render::write_html(&report, &out).context("Failed to write report")?;
    println!("Report saved to {}", out.display());

    if let Some(json) = &cli.json {
        render::write_json(&report, json).context("Failed to write JSON")?;
        println!("JSON saved to {}", json.display());
    }

    Ok(())
}

fn start_period(cli: &Cli) -> anyhow::Result<Period> {
    match (cli.start_year, cli.start_month) {
        (Some(year), Some(month)) => Ok(Period::new(year, month)?),
        (None, None) => Ok(Period::current()),
        _ => {
            warn!("Start year and month must be given together, using the current month");
            Ok(Period::current())
        }
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("mail_time_check").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn explicit_start() {
        assert_eq!(start_period(&cli(&["2025", "11"])).unwrap(), Period::new(2025, 11).unwrap());
    }

    #[test]
    fn lone_year_falls_back_to_current_month() {
        assert_eq!(start_period(&cli(&["2025"])).unwrap(), Period::current());
        assert_eq!(start_period(&cli(&[])).unwrap(), Period::current());
    }

    #[test]
    fn invalid_start_is_an_error() {
        assert!(start_period(&cli(&["2025", "13"])).is_err());
        assert!(start_period(&cli(&["2147483647", "12"])).is_err());
    }
}
