use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use swing_levels::analyze;
use swing_levels::config::AppConfig;
use swing_levels::loader::{
    filter_last_days, filter_range, load_bars_from_csv, validate_range, validate_series,
    LoadOptions,
};
use swing_levels::output::{export_csv, print_report, ReportContext};
use swing_levels::render::{build_chart, write_chart_json};

fn main() -> Result<()> {
    let config = AppConfig::parse();
    init_logging(config.verbose);
    run(&config)
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(config: &AppConfig) -> Result<()> {
    let input_path = &config.input_path;
    if !input_path.exists() {
        bail!("input file {:?} does not exist", input_path);
    }
    validate_range(config.start, config.end)?;

    let options = LoadOptions {
        source_tz: config.source_tz,
        display_tz: config.display_tz,
    };
    let raw_bars = load_bars_from_csv(input_path, options)
        .with_context(|| format!("failed to load input data from {:?}", input_path))?;

    let mut bars = filter_range(&raw_bars, config.start, config.end);
    if config.start.is_none() {
        if let Some(days) = config.days {
            bars = filter_last_days(&bars, days);
        }
    }
    if bars.is_empty() {
        bail!("no data found for {} in the selected time range", config.symbol);
    }
    validate_series(&bars)?;

    let (left, right) = (config.left(), config.right());
    info!(
        bars = bars.len(),
        left,
        right,
        suggested_days = config.timeframe.default_days(),
        "running level detection"
    );
    let analysis = analyze(&bars, left, right);
    if bars.len() <= left + right {
        warn!(
            bars = bars.len(),
            window = left + right + 1,
            "series shorter than the swing window"
        );
    }

    let context = ReportContext {
        symbol: &config.symbol,
        timeframe: config.timeframe,
        left,
        right,
    };
    print_report(&context, &bars, &analysis);

    if let Some(target) = &config.export {
        let path = export_csv(&analysis.rows, target, &config.symbol, config.timeframe)?;
        info!(path = %path.display(), rows = analysis.rows.len(), "exported results table");
    }

    if let Some(path) = &config.chart {
        let chart = build_chart(&config.symbol, config.timeframe, &bars, &analysis);
        write_chart_json(&chart, path)?;
        info!(path = %path.display(), "wrote chart primitives");
    }

    Ok(())
}
