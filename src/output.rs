use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tabled::{settings::Style, Table, Tabled};

use crate::analysis::Analysis;
use crate::config::Timeframe;
use crate::data::{Bar, LevelKind, LevelRow};

/// Run parameters echoed in the report header.
pub struct ReportContext<'a> {
    pub symbol: &'a str,
    pub timeframe: Timeframe,
    pub left: usize,
    pub right: usize,
}

#[derive(Tabled)]
struct SwingRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Type")]
    kind: &'static str,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Candle")]
    candle: usize,
}

#[derive(Tabled)]
struct LevelLine {
    #[tabled(rename = "Type")]
    kind: &'static str,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Touches")]
    touches: usize,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
}

pub fn print_report(context: &ReportContext<'_>, bars: &[Bar], analysis: &Analysis) {
    println!(
        "\n=== {} {} Smart Money Support & Resistance ===\n",
        context.symbol, context.timeframe
    );
    if let (Some(first), Some(last)) = (bars.first(), bars.last()) {
        println!(
            "Bars: {} from {} to {}",
            bars.len(),
            first.timestamp.format("%Y-%m-%d %H:%M"),
            last.timestamp.format("%Y-%m-%d %H:%M %Z"),
        );
    }
    println!(
        "Swing Window: {} left / {} right (~{:.1} hours)",
        context.left,
        context.right,
        context.timeframe.coverage_hours(context.left, context.right)
    );
    println!("Cluster Tolerance: {:.4}", analysis.tolerance);

    if analysis.is_empty() {
        println!("No support or resistance levels detected in the selected range");
        return;
    }

    println!(
        "Total Support Levels: {} | Total Resistance Levels: {}",
        analysis.count(LevelKind::Support),
        analysis.count(LevelKind::Resistance)
    );

    let rows: Vec<SwingRow> = analysis
        .rows
        .iter()
        .map(|row| SwingRow {
            date: row.date.clone(),
            time: row.time.clone(),
            kind: row.kind.as_str(),
            price: format!("{:.2}", row.price),
            candle: row.candle,
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("\n{table}\n");

    if analysis.levels.is_empty() {
        println!("No multi-touch levels formed.");
        return;
    }

    let lines: Vec<LevelLine> = analysis
        .levels
        .iter()
        .map(|level| LevelLine {
            kind: level.kind.as_str(),
            price: format!("{:.2}", level.price),
            touches: level.touches(),
            from: level.start.format("%Y-%m-%d %H:%M").to_string(),
            to: level.end.format("%Y-%m-%d %H:%M").to_string(),
        })
        .collect();
    let mut table = Table::new(lines);
    table.with(Style::rounded());
    println!("Multi-touch levels:\n{table}\n");
}

/// Default export file name for a run.
pub fn export_file_name(symbol: &str, timeframe: Timeframe) -> String {
    format!("{symbol}_{timeframe}_smart_levels.csv")
}

/// Write the results table as CSV. A directory target gets the default name.
pub fn export_csv(
    rows: &[LevelRow],
    target: &Path,
    symbol: &str,
    timeframe: Timeframe,
) -> Result<PathBuf> {
    let path = if target.is_dir() {
        target.join(export_file_name(symbol, timeframe))
    } else {
        target.to_path_buf()
    };

    let mut writer =
        csv::Writer::from_path(&path).with_context(|| format!("failed to create {:?}", path))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(path)
}
