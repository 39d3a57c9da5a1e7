use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use clap::{ArgAction, Parser, ValueEnum};

/// Largest swing window accepted on either side.
pub const MAX_WINDOW: usize = 20;

/// Command-line configuration for the support/resistance finder.
#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct AppConfig {
    /// Input CSV file path containing OHLC data.
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input_path: PathBuf,

    /// Asset label used for report and chart titles.
    #[arg(long, default_value = "ASSET")]
    pub symbol: String,

    /// Bar interval of the input data.
    #[arg(long, value_enum, default_value_t = Timeframe::H1)]
    pub timeframe: Timeframe,

    /// Bars to the left of a swing candidate (defaults per timeframe).
    #[arg(long, value_parser = parse_window)]
    pub left: Option<usize>,

    /// Bars to the right of a swing candidate (defaults per timeframe).
    #[arg(long, value_parser = parse_window)]
    pub right: Option<usize>,

    /// Timezone that naive CSV timestamps are recorded in.
    #[arg(long, default_value = "UTC", value_parser = parse_tz)]
    pub source_tz: Tz,

    /// Timezone bars are displayed and tabulated in.
    #[arg(long = "tz", default_value = "Asia/Tehran", value_parser = parse_tz)]
    pub display_tz: Tz,

    /// Inclusive start of the analysed range, in the display timezone.
    #[arg(long, value_parser = parse_local_datetime, value_name = "YYYY-MM-DD HH:MM")]
    pub start: Option<NaiveDateTime>,

    /// Exclusive end of the analysed range, in the display timezone.
    #[arg(long, value_parser = parse_local_datetime, value_name = "YYYY-MM-DD HH:MM")]
    pub end: Option<NaiveDateTime>,

    /// Keep only the last N days of data when no start is given.
    #[arg(long)]
    pub days: Option<u32>,

    /// Write the results table to this CSV file (or directory).
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Write chart primitives as JSON to this file.
    #[arg(long, value_name = "FILE")]
    pub chart: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl AppConfig {
    pub fn left(&self) -> usize {
        self.left.unwrap_or_else(|| self.timeframe.default_window())
    }

    pub fn right(&self) -> usize {
        self.right.unwrap_or_else(|| self.timeframe.default_window())
    }
}

/// Supported bar intervals and their tuned defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Timeframe {
    #[value(name = "1m")]
    M1,
    #[value(name = "5m")]
    M5,
    #[value(name = "15m")]
    M15,
    #[value(name = "30m")]
    M30,
    #[value(name = "1h")]
    H1,
    #[value(name = "4h")]
    H4,
}

impl Timeframe {
    pub fn minutes(self) -> u32 {
        match self {
            Timeframe::M1 => 1,
            Timeframe::M5 => 5,
            Timeframe::M15 => 15,
            Timeframe::M30 => 30,
            Timeframe::H1 => 60,
            Timeframe::H4 => 240,
        }
    }

    /// Default swing window on each side.
    pub fn default_window(self) -> usize {
        match self {
            Timeframe::M1 => 10,
            Timeframe::M5 => 8,
            Timeframe::M15 => 6,
            Timeframe::M30 => 5,
            Timeframe::H1 => 4,
            Timeframe::H4 => 3,
        }
    }

    /// Suggested lookback in days.
    pub fn default_days(self) -> u32 {
        match self {
            Timeframe::M1 => 1,
            Timeframe::M5 => 3,
            Timeframe::M15 => 5,
            Timeframe::M30 => 7,
            Timeframe::H1 => 14,
            Timeframe::H4 => 30,
        }
    }

    /// Wall-clock hours covered by one full swing window.
    pub fn coverage_hours(self, left: usize, right: usize) -> f64 {
        ((left + right + 1) as f64 * f64::from(self.minutes())) / 60.0
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H4 => "4h",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_window(value: &str) -> Result<usize, String> {
    let window: usize = value
        .parse()
        .map_err(|_| format!("'{value}' is not a whole number"))?;
    if (1..=MAX_WINDOW).contains(&window) {
        Ok(window)
    } else {
        Err(format!("window must be between 1 and {MAX_WINDOW}"))
    }
}

fn parse_tz(value: &str) -> Result<Tz, String> {
    value.parse::<Tz>().map_err(|err| err.to_string())
}

fn parse_local_datetime(value: &str) -> Result<NaiveDateTime, String> {
    let patterns = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];
    for pattern in &patterns {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, pattern) {
            return Ok(datetime);
        }
    }
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(chrono::NaiveTime::MIN))
        .map_err(|_| format!("'{value}' is not a date or datetime"))
}
