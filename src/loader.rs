use std::fs::File;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use csv::StringRecord;
use thiserror::Error;
use tracing::{debug, warn};

use crate::data::Bar;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("input file contains no valid rows")]
    Empty,

    #[error("unable to infer timestamp from record: {0:?}")]
    Timestamp(StringRecord),

    #[error("failed to parse numeric field '{field}' from value '{value}'")]
    ParseNumber { field: &'static str, value: String },

    #[error("start {start} must be before end {end}")]
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// Timezones used while reading a CSV file.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// Zone naive timestamps are recorded in.
    pub source_tz: Tz,
    /// Zone bars are converted to.
    pub display_tz: Tz,
}

pub fn load_bars_from_csv<P: AsRef<Path>>(path: P, options: LoadOptions) -> Result<Vec<Bar>> {
    let path_ref = path.as_ref();
    let file = File::open(path_ref).with_context(|| format!("failed to open {:?}", path_ref))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file);

    let mut bars = Vec::new();
    let mut dropped = 0usize;
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        match parse_record(&record, options)? {
            Some(bar) if is_well_formed(&bar) => bars.push(bar),
            Some(bar) => {
                warn!(timestamp = %bar.timestamp, "dropping malformed bar");
                dropped += 1;
            }
            None => continue,
        }
    }

    if bars.is_empty() {
        return Err(LoaderError::Empty.into());
    }

    bars.sort_by_key(|bar| bar.timestamp);
    let before = bars.len();
    bars.dedup_by_key(|bar| bar.timestamp);
    debug!(
        rows = bars.len(),
        dropped,
        duplicates = before - bars.len(),
        "loaded bars from csv"
    );
    Ok(bars)
}

/// Finite prices with `high >= low >= 0`.
fn is_well_formed(bar: &Bar) -> bool {
    let prices = [bar.open, bar.high, bar.low, bar.close];
    prices.iter().all(|p| p.is_finite()) && bar.high >= bar.low && bar.low >= 0.0
}

fn parse_record(record: &StringRecord, options: LoadOptions) -> Result<Option<Bar>> {
    // Skip header rows by checking the first field.
    if let Some(first) = record.get(0) {
        let first = first.trim();
        if ["date", "datetime", "timestamp", "time"]
            .iter()
            .any(|h| first.eq_ignore_ascii_case(h))
        {
            return Ok(None);
        }
    }

    let fields: Vec<&str> = record.iter().map(str::trim).collect();
    if fields.len() < 5 {
        return Ok(None);
    }

    let (timestamp, offset) = match parse_datetime_string(fields[0], options)? {
        Some(dt) => (dt, 1),
        None => {
            let naive = parse_datetime_pair(fields[0], fields[1])
                .map_err(|_| anyhow!(LoaderError::Timestamp(record.clone())))?;
            (localize(naive, options), 2)
        }
    };

    let price = |position: usize, field: &'static str| -> Result<Option<f64>> {
        fields
            .get(offset + position)
            .map(|value| parse_number(value, field))
            .transpose()
    };
    let (Some(open), Some(high), Some(low), Some(close)) = (
        price(0, "open")?,
        price(1, "high")?,
        price(2, "low")?,
        price(3, "close")?,
    ) else {
        return Ok(None);
    };
    let volume = price(4, "volume")?
        .filter(|v| v.is_finite())
        .unwrap_or(0.0);

    Ok(Some(Bar {
        timestamp,
        open,
        high,
        low,
        close,
        volume,
    }))
}

fn localize(naive: NaiveDateTime, options: LoadOptions) -> DateTime<Tz> {
    let source = options.source_tz;
    let timestamp = match source.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => dt,
        chrono::LocalResult::Ambiguous(dt, _) => dt,
        chrono::LocalResult::None => {
            warn!(%naive, zone = %source, "timestamp falls in a DST gap, reading it as UTC");
            source.from_utc_datetime(&naive)
        }
    };
    timestamp.with_timezone(&options.display_tz)
}

fn parse_number(value: &str, field: &'static str) -> Result<f64> {
    // Missing values become NaN so the row is dropped rather than shifted.
    let lowered = value.to_ascii_lowercase();
    if lowered.is_empty() || lowered == "nan" || lowered == "null" || lowered == "na" {
        return Ok(f64::NAN);
    }
    value
        .replace(',', "")
        .parse::<f64>()
        .map_err(|_| LoaderError::ParseNumber {
            field,
            value: value.to_string(),
        })
        .map_err(anyhow::Error::from)
}

fn parse_datetime_pair(date_str: &str, time_str: &str) -> Result<NaiveDateTime> {
    let date = parse_date(date_str)?;
    let time = parse_time(time_str)?;
    Ok(NaiveDateTime::new(date, time))
}

fn parse_datetime_string(value: &str, options: LoadOptions) -> Result<Option<DateTime<Tz>>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if let Ok(aware) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Some(aware.with_timezone(&options.display_tz)));
    }

    let patterns = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%m/%d/%Y %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
    ];

    for pattern in &patterns {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return Ok(Some(localize(datetime, options)));
        }
    }

    Ok(None)
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    let patterns = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    for pattern in &patterns {
        if let Ok(date) = NaiveDate::parse_from_str(value, pattern) {
            return Ok(date);
        }
    }
    Err(LoaderError::Timestamp(StringRecord::from(vec![value.to_string()])).into())
}

fn parse_time(value: &str) -> Result<NaiveTime> {
    let patterns = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];
    for pattern in &patterns {
        if let Ok(time) = NaiveTime::parse_from_str(value, pattern) {
            return Ok(time);
        }
    }
    Err(LoaderError::Timestamp(StringRecord::from(vec![value.to_string()])).into())
}

/// Reject an inverted range before any data is read.
pub fn validate_range(start: Option<NaiveDateTime>, end: Option<NaiveDateTime>) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(LoaderError::InvalidRange { start, end }.into());
        }
    }
    Ok(())
}

/// Keep bars whose local time lies in `[start, end)`.
pub fn filter_range(
    bars: &[Bar],
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Vec<Bar> {
    bars.iter()
        .filter(|bar| {
            let local = bar.timestamp.naive_local();
            start.map_or(true, |s| local >= s) && end.map_or(true, |e| local < e)
        })
        .cloned()
        .collect()
}

/// Keep bars within `days` of the final bar.
pub fn filter_last_days(bars: &[Bar], days: u32) -> Vec<Bar> {
    let Some(last) = bars.last() else {
        return Vec::new();
    };
    let cutoff = last.timestamp - Duration::days(i64::from(days));
    bars.iter()
        .filter(|bar| bar.timestamp >= cutoff)
        .cloned()
        .collect()
}

pub fn validate_series(bars: &[Bar]) -> Result<()> {
    if bars.is_empty() {
        return Err(LoaderError::Empty.into());
    }

    for pair in bars.windows(2) {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(anyhow!("timestamps must be strictly increasing"));
        }
    }

    Ok(())
}
