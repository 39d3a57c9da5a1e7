use chrono::{DateTime, Duration, TimeZone};
use chrono_tz::{Tz, UTC};

use crate::data::Bar;

/// Hourly timestamp `index` hours after 2024-01-01 00:00 UTC.
pub fn hourly(index: usize) -> DateTime<Tz> {
    let origin = UTC.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    origin + Duration::hours(index as i64)
}

/// Bars from `(high, low)` pairs; open and close sit at the midpoint.
pub fn bars_from_hl(pairs: &[(f64, f64)]) -> Vec<Bar> {
    pairs
        .iter()
        .enumerate()
        .map(|(idx, &(high, low))| {
            let mid = (high + low) / 2.0;
            Bar {
                timestamp: hourly(idx),
                open: mid,
                high,
                low,
                close: mid,
                volume: 0.0,
            }
        })
        .collect()
}

/// Bars with a one-point range around each close.
pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
    let pairs: Vec<(f64, f64)> = closes.iter().map(|&c| (c + 0.5, c - 0.5)).collect();
    bars_from_hl(&pairs)
}

/// Strictly increasing for `half` bars, then strictly decreasing for `half`.
pub fn peak_series(half: usize) -> Vec<Bar> {
    let rising = (0..half).map(|i| 100.0 + i as f64);
    let falling = (0..half).map(|i| 100.0 + half as f64 - 2.0 - i as f64);
    let closes: Vec<f64> = rising.chain(falling).collect();
    bars_from_closes(&closes)
}
